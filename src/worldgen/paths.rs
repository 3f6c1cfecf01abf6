//! Block-to-block shortest paths and the downtown lot.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, BTreeMap};

use crate::id::{BlockId, LotId};
use crate::model::{Block, DistanceTable, LotKind, Town};

/// Adjacent blocks differ by two in Manhattan distance, so half of it never
/// overestimates the remaining hops.
fn heuristic(a: &Block, b: &Block) -> u32 {
    (a.coords.0.abs_diff(b.coords.0) + a.coords.1.abs_diff(b.coords.1)) / 2
}

/// A* hop count between two blocks, or `None` when disconnected.
pub fn shortest_path(blocks: &[Block], start: BlockId, goal: BlockId) -> Option<u32> {
    let goal_block = &blocks[goal.index()];
    let mut open = BinaryHeap::new();
    let mut best: BTreeMap<BlockId, u32> = BTreeMap::new();
    best.insert(start, 0);
    open.push(Reverse((heuristic(&blocks[start.index()], goal_block), 0u32, start)));

    while let Some(Reverse((_, cost, block))) = open.pop() {
        if block == goal {
            return Some(cost);
        }
        if best.get(&block).is_some_and(|&b| b < cost) {
            continue;
        }
        for &next in &blocks[block.index()].neighbors {
            let next_cost = cost + 1;
            if best.get(&next).is_none_or(|&b| next_cost < b) {
                best.insert(next, next_cost);
                let estimate = next_cost + heuristic(&blocks[next.index()], goal_block);
                open.push(Reverse((estimate, next_cost, next)));
            }
        }
    }
    None
}

/// All-pairs table; paths are symmetric so each pair is searched once.
pub fn all_pairs(blocks: &[Block]) -> DistanceTable {
    let mut table = DistanceTable::new(blocks.len());
    for (i, a) in blocks.iter().enumerate() {
        for b in &blocks[i + 1..] {
            if let Some(hops) = shortest_path(blocks, a.id, b.id) {
                table.set(a.id, b.id, hops);
                table.set(b.id, a.id, hops);
            }
        }
    }
    table
}

/// The parcel with the most lots within two neighbor hops; lowest id wins ties.
pub fn downtown(town: &Town) -> Option<LotId> {
    town.lots
        .iter()
        .filter(|lot| lot.kind == LotKind::Parcel)
        .map(|lot| (town.tertiary_density(lot.id), Reverse(lot.id)))
        .max()
        .map(|(_, Reverse(id))| id)
}
