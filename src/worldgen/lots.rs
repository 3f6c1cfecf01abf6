//! Lot platting: corner and edge parcels along each leaf, tracts inside
//! large leaves, house numbers per block side.

use std::collections::{BTreeMap, BTreeSet};

use rand::{Rng, RngCore};

use crate::config::WorldGenConfig;
use crate::id::{BlockId, LotId};
use crate::model::{Block, Frontage, Lot, LotKind, Side};

use super::quadtree::Cell;
use super::streets::{Segment, StreetGrid, cell_sides};

/// Side of the street a leaf's edge lots face, in `cell_sides` order.
const LEAF_SIDES: [Side; 4] = [Side::East, Side::West, Side::South, Side::North];

/// House numbers for the `n` lot slots on one side of a block, strictly
/// increasing and with the side's parity.
pub fn house_numbers(
    block_number: u32,
    side: Side,
    n: u32,
    config: &WorldGenConfig,
    rng: &mut dyn RngCore,
) -> Vec<u32> {
    let parity = side.parity();
    let lo = with_parity(config.smallest_possible_house_number, parity, true);
    let hi = with_parity(config.largest_possible_house_number, parity, false);
    let increment = (100 / n).max(2);
    let mut numbers: Vec<u32> = Vec::with_capacity(n as usize);
    for i in 0..n {
        let base = (i * increment) as i64 - 1;
        let mut number = base + rng.random_range(0..increment) as i64;
        if number.rem_euclid(2) as u32 != parity {
            number += 1;
        }
        let mut number = (number.max(0) as u32).clamp(lo, hi);
        if let Some(prev) = numbers.last() {
            number = number.max(prev + 2).min(hi);
        }
        numbers.push(number);
    }
    numbers.into_iter().map(|n| n + block_number).collect()
}

fn with_parity(n: u32, parity: u32, round_up: bool) -> u32 {
    match (n % 2 == parity, round_up) {
        (true, _) => n,
        (false, true) => n + 1,
        (false, false) => n.saturating_sub(1),
    }
}

/// One lot slot along a leaf side: which segment and which slot within it.
struct Slot {
    segment: Segment,
    slot: usize,
}

/// Plat every leaf. Corner lots front two blocks, edge lots one, and tracts
/// front every block around a leaf at least two blocks wide.
pub fn plat_lots(
    cells: &[Cell],
    grid: &mut StreetGrid,
    config: &WorldGenConfig,
    rng: &mut dyn RngCore,
) -> Vec<Lot> {
    let n = config.n_buildings_per_block;
    let mut numbering: BTreeMap<(BlockId, Side), Vec<u32>> = BTreeMap::new();
    let mut lots: Vec<Lot> = Vec::new();

    for cell in cells {
        let sides = cell_sides(cell);
        let k = cell.width / 2;
        let slots: Vec<Vec<Slot>> = sides
            .iter()
            .map(|segments| {
                (0..k * n)
                    .map(|p| Slot {
                        segment: segments[(p / n) as usize],
                        slot: (p % n) as usize,
                    })
                    .collect()
            })
            .collect();
        let last = (k * n - 1) as usize;
        let [west, east, north, south] = [0usize, 1, 2, 3];

        let mut frontage = |side: usize, slot: &Slot, rng: &mut dyn RngCore| -> Frontage {
            let block = grid.segments[&slot.segment];
            let number = grid.blocks[block.index()].number;
            let side = LEAF_SIDES[side];
            let numbers = numbering
                .entry((block, side))
                .or_insert_with(|| house_numbers(number, side, n, config, rng));
            Frontage {
                block,
                house_number: numbers[slot.slot],
                side,
            }
        };

        // 1. Corners, clockwise from the northwest
        let corners = [
            [(west, 0), (north, 0)],
            [(north, last), (east, 0)],
            [(south, last), (east, last)],
            [(west, last), (south, 0)],
        ];
        for corner in corners {
            let frontages = corner
                .iter()
                .map(|&(side, p)| frontage(side, &slots[side][p], rng))
                .collect();
            push_lot(&mut lots, LotKind::Parcel, frontages, rng);
        }

        // 2. Edge lots between the corners
        for side in [west, north, east, south] {
            for slot in &slots[side][1..last] {
                let frontages = vec![frontage(side, slot, rng)];
                push_lot(&mut lots, LotKind::Parcel, frontages, rng);
            }
        }

        // 3. A tract for the interior of large leaves
        if k >= 2 {
            let frontages = sides
                .iter()
                .zip(LEAF_SIDES)
                .flat_map(|(segments, side)| {
                    segments.iter().map(move |segment| (*segment, side))
                })
                .map(|(segment, side)| {
                    let block = grid.segments[&segment];
                    Frontage {
                        block,
                        house_number: grid.blocks[block.index()].number,
                        side,
                    }
                })
                .collect();
            push_lot(&mut lots, LotKind::Tract, frontages, rng);
        }
    }

    link_lots(&mut lots, &mut grid.blocks);
    lots
}

fn push_lot(lots: &mut Vec<Lot>, kind: LotKind, frontages: Vec<Frontage>, rng: &mut dyn RngCore) {
    let address_frontage = rng.random_range(0..frontages.len());
    lots.push(Lot {
        id: LotId(lots.len() as u32),
        kind,
        frontages,
        address_frontage,
        building: None,
        former_buildings: Vec::new(),
        neighbors: Vec::new(),
    });
}

/// Register each lot on its blocks, then link lots that share a block.
fn link_lots(lots: &mut [Lot], blocks: &mut [Block]) {
    for lot in lots.iter() {
        for block in lot.blocks() {
            blocks[block.index()].lots.push(lot.id);
        }
    }
    for i in 0..lots.len() {
        let mut neighbors: BTreeSet<LotId> = BTreeSet::new();
        for block in lots[i].blocks() {
            neighbors.extend(blocks[block.index()].lots.iter().copied());
        }
        neighbors.remove(&lots[i].id);
        lots[i].neighbors = neighbors.into_iter().collect();
    }
}
