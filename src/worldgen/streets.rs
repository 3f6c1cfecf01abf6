//! Street segments, merged streets and the block adjacency graph.

use std::collections::{BTreeMap, BTreeSet};

use rand::RngCore;

use crate::config::WorldGenConfig;
use crate::corpora::Corpora;
use crate::id::{BlockId, StreetId};
use crate::model::{Block, Direction, Orientation, Street};
use crate::sim::random::chance;

use super::quadtree::Cell;

/// One unit street segment on the intersection grid. Intersections sit at
/// even map coordinates; `(i, j)` is the segment's first endpoint in grid
/// units (map coordinate / 2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Segment {
    pub orientation: Orientation,
    pub i: u32,
    pub j: u32,
}

impl Segment {
    pub fn ns(i: u32, j: u32) -> Self {
        Self { orientation: Orientation::NorthSouth, i, j }
    }

    pub fn ew(i: u32, j: u32) -> Self {
        Self { orientation: Orientation::EastWest, i, j }
    }

    fn endpoints(&self) -> [(u32, u32); 2] {
        match self.orientation {
            Orientation::NorthSouth => [(self.i, self.j), (self.i, self.j + 1)],
            Orientation::EastWest => [(self.i, self.j), (self.i + 1, self.j)],
        }
    }

    /// Line the segment lies on, and its position along that line.
    fn line_and_position(&self) -> (u32, u32) {
        match self.orientation {
            Orientation::NorthSouth => (self.i, self.j),
            Orientation::EastWest => (self.j, self.i),
        }
    }

    /// Hundred-based block number: the position along the street.
    fn block_number(&self) -> u32 {
        (self.line_and_position().1 + 1) * 100
    }

    /// Midpoint in map coordinates.
    fn coords(&self) -> (u32, u32) {
        match self.orientation {
            Orientation::NorthSouth => (2 * self.i, 2 * self.j + 1),
            Orientation::EastWest => (2 * self.i + 1, 2 * self.j),
        }
    }
}

/// The four sides of a quadtree leaf as segments, in order along each side:
/// west, east, north, south.
pub fn cell_sides(cell: &Cell) -> [Vec<Segment>; 4] {
    let (gi, gj, k) = (cell.x / 2, cell.y / 2, cell.width / 2);
    [
        (0..k).map(|t| Segment::ns(gi, gj + t)).collect(),
        (0..k).map(|t| Segment::ns(gi + k, gj + t)).collect(),
        (0..k).map(|t| Segment::ew(gi + t, gj)).collect(),
        (0..k).map(|t| Segment::ew(gi + t, gj + k)).collect(),
    ]
}

pub struct StreetGrid {
    pub streets: Vec<Street>,
    pub blocks: Vec<Block>,
    pub segments: BTreeMap<Segment, BlockId>,
}

/// Merge the leaves' edges into maximal collinear streets, one block per
/// segment, and link blocks that meet at an intersection.
pub fn build_streets(
    cells: &[Cell],
    config: &WorldGenConfig,
    corpora: &Corpora,
    rng: &mut dyn RngCore,
) -> StreetGrid {
    // 1. Deduplicated unit segments, grouped by line
    let mut lines: BTreeMap<(Orientation, u32), BTreeSet<u32>> = BTreeMap::new();
    for cell in cells {
        for side in cell_sides(cell) {
            for segment in side {
                let (line, position) = segment.line_and_position();
                lines
                    .entry((segment.orientation, line))
                    .or_default()
                    .insert(position);
            }
        }
    }

    // 2. Maximal runs become streets; each segment becomes a block
    let mut streets = Vec::new();
    let mut blocks = Vec::new();
    let mut segments = BTreeMap::new();
    let half = config.size / 4;
    for ((orientation, line), positions) in &lines {
        for run in runs(positions) {
            let street_id = StreetId(streets.len() as u32);
            let number = line + 1;
            let direction = match (orientation, number < half) {
                (Orientation::NorthSouth, true) => Direction::North,
                (Orientation::NorthSouth, false) => Direction::South,
                (Orientation::EastWest, true) => Direction::East,
                (Orientation::EastWest, false) => Direction::West,
            };
            let mut street_blocks = Vec::new();
            for position in run {
                let segment = match orientation {
                    Orientation::NorthSouth => Segment::ns(*line, position),
                    Orientation::EastWest => Segment::ew(position, *line),
                };
                let block_id = BlockId(blocks.len() as u32);
                blocks.push(Block {
                    id: block_id,
                    street: street_id,
                    number: segment.block_number(),
                    orientation: *orientation,
                    coords: segment.coords(),
                    lots: Vec::new(),
                    neighbors: Vec::new(),
                });
                segments.insert(segment, block_id);
                street_blocks.push(block_id);
            }
            let name = street_name(*orientation, number, direction, config, corpora, rng);
            streets.push(Street {
                id: street_id,
                number,
                direction,
                orientation: *orientation,
                name,
                blocks: street_blocks,
            });
        }
    }

    // 3. Blocks sharing an intersection are neighbors
    let mut at_intersection: BTreeMap<(u32, u32), Vec<BlockId>> = BTreeMap::new();
    for (segment, block) in &segments {
        for endpoint in segment.endpoints() {
            at_intersection.entry(endpoint).or_default().push(*block);
        }
    }
    for (segment, block) in &segments {
        let mut neighbors: BTreeSet<BlockId> = BTreeSet::new();
        for endpoint in segment.endpoints() {
            neighbors.extend(at_intersection[&endpoint].iter().copied());
        }
        neighbors.remove(block);
        blocks[block.index()].neighbors = neighbors.into_iter().collect();
    }

    StreetGrid {
        streets,
        blocks,
        segments,
    }
}

/// Split sorted positions into runs of consecutive values.
fn runs(positions: &BTreeSet<u32>) -> Vec<Vec<u32>> {
    let mut out: Vec<Vec<u32>> = Vec::new();
    for &p in positions {
        match out.last_mut() {
            Some(run) if run.last().is_some_and(|last| last + 1 == p) => run.push(p),
            _ => out.push(vec![p]),
        }
    }
    out
}

fn street_name(
    orientation: Orientation,
    number: u32,
    direction: Direction,
    config: &WorldGenConfig,
    corpora: &Corpora,
    rng: &mut dyn RngCore,
) -> String {
    let kind = match orientation {
        Orientation::NorthSouth => "Avenue",
        Orientation::EastWest => "Street",
    };
    if chance(rng, config.chance_street_gets_surname) {
        format!("{} {kind}", corpora.surname(rng))
    } else {
        format!("{} {kind} {direction}", ordinal(number))
    }
}

/// 1 -> "1st", 12 -> "12th", 23 -> "23rd".
pub fn ordinal(n: u32) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn ordinals() {
        assert_eq!(ordinal(1), "1st");
        assert_eq!(ordinal(2), "2nd");
        assert_eq!(ordinal(3), "3rd");
        assert_eq!(ordinal(11), "11th");
        assert_eq!(ordinal(22), "22nd");
        assert_eq!(ordinal(113), "113th");
    }

    #[test]
    fn single_cell_makes_four_streets() {
        let mut rng = SmallRng::seed_from_u64(0);
        let config = WorldGenConfig::default();
        let cells = [Cell { x: 0, y: 0, width: 4 }];
        let grid = build_streets(&cells, &config, &Corpora::builtin(), &mut rng);
        assert_eq!(grid.streets.len(), 4);
        assert_eq!(grid.blocks.len(), 8);
        assert!(grid.streets.iter().all(|s| s.blocks.len() == 2));
        // A corner block meets its collinear partner and one perpendicular block.
        let corner = grid.segments[&Segment::ns(0, 0)];
        assert_eq!(grid.blocks[corner.index()].neighbors.len(), 2);
    }

    #[test]
    fn split_cells_share_segments() {
        let mut rng = SmallRng::seed_from_u64(0);
        let config = WorldGenConfig::default();
        let cells = [
            Cell { x: 0, y: 0, width: 2 },
            Cell { x: 2, y: 0, width: 2 },
        ];
        let grid = build_streets(&cells, &config, &Corpora::builtin(), &mut rng);
        // three avenues of one block, two streets of two blocks
        assert_eq!(grid.blocks.len(), 7);
        assert_eq!(grid.streets.len(), 5);
        let numbers: Vec<u32> = grid.blocks.iter().map(|b| b.number).collect();
        assert!(numbers.iter().all(|n| n % 100 == 0));
    }
}
