//! Platted town layout: streets, blocks, lots and the block distance table.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::id::{BlockId, BuildingId, LotId, StreetId};

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Direction {
    North,
    South,
    East,
    West,
}

string_enum!(Direction {
    North => "N",
    South => "S",
    East => "E",
    West => "W",
});

/// Streets running north-south are avenues; east-west ones are streets.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Orientation {
    NorthSouth,
    EastWest,
}

string_enum!(Orientation {
    NorthSouth => "ns",
    EastWest => "ew",
});

/// Which side of its street a lot sits on. East and north sides carry even
/// house numbers; west and south sides carry odd ones.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Side {
    North,
    South,
    East,
    West,
}

string_enum!(Side {
    North => "north",
    South => "south",
    East => "east",
    West => "west",
});

impl Side {
    /// 0 for even-numbered sides, 1 for odd-numbered sides.
    pub fn parity(self) -> u32 {
        match self {
            Side::East | Side::North => 0,
            Side::West | Side::South => 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Street {
    pub id: StreetId,
    pub number: u32,
    pub direction: Direction,
    pub orientation: Orientation,
    pub name: String,
    /// Blocks in order along the street.
    pub blocks: Vec<BlockId>,
}

impl Street {
    pub fn start_block(&self) -> Option<BlockId> {
        self.blocks.first().copied()
    }

    pub fn end_block(&self) -> Option<BlockId> {
        self.blocks.last().copied()
    }
}

/// One street segment between two adjacent intersections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    pub id: BlockId,
    pub street: StreetId,
    /// Hundred-based block number, e.g. 300 for the 300 block.
    pub number: u32,
    pub orientation: Orientation,
    /// Segment midpoint on a grid where intersections sit at even coordinates.
    pub coords: (u32, u32),
    pub lots: Vec<LotId>,
    pub neighbors: Vec<BlockId>,
}

/// A lot's presence on one of its blocks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Frontage {
    pub block: BlockId,
    pub house_number: u32,
    pub side: Side,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LotKind {
    /// An ordinary parcel on the edge or corner of a block.
    Parcel,
    /// The interior of a large block; reserved for parks and cemeteries.
    Tract,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lot {
    pub id: LotId,
    pub kind: LotKind,
    pub frontages: Vec<Frontage>,
    /// Index into `frontages` of the block that gives the street address.
    pub address_frontage: usize,
    pub building: Option<BuildingId>,
    pub former_buildings: Vec<BuildingId>,
    /// Lots sharing at least one block with this one.
    pub neighbors: Vec<LotId>,
}

impl Lot {
    pub fn blocks(&self) -> impl Iterator<Item = BlockId> + '_ {
        self.frontages.iter().map(|f| f.block)
    }

    pub fn street_address(&self) -> &Frontage {
        &self.frontages[self.address_frontage]
    }

    pub fn is_vacant(&self) -> bool {
        self.building.is_none()
    }
}

/// Dense all-pairs block hop counts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DistanceTable {
    n: usize,
    hops: Vec<u32>,
}

impl DistanceTable {
    pub const UNREACHABLE: u32 = u32::MAX;

    pub fn new(n: usize) -> Self {
        let mut hops = vec![Self::UNREACHABLE; n * n];
        for i in 0..n {
            hops[i * n + i] = 0;
        }
        Self { n, hops }
    }

    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    pub fn get(&self, a: BlockId, b: BlockId) -> u32 {
        self.hops[a.index() * self.n + b.index()]
    }

    pub fn set(&mut self, a: BlockId, b: BlockId, hops: u32) {
        self.hops[a.index() * self.n + b.index()] = hops;
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Town {
    pub name: String,
    pub size: u32,
    pub streets: Vec<Street>,
    pub blocks: Vec<Block>,
    pub lots: Vec<Lot>,
    pub paths: DistanceTable,
    pub downtown: Option<LotId>,
}

impl Town {
    pub fn street(&self, id: StreetId) -> &Street {
        &self.streets[id.index()]
    }

    pub fn block(&self, id: BlockId) -> &Block {
        &self.blocks[id.index()]
    }

    pub fn lot(&self, id: LotId) -> &Lot {
        &self.lots[id.index()]
    }

    pub fn lot_mut(&mut self, id: LotId) -> &mut Lot {
        &mut self.lots[id.index()]
    }

    /// "<number> <street name>" for a lot's address block.
    pub fn address_of(&self, lot: LotId) -> String {
        let frontage = self.lot(lot).street_address();
        let street = self.street(self.block(frontage.block).street);
        format!("{} {}", frontage.house_number, street.name)
    }

    /// "The 300 block of Third Street" style description.
    pub fn block_name(&self, block: BlockId) -> String {
        let block = self.block(block);
        format!("{} block of {}", block.number, self.street(block.street).name)
    }

    /// Minimum block hop count between any block of `a` and any block of `b`.
    pub fn lot_distance(&self, a: LotId, b: LotId) -> u32 {
        let (a, b) = (self.lot(a), self.lot(b));
        a.blocks()
            .flat_map(|x| b.blocks().map(move |y| (x, y)))
            .map(|(x, y)| self.paths.get(x, y))
            .min()
            .unwrap_or(DistanceTable::UNREACHABLE)
    }

    /// The lot plus its neighbors.
    pub fn secondary_lots(&self, lot: LotId) -> BTreeSet<LotId> {
        let mut lots = BTreeSet::from([lot]);
        lots.extend(self.lot(lot).neighbors.iter().copied());
        lots
    }

    /// The lot, its neighbors, and their neighbors.
    pub fn tertiary_lots(&self, lot: LotId) -> BTreeSet<LotId> {
        let secondary = self.secondary_lots(lot);
        let mut lots = secondary.clone();
        for neighbor in &secondary {
            lots.extend(self.lot(*neighbor).neighbors.iter().copied());
        }
        lots
    }

    pub fn tertiary_density(&self, lot: LotId) -> usize {
        self.tertiary_lots(lot).len()
    }

    pub fn vacant_lots(&self, kind: LotKind) -> impl Iterator<Item = LotId> + '_ {
        self.lots
            .iter()
            .filter(move |l| l.kind == kind && l.is_vacant())
            .map(|l| l.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_table_diagonal_is_zero() {
        let mut table = DistanceTable::new(3);
        assert_eq!(table.get(BlockId(1), BlockId(1)), 0);
        assert_eq!(table.get(BlockId(0), BlockId(2)), DistanceTable::UNREACHABLE);
        table.set(BlockId(0), BlockId(2), 4);
        assert_eq!(table.get(BlockId(0), BlockId(2)), 4);
    }

    #[test]
    fn side_parity() {
        assert_eq!(Side::East.parity(), 0);
        assert_eq!(Side::North.parity(), 0);
        assert_eq!(Side::West.parity(), 1);
        assert_eq!(Side::South.parity(), 1);
    }

    #[test]
    fn direction_strings() {
        assert_eq!(Direction::North.as_str(), "N");
        assert_eq!("W".parse::<Direction>(), Ok(Direction::West));
    }
}
