use std::fmt;

use serde::{Deserialize, Serialize};

/// Monotonic ID generator shared across all entity types.
/// Guarantees globally unique IDs: no two objects of any type share an ID.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    next: u64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    pub fn starting_from(start: u64) -> Self {
        Self { next: start }
    }

    pub fn next_id(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }

    /// The id the next call to `next_id` will hand out.
    pub fn peek(&self) -> u64 {
        self.next
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

macro_rules! typed_id {
    ($($(#[$meta:meta])* $name:ident),+ $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
            #[serde(transparent)]
            pub struct $name(pub u64);

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, "{}", self.0)
                }
            }
        )+
    };
}

typed_id!(
    PersonId,
    /// Houses, apartment units and businesses share one id space.
    BuildingId,
    OccupationId,
    FacetId,
    EvidenceId,
    EventId,
);

/// A business is the company that occupies a business building.
pub type CompanyId = BuildingId;

macro_rules! index_id {
    ($($name:ident),+ $(,)?) => {
        $(
            /// Dense index into the town layout; assigned in platting order.
            #[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
            #[serde(transparent)]
            pub struct $name(pub u32);

            impl $name {
                pub fn index(self) -> usize {
                    self.0 as usize
                }
            }

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, "{}", self.0)
                }
            }
        )+
    };
}

index_id!(StreetId, BlockId, LotId);
