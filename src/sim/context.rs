use std::collections::BTreeMap;

use rand::RngCore;

use super::system::Fidelity;
use crate::id::PersonId;
use crate::model::{Entity, SimTimestamp, World};

/// People gathered at each place during one half-day.
#[derive(Debug, Clone, Default)]
pub struct Occasion {
    pub when: SimTimestamp,
    pub groups: BTreeMap<Entity, Vec<PersonId>>,
}

/// Context passed to each system on every step.
pub struct TickContext<'a> {
    pub world: &'a mut World,
    pub rng: &'a mut dyn RngCore,
    pub fidelity: Fidelity,
    /// Days each interaction and each decay roll stands for.
    pub missing_days: u32,
    /// Routine pushes the step's gatherings here; relationships and
    /// beliefs read them.
    pub occasions: &'a mut Vec<Occasion>,
}
