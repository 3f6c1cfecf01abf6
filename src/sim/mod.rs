mod context;
mod runner;
mod system;

pub mod aging;
pub mod beliefs;
pub mod business;
pub mod founding;
pub mod hiring;
pub mod housing;
pub mod invariants;
pub mod kinship;
pub mod life;
pub mod naming;
pub mod population;
pub mod random;
pub mod relationships;
pub mod routine;

pub use context::{Occasion, TickContext};
pub use runner::{AbortHandle, Simulation, default_systems, dispatch_systems, generate_world};
pub use system::{Fidelity, SimSystem};
