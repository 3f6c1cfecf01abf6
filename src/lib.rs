#[macro_use]
mod macros;

pub mod config;
pub mod corpora;
pub mod error;
pub mod flush;
pub mod id;
pub mod model;
pub mod sim;
pub mod worldgen;

pub use config::Config;
pub use corpora::Corpora;
pub use error::{ConfigError, Result, SimError};
pub use id::IdGenerator;
pub use model::{Entity, SimTimestamp, Snapshot, World};
pub use sim::{AbortHandle, Simulation, generate_world};
