pub mod access;
pub mod error;
pub mod metrics;
pub mod network;
pub mod simulation;
pub mod station;

pub use access::{AccessModel, AccessModelRegistry, Generation};
pub use error::{Result, SimError};
pub use metrics::{RunReport, StatisticsAggregator, Summary};
pub use simulation::{SimConfig, Simulation, SimulationResults, SimulationRunner};

/// Seeded generator threaded through every run.
pub type SimRng = rand_chacha::ChaCha8Rng;

pub mod prelude {
    pub use crate::access::{AccessModel, AccessModelRegistry, AttemptOutcome, Generation};
    pub use crate::error::SimError;
    pub use crate::metrics::{RunReport, StatisticsAggregator, Summary};
    pub use crate::network::{ChannelState, NetworkPacket, PhyProfile};
    pub use crate::simulation::{SimConfig, Simulation, SimulationResults, SimulationRunner};
    pub use crate::SimRng;
}
