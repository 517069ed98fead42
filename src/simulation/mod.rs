//! Forward simulation of duplication and recombination histories.

pub mod random;
pub mod scenario;

pub use random::{random_history, simulate, SimulationConfig};
pub use scenario::{Event, History, Scenario};
