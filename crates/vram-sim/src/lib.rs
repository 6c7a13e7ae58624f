//! vram-sim Simulation Driver
//!
//! Feeds a stream of generated processes through the admission engine
//! and reports usage after every step:
//! - Validated run configuration
//! - Seedable process generation
//! - Step observers (console output, chart history)

mod config;
mod generator;
mod history;
mod simulation;

pub use config::{ConfigError, SimConfig};
pub use generator::{ProcessGenerator, RandomGenerator, SequenceGenerator};
pub use history::{UsageHistory, UsageSample};
pub use simulation::{Simulation, SimulationError, SimulationSummary, StepRecord};
