//! Simulation driver - runs the generator -> engine -> reporter pipeline.

use crate::config::{ConfigError, SimConfig};
use crate::generator::{ProcessGenerator, RandomGenerator};
use crate::history::UsageHistory;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};
use vram_memory::{
    AdmissionEngine, AdmitEvent, EngineError, FileStorageSink, Pid, PressureLevel, StorageSink,
    UsageReport,
};

/// Errors that abort a run
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Everything that happened in one step.
#[derive(Debug, Clone, Serialize)]
pub struct StepRecord {
    /// Step index (process arrival), starting at 1
    pub step: u64,
    pub event: AdmitEvent,
    /// Usage after the step
    pub report: UsageReport,
}

/// Final state of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimulationSummary {
    pub steps: u64,
    /// Residents at the end, oldest first
    pub final_ram: Vec<Pid>,
    /// Swapped processes in eviction order
    pub final_storage: Vec<Pid>,
    pub evictions: usize,
    pub peak_ram_mb: u64,
    /// Steps that ended with RAM above capacity
    pub over_capacity_steps: u64,
}

/// Callback invoked after every step
pub type StepCallback = Box<dyn FnMut(&StepRecord)>;

/// Drives a fixed number of arrivals through the admission engine.
pub struct Simulation<G: ProcessGenerator, S: StorageSink> {
    config: SimConfig,
    generator: G,
    engine: AdmissionEngine<S>,
    history: UsageHistory,
    observers: Vec<StepCallback>,
}

impl Simulation<RandomGenerator, FileStorageSink> {
    /// Build a run from configuration: seeded or entropy-backed
    /// generator, eviction log at `storage_path`.
    pub fn from_config(config: SimConfig) -> Result<Self, SimulationError> {
        config.validate()?;

        let range = config.min_request_mb..=config.max_request_mb;
        let generator = match config.seed {
            Some(seed) => RandomGenerator::seeded(seed, range),
            None => RandomGenerator::from_entropy(range),
        };
        let sink = FileStorageSink::new(config.storage_path.clone());

        Self::new(config, generator, sink)
    }
}

impl<G: ProcessGenerator, S: StorageSink> Simulation<G, S> {
    /// Create a simulation with an explicit generator and sink.
    pub fn new(config: SimConfig, generator: G, sink: S) -> Result<Self, SimulationError> {
        config.validate()?;

        let engine = AdmissionEngine::new(config.engine_config(), sink)?;
        let history = UsageHistory::new(config.capacity_mb, config.threshold_mb());

        Ok(Self {
            config,
            generator,
            engine,
            history,
            observers: Vec::new(),
        })
    }

    /// Register an observer for per-step records.
    pub fn on_step<F>(&mut self, callback: F)
    where
        F: FnMut(&StepRecord) + 'static,
    {
        self.observers.push(Box::new(callback));
    }

    /// Run all arrivals. The storage log is truncated first.
    pub fn run(&mut self) -> Result<SimulationSummary, SimulationError> {
        info!(
            capacity_mb = self.config.capacity_mb,
            threshold = self.config.threshold,
            processes = self.config.process_count,
            policy = ?self.config.overflow_policy,
            "Virtual memory simulation started"
        );

        self.engine.begin_run()?;
        self.history = UsageHistory::new(self.config.capacity_mb, self.config.threshold_mb());

        let mut over_capacity_steps = 0;
        for step in 1..=self.config.process_count {
            let process = self.generator.generate(Pid::new(step));
            let event = self.engine.admit(process)?;
            let report = self.engine.report();

            if report.pressure == PressureLevel::OverCapacity {
                over_capacity_steps += 1;
            }

            debug!(
                step,
                ram_used = report.ram_used_mb,
                storage_used = report.storage_used_mb,
                pressure = report.pressure.description(),
                "Step complete"
            );

            let record = StepRecord { step, event, report };
            self.history.record(&record);
            for observer in &mut self.observers {
                observer(&record);
            }
        }

        let summary = SimulationSummary {
            steps: self.config.process_count,
            final_ram: self.engine.ram().pids(),
            final_storage: self.engine.storage().pids(),
            evictions: self.engine.storage().len(),
            peak_ram_mb: self.history.peak_ram_mb(),
            over_capacity_steps,
        };

        info!(
            evictions = summary.evictions,
            peak_ram_mb = summary.peak_ram_mb,
            over_capacity_steps,
            "Simulation complete"
        );

        Ok(summary)
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn engine(&self) -> &AdmissionEngine<S> {
        &self.engine
    }

    /// Chart series from the most recent run.
    pub fn history(&self) -> &UsageHistory {
        &self.history
    }
}
