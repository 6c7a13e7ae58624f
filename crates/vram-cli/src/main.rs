//! vram: Virtual RAM Simulator
//!
//! Streams randomly sized processes into a fixed-capacity RAM pool,
//! swapping the oldest resident out to a storage log once usage crosses
//! the eviction threshold. Prints status after every arrival.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::FmtSubscriber;
use vram_memory::{format_pids, OverflowPolicy};
use vram_sim::{SimConfig, Simulation, StepRecord};

#[derive(Debug, Parser)]
#[command(name = "vram", version, about = "Virtual RAM admission/eviction simulator")]
struct Cli {
    /// JSON configuration file; flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// RAM capacity in MB
    #[arg(long)]
    capacity: Option<u64>,

    /// Eviction threshold as a fraction of capacity, in (0, 1]
    #[arg(long)]
    threshold: Option<f64>,

    /// Number of processes to simulate
    #[arg(long)]
    processes: Option<u64>,

    /// Smallest memory request in MB
    #[arg(long)]
    min_request: Option<u64>,

    /// Largest memory request in MB
    #[arg(long)]
    max_request: Option<u64>,

    /// Seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Eviction log path
    #[arg(long)]
    storage: Option<PathBuf>,

    /// Evict until each process fits instead of at most once per arrival
    #[arg(long)]
    strict: bool,

    /// Write the usage chart series as JSON
    #[arg(long)]
    history: Option<PathBuf>,

    /// Show debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn into_config(self) -> Result<SimConfig> {
        let mut config = match &self.config {
            Some(path) => SimConfig::from_file(path)?,
            None => SimConfig::default(),
        };

        if let Some(capacity) = self.capacity {
            config.capacity_mb = capacity;
        }
        if let Some(threshold) = self.threshold {
            config.threshold = threshold;
        }
        if let Some(count) = self.processes {
            config.process_count = count;
        }
        if let Some(min) = self.min_request {
            config.min_request_mb = min;
        }
        if let Some(max) = self.max_request {
            config.max_request_mb = max;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if let Some(storage) = self.storage {
            config.storage_path = storage;
        }
        if self.strict {
            config.overflow_policy = OverflowPolicy::Strict;
        }

        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    let history_path = cli.history.clone();
    let config = cli.into_config().context("invalid configuration")?;
    let threshold = config.threshold;

    let mut sim = Simulation::from_config(config)?;
    sim.on_step(move |record| print_step(record, threshold));

    println!("---- Virtual Memory Simulation Started ----");
    let summary = sim.run().context("simulation aborted")?;

    println!("\n---- Simulation Complete ----");
    println!("Final RAM State: {}", format_pids(&summary.final_ram));
    println!("Final Storage State: {}", format_pids(&summary.final_storage));

    if let Some(path) = history_path {
        sim.history()
            .write_json(&path)
            .with_context(|| format!("failed to write history to {}", path.display()))?;
        info!("Usage history written to: {}", path.display());
    }

    Ok(())
}

fn print_step(record: &StepRecord, threshold: f64) {
    for line in step_lines(record, threshold) {
        println!("{line}");
    }
}

fn step_lines(record: &StepRecord, threshold: f64) -> Vec<String> {
    let event = &record.event;
    let mut lines = Vec::new();

    if event.overflowed {
        for victim in &event.evicted {
            lines.push(format!(
                "RAM exceeded {:.0}%, swapping out Process {} to storage.",
                threshold * 100.0,
                victim
            ));
        }
        lines.push(format!(
            "Process {} (size={}MB) loaded into RAM after swap.",
            event.admitted, event.memory_request
        ));
    } else {
        lines.push(format!(
            "Process {} (size={}MB) loaded into RAM.",
            event.admitted, event.memory_request
        ));
    }

    lines.push(String::new());
    lines.extend(record.report.to_string().lines().map(str::to_owned));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use vram_memory::MemoryStorageSink;
    use vram_sim::SequenceGenerator;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_flags_override_defaults() {
        let cli = Cli::parse_from([
            "vram",
            "--capacity",
            "800",
            "--threshold",
            "0.75",
            "--processes",
            "20",
            "--seed",
            "3",
            "--strict",
        ]);
        let config = cli.into_config().unwrap();
        assert_eq!(config.capacity_mb, 800);
        assert_eq!(config.threshold, 0.75);
        assert_eq!(config.process_count, 20);
        assert_eq!(config.seed, Some(3));
        assert_eq!(config.overflow_policy, OverflowPolicy::Strict);
        assert_eq!(config.min_request_mb, 50);
    }

    #[test]
    fn test_invalid_flags_rejected() {
        let cli = Cli::parse_from(["vram", "--processes", "0"]);
        assert!(cli.into_config().is_err());
    }

    #[test]
    fn test_step_lines() {
        let config = SimConfig {
            process_count: 7,
            ..SimConfig::default()
        };
        let mut sim = Simulation::new(
            config,
            SequenceGenerator::new(vec![100]).unwrap(),
            MemoryStorageSink::new(),
        )
        .unwrap();

        let records = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        let collected = records.clone();
        sim.on_step(move |record| collected.borrow_mut().push(record.clone()));
        sim.run().unwrap();

        let records = records.borrow();
        let first = step_lines(&records[0], 0.8);
        assert_eq!(first[0], "Process 1 (size=100MB) loaded into RAM.");
        assert_eq!(first[2], "RAM Used: 100/500 MB | Storage Used: 0 MB");

        let sixth = step_lines(&records[5], 0.8);
        assert_eq!(sixth[0], "RAM exceeded 80%, swapping out Process 1 to storage.");
        assert_eq!(sixth[1], "Process 6 (size=100MB) loaded into RAM after swap.");

        let last = step_lines(&records[6], 0.8);
        assert_eq!(last[0], "RAM exceeded 80%, swapping out Process 2 to storage.");
        assert_eq!(last[1], "Process 7 (size=100MB) loaded into RAM after swap.");
        assert_eq!(last[3], "RAM Used: 500/500 MB | Storage Used: 200 MB");
        assert_eq!(last[4], "RAM Processes: [3, 4, 5, 6, 7]");
        assert_eq!(last[5], "Storage Processes: [1, 2]");
    }
}
