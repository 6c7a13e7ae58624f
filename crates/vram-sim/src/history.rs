//! Usage history for charting.
//!
//! Collects the per-step RAM and storage totals together with the
//! threshold line so an external renderer can plot them. Nothing here
//! depends on a rendering library.

use crate::simulation::StepRecord;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// One point on the usage chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageSample {
    /// Step index (process arrival), starting at 1
    pub step: u64,
    pub ram_used_mb: u64,
    pub storage_used_mb: u64,
}

/// Chart series for a whole run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageHistory {
    pub capacity_mb: u64,
    /// Horizontal threshold line (capacity x threshold)
    pub threshold_mb: f64,
    pub samples: Vec<UsageSample>,
}

impl UsageHistory {
    pub fn new(capacity_mb: u64, threshold_mb: f64) -> Self {
        Self {
            capacity_mb,
            threshold_mb,
            samples: Vec::new(),
        }
    }

    pub fn record(&mut self, step: &StepRecord) {
        let (ram_used_mb, storage_used_mb) = step.report.totals();
        self.samples.push(UsageSample {
            step: step.step,
            ram_used_mb,
            storage_used_mb,
        });
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// RAM series, in step order.
    pub fn ram_series(&self) -> Vec<u64> {
        self.samples.iter().map(|s| s.ram_used_mb).collect()
    }

    /// Storage series, in step order.
    pub fn storage_series(&self) -> Vec<u64> {
        self.samples.iter().map(|s| s.storage_used_mb).collect()
    }

    pub fn peak_ram_mb(&self) -> u64 {
        self.samples.iter().map(|s| s.ram_used_mb).max().unwrap_or(0)
    }

    /// Write the history as pretty-printed JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> io::Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.write_all(b"\n")?;
        writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{SequenceGenerator, SimConfig, Simulation};
    use vram_memory::MemoryStorageSink;

    fn run_history(requests: Vec<u64>, count: u64) -> UsageHistory {
        let config = SimConfig {
            process_count: count,
            ..SimConfig::default()
        };
        let mut sim = Simulation::new(
            config,
            SequenceGenerator::new(requests).unwrap(),
            MemoryStorageSink::new(),
        )
        .unwrap();
        sim.run().unwrap();
        sim.history().clone()
    }

    #[test]
    fn test_series_follow_steps() {
        let history = run_history(vec![100], 7);

        assert_eq!(history.len(), 7);
        assert_eq!(history.capacity_mb, 500);
        assert!((history.threshold_mb - 400.0).abs() < 1e-9);
        assert_eq!(
            history.ram_series(),
            vec![100, 200, 300, 400, 500, 500, 500]
        );
        assert_eq!(history.storage_series(), vec![0, 0, 0, 0, 0, 100, 200]);
        assert_eq!(history.peak_ram_mb(), 500);
        let steps: Vec<u64> = history.samples.iter().map(|s| s.step).collect();
        assert_eq!(steps, (1..=7).collect::<Vec<_>>());
    }

    #[test]
    fn test_write_json() {
        let history = run_history(vec![120, 80], 3);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        history.write_json(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let parsed: UsageHistory = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed.ram_series(), vec![120, 200, 320]);
    }

    #[test]
    fn test_empty_history() {
        let history = UsageHistory::new(500, 400.0);
        assert!(history.is_empty());
        assert_eq!(history.peak_ram_mb(), 0);
    }
}
