//! Usage reporting.

use crate::pool::{RamPool, StoragePool};
use crate::process::Pid;
use serde::Serialize;
use std::fmt;

/// How full RAM is relative to the eviction threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PressureLevel {
    /// Below the eviction threshold
    Normal,
    /// At or above the threshold, within capacity
    AboveThreshold,
    /// Usage exceeds capacity (transient overshoot after admission)
    OverCapacity,
}

impl PressureLevel {
    /// Classify RAM usage against capacity and threshold.
    pub fn from_usage(ram_used_mb: u64, capacity_mb: u64, threshold: f64) -> Self {
        if ram_used_mb > capacity_mb {
            return Self::OverCapacity;
        }
        let ratio = ram_used_mb as f64 / capacity_mb as f64;
        if ratio >= threshold {
            Self::AboveThreshold
        } else {
            Self::Normal
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::AboveThreshold => "above threshold",
            Self::OverCapacity => "over capacity",
        }
    }
}

/// Snapshot of RAM and storage usage after a step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageReport {
    pub ram_used_mb: u64,
    pub storage_used_mb: u64,
    pub capacity_mb: u64,
    pub ram_pids: Vec<Pid>,
    pub storage_pids: Vec<Pid>,
    pub pressure: PressureLevel,
}

impl UsageReport {
    /// Compute usage from a pool pair. Pure: the same pools always
    /// produce the same report.
    pub fn capture(ram: &RamPool, storage: &StoragePool, capacity_mb: u64, threshold: f64) -> Self {
        let ram_used_mb = ram.used_mb();
        Self {
            ram_used_mb,
            storage_used_mb: storage.used_mb(),
            capacity_mb,
            ram_pids: ram.pids(),
            storage_pids: storage.pids(),
            pressure: PressureLevel::from_usage(ram_used_mb, capacity_mb, threshold),
        }
    }

    /// `(ram_used_mb, storage_used_mb)` pair for chart series.
    pub fn totals(&self) -> (u64, u64) {
        (self.ram_used_mb, self.storage_used_mb)
    }

    /// RAM usage as a percentage of capacity.
    pub fn ram_percent(&self) -> f64 {
        self.ram_used_mb as f64 / self.capacity_mb as f64 * 100.0
    }
}

impl fmt::Display for UsageReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "RAM Used: {}/{} MB | Storage Used: {} MB",
            self.ram_used_mb, self.capacity_mb, self.storage_used_mb
        )?;
        writeln!(f, "RAM Processes: {}", format_pids(&self.ram_pids))?;
        write!(f, "Storage Processes: {}", format_pids(&self.storage_pids))
    }
}

/// Format a pid list as `[1, 2, 3]`.
pub fn format_pids(pids: &[Pid]) -> String {
    let inner: Vec<String> = pids.iter().map(Pid::to_string).collect();
    format!("[{}]", inner.join(", "))
}
