//! Admission/Eviction Engine
//!
//! Decides, for each arriving process, whether it fits into RAM as-is or
//! whether the oldest resident must be swapped out first.
//!
//! ```text
//! Process arrives
//!     │
//!     ▼
//! ┌──────────────────────────┐
//! │ used + request <= cap ?  │ ── yes ──▶ Admit
//! └────────────┬─────────────┘
//!              │ no
//!              ▼
//! ┌──────────────────────────┐
//! │ used / cap >= threshold  │ ── no ───▶ Admit (overshoot absorbed)
//! │ and RAM non-empty ?      │
//! └────────────┬─────────────┘
//!              │ yes
//!              ▼
//! ┌──────────────────────────┐
//! │ Swap out oldest resident │ ──────────▶ Admit
//! └──────────────────────────┘
//! ```
//!
//! `used` is always measured before the incoming process is added, so with
//! the reference policy a single admission can leave RAM above capacity by
//! up to one request. [`OverflowPolicy::Strict`] evicts until the process
//! actually fits instead.
//!
//! Requests larger than the whole capacity are outside the model. The
//! engine logs a warning and applies the policy unchanged.

use crate::pool::{RamPool, StoragePool};
use crate::process::{Pid, Process};
use crate::stats::UsageReport;
use crate::storage::{StorageError, StorageSink};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors surfaced by the engine
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Failed to record evicted process {pid}: {source}")]
    Storage {
        pid: Pid,
        #[source]
        source: StorageError,
    },

    #[error("Failed to reset storage: {0}")]
    Reset(#[source] StorageError),

    #[error("RAM capacity must be positive")]
    ZeroCapacity,

    #[error("Threshold must be in (0, 1], got {0}")]
    ThresholdOutOfRange(f64),
}

/// What to do when an arriving process does not fit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverflowPolicy {
    /// Evict at most one resident, and only when usage is at or above
    /// the threshold. RAM may overshoot capacity by one request.
    #[default]
    Reference,
    /// Evict oldest residents until the process fits, ignoring the
    /// threshold. RAM never exceeds capacity for in-range requests.
    Strict,
}

/// Engine parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// RAM capacity in MB
    pub capacity_mb: u64,
    /// Fraction of capacity at which an overflow triggers eviction, in (0, 1]
    pub threshold: f64,
    /// Overflow handling
    pub overflow_policy: OverflowPolicy,
}

impl EngineConfig {
    /// Reject parameters that would make the usage ratio meaningless.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.capacity_mb == 0 {
            return Err(EngineError::ZeroCapacity);
        }
        if !(self.threshold > 0.0 && self.threshold <= 1.0) {
            return Err(EngineError::ThresholdOutOfRange(self.threshold));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            capacity_mb: 500,
            threshold: 0.8,
            overflow_policy: OverflowPolicy::Reference,
        }
    }
}

/// Outcome of a single admission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdmitEvent {
    /// The process that was admitted
    pub admitted: Pid,
    /// Memory requirement of the admitted process, in MB
    pub memory_request: u64,
    /// Processes swapped out to make room, oldest first
    pub evicted: Vec<Pid>,
    /// RAM usage measured before admission, in MB
    pub ram_used_before: u64,
    /// Whether the fit check failed
    pub overflowed: bool,
}

impl AdmitEvent {
    /// First (and under the reference policy, only) victim.
    pub fn evicted_pid(&self) -> Option<Pid> {
        self.evicted.first().copied()
    }

    pub fn caused_eviction(&self) -> bool {
        !self.evicted.is_empty()
    }
}

/// Owns the RAM and storage pools and the sink that records evictions.
pub struct AdmissionEngine<S: StorageSink> {
    config: EngineConfig,
    ram: RamPool,
    storage: StoragePool,
    sink: S,
}

impl<S: StorageSink> AdmissionEngine<S> {
    /// Create an engine with empty pools.
    pub fn new(config: EngineConfig, sink: S) -> Result<Self, EngineError> {
        config.validate()?;

        Ok(Self {
            config,
            ram: RamPool::new(),
            storage: StoragePool::new(),
            sink,
        })
    }

    /// Clear both pools and truncate the sink for a fresh run.
    pub fn begin_run(&mut self) -> Result<(), EngineError> {
        self.ram = RamPool::new();
        self.storage = StoragePool::new();
        self.sink.reset().map_err(EngineError::Reset)
    }

    /// Admit an arriving process, evicting first if the policy says so.
    pub fn admit(&mut self, mut process: Process) -> Result<AdmitEvent, EngineError> {
        let pid = process.pid();
        let request = process.memory_request();
        let capacity = self.config.capacity_mb;

        if request > capacity {
            warn!(
                pid = pid.get(),
                request,
                capacity,
                "Process larger than RAM capacity; behavior is undefined"
            );
        }

        let ram_used = self.ram.used_mb();
        let overflowed = ram_used.saturating_add(request) > capacity;
        let mut evicted = Vec::new();

        if overflowed {
            match self.config.overflow_policy {
                OverflowPolicy::Reference => {
                    let usage_ratio = ram_used as f64 / capacity as f64;
                    if usage_ratio >= self.config.threshold && !self.ram.is_empty() {
                        if let Some(victim) = self.evict_oldest()? {
                            evicted.push(victim);
                        }
                    } else {
                        debug!(
                            pid = pid.get(),
                            ram_used,
                            usage_ratio,
                            "Overflow below threshold, admitting without eviction"
                        );
                    }
                }
                OverflowPolicy::Strict => {
                    let mut used = ram_used;
                    while used.saturating_add(request) > capacity {
                        let Some(victim) = self.evict_oldest()? else {
                            break;
                        };
                        used = self.ram.used_mb();
                        evicted.push(victim);
                    }
                }
            }
        }

        process.mark_resident();
        self.ram.push_newest(process);

        debug!(
            pid = pid.get(),
            request,
            ram_used = self.ram.used_mb(),
            evicted = evicted.len(),
            "Admitted process"
        );

        let ram_after = self.ram.used_mb();
        if ram_after > capacity {
            warn!(
                pid = pid.get(),
                ram_used = ram_after,
                capacity,
                "RAM above capacity after admission"
            );
        }

        Ok(AdmitEvent {
            admitted: pid,
            memory_request: request,
            evicted,
            ram_used_before: ram_used,
            overflowed,
        })
    }

    /// Swap out the longest-resident process.
    fn evict_oldest(&mut self) -> Result<Option<Pid>, EngineError> {
        let Some(mut victim) = self.ram.pop_oldest() else {
            return Ok(None);
        };
        let pid = victim.pid();
        victim.mark_swapped();

        let result = self.sink.record(&victim);
        info!(
            pid = pid.get(),
            size = victim.memory_request(),
            "Swapping out process to storage"
        );
        self.storage.push(victim);

        result.map_err(|source| EngineError::Storage { pid, source })?;
        Ok(Some(pid))
    }

    /// Current usage snapshot.
    pub fn report(&self) -> UsageReport {
        UsageReport::capture(
            &self.ram,
            &self.storage,
            self.config.capacity_mb,
            self.config.threshold,
        )
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn ram(&self) -> &RamPool {
        &self.ram
    }

    pub fn storage(&self) -> &StoragePool {
        &self.storage
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Consume the engine, returning its sink.
    pub fn into_sink(self) -> S {
        self.sink
    }
}
