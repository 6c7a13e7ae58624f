//! vram-sim Memory Model
//!
//! Whole-process admission into a fixed-capacity RAM pool, with FIFO
//! eviction to a backing store once usage crosses a threshold.
//! Every eviction is recorded through an injected storage sink.

mod process;
mod pool;
mod engine;
mod storage;
mod stats;

pub use process::{Pid, Process, ProcessState};
pub use pool::{RamPool, StoragePool};
pub use engine::{AdmissionEngine, AdmitEvent, EngineConfig, EngineError, OverflowPolicy};
pub use storage::{FileStorageSink, MemoryStorageSink, StorageError, StorageSink};
pub use stats::{format_pids, PressureLevel, UsageReport};
