//! Storage Sink
//!
//! Durable record of every process swapped out of RAM. The log is
//! append-only within a run and truncated when a new run starts.
//!
//! Format: one JSON object per line, in eviction order:
//!
//! ```text
//! {"pid":1,"memory_request":112,"state":"swapped"}
//! {"pid":2,"memory_request":87,"state":"swapped"}
//! ```

use crate::process::Process;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur while recording evictions
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Malformed record on line {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },
}

/// Destination for evicted processes.
pub trait StorageSink {
    /// Discard everything recorded by a previous run.
    fn reset(&mut self) -> Result<(), StorageError>;

    /// Append one evicted process.
    fn record(&mut self, process: &Process) -> Result<(), StorageError>;
}

impl<S: StorageSink + ?Sized> StorageSink for &mut S {
    fn reset(&mut self) -> Result<(), StorageError> {
        (**self).reset()
    }

    fn record(&mut self, process: &Process) -> Result<(), StorageError> {
        (**self).record(process)
    }
}

impl<S: StorageSink + ?Sized> StorageSink for Box<S> {
    fn reset(&mut self) -> Result<(), StorageError> {
        (**self).reset()
    }

    fn record(&mut self, process: &Process) -> Result<(), StorageError> {
        (**self).record(process)
    }
}

/// Plain-text eviction log on disk.
#[derive(Debug)]
pub struct FileStorageSink {
    path: PathBuf,
    records: usize,
}

impl FileStorageSink {
    /// Create a sink for the given log path. Nothing is touched on disk
    /// until [`StorageSink::reset`] or [`StorageSink::record`] is called.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            records: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Records written since the last reset.
    pub fn record_count(&self) -> usize {
        self.records
    }

    /// Read the log back, in eviction order.
    pub fn read_records(&self) -> Result<Vec<Process>, StorageError> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(self.io_error(e)),
        };

        let mut processes = Vec::new();
        for (idx, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| self.io_error(e))?;
            if line.trim().is_empty() {
                continue;
            }
            let process = serde_json::from_str(&line).map_err(|e| {
                StorageError::MalformedRecord {
                    line: idx + 1,
                    reason: e.to_string(),
                }
            })?;
            processes.push(process);
        }
        Ok(processes)
    }

    fn io_error(&self, source: io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl StorageSink for FileStorageSink {
    fn reset(&mut self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        File::create(&self.path).map_err(|e| self.io_error(e))?;
        self.records = 0;

        info!("Storage log reset at: {}", self.path.display());
        Ok(())
    }

    fn record(&mut self, process: &Process) -> Result<(), StorageError> {
        let mut line = serde_json::to_string(process)?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.io_error(e))?;
        file.write_all(line.as_bytes())
            .and_then(|_| file.flush())
            .map_err(|e| self.io_error(e))?;
        self.records += 1;

        debug!(pid = process.pid().get(), path = %self.path.display(), "Recorded eviction");
        Ok(())
    }
}

/// In-memory sink for dry runs and tests.
#[derive(Debug, Default, Clone)]
pub struct MemoryStorageSink {
    records: Vec<Process>,
}

impl MemoryStorageSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[Process] {
        &self.records
    }
}

impl StorageSink for MemoryStorageSink {
    fn reset(&mut self) -> Result<(), StorageError> {
        self.records.clear();
        Ok(())
    }

    fn record(&mut self, process: &Process) -> Result<(), StorageError> {
        self.records.push(process.clone());
        Ok(())
    }
}
