//! RAM and storage pools.

use crate::process::{Pid, Process};
use std::collections::VecDeque;

/// Resident processes, oldest arrival at the head.
#[derive(Debug, Default, Clone)]
pub struct RamPool {
    entries: VecDeque<Process>,
}

impl RamPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total memory held by residents, in MB.
    pub fn used_mb(&self) -> u64 {
        self.entries.iter().map(Process::memory_request).sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resident pids in arrival order.
    pub fn pids(&self) -> Vec<Pid> {
        self.entries.iter().map(Process::pid).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Process> {
        self.entries.iter()
    }

    /// The longest-resident process, if any.
    pub fn oldest(&self) -> Option<&Process> {
        self.entries.front()
    }

    pub(crate) fn push_newest(&mut self, process: Process) {
        self.entries.push_back(process);
    }

    pub(crate) fn pop_oldest(&mut self) -> Option<Process> {
        self.entries.pop_front()
    }
}

/// Swapped-out processes in eviction order. Grows monotonically.
#[derive(Debug, Default, Clone)]
pub struct StoragePool {
    entries: Vec<Process>,
}

impl StoragePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total memory held in storage, in MB.
    pub fn used_mb(&self) -> u64 {
        self.entries.iter().map(Process::memory_request).sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Swapped pids in eviction order.
    pub fn pids(&self) -> Vec<Pid> {
        self.entries.iter().map(Process::pid).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Process> {
        self.entries.iter()
    }

    pub(crate) fn push(&mut self, process: Process) {
        self.entries.push(process);
    }
}
