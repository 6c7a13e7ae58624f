//! Process descriptors and their lifecycle states.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Arrival-ordered process identifier, starting at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pid(pub u64);

impl Pid {
    /// Create a new process ID.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw numeric value.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of a process.
///
/// `Ready -> Resident` on admission, `Resident -> Swapped` on eviction.
/// Both `Resident` and `Swapped` are terminal for the rest of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessState {
    /// Created by the generator, not yet admitted
    Ready,
    /// Held in the RAM pool
    Resident,
    /// Evicted to the storage pool
    Swapped,
}

impl fmt::Display for ProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Ready => "ready",
            Self::Resident => "resident",
            Self::Swapped => "swapped",
        };
        f.write_str(name)
    }
}

/// A simulated process with a fixed memory requirement in MB.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Process {
    pid: Pid,
    memory_request: u64,
    state: ProcessState,
}

impl Process {
    /// Create a new process in the `Ready` state.
    pub fn new(pid: Pid, memory_request: u64) -> Self {
        Self {
            pid,
            memory_request,
            state: ProcessState::Ready,
        }
    }

    pub fn pid(&self) -> Pid {
        self.pid
    }

    /// Memory requirement in MB.
    pub fn memory_request(&self) -> u64 {
        self.memory_request
    }

    pub fn state(&self) -> ProcessState {
        self.state
    }

    pub(crate) fn mark_resident(&mut self) {
        debug_assert_eq!(self.state, ProcessState::Ready, "only ready processes are admitted");
        self.state = ProcessState::Resident;
    }

    pub(crate) fn mark_swapped(&mut self) {
        debug_assert_eq!(self.state, ProcessState::Resident, "only residents are evicted");
        self.state = ProcessState::Swapped;
    }
}

impl fmt::Display for Process {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Process {} (size={}MB, {})",
            self.pid, self.memory_request, self.state
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_process_is_ready() {
        let process = Process::new(Pid::new(3), 120);
        assert_eq!(process.pid(), Pid(3));
        assert_eq!(process.memory_request(), 120);
        assert_eq!(process.state(), ProcessState::Ready);
    }

    #[test]
    fn test_state_transitions() {
        let mut process = Process::new(Pid::new(1), 50);
        process.mark_resident();
        assert_eq!(process.state(), ProcessState::Resident);
        process.mark_swapped();
        assert_eq!(process.state(), ProcessState::Swapped);
    }

    #[test]
    fn test_display() {
        let process = Process::new(Pid::new(7), 64);
        assert_eq!(process.to_string(), "Process 7 (size=64MB, ready)");
    }

    #[test]
    fn test_serialized_shape() {
        let mut process = Process::new(Pid::new(2), 99);
        process.mark_resident();
        process.mark_swapped();
        let json = serde_json::to_string(&process).unwrap();
        assert_eq!(json, r#"{"pid":2,"memory_request":99,"state":"swapped"}"#);
    }
}
