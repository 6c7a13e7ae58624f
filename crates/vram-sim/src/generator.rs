//! Process generation.

use crate::config::ConfigError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::ops::RangeInclusive;
use tracing::debug;
use vram_memory::{Pid, Process};

/// Source of arriving processes.
pub trait ProcessGenerator {
    /// Produce the process with the given pid in the `Ready` state.
    fn generate(&mut self, pid: Pid) -> Process;
}

impl<G: ProcessGenerator + ?Sized> ProcessGenerator for Box<G> {
    fn generate(&mut self, pid: Pid) -> Process {
        (**self).generate(pid)
    }
}

/// Uniformly random memory requests over an inclusive range.
pub struct RandomGenerator {
    rng: StdRng,
    range: RangeInclusive<u64>,
}

impl RandomGenerator {
    /// Deterministic generator: the same seed yields the same requests.
    pub fn seeded(seed: u64, range: RangeInclusive<u64>) -> Self {
        debug!(seed, "Seeding process generator");
        Self {
            rng: StdRng::seed_from_u64(seed),
            range,
        }
    }

    /// Generator seeded from OS entropy.
    pub fn from_entropy(range: RangeInclusive<u64>) -> Self {
        Self {
            rng: StdRng::from_entropy(),
            range,
        }
    }

    pub fn range(&self) -> &RangeInclusive<u64> {
        &self.range
    }
}

impl ProcessGenerator for RandomGenerator {
    fn generate(&mut self, pid: Pid) -> Process {
        let request = self.rng.gen_range(self.range.clone());
        Process::new(pid, request)
    }
}

/// Replays a fixed list of requests, cycling when exhausted.
#[derive(Debug, Clone)]
pub struct SequenceGenerator {
    requests: Vec<u64>,
    next: usize,
}

impl SequenceGenerator {
    pub fn new(requests: impl Into<Vec<u64>>) -> Result<Self, ConfigError> {
        let requests = requests.into();
        if requests.is_empty() {
            return Err(ConfigError::EmptyRequestSequence);
        }
        Ok(Self { requests, next: 0 })
    }
}

impl ProcessGenerator for SequenceGenerator {
    fn generate(&mut self, pid: Pid) -> Process {
        let request = self.requests[self.next % self.requests.len()];
        self.next += 1;
        Process::new(pid, request)
    }
}
