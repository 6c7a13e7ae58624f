//! Simulation Configuration
//!
//! Everything is fixed at start. Validation happens before any side
//! effect, so an invalid configuration never truncates the storage log.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use vram_memory::{EngineConfig, OverflowPolicy};

/// Complete run configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Total RAM capacity (MB)
    pub capacity_mb: u64,

    /// Fraction of capacity at which an overflow swaps out the oldest
    /// resident, in (0, 1]
    pub threshold: f64,

    /// Number of processes to generate
    pub process_count: u64,

    /// Smallest generated memory request (MB, inclusive)
    pub min_request_mb: u64,

    /// Largest generated memory request (MB, inclusive)
    pub max_request_mb: u64,

    /// Seed for the request generator. `None` draws from OS entropy.
    pub seed: Option<u64>,

    /// Eviction log location
    pub storage_path: PathBuf,

    /// Overflow handling
    pub overflow_policy: OverflowPolicy,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            capacity_mb: 500,
            threshold: 0.8,
            process_count: 15,
            min_request_mb: 50,
            max_request_mb: 150,
            seed: None,
            storage_path: PathBuf::from("storage.txt"),
            overflow_policy: OverflowPolicy::Reference,
        }
    }
}

impl SimConfig {
    /// Load from a JSON file. Missing fields take their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        serde_json::from_str(&text).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity_mb == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if !(self.threshold > 0.0 && self.threshold <= 1.0) {
            return Err(ConfigError::ThresholdOutOfRange(self.threshold));
        }
        if self.process_count == 0 {
            return Err(ConfigError::ZeroProcessCount);
        }
        if self.min_request_mb == 0 || self.min_request_mb > self.max_request_mb {
            return Err(ConfigError::InvalidRequestRange {
                min: self.min_request_mb,
                max: self.max_request_mb,
            });
        }
        if self.max_request_mb > self.capacity_mb {
            return Err(ConfigError::RequestExceedsCapacity {
                max: self.max_request_mb,
                capacity: self.capacity_mb,
            });
        }
        if self.storage_path.as_os_str().is_empty() {
            return Err(ConfigError::EmptyStoragePath);
        }
        Ok(())
    }

    /// Engine parameters derived from this configuration.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            capacity_mb: self.capacity_mb,
            threshold: self.threshold,
            overflow_policy: self.overflow_policy,
        }
    }

    /// RAM level (MB) at which eviction kicks in.
    pub fn threshold_mb(&self) -> f64 {
        self.capacity_mb as f64 * self.threshold
    }
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("RAM capacity must be positive")]
    ZeroCapacity,

    #[error("Threshold must be in (0, 1], got {0}")]
    ThresholdOutOfRange(f64),

    #[error("Process count must be positive")]
    ZeroProcessCount,

    #[error("Invalid memory request range {min}..={max} MB")]
    InvalidRequestRange { min: u64, max: u64 },

    #[error("Largest memory request ({max} MB) exceeds RAM capacity ({capacity} MB)")]
    RequestExceedsCapacity { max: u64, capacity: u64 },

    #[error("Storage log path is empty")]
    EmptyStoragePath,

    #[error("Request sequence is empty")]
    EmptyRequestSequence,

    #[error("Cannot read config {}: {reason}", path.display())]
    Read { path: PathBuf, reason: String },

    #[error("Malformed config {}: {reason}", path.display())]
    Parse { path: PathBuf, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SimConfig::default();
        assert_eq!(config.capacity_mb, 500);
        assert_eq!(config.threshold, 0.8);
        assert_eq!(config.process_count, 15);
        assert_eq!(config.storage_path, PathBuf::from("storage.txt"));
        assert_eq!(config.overflow_policy, OverflowPolicy::Reference);
        assert!(config.validate().is_ok());
        assert!((config.threshold_mb() - 400.0).abs() < 1e-9);
    }

    #[test]
    fn test_config_validation() {
        let mut config = SimConfig::default();
        config.capacity_mb = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroCapacity));

        let mut config = SimConfig::default();
        config.process_count = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroProcessCount));

        for bad in [0.0, -0.5, 1.01, f64::NAN] {
            let mut config = SimConfig::default();
            config.threshold = bad;
            assert!(matches!(
                config.validate(),
                Err(ConfigError::ThresholdOutOfRange(_))
            ));
        }

        let mut config = SimConfig::default();
        config.threshold = 1.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_request_range_validation() {
        let mut config = SimConfig::default();
        config.min_request_mb = 200;
        config.max_request_mb = 100;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidRequestRange { .. })
        ));

        let mut config = SimConfig::default();
        config.min_request_mb = 0;
        assert!(config.validate().is_err());

        let mut config = SimConfig::default();
        config.capacity_mb = 100;
        assert_eq!(
            config.validate(),
            Err(ConfigError::RequestExceedsCapacity { max: 150, capacity: 100 })
        );
    }

    #[test]
    fn test_from_file_with_partial_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sim.json");
        fs::write(
            &path,
            r#"{ "capacity_mb": 1000, "seed": 7, "overflow_policy": "strict" }"#,
        )
        .unwrap();

        let config = SimConfig::from_file(&path).unwrap();
        assert_eq!(config.capacity_mb, 1000);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.overflow_policy, OverflowPolicy::Strict);
        assert_eq!(config.threshold, 0.8);
        assert_eq!(config.process_count, 15);
    }

    #[test]
    fn test_from_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            SimConfig::from_file(dir.path().join("missing.json")),
            Err(ConfigError::Read { .. })
        ));

        let path = dir.path().join("bad.json");
        fs::write(&path, "{ capacity_mb: }").unwrap();
        assert!(matches!(
            SimConfig::from_file(&path),
            Err(ConfigError::Parse { .. })
        ));
    }
}
