//! Run configuration.
//!
//! A [`RunConfig`] collects everything needed to prepare a state and execute a
//! circuit on it: lattice, boundary, repetitions, recording cadence, and the
//! seed of each named stream. It can be loaded from JSON or YAML.
//!
//! ```rust
//! use quench_circuit::{Boundary, RecordingDirective, RunConfig};
//!
//! let config = RunConfig::from_yaml_str(
//!     "lattice_size: 8\nboundary: periodic\nrepetitions: 20\nrecording: final_only\nseeds:\n  ctrl: 42\n",
//! )
//! .unwrap();
//! assert_eq!(config.boundary, Boundary::Periodic);
//! assert_eq!(config.recording, RecordingDirective::FinalOnly);
//! assert_eq!(config.seeds.ctrl, 42);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{CircuitError, CircuitResult};
use crate::geometry::Boundary;
use crate::recording::RecordingDirective;
use crate::rng::{RngRegistry, StreamKey};

/// Seeds of the named streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    /// Branch decisions.
    pub ctrl: u64,
    /// Projection protocols.
    pub proj: u64,
    /// Haar-random unitaries.
    pub haar: u64,
    /// Born-rule outcomes.
    pub born: u64,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            ctrl: 0,
            proj: 1,
            haar: 2,
            born: 3,
        }
    }
}

impl SeedConfig {
    /// Seed of `key`.
    pub fn get(&self, key: StreamKey) -> u64 {
        match key {
            StreamKey::Ctrl => self.ctrl,
            StreamKey::Proj => self.proj,
            StreamKey::Haar => self.haar,
            StreamKey::Born => self.born,
        }
    }
}

/// Configuration of one simulation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Number of lattice sites.
    pub lattice_size: usize,
    /// Boundary condition.
    #[serde(default)]
    pub boundary: Boundary,
    /// Repetitions of the circuit.
    #[serde(default = "default_repetitions")]
    pub repetitions: usize,
    /// Recording cadence.
    #[serde(default)]
    pub recording: RecordingDirective,
    /// Stream seeds.
    #[serde(default)]
    pub seeds: SeedConfig,
}

fn default_repetitions() -> usize {
    1
}

impl RunConfig {
    /// Create a configuration with default repetitions, recording and seeds.
    pub fn new(lattice_size: usize, boundary: Boundary) -> Self {
        Self {
            lattice_size,
            boundary,
            repetitions: default_repetitions(),
            recording: RecordingDirective::default(),
            seeds: SeedConfig::default(),
        }
    }

    /// Set the number of repetitions.
    #[must_use]
    pub fn with_repetitions(mut self, repetitions: usize) -> Self {
        self.repetitions = repetitions;
        self
    }

    /// Set the recording cadence.
    #[must_use]
    pub fn with_recording(mut self, recording: RecordingDirective) -> Self {
        self.recording = recording;
        self
    }

    /// Set the seed of the control stream.
    #[must_use]
    pub fn with_ctrl_seed(mut self, seed: u64) -> Self {
        self.seeds.ctrl = seed;
        self
    }

    /// Parse and validate a JSON configuration.
    pub fn from_json_str(s: &str) -> CircuitResult<Self> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a YAML configuration.
    pub fn from_yaml_str(s: &str) -> CircuitResult<Self> {
        let config: Self = serde_yaml_ng::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Check numeric fields.
    pub fn validate(&self) -> CircuitResult<()> {
        if self.lattice_size < 2 {
            return Err(CircuitError::Config(format!(
                "lattice_size must be at least 2, got {}",
                self.lattice_size
            )));
        }
        if self.repetitions == 0 {
            return Err(CircuitError::Config(
                "repetitions must be at least 1".into(),
            ));
        }
        match self.recording {
            RecordingDirective::EveryNGates(0) | RecordingDirective::EveryNRepetitions(0) => Err(
                CircuitError::Config("recording interval must be at least 1".into()),
            ),
            _ => Ok(()),
        }
    }

    /// A registry with every named stream seeded from `seeds`.
    pub fn rng_registry(&self) -> RngRegistry {
        StreamKey::ALL
            .into_iter()
            .fold(RngRegistry::new(), |registry, key| {
                registry.with_stream(key, self.seeds.get(key))
            })
    }
}
