//! Named random streams.
//!
//! Every source of randomness in a simulation draws from its own named stream
//! so that, for example, Born-rule measurement outcomes never shift the
//! control stream that decides stochastic branches. Each stream is an
//! independently seeded [`StdRng`].

use std::collections::BTreeMap;
use std::fmt;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::{CircuitError, CircuitResult};

/// Key of a named random stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamKey {
    /// Branch decisions of stochastic operations.
    Ctrl,
    /// Reserved for projection-based protocols.
    Proj,
    /// Haar-random unitary sampling.
    Haar,
    /// Born-rule measurement outcomes.
    Born,
}

impl StreamKey {
    /// All stream keys, in registry order.
    pub const ALL: [StreamKey; 4] = [
        StreamKey::Ctrl,
        StreamKey::Proj,
        StreamKey::Haar,
        StreamKey::Born,
    ];
}

impl fmt::Display for StreamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamKey::Ctrl => write!(f, "ctrl"),
            StreamKey::Proj => write!(f, "proj"),
            StreamKey::Haar => write!(f, "haar"),
            StreamKey::Born => write!(f, "born"),
        }
    }
}

/// Create the generator used for a stream seeded with `seed`.
///
/// The expander and the registry both go through this function, which is what
/// makes an expansion with seed `s` line up with an execution whose control
/// stream was seeded with `s`.
pub fn seeded_stream(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Registry of independently seeded named streams.
#[derive(Debug, Clone, Default)]
pub struct RngRegistry {
    streams: BTreeMap<StreamKey, StdRng>,
}

impl RngRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed `key` and return the registry.
    #[must_use]
    pub fn with_stream(mut self, key: StreamKey, seed: u64) -> Self {
        self.seed(key, seed);
        self
    }

    /// Seed (or reseed) a stream, discarding its previous position.
    pub fn seed(&mut self, key: StreamKey, seed: u64) {
        self.streams.insert(key, seeded_stream(seed));
    }

    /// True if `key` has been seeded.
    pub fn contains(&self, key: StreamKey) -> bool {
        self.streams.contains_key(&key)
    }

    /// Handle to a seeded stream.
    pub fn stream_mut(&mut self, key: StreamKey) -> CircuitResult<&mut StdRng> {
        self.streams
            .get_mut(&key)
            .ok_or(CircuitError::UnseededStream(key))
    }

    /// Draw one uniform sample in `[0, 1)` from `key`.
    pub fn draw(&mut self, key: StreamKey) -> CircuitResult<f64> {
        Ok(self.stream_mut(key)?.r#gen())
    }
}
