//! Error types for the circuit crate.

use thiserror::Error;

use crate::geometry::{Boundary, GeometryError};
use crate::rng::StreamKey;

/// Errors produced while building, expanding, or executing a circuit.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CircuitError {
    // ---------------------------------------------------------------------
    // Construction time
    // ---------------------------------------------------------------------
    /// A stochastic operation was declared without any outcomes.
    #[error("Stochastic operation {op_index} has no outcomes")]
    EmptyOutcomes {
        /// Index of the operation within the step template.
        op_index: usize,
    },

    /// Outcome probabilities add up to more than one (beyond tolerance).
    #[error(
        "Stochastic operation {op_index}: outcome probabilities sum to {sum}, exceeding 1 + {tolerance:e}"
    )]
    ProbabilitySumExceeded {
        /// Index of the operation within the step template.
        op_index: usize,
        /// The offending sum.
        sum: f64,
        /// Tolerance allowed above one.
        tolerance: f64,
    },

    /// A single outcome probability is negative or not finite.
    #[error("Stochastic operation {op_index}: outcome {outcome} has invalid probability {probability}")]
    InvalidProbability {
        /// Index of the operation within the step template.
        op_index: usize,
        /// Index of the outcome within the operation.
        outcome: usize,
        /// The rejected value.
        probability: f64,
    },

    /// Stochastic operations may only draw from the control stream.
    #[error("Stochastic operation {op_index}: stream '{stream}' is reserved; only '{}' is accepted", StreamKey::Ctrl)]
    DisallowedStream {
        /// Index of the operation within the step template.
        op_index: usize,
        /// The rejected stream.
        stream: StreamKey,
    },

    /// A circuit must span at least one step.
    #[error("repeat_count must be at least 1, got {0}")]
    InvalidRepeatCount(usize),

    // ---------------------------------------------------------------------
    // Resolution time
    // ---------------------------------------------------------------------
    /// Geometry resolution failed for a specific operation.
    #[error("Operation {op_index} at step {step}: {source}")]
    Resolution {
        /// Index of the operation within the step template.
        op_index: usize,
        /// Step at which resolution was attempted.
        step: usize,
        /// Underlying resolver error.
        #[source]
        source: GeometryError,
    },

    /// Outcomes of a compound stochastic operation disagree on their geometry.
    #[error(
        "Operation {op_index} at step {step}: compound outcomes must all share one geometry"
    )]
    MixedCompoundOutcomes {
        /// Index of the operation within the step template.
        op_index: usize,
        /// Step at which resolution was attempted.
        step: usize,
    },

    // ---------------------------------------------------------------------
    // Execution time
    // ---------------------------------------------------------------------
    /// Execution needs at least one repetition.
    #[error("repetitions must be at least 1, got {0}")]
    InvalidRepetitions(usize),

    /// The state was prepared for a different lattice.
    #[error("Circuit expects {circuit} sites but the state has {state}")]
    LatticeMismatch {
        /// Lattice size of the circuit.
        circuit: usize,
        /// Lattice size of the state.
        state: usize,
    },

    /// The state was prepared with a different boundary condition.
    #[error("Circuit uses {circuit} boundary but the state uses {state}")]
    BoundaryMismatch {
        /// Boundary of the circuit.
        circuit: Boundary,
        /// Boundary of the state.
        state: Boundary,
    },

    /// A draw was requested from a stream that was never seeded.
    #[error("Random stream '{0}' has not been seeded")]
    UnseededStream(StreamKey),

    /// A stochastic operation draws from a stream the state never seeded.
    #[error("Operation {op_index} at step {step}: random stream '{stream}' has not been seeded")]
    UnseededOperationStream {
        /// Index of the operation within the step template.
        op_index: usize,
        /// Step being walked.
        step: usize,
        /// The missing stream.
        stream: StreamKey,
    },

    /// `every_n_gates(0)` or `every_n_repetitions(0)`.
    #[error("Recording interval must be at least 1")]
    InvalidRecordingInterval,

    /// The state backend failed to apply a gate.
    #[error("Operation {op_index} at step {step}: state backend failed applying '{gate}': {source}")]
    State {
        /// Index of the operation within the step template.
        op_index: usize,
        /// Global step being executed.
        step: usize,
        /// Label of the gate being applied.
        gate: String,
        /// Backend error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The state backend failed to snapshot observables.
    #[error("Recording after repetition {repetition} failed: {source}")]
    Record {
        /// Repetition (1-based) whose snapshot failed.
        repetition: usize,
        /// Backend error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    // ---------------------------------------------------------------------
    // Configuration
    // ---------------------------------------------------------------------
    /// Run configuration could not be parsed or is inconsistent.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A schedule could not be serialised.
    #[error("Export error: {0}")]
    Export(String),
}

impl From<serde_json::Error> for CircuitError {
    fn from(e: serde_json::Error) -> Self {
        CircuitError::Config(e.to_string())
    }
}

impl From<serde_yaml_ng::Error> for CircuitError {
    fn from(e: serde_yaml_ng::Error) -> Self {
        CircuitError::Config(e.to_string())
    }
}

/// Result type for circuit operations.
pub type CircuitResult<T> = Result<T, CircuitError>;
