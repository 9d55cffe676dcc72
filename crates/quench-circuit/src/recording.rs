//! Recording cadence.
//!
//! The executor consults a [`RecordingPolicy`] after every gate that actually
//! fires and once more when a repetition completes. Per-gate requests from
//! [`RecordingPolicy::EveryNGates`] and [`RecordingPolicy::Custom`] are
//! batched: however many gates ask for a recording, the repetition produces a
//! single snapshot once its state has settled. Only
//! [`RecordingPolicy::EveryGate`] snapshots mid-repetition.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CircuitError, CircuitResult};
use crate::gate::Gate;

/// What the executor knows about a gate that just fired.
#[derive(Debug, Clone, Copy)]
pub struct RecordingContext<'a> {
    /// Repetition being executed (1-based).
    pub repetition_idx: usize,
    /// Value of the state's gate counter after this gate (monotonic).
    pub gate_idx: u64,
    /// The gate that fired.
    pub gate: &'a Gate,
    /// True on the final element of the final operation of the final step of
    /// the repetition.
    pub is_boundary: bool,
}

/// User predicate deciding whether a gate requests a recording.
pub type RecordingPredicate = Box<dyn Fn(&RecordingContext<'_>) -> bool + Send + Sync>;

/// When to snapshot observables.
#[derive(Default)]
pub enum RecordingPolicy {
    /// Once after each repetition.
    #[default]
    EveryRepetition,
    /// After every executed gate, immediately.
    EveryGate,
    /// Once, after the last repetition.
    FinalOnly,
    /// When `gate_idx % n == 0`, batched per repetition.
    EveryNGates(u64),
    /// After repetitions whose index is divisible by `n`.
    EveryNRepetitions(usize),
    /// When the predicate holds for some gate, batched per repetition.
    Custom(RecordingPredicate),
}

/// What to do after a gate fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateAction {
    /// Nothing.
    Skip,
    /// Snapshot once the repetition completes.
    Defer,
    /// Snapshot now.
    RecordNow,
}

impl RecordingPolicy {
    /// Wrap a predicate.
    pub fn custom<F>(predicate: F) -> Self
    where
        F: Fn(&RecordingContext<'_>) -> bool + Send + Sync + 'static,
    {
        RecordingPolicy::Custom(Box::new(predicate))
    }

    /// Reject zero intervals.
    pub fn validate(&self) -> CircuitResult<()> {
        match self {
            RecordingPolicy::EveryNGates(0) | RecordingPolicy::EveryNRepetitions(0) => {
                Err(CircuitError::InvalidRecordingInterval)
            }
            _ => Ok(()),
        }
    }

    /// Decision taken after a gate fires.
    pub fn on_gate(&self, ctx: &RecordingContext<'_>) -> GateAction {
        match self {
            RecordingPolicy::EveryGate => GateAction::RecordNow,
            RecordingPolicy::EveryNGates(n) if *n > 0 && ctx.gate_idx % n == 0 => {
                GateAction::Defer
            }
            RecordingPolicy::Custom(predicate) if predicate(ctx) => GateAction::Defer,
            _ => GateAction::Skip,
        }
    }

    /// Decision taken when repetition `repetition` (1-based) of `total`
    /// completes, independent of any deferred per-gate request.
    pub fn at_repetition_end(&self, repetition: usize, total: usize) -> bool {
        match self {
            RecordingPolicy::EveryRepetition => true,
            RecordingPolicy::EveryNRepetitions(n) => *n > 0 && repetition % n == 0,
            RecordingPolicy::FinalOnly => repetition == total,
            _ => false,
        }
    }
}

impl fmt::Debug for RecordingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordingPolicy::EveryRepetition => write!(f, "EveryRepetition"),
            RecordingPolicy::EveryGate => write!(f, "EveryGate"),
            RecordingPolicy::FinalOnly => write!(f, "FinalOnly"),
            RecordingPolicy::EveryNGates(n) => write!(f, "EveryNGates({n})"),
            RecordingPolicy::EveryNRepetitions(n) => write!(f, "EveryNRepetitions({n})"),
            RecordingPolicy::Custom(_) => write!(f, "Custom(<predicate>)"),
        }
    }
}

/// Serialisable recording presets, used by run configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordingDirective {
    /// See [`RecordingPolicy::EveryRepetition`].
    #[default]
    EveryRepetition,
    /// See [`RecordingPolicy::EveryGate`].
    EveryGate,
    /// See [`RecordingPolicy::FinalOnly`].
    FinalOnly,
    /// See [`RecordingPolicy::EveryNGates`].
    EveryNGates(u64),
    /// See [`RecordingPolicy::EveryNRepetitions`].
    EveryNRepetitions(usize),
}

impl From<RecordingDirective> for RecordingPolicy {
    fn from(directive: RecordingDirective) -> Self {
        match directive {
            RecordingDirective::EveryRepetition => RecordingPolicy::EveryRepetition,
            RecordingDirective::EveryGate => RecordingPolicy::EveryGate,
            RecordingDirective::FinalOnly => RecordingPolicy::FinalOnly,
            RecordingDirective::EveryNGates(n) => RecordingPolicy::EveryNGates(n),
            RecordingDirective::EveryNRepetitions(n) => RecordingPolicy::EveryNRepetitions(n),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(gate_idx: u64, is_boundary: bool) -> RecordingContext<'static> {
        RecordingContext {
            repetition_idx: 1,
            gate_idx,
            gate: &Gate::X,
            is_boundary,
        }
    }

    #[test]
    fn test_default_is_every_repetition() {
        let policy = RecordingPolicy::default();
        assert_eq!(policy.on_gate(&ctx(1, false)), GateAction::Skip);
        assert!(policy.at_repetition_end(1, 3));
        assert!(policy.at_repetition_end(3, 3));
    }

    #[test]
    fn test_every_gate_records_immediately() {
        let policy = RecordingPolicy::EveryGate;
        assert_eq!(policy.on_gate(&ctx(7, false)), GateAction::RecordNow);
        assert!(!policy.at_repetition_end(1, 1));
    }

    #[test]
    fn test_final_only() {
        let policy = RecordingPolicy::FinalOnly;
        assert!(!policy.at_repetition_end(4, 5));
        assert!(policy.at_repetition_end(5, 5));
    }

    #[test]
    fn test_every_n_gates_defers() {
        let policy = RecordingPolicy::EveryNGates(3);
        assert_eq!(policy.on_gate(&ctx(2, false)), GateAction::Skip);
        assert_eq!(policy.on_gate(&ctx(3, false)), GateAction::Defer);
        assert_eq!(policy.on_gate(&ctx(6, false)), GateAction::Defer);
    }

    #[test]
    fn test_every_n_repetitions() {
        let policy = RecordingPolicy::EveryNRepetitions(2);
        let hits: Vec<usize> = (1..=6).filter(|&r| policy.at_repetition_end(r, 6)).collect();
        assert_eq!(hits, vec![2, 4, 6]);
    }

    #[test]
    fn test_custom_predicate() {
        let policy = RecordingPolicy::custom(|c| c.is_boundary && c.gate.name() == "x");
        assert_eq!(policy.on_gate(&ctx(1, true)), GateAction::Defer);
        assert_eq!(policy.on_gate(&ctx(1, false)), GateAction::Skip);
    }

    #[test]
    fn test_zero_interval_rejected() {
        assert!(RecordingPolicy::EveryNGates(0).validate().is_err());
        assert!(RecordingPolicy::EveryNRepetitions(0).validate().is_err());
        assert!(RecordingPolicy::EveryNGates(1).validate().is_ok());
    }

    #[test]
    fn test_directive_deserialises() {
        let d: RecordingDirective = serde_json::from_str(r#"{"every_n_gates": 4}"#).unwrap();
        assert_eq!(d, RecordingDirective::EveryNGates(4));
        let d: RecordingDirective = serde_json::from_str(r#""final_only""#).unwrap();
        assert!(matches!(RecordingPolicy::from(d), RecordingPolicy::FinalOnly));
    }
}
