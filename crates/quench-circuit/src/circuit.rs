//! Step-template circuits and their builder.
//!
//! A [`Circuit`] is an ordered list of [`Operation`]s forming one step
//! template, together with the lattice it targets and the number of steps a
//! repetition spans. It is built once through [`Circuit::build`] and is
//! read-only afterwards.
//!
//! # Example
//!
//! ```rust
//! use quench_circuit::{Boundary, Circuit, Gate, Geometry, Outcome, Parity, StreamKey};
//!
//! let circuit = Circuit::build(6, Boundary::Periodic, 3, |b| {
//!     b.add_deterministic(Gate::H, Geometry::AllSites);
//!     b.add_stochastic(
//!         StreamKey::Ctrl,
//!         vec![
//!             Outcome::new(0.3, Gate::Measure, Geometry::AllSites),
//!             Outcome::new(0.2, Gate::Reset, Geometry::AllSites),
//!         ],
//!     )?;
//!     b.add_deterministic(Gate::CZ, Geometry::Bricklayer(Parity::Odd));
//!     Ok(())
//! })
//! .unwrap();
//!
//! assert_eq!(circuit.operations().len(), 3);
//! assert_eq!(circuit.repeat_count(), 3);
//! ```

use serde::Serialize;
use tracing::debug;

use crate::error::{CircuitError, CircuitResult};
use crate::gate::Gate;
use crate::geometry::{Boundary, Geometry};
use crate::rng::StreamKey;

/// Tolerance allowed above one when summing outcome probabilities.
pub const PROBABILITY_TOLERANCE: f64 = 1e-10;

/// One candidate branch of a stochastic operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outcome {
    /// Probability of taking this branch.
    pub probability: f64,
    /// Gate applied when the branch is taken.
    pub gate: Gate,
    /// Where the gate lands.
    pub geometry: Geometry,
}

impl Outcome {
    /// Create a new outcome.
    pub fn new(probability: f64, gate: Gate, geometry: Geometry) -> Self {
        Self {
            probability,
            gate,
            geometry,
        }
    }
}

/// One entry of a step template.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Always applied.
    Deterministic {
        /// Gate to apply.
        gate: Gate,
        /// Where to apply it.
        geometry: Geometry,
    },
    /// At most one outcome is applied per draw; the unallocated probability
    /// mass is an implicit "do nothing" branch.
    Stochastic {
        /// Stream the branch decision is drawn from.
        stream: StreamKey,
        /// Candidate branches, in declaration order.
        outcomes: Vec<Outcome>,
    },
}

impl Operation {
    /// True if the operation draws randomness.
    pub fn is_stochastic(&self) -> bool {
        matches!(self, Operation::Stochastic { .. })
    }
}

/// A validated, immutable step template.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Circuit {
    lattice_size: usize,
    boundary: Boundary,
    operations: Vec<Operation>,
    repeat_count: usize,
}

impl Circuit {
    /// Build a circuit by letting `describe` add operations to a builder.
    ///
    /// Operations execute in the order they are added. `repeat_count` is the
    /// number of steps one repetition spans; it must be at least 1.
    ///
    /// Geometry is not checked against the lattice here: that happens when
    /// the circuit is expanded or executed.
    pub fn build<F>(
        lattice_size: usize,
        boundary: Boundary,
        repeat_count: usize,
        describe: F,
    ) -> CircuitResult<Self>
    where
        F: FnOnce(&mut CircuitBuilder) -> CircuitResult<()>,
    {
        if repeat_count == 0 {
            return Err(CircuitError::InvalidRepeatCount(0));
        }
        let mut builder = CircuitBuilder::default();
        describe(&mut builder)?;

        debug!(
            lattice_size,
            %boundary,
            repeat_count,
            n_operations = builder.operations.len(),
            "built circuit"
        );

        Ok(Self {
            lattice_size,
            boundary,
            operations: builder.operations,
            repeat_count,
        })
    }

    /// Number of lattice sites.
    pub fn lattice_size(&self) -> usize {
        self.lattice_size
    }

    /// Boundary condition.
    pub fn boundary(&self) -> Boundary {
        self.boundary
    }

    /// The step template, in execution order.
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Number of steps one repetition spans.
    pub fn repeat_count(&self) -> usize {
        self.repeat_count
    }

    /// True if no operation draws randomness.
    pub fn is_deterministic(&self) -> bool {
        !self.operations.iter().any(Operation::is_stochastic)
    }
}

/// Accumulates operations for [`Circuit::build`].
#[derive(Debug, Default)]
pub struct CircuitBuilder {
    operations: Vec<Operation>,
}

impl CircuitBuilder {
    /// Append an operation that is always applied.
    pub fn add_deterministic(&mut self, gate: Gate, geometry: Geometry) -> &mut Self {
        self.operations
            .push(Operation::Deterministic { gate, geometry });
        self
    }

    /// Append a probabilistic choice between `outcomes`.
    ///
    /// Fails if `outcomes` is empty, if any probability is negative or not
    /// finite, if the probabilities sum to more than
    /// `1 + PROBABILITY_TOLERANCE`, or if `stream` is not
    /// [`StreamKey::Ctrl`].
    pub fn add_stochastic(
        &mut self,
        stream: StreamKey,
        outcomes: Vec<Outcome>,
    ) -> CircuitResult<&mut Self> {
        let op_index = self.operations.len();

        if stream != StreamKey::Ctrl {
            return Err(CircuitError::DisallowedStream { op_index, stream });
        }
        if outcomes.is_empty() {
            return Err(CircuitError::EmptyOutcomes { op_index });
        }
        for (outcome, o) in outcomes.iter().enumerate() {
            if !o.probability.is_finite() || o.probability < 0.0 {
                return Err(CircuitError::InvalidProbability {
                    op_index,
                    outcome,
                    probability: o.probability,
                });
            }
        }
        let sum: f64 = outcomes.iter().map(|o| o.probability).sum();
        if sum > 1.0 + PROBABILITY_TOLERANCE {
            return Err(CircuitError::ProbabilitySumExceeded {
                op_index,
                sum,
                tolerance: PROBABILITY_TOLERANCE,
            });
        }

        self.operations
            .push(Operation::Stochastic { stream, outcomes });
        Ok(self)
    }

    /// Number of operations added so far.
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// True if nothing has been added yet.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coin(p: f64) -> Vec<Outcome> {
        vec![
            Outcome::new(p, Gate::X, Geometry::SingleSite(0)),
            Outcome::new(p, Gate::Z, Geometry::SingleSite(0)),
        ]
    }

    #[test]
    fn test_build_preserves_order() {
        let circuit = Circuit::build(4, Boundary::Open, 1, |b| {
            b.add_deterministic(Gate::H, Geometry::SingleSite(0))
                .add_deterministic(Gate::CX, Geometry::AdjacentPair(0));
            b.add_stochastic(StreamKey::Ctrl, coin(0.25))?;
            Ok(())
        })
        .unwrap();

        let ops = circuit.operations();
        assert_eq!(ops.len(), 3);
        assert!(matches!(ops[0], Operation::Deterministic { gate: Gate::H, .. }));
        assert!(matches!(ops[1], Operation::Deterministic { gate: Gate::CX, .. }));
        assert!(ops[2].is_stochastic());
        assert!(!circuit.is_deterministic());
    }

    #[test]
    fn test_zero_repeat_count_rejected() {
        let result = Circuit::build(4, Boundary::Open, 0, |_| Ok(()));
        assert!(matches!(result, Err(CircuitError::InvalidRepeatCount(0))));
    }

    #[test]
    fn test_empty_outcomes_rejected() {
        let result = Circuit::build(4, Boundary::Open, 1, |b| {
            b.add_deterministic(Gate::H, Geometry::SingleSite(0));
            b.add_stochastic(StreamKey::Ctrl, vec![])?;
            Ok(())
        });
        assert!(matches!(
            result,
            Err(CircuitError::EmptyOutcomes { op_index: 1 })
        ));
    }

    #[test]
    fn test_probability_sum_bound() {
        let over = Circuit::build(4, Boundary::Open, 1, |b| {
            b.add_stochastic(StreamKey::Ctrl, coin(0.5 + PROBABILITY_TOLERANCE))?;
            Ok(())
        });
        assert!(matches!(
            over,
            Err(CircuitError::ProbabilitySumExceeded { op_index: 0, .. })
        ));

        let exact = Circuit::build(4, Boundary::Open, 1, |b| {
            b.add_stochastic(StreamKey::Ctrl, coin(0.5))?;
            Ok(())
        });
        assert!(exact.is_ok());

        let under = Circuit::build(4, Boundary::Open, 1, |b| {
            b.add_stochastic(StreamKey::Ctrl, coin(0.4))?;
            Ok(())
        });
        assert!(under.is_ok());
    }

    #[test]
    fn test_invalid_probability_rejected() {
        for p in [-0.1, f64::NAN, f64::INFINITY] {
            let result = Circuit::build(4, Boundary::Open, 1, |b| {
                b.add_stochastic(
                    StreamKey::Ctrl,
                    vec![Outcome::new(p, Gate::X, Geometry::SingleSite(0))],
                )?;
                Ok(())
            });
            assert!(matches!(
                result,
                Err(CircuitError::InvalidProbability { outcome: 0, .. })
            ));
        }
    }

    #[test]
    fn test_reserved_streams_rejected() {
        for stream in [StreamKey::Proj, StreamKey::Haar, StreamKey::Born] {
            let result = Circuit::build(4, Boundary::Open, 1, |b| {
                b.add_stochastic(stream, coin(0.5))?;
                Ok(())
            });
            assert!(matches!(
                result,
                Err(CircuitError::DisallowedStream { stream: s, .. }) if s == stream
            ));
        }
    }

    #[test]
    fn test_geometry_not_checked_at_build_time() {
        // Site 10 does not exist on a 4-site lattice; that surfaces only when
        // the circuit is resolved.
        let circuit = Circuit::build(4, Boundary::Open, 1, |b| {
            b.add_deterministic(Gate::X, Geometry::SingleSite(10));
            Ok(())
        });
        assert!(circuit.is_ok());
    }
}
