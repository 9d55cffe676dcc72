//! Side-effect-free expansion of a circuit into a concrete schedule.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::circuit::Circuit;
use crate::error::{CircuitError, CircuitResult};
use crate::gate::Gate;
use crate::rng::{RngRegistry, StreamKey};
use crate::walk::{FiredGate, StepVisitor, walk_step};

/// A gate at concrete sites, as produced by [`expand`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedOp {
    /// Step (1-based) the gate belongs to.
    pub step: usize,
    /// Index of the template operation that produced it.
    pub op_index: usize,
    /// The gate.
    pub gate: Gate,
    /// Target sites, in gate order.
    pub sites: Vec<usize>,
    /// Display label.
    pub label: String,
}

/// Expand `circuit` into one list of resolved operations per step.
///
/// The control stream is a fresh generator seeded with `seed`, created the
/// same way [`RngRegistry::seed`] creates streams: executing the circuit on a
/// state whose control stream was seeded with `seed` takes the same branches.
/// The outer list always has `circuit.repeat_count()` entries; steps where
/// nothing fired are empty.
pub fn expand(circuit: &Circuit, seed: u64) -> CircuitResult<Vec<Vec<ResolvedOp>>> {
    let mut collector = Collector {
        rng: RngRegistry::new().with_stream(StreamKey::Ctrl, seed),
        ops: Vec::new(),
    };

    let steps = circuit.repeat_count();
    let mut schedule = Vec::with_capacity(steps);
    for step in 1..=steps {
        walk_step(circuit, step, step == steps, &mut collector)?;
        schedule.push(std::mem::take(&mut collector.ops));
    }

    debug!(
        seed,
        steps,
        n_ops = schedule.iter().map(Vec::len).sum::<usize>(),
        "expanded circuit"
    );
    Ok(schedule)
}

/// [`expand`], serialised as pretty-printed JSON for external viewers.
pub fn expand_json(circuit: &Circuit, seed: u64) -> CircuitResult<String> {
    let schedule = expand(circuit, seed)?;
    serde_json::to_string_pretty(&schedule).map_err(|e| CircuitError::Export(e.to_string()))
}

struct Collector {
    rng: RngRegistry,
    ops: Vec<ResolvedOp>,
}

impl StepVisitor for Collector {
    fn rng(&mut self) -> &mut RngRegistry {
        &mut self.rng
    }

    fn fire(&mut self, fired: FiredGate<'_>) -> CircuitResult<()> {
        self.ops.push(ResolvedOp {
            step: fired.step,
            op_index: fired.op_index,
            gate: fired.gate.clone(),
            sites: fired.sites.to_vec(),
            label: fired.gate.label(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::Outcome;
    use crate::geometry::{Boundary, Geometry, Parity};

    #[test]
    fn test_deterministic_schedule() {
        let circuit = Circuit::build(4, Boundary::Open, 3, |b| {
            b.add_deterministic(Gate::H, Geometry::StaircaseRight(0));
            Ok(())
        })
        .unwrap();

        // H has arity 1 but a staircase yields pairs.
        assert!(matches!(
            expand(&circuit, 0),
            Err(CircuitError::Resolution { op_index: 0, step: 1, .. })
        ));

        let circuit = Circuit::build(4, Boundary::Open, 4, |b| {
            b.add_deterministic(Gate::CX, Geometry::StaircaseRight(0));
            Ok(())
        })
        .unwrap();
        let schedule = expand(&circuit, 0).unwrap();
        let sites: Vec<Vec<usize>> = schedule.iter().map(|s| s[0].sites.clone()).collect();
        assert_eq!(sites, vec![vec![0, 1], vec![1, 2], vec![2, 3], vec![0, 1]]);
        assert!(schedule.iter().flatten().all(|op| op.label == "cx"));
    }

    #[test]
    fn test_compound_deterministic_fans_out() {
        let circuit = Circuit::build(6, Boundary::Periodic, 1, |b| {
            b.add_deterministic(Gate::CZ, Geometry::Bricklayer(Parity::Even));
            Ok(())
        })
        .unwrap();
        let schedule = expand(&circuit, 1).unwrap();
        assert_eq!(schedule.len(), 1);
        assert_eq!(schedule[0].len(), 3);
        assert_eq!(schedule[0][2].sites, vec![5, 0]);
    }

    #[test]
    fn test_empty_steps_are_kept() {
        let circuit = Circuit::build(4, Boundary::Open, 5, |b| {
            b.add_stochastic(
                StreamKey::Ctrl,
                vec![Outcome::new(0.0, Gate::X, Geometry::SingleSite(0))],
            )?;
            Ok(())
        })
        .unwrap();
        let schedule = expand(&circuit, 9).unwrap();
        assert_eq!(schedule.len(), 5);
        assert!(schedule.iter().all(Vec::is_empty));
    }

    #[test]
    fn test_mixed_compound_outcomes_rejected() {
        let circuit = Circuit::build(4, Boundary::Open, 1, |b| {
            b.add_stochastic(
                StreamKey::Ctrl,
                vec![
                    Outcome::new(0.5, Gate::X, Geometry::AllSites),
                    Outcome::new(0.5, Gate::Z, Geometry::SingleSite(0)),
                ],
            )?;
            Ok(())
        })
        .unwrap();
        assert!(matches!(
            expand(&circuit, 0),
            Err(CircuitError::MixedCompoundOutcomes { op_index: 0, step: 1 })
        ));
    }

    #[test]
    fn test_expand_json() {
        let circuit = Circuit::build(2, Boundary::Open, 1, |b| {
            b.add_deterministic(Gate::Rx(0.5), Geometry::SingleSite(1));
            Ok(())
        })
        .unwrap();
        let json = expand_json(&circuit, 0).unwrap();
        let parsed: Vec<Vec<ResolvedOp>> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed[0][0].sites, vec![1]);
        assert_eq!(parsed[0][0].label, "rx(0.5000)");
    }
}
