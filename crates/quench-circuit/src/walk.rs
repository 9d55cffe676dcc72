//! One pass over a step template.
//!
//! Expansion and execution differ only in what happens when a gate fires, so
//! both drive the same walker with a different [`StepVisitor`]. Site
//! resolution, compound fan-out, and the draw order therefore cannot drift
//! apart between the two paths.

use rand::rngs::StdRng;

use crate::branch::select_branch;
use crate::circuit::{Circuit, Operation, Outcome};
use crate::error::{CircuitError, CircuitResult};
use crate::gate::Gate;
use crate::geometry::{Geometry, GeometryError, SiteGroups, check_arity, resolve};
use crate::rng::{RngRegistry, StreamKey};

/// A gate that was selected to fire at concrete sites.
#[derive(Debug)]
pub(crate) struct FiredGate<'a> {
    pub op_index: usize,
    pub step: usize,
    pub gate: &'a Gate,
    pub sites: &'a [usize],
    /// Last element of the last operation of the last step of a repetition.
    pub is_boundary: bool,
}

/// Receives the gates a step fires, and provides the draws it consumes.
pub(crate) trait StepVisitor {
    fn rng(&mut self) -> &mut RngRegistry;

    fn fire(&mut self, fired: FiredGate<'_>) -> CircuitResult<()>;
}

/// Walk every operation of `circuit` once at `step`.
///
/// `final_step` marks the last step of a repetition; it only affects the
/// `is_boundary` flag of fired gates.
pub(crate) fn walk_step<V: StepVisitor>(
    circuit: &Circuit,
    step: usize,
    final_step: bool,
    visitor: &mut V,
) -> CircuitResult<()> {
    let last_op = circuit.operations().len().saturating_sub(1);

    for (op_index, op) in circuit.operations().iter().enumerate() {
        let final_op = final_step && op_index == last_op;
        let at = Context {
            circuit,
            op_index,
            step,
        };

        match op {
            Operation::Deterministic { gate, geometry } => {
                let groups = at.resolve(geometry)?.into_groups();
                let last = groups.len().saturating_sub(1);
                for (element, sites) in groups.iter().enumerate() {
                    at.check_arity(gate, geometry, sites)?;
                    visitor.fire(FiredGate {
                        op_index,
                        step,
                        gate,
                        sites,
                        is_boundary: final_op && element == last,
                    })?;
                }
            }
            Operation::Stochastic { stream, outcomes } => match at.shared_compound(outcomes)? {
                Some(geometry) => {
                    // One independent draw per element, in element order.
                    // Everything is drawn before anything fires; the boundary
                    // flag belongs to the last element that fires.
                    let groups = at.resolve(geometry)?.into_groups();
                    let mut selected = Vec::with_capacity(groups.len());
                    for sites in &groups {
                        let rng = at.stream(visitor, *stream)?;
                        if let Some(outcome) = select_branch(rng, outcomes) {
                            at.check_arity(&outcome.gate, geometry, sites)?;
                            selected.push((outcome, sites));
                        }
                    }
                    let last = selected.len().saturating_sub(1);
                    for (i, (outcome, sites)) in selected.into_iter().enumerate() {
                        visitor.fire(FiredGate {
                            op_index,
                            step,
                            gate: &outcome.gate,
                            sites,
                            is_boundary: final_op && i == last,
                        })?;
                    }
                }
                None => {
                    let rng = at.stream(visitor, *stream)?;
                    let Some(outcome) = select_branch(rng, outcomes) else {
                        continue;
                    };
                    let sites = match at.resolve(&outcome.geometry)? {
                        SiteGroups::Single(sites) => sites,
                        // Unreachable for a well-formed geometry: compound
                        // outcomes take the branch above.
                        SiteGroups::Compound(_) => {
                            return Err(CircuitError::MixedCompoundOutcomes { op_index, step });
                        }
                    };
                    at.check_arity(&outcome.gate, &outcome.geometry, &sites)?;
                    visitor.fire(FiredGate {
                        op_index,
                        step,
                        gate: &outcome.gate,
                        sites: &sites,
                        is_boundary: final_op,
                    })?;
                }
            },
        }
    }
    Ok(())
}

/// Where in the template resolution is happening, for error context.
struct Context<'c> {
    circuit: &'c Circuit,
    op_index: usize,
    step: usize,
}

impl Context<'_> {
    fn wrap(&self, source: GeometryError) -> CircuitError {
        CircuitError::Resolution {
            op_index: self.op_index,
            step: self.step,
            source,
        }
    }

    fn resolve(&self, geometry: &Geometry) -> CircuitResult<SiteGroups> {
        resolve(
            geometry,
            self.step,
            self.circuit.lattice_size(),
            self.circuit.boundary(),
        )
        .map_err(|e| self.wrap(e))
    }

    fn check_arity(&self, gate: &Gate, geometry: &Geometry, sites: &[usize]) -> CircuitResult<()> {
        check_arity(&gate.label(), geometry, gate.num_sites(), sites).map_err(|e| self.wrap(e))
    }

    /// The named stream of `visitor`, with operation context if it is missing.
    fn stream<'v, V: StepVisitor>(
        &self,
        visitor: &'v mut V,
        stream: StreamKey,
    ) -> CircuitResult<&'v mut StdRng> {
        visitor.rng().stream_mut(stream).map_err(|e| match e {
            CircuitError::UnseededStream(stream) => CircuitError::UnseededOperationStream {
                op_index: self.op_index,
                step: self.step,
                stream,
            },
            other => other,
        })
    }

    /// The compound geometry all outcomes share, or `None` if none is compound.
    fn shared_compound<'o>(&self, outcomes: &'o [Outcome]) -> CircuitResult<Option<&'o Geometry>> {
        let Some(first) = outcomes.iter().find(|o| o.geometry.is_compound()) else {
            return Ok(None);
        };
        if outcomes.iter().any(|o| o.geometry != first.geometry) {
            return Err(CircuitError::MixedCompoundOutcomes {
                op_index: self.op_index,
                step: self.step,
            });
        }
        Ok(Some(&first.geometry))
    }
}
