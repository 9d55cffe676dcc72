//! Execution of a circuit against a live state.

use serde::Serialize;
use tracing::{debug, instrument, trace};

use crate::circuit::Circuit;
use crate::config::RunConfig;
use crate::error::{CircuitError, CircuitResult};
use crate::recording::{GateAction, RecordingContext, RecordingPolicy};
use crate::rng::RngRegistry;
use crate::state::SimulationState;
use crate::walk::{FiredGate, StepVisitor, walk_step};

/// What an [`execute`] call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExecutionSummary {
    /// Repetitions run.
    pub repetitions: usize,
    /// Gates that fired during this call.
    pub gates_applied: u64,
    /// Snapshots taken during this call.
    pub recordings: usize,
    /// The state's gate counter when the call returned.
    pub final_gate_idx: u64,
}

/// Run `circuit` on `state` for `repetitions` repetitions.
///
/// Each repetition walks `circuit.repeat_count()` steps. Geometry is resolved
/// at the global step `(repetition − 1) · repeat_count + step`, so moving
/// pointers keep advancing across repetitions; the first repetition resolves
/// exactly the steps [`crate::expand`] produces.
///
/// Stochastic operations draw from the state's own named streams. Seed the
/// state's control stream with the expansion seed to reproduce an expansion.
#[instrument(
    skip_all,
    fields(
        lattice_size = circuit.lattice_size(),
        repetitions = repetitions,
        policy = ?policy
    )
)]
pub fn execute<S: SimulationState>(
    circuit: &Circuit,
    state: &mut S,
    repetitions: usize,
    policy: &RecordingPolicy,
) -> CircuitResult<ExecutionSummary> {
    validate(circuit, state, repetitions)?;
    policy.validate()?;

    let steps = circuit.repeat_count();
    let mut driver = Driver {
        state,
        policy,
        repetition: 0,
        pending: false,
        gates_applied: 0,
        recordings: 0,
    };
    let start_gate_idx = driver.state.gate_counter_mut().get();

    for repetition in 1..=repetitions {
        driver.repetition = repetition;
        driver.pending = false;

        for step in 1..=steps {
            let global_step = (repetition - 1) * steps + step;
            walk_step(circuit, global_step, step == steps, &mut driver)?;
        }

        if driver.pending || policy.at_repetition_end(repetition, repetitions) {
            driver.record()?;
        }
        debug!(
            repetition,
            gate_idx = driver.state.gate_counter_mut().get(),
            recordings = driver.recordings,
            "repetition complete"
        );
    }

    let final_gate_idx = driver.state.gate_counter_mut().get();
    debug!(
        start_gate_idx,
        final_gate_idx,
        gates_applied = driver.gates_applied,
        recordings = driver.recordings,
        "execution complete"
    );

    Ok(ExecutionSummary {
        repetitions,
        gates_applied: driver.gates_applied,
        recordings: driver.recordings,
        final_gate_idx,
    })
}

/// [`execute`] with repetitions and recording taken from `config`.
pub fn execute_configured<S: SimulationState>(
    circuit: &Circuit,
    state: &mut S,
    config: &RunConfig,
) -> CircuitResult<ExecutionSummary> {
    config.validate()?;
    let policy = RecordingPolicy::from(config.recording);
    execute(circuit, state, config.repetitions, &policy)
}

fn validate<S: SimulationState>(
    circuit: &Circuit,
    state: &S,
    repetitions: usize,
) -> CircuitResult<()> {
    if repetitions == 0 {
        return Err(CircuitError::InvalidRepetitions(0));
    }
    if state.lattice_size() != circuit.lattice_size() {
        return Err(CircuitError::LatticeMismatch {
            circuit: circuit.lattice_size(),
            state: state.lattice_size(),
        });
    }
    if state.boundary() != circuit.boundary() {
        return Err(CircuitError::BoundaryMismatch {
            circuit: circuit.boundary(),
            state: state.boundary(),
        });
    }
    Ok(())
}

/// Applies fired gates to the state and tracks recording requests.
struct Driver<'s, 'p, S> {
    state: &'s mut S,
    policy: &'p RecordingPolicy,
    repetition: usize,
    /// A deferred recording was requested during the current repetition.
    pending: bool,
    gates_applied: u64,
    recordings: usize,
}

impl<S: SimulationState> Driver<'_, '_, S> {
    fn record(&mut self) -> CircuitResult<()> {
        self.state
            .record()
            .map_err(|e| CircuitError::Record {
                repetition: self.repetition,
                source: Box::new(e),
            })?;
        self.recordings += 1;
        Ok(())
    }
}

impl<S: SimulationState> StepVisitor for Driver<'_, '_, S> {
    fn rng(&mut self) -> &mut RngRegistry {
        self.state.rng_mut()
    }

    fn fire(&mut self, fired: FiredGate<'_>) -> CircuitResult<()> {
        let FiredGate {
            op_index,
            step,
            gate,
            sites,
            is_boundary,
        } = fired;

        let applied = if gate.is_projective() {
            self.state.apply_measurement(gate, sites[0])
        } else {
            self.state.apply(gate, sites)
        };
        applied.map_err(|e| CircuitError::State {
            op_index,
            step,
            gate: gate.label(),
            source: Box::new(e),
        })?;

        let gate_idx = self.state.gate_counter_mut().advance();
        self.gates_applied += 1;
        trace!(gate_idx, step, op_index, gate = %gate, ?sites, "applied gate");

        let ctx = RecordingContext {
            repetition_idx: self.repetition,
            gate_idx,
            gate,
            is_boundary,
        };
        match self.policy.on_gate(&ctx) {
            GateAction::RecordNow => self.record()?,
            GateAction::Defer => self.pending = true,
            GateAction::Skip => {}
        }
        Ok(())
    }
}
