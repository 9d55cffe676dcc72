//! A state backend that only remembers what it was asked to do.

#![allow(dead_code)]

use quench_circuit::{
    Boundary, Gate, GateCounter, ResolvedOp, RngRegistry, SimulationState, StreamKey,
};

/// One call the executor made into the backend.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Unitary(Gate, Vec<usize>),
    Measurement(Gate, usize),
}

impl Call {
    pub fn gate(&self) -> &Gate {
        match self {
            Call::Unitary(gate, _) | Call::Measurement(gate, _) => gate,
        }
    }

    pub fn sites(&self) -> Vec<usize> {
        match self {
            Call::Unitary(_, sites) => sites.clone(),
            Call::Measurement(_, site) => vec![*site],
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("trace backend refused gate '{0}'")]
pub struct TraceError(pub String);

pub struct TraceState {
    pub lattice_size: usize,
    pub boundary: Boundary,
    pub rng: RngRegistry,
    pub counter: GateCounter,
    pub calls: Vec<Call>,
    /// Number of calls seen at each snapshot.
    pub snapshots: Vec<usize>,
    /// Gate name the backend refuses to apply.
    pub refuse: Option<&'static str>,
}

impl TraceState {
    pub fn new(lattice_size: usize, boundary: Boundary, ctrl_seed: u64) -> Self {
        Self {
            lattice_size,
            boundary,
            rng: RngRegistry::new().with_stream(StreamKey::Ctrl, ctrl_seed),
            counter: GateCounter::new(),
            calls: Vec::new(),
            snapshots: Vec::new(),
            refuse: None,
        }
    }

    /// Calls as (gate, sites) pairs, for comparison with an expansion.
    pub fn trace(&self) -> Vec<(Gate, Vec<usize>)> {
        self.calls
            .iter()
            .map(|c| (c.gate().clone(), c.sites()))
            .collect()
    }
}

impl SimulationState for TraceState {
    type Error = TraceError;

    fn lattice_size(&self) -> usize {
        self.lattice_size
    }

    fn boundary(&self) -> Boundary {
        self.boundary
    }

    fn apply(&mut self, gate: &Gate, sites: &[usize]) -> Result<(), TraceError> {
        if self.refuse == Some(gate.name()) {
            return Err(TraceError(gate.label()));
        }
        self.calls.push(Call::Unitary(gate.clone(), sites.to_vec()));
        Ok(())
    }

    fn apply_measurement(&mut self, gate: &Gate, site: usize) -> Result<(), TraceError> {
        if self.refuse == Some(gate.name()) {
            return Err(TraceError(gate.label()));
        }
        self.calls.push(Call::Measurement(gate.clone(), site));
        Ok(())
    }

    fn rng_mut(&mut self) -> &mut RngRegistry {
        &mut self.rng
    }

    fn gate_counter_mut(&mut self) -> &mut GateCounter {
        &mut self.counter
    }

    fn record(&mut self) -> Result<(), TraceError> {
        self.snapshots.push(self.calls.len());
        Ok(())
    }
}

/// Flatten an expansion into (gate, sites) pairs.
pub fn flatten(schedule: &[Vec<ResolvedOp>]) -> Vec<(Gate, Vec<usize>)> {
    schedule
        .iter()
        .flatten()
        .map(|op| (op.gate.clone(), op.sites.clone()))
        .collect()
}
