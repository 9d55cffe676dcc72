//! The state backend seam.
//!
//! The executor drives any type implementing [`SimulationState`]. The state
//! owns the physical representation, its named random streams, its
//! observables, and the running gate counter, so that counting continues
//! across successive `execute` calls on the same state.

use serde::Serialize;

use crate::gate::Gate;
use crate::geometry::Boundary;
use crate::rng::RngRegistry;

/// Monotonic count of gates executed against a state. Never decremented or
/// reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct GateCounter(u64);

impl GateCounter {
    /// A counter at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Gates counted so far.
    pub fn get(self) -> u64 {
        self.0
    }

    /// Count one gate and return the new value.
    pub(crate) fn advance(&mut self) -> u64 {
        self.0 += 1;
        self.0
    }
}

/// A quantum state the executor can mutate.
///
/// # Contract
///
/// - `apply` receives every unitary gate together with its resolved sites, in
///   the gate's site order.
/// - `apply_measurement` receives every gate for which
///   [`Gate::is_projective`] holds, with its single site.
/// - Neither entry point resolves geometry; sites are always concrete.
/// - `record` snapshots every tracked observable once.
pub trait SimulationState {
    /// Backend failure type.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Number of lattice sites.
    fn lattice_size(&self) -> usize;

    /// Boundary condition the state was prepared with.
    fn boundary(&self) -> Boundary;

    /// Apply a unitary gate.
    fn apply(&mut self, gate: &Gate, sites: &[usize]) -> Result<(), Self::Error>;

    /// Apply a projective gate.
    fn apply_measurement(&mut self, gate: &Gate, site: usize) -> Result<(), Self::Error>;

    /// Named random streams owned by the state.
    fn rng_mut(&mut self) -> &mut RngRegistry;

    /// The state's running gate counter.
    fn gate_counter_mut(&mut self) -> &mut GateCounter;

    /// Snapshot all tracked observables.
    fn record(&mut self) -> Result<(), Self::Error>;
}
