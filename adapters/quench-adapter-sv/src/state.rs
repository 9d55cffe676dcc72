//! [`SimulationState`] implementation over a dense statevector.

use num_complex::Complex64;
use quench_circuit::{
    Boundary, Gate, GateCounter, RngRegistry, RunConfig, SimulationState, StreamKey,
};
use tracing::{debug, trace};

use crate::error::{SvError, SvResult};
use crate::observable::{Observable, ObservableRegistry};
use crate::statevector::Statevector;

/// Largest lattice a dense statevector is allowed to hold.
pub const MAX_SITES: usize = 20;

/// Outcomes with less weight than this cannot be projected onto.
const ZERO_PROBABILITY: f64 = 1e-12;

/// A lattice of qubits held as a dense statevector, with its random streams,
/// gate counter, and observable series.
#[derive(Debug, Clone)]
pub struct SvState {
    sv: Statevector,
    boundary: Boundary,
    rng: RngRegistry,
    counter: GateCounter,
    observables: ObservableRegistry,
    recordings: usize,
}

impl SvState {
    /// Create a state in |0...0⟩.
    ///
    /// Haar-random gates draw from `rng`'s `haar` stream and measurements from
    /// its `born` stream; the executor draws branch decisions from `ctrl`.
    pub fn new(lattice_size: usize, boundary: Boundary, rng: RngRegistry) -> SvResult<Self> {
        if lattice_size > MAX_SITES {
            return Err(SvError::TooManySites {
                requested: lattice_size,
                max: MAX_SITES,
            });
        }
        Ok(Self {
            sv: Statevector::new(lattice_size),
            boundary,
            rng,
            counter: GateCounter::new(),
            observables: ObservableRegistry::new(),
            recordings: 0,
        })
    }

    /// Create a state sized and seeded from `config`.
    pub fn from_config(config: &RunConfig) -> SvResult<Self> {
        config.validate()?;
        Self::new(config.lattice_size, config.boundary, config.rng_registry())
    }

    /// Track `observable` under `name`; it is evaluated on every recording.
    pub fn track(&mut self, name: impl Into<String>, observable: Observable) -> SvResult<()> {
        observable.validate(self.sv.num_sites())?;
        self.observables.track(name, observable)
    }

    /// Values recorded for `name`, oldest first.
    pub fn series(&self, name: &str) -> Option<&[f64]> {
        self.observables.series(name)
    }

    /// Every tracked observable with its series.
    pub fn observables(&self) -> &ObservableRegistry {
        &self.observables
    }

    /// Evaluate `observable` on the current state without recording it.
    pub fn expectation(&self, observable: Observable) -> SvResult<f64> {
        observable.validate(self.sv.num_sites())?;
        Ok(observable.evaluate(&self.sv))
    }

    /// Current amplitudes, site `k` on bit `k` of the index.
    pub fn amplitudes(&self) -> &[Complex64] {
        self.sv.amplitudes()
    }

    /// Read-only view of the underlying statevector.
    pub fn statevector(&self) -> &Statevector {
        &self.sv
    }

    /// Number of snapshots taken so far.
    pub fn recordings(&self) -> usize {
        self.recordings
    }

    fn check_sites(&self, gate: &Gate, sites: &[usize]) -> SvResult<()> {
        let expected = gate.num_sites();
        if sites.len() != expected {
            return Err(SvError::ArityMismatch {
                gate: gate.label(),
                expected,
                got: sites.len(),
            });
        }
        let lattice_size = self.sv.num_sites();
        if let Some(&site) = sites.iter().find(|&&s| s >= lattice_size) {
            return Err(SvError::SiteOutOfRange { site, lattice_size });
        }
        if let [a, b] = *sites {
            if a == b {
                return Err(SvError::RepeatedSite {
                    gate: gate.label(),
                    site: a,
                });
            }
        }
        Ok(())
    }

    /// Haar-random SU(2) up to a global phase.
    fn apply_haar(&mut self, site: usize) -> SvResult<()> {
        let u1 = self.rng.draw(StreamKey::Haar)?;
        let u2 = self.rng.draw(StreamKey::Haar)?;
        let u3 = self.rng.draw(StreamKey::Haar)?;
        let theta = (1.0 - 2.0 * u1).acos();
        let tau = std::f64::consts::TAU;
        self.sv.apply_u(site, theta, tau * u2, tau * u3);
        Ok(())
    }

    /// Born-rule measurement of `site`; returns the outcome.
    fn measure(&mut self, site: usize) -> SvResult<bool> {
        let p0 = self.sv.probability(site, false);
        let outcome = self.rng.draw(StreamKey::Born)? >= p0;
        let p = if outcome { 1.0 - p0 } else { p0 };
        self.sv.project(site, outcome, p);
        trace!(site, outcome, probability = p, "measured site");
        Ok(outcome)
    }

    fn project(&mut self, site: usize, outcome: bool) -> SvResult<()> {
        let p = self.sv.probability(site, outcome);
        if p < ZERO_PROBABILITY {
            return Err(SvError::ZeroProbabilityProjection { site, outcome });
        }
        self.sv.project(site, outcome, p);
        Ok(())
    }
}

impl SimulationState for SvState {
    type Error = SvError;

    fn lattice_size(&self) -> usize {
        self.sv.num_sites()
    }

    fn boundary(&self) -> Boundary {
        self.boundary
    }

    fn apply(&mut self, gate: &Gate, sites: &[usize]) -> SvResult<()> {
        self.check_sites(gate, sites)?;
        match *gate {
            Gate::I => {}
            Gate::X => self.sv.apply_x(sites[0]),
            Gate::Y => self.sv.apply_y(sites[0]),
            Gate::Z => self.sv.apply_z(sites[0]),
            Gate::H => self.sv.apply_h(sites[0]),
            Gate::S => self.sv.apply_phase(sites[0], std::f64::consts::FRAC_PI_2),
            Gate::Sdg => self.sv.apply_phase(sites[0], -std::f64::consts::FRAC_PI_2),
            Gate::T => self.sv.apply_phase(sites[0], std::f64::consts::FRAC_PI_4),
            Gate::Tdg => self.sv.apply_phase(sites[0], -std::f64::consts::FRAC_PI_4),
            Gate::Rx(theta) => self.sv.apply_rx(sites[0], theta),
            Gate::Ry(theta) => self.sv.apply_ry(sites[0], theta),
            Gate::Rz(theta) => self.sv.apply_rz(sites[0], theta),
            Gate::HaarRandom => self.apply_haar(sites[0])?,
            Gate::CX => self.sv.apply_cx(sites[0], sites[1]),
            Gate::CZ => self.sv.apply_cz(sites[0], sites[1]),
            Gate::Swap => self.sv.apply_swap(sites[0], sites[1]),
            Gate::Rzz(theta) => self.sv.apply_rzz(sites[0], sites[1], theta),
            Gate::Measure | Gate::Reset | Gate::Project(_) => {
                self.apply_measurement(gate, sites[0])?;
            }
            _ => return Err(SvError::UnsupportedGate(gate.label())),
        }
        Ok(())
    }

    fn apply_measurement(&mut self, gate: &Gate, site: usize) -> SvResult<()> {
        self.check_sites(gate, &[site])?;
        match *gate {
            Gate::Measure => {
                self.measure(site)?;
            }
            Gate::Reset => {
                if self.measure(site)? {
                    self.sv.apply_x(site);
                }
            }
            Gate::Project(outcome) => self.project(site, outcome)?,
            _ => return Err(SvError::NotProjective(gate.label())),
        }
        Ok(())
    }

    fn rng_mut(&mut self) -> &mut RngRegistry {
        &mut self.rng
    }

    fn gate_counter_mut(&mut self) -> &mut GateCounter {
        &mut self.counter
    }

    fn record(&mut self) -> SvResult<()> {
        self.observables.record(&self.sv);
        self.recordings += 1;
        debug!(
            recording = self.recordings,
            gate_idx = self.counter.get(),
            observables = self.observables.len(),
            "recorded observables"
        );
        Ok(())
    }
}
