//! Dense statevector backend for `quench` circuits.
//!
//! [`SvState`] implements [`quench_circuit::SimulationState`] with an exact
//! statevector, so circuits built with `quench-circuit` can be executed end
//! to end on small lattices. Named observables are tracked on the state and
//! appended to their series every time the executor asks for a recording.
//!
//! | Sites | Memory |
//! |-------|--------|
//! | 10 | ~16 KB |
//! | 16 | ~1 MB |
//! | 20 | ~16 MB |
//!
//! # Example
//!
//! ```rust
//! use quench_adapter_sv::{Observable, SvState};
//! use quench_circuit::{
//!     execute, Boundary, Circuit, Gate, Geometry, RecordingPolicy, RunConfig,
//! };
//!
//! // GHZ state on four sites.
//! let circuit = Circuit::build(4, Boundary::Open, 1, |b| {
//!     b.add_deterministic(Gate::H, Geometry::SingleSite(0))
//!         .add_deterministic(Gate::CX, Geometry::AdjacentPair(0))
//!         .add_deterministic(Gate::CX, Geometry::AdjacentPair(1))
//!         .add_deterministic(Gate::CX, Geometry::AdjacentPair(2));
//!     Ok(())
//! })
//! .unwrap();
//!
//! let mut state = SvState::from_config(&RunConfig::new(4, Boundary::Open)).unwrap();
//! state.track("s2", Observable::Renyi2Entropy { cut: 2 }).unwrap();
//! execute(&circuit, &mut state, 1, &RecordingPolicy::FinalOnly).unwrap();
//!
//! let s2 = state.series("s2").unwrap();
//! assert_eq!(s2.len(), 1);
//! assert!((s2[0] - 2.0_f64.ln()).abs() < 1e-12);
//! ```

mod error;
mod observable;
mod state;
mod statevector;

pub use error::{SvError, SvResult};
pub use observable::{Observable, ObservableRegistry};
pub use state::{MAX_SITES, SvState};
pub use statevector::Statevector;
