//! `quench-circuit` — stepwise stochastic circuit templates.
//!
//! A [`Circuit`] is a step template for a 1D lattice: an ordered list of
//! deterministic gates and probabilistic branches. The same template can be
//!
//! - **expanded** with [`expand`] into a concrete, inspectable schedule, or
//! - **executed** with [`execute`] against any [`SimulationState`], repeated
//!   many times while observables are recorded according to a
//!   [`RecordingPolicy`].
//!
//! Both paths make their branch decisions through the same sampler and walk
//! the template in the same order, so an expansion with seed `s` and an
//! execution whose control stream is seeded with `s` select identical
//! branches.
//!
//! # Quick start
//!
//! ```rust
//! use quench_circuit::{expand, Boundary, Circuit, Gate, Geometry, Outcome, StreamKey};
//!
//! let circuit = Circuit::build(4, Boundary::Periodic, 10, |b| {
//!     b.add_stochastic(
//!         StreamKey::Ctrl,
//!         vec![
//!             Outcome::new(0.5, Gate::CZ, Geometry::StaircaseRight(0)),
//!             Outcome::new(0.5, Gate::Swap, Geometry::StaircaseRight(0)),
//!         ],
//!     )?;
//!     Ok(())
//! })
//! .unwrap();
//!
//! let schedule = expand(&circuit, 42).unwrap();
//! assert_eq!(schedule.len(), 10);
//! // The two outcomes cover the full probability mass: every step fires.
//! assert!(schedule.iter().all(|step| step.len() == 1));
//! ```

pub mod branch;
pub mod circuit;
pub mod config;
pub mod error;
pub mod execute;
pub mod expand;
pub mod gate;
pub mod geometry;
pub mod recording;
pub mod rng;
pub mod state;
mod walk;

pub use branch::select_branch;
pub use circuit::{Circuit, CircuitBuilder, Operation, Outcome, PROBABILITY_TOLERANCE};
pub use config::{RunConfig, SeedConfig};
pub use error::{CircuitError, CircuitResult};
pub use execute::{ExecutionSummary, execute, execute_configured};
pub use expand::{ResolvedOp, expand, expand_json};
pub use gate::Gate;
pub use geometry::{Boundary, Geometry, GeometryError, Parity, SiteGroups};
pub use recording::{GateAction, RecordingContext, RecordingDirective, RecordingPolicy};
pub use rng::{RngRegistry, StreamKey};
pub use state::{GateCounter, SimulationState};
