//! Gate vocabulary carried through step templates.
//!
//! The engine does not build operators; it only needs to know a gate's name,
//! how many sites it acts on, and whether it is a unitary or a projective
//! (measurement-like) operation. Operator construction belongs to the state
//! backend.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Gates that can appear in a step template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum Gate {
    // Single-site Pauli gates
    /// Identity gate.
    I,
    /// Pauli-X gate.
    X,
    /// Pauli-Y gate.
    Y,
    /// Pauli-Z gate.
    Z,

    // Single-site Clifford gates
    /// Hadamard gate.
    H,
    /// S gate (sqrt(Z)).
    S,
    /// S-dagger gate.
    Sdg,
    /// T gate (fourth root of Z).
    T,
    /// T-dagger gate.
    Tdg,

    // Single-site rotations
    /// Rotation around X axis.
    Rx(f64),
    /// Rotation around Y axis.
    Ry(f64),
    /// Rotation around Z axis.
    Rz(f64),
    /// Haar-random single-site unitary, sampled by the backend from its
    /// `haar` stream each time the gate fires.
    HaarRandom,

    // Two-site gates
    /// Controlled-X (CNOT) gate.
    CX,
    /// Controlled-Z gate.
    CZ,
    /// SWAP gate.
    Swap,
    /// ZZ rotation gate.
    Rzz(f64),

    // Projective operations
    /// Projective Z measurement with a Born-rule outcome.
    Measure,
    /// Measure, then flip the site to |0⟩.
    Reset,
    /// Forced projection onto |0⟩ (`false`) or |1⟩ (`true`).
    Project(bool),
}

impl Gate {
    /// Get the name of this gate.
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Gate::I => "id",
            Gate::X => "x",
            Gate::Y => "y",
            Gate::Z => "z",
            Gate::H => "h",
            Gate::S => "s",
            Gate::Sdg => "sdg",
            Gate::T => "t",
            Gate::Tdg => "tdg",
            Gate::Rx(_) => "rx",
            Gate::Ry(_) => "ry",
            Gate::Rz(_) => "rz",
            Gate::HaarRandom => "haar",
            Gate::CX => "cx",
            Gate::CZ => "cz",
            Gate::Swap => "swap",
            Gate::Rzz(_) => "rzz",
            Gate::Measure => "measure",
            Gate::Reset => "reset",
            Gate::Project(_) => "project",
        }
    }

    /// Get the number of sites this gate acts on.
    #[inline]
    pub fn num_sites(&self) -> usize {
        match self {
            Gate::CX | Gate::CZ | Gate::Swap | Gate::Rzz(_) => 2,
            _ => 1,
        }
    }

    /// True for gates that are not unitaries and must go through the
    /// backend's measurement entry point.
    #[inline]
    pub fn is_projective(&self) -> bool {
        matches!(self, Gate::Measure | Gate::Reset | Gate::Project(_))
    }

    /// Short label used in expanded schedules.
    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gate::Rx(theta) | Gate::Ry(theta) | Gate::Rz(theta) | Gate::Rzz(theta) => {
                write!(f, "{}({:.4})", self.name(), theta)
            }
            Gate::Project(outcome) => write!(f, "project({})", u8::from(*outcome)),
            _ => write!(f, "{}", self.name()),
        }
    }
}
