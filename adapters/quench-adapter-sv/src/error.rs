//! Error types for the statevector backend.

use quench_circuit::CircuitError;
use thiserror::Error;

/// Errors raised by [`crate::SvState`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SvError {
    /// The lattice does not fit in a dense statevector.
    #[error("statevector supports at most {max} sites, got {requested}")]
    TooManySites {
        /// Sites requested.
        requested: usize,
        /// Largest supported lattice.
        max: usize,
    },

    /// A gate or observable referenced a site outside the lattice.
    #[error("site {site} out of range for a lattice of {lattice_size} sites")]
    SiteOutOfRange {
        /// The offending site.
        site: usize,
        /// Number of lattice sites.
        lattice_size: usize,
    },

    /// A gate was applied to the wrong number of sites.
    #[error("gate '{gate}' acts on {expected} site(s), got {got}")]
    ArityMismatch {
        /// Gate label.
        gate: String,
        /// Sites the gate acts on.
        expected: usize,
        /// Sites supplied.
        got: usize,
    },

    /// A two-site gate was applied with the same site twice.
    #[error("gate '{gate}' applied to site {site} twice")]
    RepeatedSite {
        /// Gate label.
        gate: String,
        /// The repeated site.
        site: usize,
    },

    /// A forced projection targeted an outcome the state cannot produce.
    #[error("projection of site {site} onto |{}⟩ has zero probability", u8::from(*outcome))]
    ZeroProbabilityProjection {
        /// Projected site.
        site: usize,
        /// Requested outcome.
        outcome: bool,
    },

    /// A unitary gate was passed to the measurement entry point.
    #[error("gate '{0}' is not a projective operation")]
    NotProjective(String),

    /// The gate has no statevector implementation.
    #[error("gate '{0}' is not supported by the statevector backend")]
    UnsupportedGate(String),

    /// An observable name was registered twice.
    #[error("observable '{0}' is already tracked")]
    DuplicateObservable(String),

    /// An entanglement cut lies outside the lattice.
    #[error("entanglement cut {cut} is outside 0..={lattice_size}")]
    InvalidCut {
        /// Requested cut.
        cut: usize,
        /// Number of lattice sites.
        lattice_size: usize,
    },

    /// Stream or configuration error from the circuit engine.
    #[error(transparent)]
    Circuit(#[from] CircuitError),
}

/// Result type for statevector operations.
pub type SvResult<T> = Result<T, SvError>;
