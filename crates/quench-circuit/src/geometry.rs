//! Geometry site resolution.
//!
//! A [`Geometry`] describes *where* a gate lands on a 1D lattice. Resolution is
//! a pure function of `(geometry, step, lattice_size, boundary)`: nothing is
//! mutated, so the expander and the executor always agree on the sites for a
//! given step.
//!
//! Sites are 0-based. Steps are 1-based: step `N` is the configuration reached
//! after `N − 1` advances from the declared start.
//!
//! Simple geometries resolve to one site group; compound geometries
//! ([`Geometry::Bricklayer`], [`Geometry::AllSites`]) resolve to a list of
//! independent groups, each of which is treated as its own element by the
//! engine (including one random draw per element for stochastic operations).
//!
//! ```rust
//! use quench_circuit::geometry::{resolve, Boundary, Geometry, Parity, SiteGroups};
//!
//! // A right-moving staircase on 4 periodic sites wraps after 4 steps.
//! let g = Geometry::StaircaseRight(2);
//! assert_eq!(resolve(&g, 1, 4, Boundary::Periodic).unwrap(), SiteGroups::Single(vec![2, 3]));
//! assert_eq!(resolve(&g, 2, 4, Boundary::Periodic).unwrap(), SiteGroups::Single(vec![3, 0]));
//!
//! let layer = resolve(&Geometry::Bricklayer(Parity::Even), 1, 4, Boundary::Periodic).unwrap();
//! assert_eq!(layer, SiteGroups::Compound(vec![vec![1, 2], vec![3, 0]]));
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Boundary condition of the lattice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Boundary {
    /// Sites `0` and `L − 1` are not neighbours.
    #[default]
    Open,
    /// Site `L − 1` neighbours site `0`.
    Periodic,
}

impl fmt::Display for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Boundary::Open => write!(f, "open"),
            Boundary::Periodic => write!(f, "periodic"),
        }
    }
}

/// Which bricklayer sublattice a layer covers.
///
/// Named after the 1-based position of the left site of each pair, as is
/// customary for brickwork circuits: the odd layer pairs sites (1,2), (3,4), …
/// which are the 0-based pairs starting at 0, 2, ….
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Parity {
    /// Pairs starting at 0-based sites 0, 2, 4, ….
    Odd,
    /// Pairs starting at 0-based sites 1, 3, 5, ….
    Even,
}

impl Parity {
    fn first_site(self) -> usize {
        match self {
            Parity::Odd => 0,
            Parity::Even => 1,
        }
    }
}

/// Where a gate is applied.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum Geometry {
    /// A fixed site.
    SingleSite(usize),
    /// The pair `(i, i + 1)`; wraps to `(L − 1, 0)` on a periodic lattice.
    AdjacentPair(usize),
    /// A nearest-neighbour pair whose left site moves one site right per step.
    StaircaseRight(usize),
    /// A nearest-neighbour pair whose left site moves one site left per step.
    StaircaseLeft(usize),
    /// One brickwork layer of disjoint nearest-neighbour pairs (compound).
    Bricklayer(Parity),
    /// Every site individually (compound).
    AllSites,
}

impl Geometry {
    /// True if this geometry resolves to several independent elements.
    pub fn is_compound(&self) -> bool {
        matches!(self, Geometry::Bricklayer(_) | Geometry::AllSites)
    }
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Geometry::SingleSite(i) => write!(f, "site({i})"),
            Geometry::AdjacentPair(i) => write!(f, "pair({i})"),
            Geometry::StaircaseRight(s) => write!(f, "staircase_right({s})"),
            Geometry::StaircaseLeft(s) => write!(f, "staircase_left({s})"),
            Geometry::Bricklayer(Parity::Odd) => write!(f, "bricklayer(odd)"),
            Geometry::Bricklayer(Parity::Even) => write!(f, "bricklayer(even)"),
            Geometry::AllSites => write!(f, "all_sites"),
        }
    }
}

/// Sites produced by resolving a geometry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SiteGroups {
    /// One site group.
    Single(Vec<usize>),
    /// Several independent site groups, in element order.
    Compound(Vec<Vec<usize>>),
}

impl SiteGroups {
    /// Flatten into a list of groups (a single group becomes a list of one).
    pub fn into_groups(self) -> Vec<Vec<usize>> {
        match self {
            SiteGroups::Single(group) => vec![group],
            SiteGroups::Compound(groups) => groups,
        }
    }
}

/// Errors raised while resolving a geometry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum GeometryError {
    /// Steps are 1-based.
    #[error("step must be at least 1, got {0}")]
    InvalidStep(usize),

    /// A lattice needs at least two sites.
    #[error("lattice size must be at least 2, got {0}")]
    LatticeTooSmall(usize),

    /// A site or pointer start lies outside the lattice.
    #[error("{geometry}: site {site} is outside the lattice of {lattice_size} sites")]
    SiteOutOfRange {
        /// The geometry being resolved.
        geometry: Geometry,
        /// The offending site.
        site: usize,
        /// Lattice size.
        lattice_size: usize,
    },

    /// A pair would need a site beyond the lattice edge.
    #[error("{geometry}: pair starting at site {site} crosses the edge of an open lattice of {lattice_size} sites")]
    InvalidPairing {
        /// The geometry being resolved.
        geometry: Geometry,
        /// Left site of the pair.
        site: usize,
        /// Lattice size.
        lattice_size: usize,
    },

    /// Periodic bricklayer layers overlap at the seam on odd lattices.
    #[error("{geometry}: periodic bricklayer needs an even lattice size, got {lattice_size}")]
    OddPeriodicBricklayer {
        /// The geometry being resolved.
        geometry: Geometry,
        /// Lattice size.
        lattice_size: usize,
    },

    /// The gate acts on a different number of sites than the geometry provides.
    #[error("gate '{gate}' acts on {expected} site(s) but {geometry} provides {got}")]
    ArityMismatch {
        /// Gate label.
        gate: String,
        /// The geometry being resolved.
        geometry: Geometry,
        /// Sites the gate needs.
        expected: usize,
        /// Sites the geometry provides.
        got: usize,
    },
}

/// Resolve `geometry` at `step` on a lattice of `lattice_size` sites.
pub fn resolve(
    geometry: &Geometry,
    step: usize,
    lattice_size: usize,
    boundary: Boundary,
) -> Result<SiteGroups, GeometryError> {
    if step < 1 {
        return Err(GeometryError::InvalidStep(step));
    }
    if lattice_size < 2 {
        return Err(GeometryError::LatticeTooSmall(lattice_size));
    }

    match geometry {
        Geometry::SingleSite(site) => {
            check_site(geometry, *site, lattice_size)?;
            Ok(SiteGroups::Single(vec![*site]))
        }
        Geometry::AdjacentPair(site) => {
            check_site(geometry, *site, lattice_size)?;
            adjacent_pair(geometry, *site, lattice_size, boundary).map(SiteGroups::Single)
        }
        Geometry::StaircaseRight(start) | Geometry::StaircaseLeft(start) => {
            let period = pointer_period(lattice_size, boundary);
            if *start >= period {
                return Err(match boundary {
                    Boundary::Open if *start < lattice_size => GeometryError::InvalidPairing {
                        geometry: geometry.clone(),
                        site: *start,
                        lattice_size,
                    },
                    _ => GeometryError::SiteOutOfRange {
                        geometry: geometry.clone(),
                        site: *start,
                        lattice_size,
                    },
                });
            }
            let advances = (step - 1) % period;
            let position = match geometry {
                Geometry::StaircaseRight(_) => (start + advances) % period,
                _ => (start + period - advances) % period,
            };
            adjacent_pair(geometry, position, lattice_size, boundary).map(SiteGroups::Single)
        }
        Geometry::Bricklayer(parity) => {
            if boundary == Boundary::Periodic && lattice_size % 2 != 0 {
                return Err(GeometryError::OddPeriodicBricklayer {
                    geometry: geometry.clone(),
                    lattice_size,
                });
            }
            let pairs = (parity.first_site()..pointer_period(lattice_size, boundary))
                .step_by(2)
                .map(|site| adjacent_pair(geometry, site, lattice_size, boundary))
                .collect::<Result<_, _>>()?;
            Ok(SiteGroups::Compound(pairs))
        }
        Geometry::AllSites => Ok(SiteGroups::Compound(
            (0..lattice_size).map(|site| vec![site]).collect(),
        )),
    }
}

/// Number of distinct positions a moving pointer cycles through.
///
/// On an open lattice the last site cannot start a pair, so the pointer wraps
/// after `L − 1` positions.
pub fn pointer_period(lattice_size: usize, boundary: Boundary) -> usize {
    match boundary {
        Boundary::Open => lattice_size - 1,
        Boundary::Periodic => lattice_size,
    }
}

/// Check that a resolved group matches the arity a gate needs.
pub fn check_arity(
    gate: &str,
    geometry: &Geometry,
    expected: usize,
    group: &[usize],
) -> Result<(), GeometryError> {
    if group.len() != expected {
        return Err(GeometryError::ArityMismatch {
            gate: gate.to_string(),
            geometry: geometry.clone(),
            expected,
            got: group.len(),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn check_site(geometry: &Geometry, site: usize, lattice_size: usize) -> Result<(), GeometryError> {
    if site >= lattice_size {
        return Err(GeometryError::SiteOutOfRange {
            geometry: geometry.clone(),
            site,
            lattice_size,
        });
    }
    Ok(())
}

fn adjacent_pair(
    geometry: &Geometry,
    site: usize,
    lattice_size: usize,
    boundary: Boundary,
) -> Result<Vec<usize>, GeometryError> {
    if site + 1 < lattice_size {
        return Ok(vec![site, site + 1]);
    }
    match boundary {
        Boundary::Periodic if site + 1 == lattice_size => Ok(vec![site, 0]),
        _ => Err(GeometryError::InvalidPairing {
            geometry: geometry.clone(),
            site,
            lattice_size,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(g: &Geometry, step: usize, l: usize, b: Boundary) -> Vec<usize> {
        match resolve(g, step, l, b).unwrap() {
            SiteGroups::Single(group) => group,
            SiteGroups::Compound(_) => panic!("expected a single group"),
        }
    }

    #[test]
    fn test_single_site() {
        assert_eq!(single(&Geometry::SingleSite(3), 7, 4, Boundary::Open), vec![3]);
        assert!(matches!(
            resolve(&Geometry::SingleSite(4), 1, 4, Boundary::Open),
            Err(GeometryError::SiteOutOfRange { site: 4, .. })
        ));
    }

    #[test]
    fn test_adjacent_pair_wraps_only_when_periodic() {
        assert_eq!(single(&Geometry::AdjacentPair(1), 1, 4, Boundary::Open), vec![1, 2]);
        assert_eq!(single(&Geometry::AdjacentPair(3), 1, 4, Boundary::Periodic), vec![3, 0]);
        assert!(matches!(
            resolve(&Geometry::AdjacentPair(3), 1, 4, Boundary::Open),
            Err(GeometryError::InvalidPairing { site: 3, .. })
        ));
    }

    #[test]
    fn test_staircase_right_matches_stateful_pointer() {
        // Replay a mutable pointer and compare every step against the pure form.
        for boundary in [Boundary::Open, Boundary::Periodic] {
            let l = 5;
            let period = pointer_period(l, boundary);
            for start in 0..period {
                let mut pointer = start;
                for step in 1..=3 * l {
                    let expected = vec![pointer, (pointer + 1) % l];
                    assert_eq!(
                        single(&Geometry::StaircaseRight(start), step, l, boundary),
                        expected
                    );
                    pointer = (pointer + 1) % period;
                }
            }
        }
    }

    #[test]
    fn test_staircase_left_matches_stateful_pointer() {
        for boundary in [Boundary::Open, Boundary::Periodic] {
            let l = 6;
            let period = pointer_period(l, boundary);
            for start in 0..period {
                let mut pointer = start;
                for step in 1..=2 * l {
                    let expected = vec![pointer, (pointer + 1) % l];
                    assert_eq!(
                        single(&Geometry::StaircaseLeft(start), step, l, boundary),
                        expected
                    );
                    pointer = (pointer + period - 1) % period;
                }
            }
        }
    }

    #[test]
    fn test_staircase_start_out_of_range() {
        assert!(matches!(
            resolve(&Geometry::StaircaseRight(3), 1, 4, Boundary::Open),
            Err(GeometryError::InvalidPairing { site: 3, .. })
        ));
        assert!(matches!(
            resolve(&Geometry::StaircaseLeft(9), 1, 4, Boundary::Periodic),
            Err(GeometryError::SiteOutOfRange { site: 9, .. })
        ));
    }

    #[test]
    fn test_bricklayer_open() {
        let odd = resolve(&Geometry::Bricklayer(Parity::Odd), 1, 5, Boundary::Open).unwrap();
        assert_eq!(odd, SiteGroups::Compound(vec![vec![0, 1], vec![2, 3]]));
        let even = resolve(&Geometry::Bricklayer(Parity::Even), 1, 5, Boundary::Open).unwrap();
        assert_eq!(even, SiteGroups::Compound(vec![vec![1, 2], vec![3, 4]]));
    }

    #[test]
    fn test_bricklayer_open_stops_before_last_site() {
        let even = resolve(&Geometry::Bricklayer(Parity::Even), 1, 4, Boundary::Open).unwrap();
        assert_eq!(even, SiteGroups::Compound(vec![vec![1, 2]]));
        let odd = resolve(&Geometry::Bricklayer(Parity::Odd), 1, 4, Boundary::Open).unwrap();
        assert_eq!(odd, SiteGroups::Compound(vec![vec![0, 1], vec![2, 3]]));
        let empty = resolve(&Geometry::Bricklayer(Parity::Even), 1, 2, Boundary::Open).unwrap();
        assert_eq!(empty, SiteGroups::Compound(vec![]));
    }

    #[test]
    fn test_bricklayer_periodic_requires_even_size() {
        assert!(matches!(
            resolve(&Geometry::Bricklayer(Parity::Odd), 1, 5, Boundary::Periodic),
            Err(GeometryError::OddPeriodicBricklayer { lattice_size: 5, .. })
        ));
        let even = resolve(&Geometry::Bricklayer(Parity::Even), 1, 6, Boundary::Periodic).unwrap();
        assert_eq!(
            even,
            SiteGroups::Compound(vec![vec![1, 2], vec![3, 4], vec![5, 0]])
        );
    }

    #[test]
    fn test_all_sites() {
        let groups = resolve(&Geometry::AllSites, 1, 3, Boundary::Open).unwrap();
        assert_eq!(groups.into_groups(), vec![vec![0], vec![1], vec![2]]);
    }

    #[test]
    fn test_invalid_step_and_lattice() {
        assert_eq!(
            resolve(&Geometry::SingleSite(0), 0, 4, Boundary::Open),
            Err(GeometryError::InvalidStep(0))
        );
        assert_eq!(
            resolve(&Geometry::SingleSite(0), 1, 1, Boundary::Open),
            Err(GeometryError::LatticeTooSmall(1))
        );
    }

    #[test]
    fn test_check_arity() {
        assert!(check_arity("cx", &Geometry::AdjacentPair(0), 2, &[0, 1]).is_ok());
        assert!(matches!(
            check_arity("cx", &Geometry::SingleSite(0), 2, &[0]),
            Err(GeometryError::ArityMismatch { expected: 2, got: 1, .. })
        ));
    }
}
