//! Observables and their recorded series.

use std::fmt;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{SvError, SvResult};
use crate::statevector::Statevector;

/// A scalar quantity evaluated on the statevector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum Observable {
    /// ⟨Z⟩ on one site.
    Magnetization {
        /// Site to evaluate.
        site: usize,
    },
    /// ⟨Z⟩ averaged over all sites.
    MeanMagnetization,
    /// Probability that `site` reads `outcome`.
    BornProbability {
        /// Site to evaluate.
        site: usize,
        /// `false` for |0⟩, `true` for |1⟩.
        outcome: bool,
    },
    /// Second Rényi entropy of sites `0..cut`.
    Renyi2Entropy {
        /// Number of sites on the left of the cut.
        cut: usize,
    },
}

impl Observable {
    /// Check that the observable fits a lattice of `lattice_size` sites.
    pub fn validate(&self, lattice_size: usize) -> SvResult<()> {
        match *self {
            Observable::Magnetization { site } | Observable::BornProbability { site, .. }
                if site >= lattice_size =>
            {
                Err(SvError::SiteOutOfRange { site, lattice_size })
            }
            Observable::Renyi2Entropy { cut } if cut > lattice_size => {
                Err(SvError::InvalidCut { cut, lattice_size })
            }
            _ => Ok(()),
        }
    }

    pub(crate) fn evaluate(&self, sv: &Statevector) -> f64 {
        match *self {
            Observable::Magnetization { site } => sv.expectation_z(site),
            Observable::MeanMagnetization => {
                let n = sv.num_sites();
                if n == 0 {
                    return 0.0;
                }
                (0..n).map(|site| sv.expectation_z(site)).sum::<f64>() / n as f64
            }
            Observable::BornProbability { site, outcome } => sv.probability(site, outcome),
            Observable::Renyi2Entropy { cut } => sv.renyi2(cut),
        }
    }
}

impl fmt::Display for Observable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Observable::Magnetization { site } => write!(f, "Z[{site}]"),
            Observable::MeanMagnetization => write!(f, "mean Z"),
            Observable::BornProbability { site, outcome } => {
                write!(f, "P[{site}={}]", u8::from(*outcome))
            }
            Observable::Renyi2Entropy { cut } => write!(f, "S2[0..{cut}]"),
        }
    }
}

#[derive(Debug, Clone)]
struct Tracked {
    name: String,
    observable: Observable,
    series: Vec<f64>,
}

/// Named observables, each with the series of values recorded so far.
///
/// Series are appended in registration order on every [`record`](Self::record).
#[derive(Debug, Clone, Default)]
pub struct ObservableRegistry {
    index: FxHashMap<String, usize>,
    tracked: Vec<Tracked>,
}

impl ObservableRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking `observable` under `name`.
    pub fn track(&mut self, name: impl Into<String>, observable: Observable) -> SvResult<()> {
        let name = name.into();
        if self.index.contains_key(&name) {
            return Err(SvError::DuplicateObservable(name));
        }
        self.index.insert(name.clone(), self.tracked.len());
        self.tracked.push(Tracked {
            name,
            observable,
            series: Vec::new(),
        });
        Ok(())
    }

    /// Evaluate every tracked observable on `sv` and append the values.
    pub fn record(&mut self, sv: &Statevector) {
        for tracked in &mut self.tracked {
            tracked.series.push(tracked.observable.evaluate(sv));
        }
    }

    /// Values recorded for `name`, oldest first.
    pub fn series(&self, name: &str) -> Option<&[f64]> {
        self.index
            .get(name)
            .map(|&i| self.tracked[i].series.as_slice())
    }

    /// The observable registered under `name`.
    pub fn observable(&self, name: &str) -> Option<Observable> {
        self.index.get(name).map(|&i| self.tracked[i].observable)
    }

    /// Tracked names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tracked.iter().map(|t| t.name.as_str())
    }

    /// Number of tracked observables.
    pub fn len(&self) -> usize {
        self.tracked.len()
    }

    /// Whether nothing is tracked.
    pub fn is_empty(&self) -> bool {
        self.tracked.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_and_record() {
        let mut registry = ObservableRegistry::new();
        registry.track("z0", Observable::Magnetization { site: 0 }).unwrap();
        registry.track("mz", Observable::MeanMagnetization).unwrap();

        let mut sv = Statevector::new(2);
        registry.record(&sv);
        sv.apply_x(0);
        registry.record(&sv);

        assert_eq!(registry.series("z0").unwrap(), &[1.0, -1.0]);
        assert_eq!(registry.series("mz").unwrap(), &[1.0, 0.0]);
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["z0", "mz"]);
        assert!(registry.series("missing").is_none());
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut registry = ObservableRegistry::new();
        registry.track("s", Observable::Renyi2Entropy { cut: 1 }).unwrap();
        assert!(matches!(
            registry.track("s", Observable::MeanMagnetization),
            Err(SvError::DuplicateObservable(name)) if name == "s"
        ));
        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.observable("s"),
            Some(Observable::Renyi2Entropy { cut: 1 })
        );
    }

    #[test]
    fn test_validate() {
        assert!(Observable::Magnetization { site: 3 }.validate(4).is_ok());
        assert!(matches!(
            Observable::BornProbability { site: 4, outcome: true }.validate(4),
            Err(SvError::SiteOutOfRange { site: 4, lattice_size: 4 })
        ));
        assert!(Observable::Renyi2Entropy { cut: 4 }.validate(4).is_ok());
        assert!(matches!(
            Observable::Renyi2Entropy { cut: 5 }.validate(4),
            Err(SvError::InvalidCut { cut: 5, .. })
        ));
    }

    #[test]
    fn test_display() {
        assert_eq!(Observable::Magnetization { site: 2 }.to_string(), "Z[2]");
        assert_eq!(
            Observable::BornProbability { site: 1, outcome: false }.to_string(),
            "P[1=0]"
        );
    }
}
