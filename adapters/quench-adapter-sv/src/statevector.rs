//! Dense statevector engine.
//!
//! Site `k` is bit `k` of the basis-state index.

use num_complex::Complex64;

/// Amplitudes of an `n`-site qubit register.
#[derive(Debug, Clone, PartialEq)]
pub struct Statevector {
    amplitudes: Vec<Complex64>,
    num_sites: usize,
}

impl Statevector {
    /// Create a statevector initialized to |0...0⟩.
    ///
    /// `num_sites` must already be within [`MAX_SITES`](crate::MAX_SITES).
    pub(crate) fn new(num_sites: usize) -> Self {
        let size = 1 << num_sites;
        let mut amplitudes = vec![Complex64::new(0.0, 0.0); size];
        amplitudes[0] = Complex64::new(1.0, 0.0);
        Self {
            amplitudes,
            num_sites,
        }
    }

    /// Number of sites in the register.
    pub fn num_sites(&self) -> usize {
        self.num_sites
    }

    /// Amplitudes indexed by basis state, site `k` on bit `k`.
    pub fn amplitudes(&self) -> &[Complex64] {
        &self.amplitudes
    }

    fn dim(&self) -> usize {
        1 << self.num_sites
    }

    // =========================================================================
    // Single-site gates
    // =========================================================================

    /// Pauli X on `site`.
    pub(crate) fn apply_x(&mut self, site: usize) {
        let mask = 1 << site;
        for i in 0..self.dim() {
            if i & mask == 0 {
                self.amplitudes.swap(i, i | mask);
            }
        }
    }

    /// Pauli Y on `site`.
    pub(crate) fn apply_y(&mut self, site: usize) {
        let mask = 1 << site;
        let i_val = Complex64::new(0.0, 1.0);
        for i in 0..self.dim() {
            if i & mask == 0 {
                let j = i | mask;
                let tmp = self.amplitudes[i];
                self.amplitudes[i] = -i_val * self.amplitudes[j];
                self.amplitudes[j] = i_val * tmp;
            }
        }
    }

    /// Pauli Z on `site`.
    pub(crate) fn apply_z(&mut self, site: usize) {
        let mask = 1 << site;
        for (i, amp) in self.amplitudes.iter_mut().enumerate() {
            if i & mask != 0 {
                *amp = -*amp;
            }
        }
    }

    /// Hadamard on `site`.
    pub(crate) fn apply_h(&mut self, site: usize) {
        let mask = 1 << site;
        let sqrt2_inv = std::f64::consts::FRAC_1_SQRT_2;
        for i in 0..self.dim() {
            if i & mask == 0 {
                let j = i | mask;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = sqrt2_inv * (a + b);
                self.amplitudes[j] = sqrt2_inv * (a - b);
            }
        }
    }

    /// diag(1, e^{iθ}).
    pub(crate) fn apply_phase(&mut self, site: usize, theta: f64) {
        let mask = 1 << site;
        let phase = Complex64::from_polar(1.0, theta);
        for (i, amp) in self.amplitudes.iter_mut().enumerate() {
            if i & mask != 0 {
                *amp *= phase;
            }
        }
    }

    /// X rotation by `theta`.
    pub(crate) fn apply_rx(&mut self, site: usize, theta: f64) {
        let mask = 1 << site;
        let c = (theta / 2.0).cos();
        let neg_i_s = Complex64::new(0.0, -(theta / 2.0).sin());
        for i in 0..self.dim() {
            if i & mask == 0 {
                let j = i | mask;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = c * a + neg_i_s * b;
                self.amplitudes[j] = neg_i_s * a + c * b;
            }
        }
    }

    /// Y rotation by `theta`.
    pub(crate) fn apply_ry(&mut self, site: usize, theta: f64) {
        let mask = 1 << site;
        let c = (theta / 2.0).cos();
        let s = (theta / 2.0).sin();
        for i in 0..self.dim() {
            if i & mask == 0 {
                let j = i | mask;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = c * a - s * b;
                self.amplitudes[j] = s * a + c * b;
            }
        }
    }

    /// Z rotation by `theta`.
    pub(crate) fn apply_rz(&mut self, site: usize, theta: f64) {
        let mask = 1 << site;
        let phase_0 = Complex64::from_polar(1.0, -theta / 2.0);
        let phase_1 = Complex64::from_polar(1.0, theta / 2.0);
        for (i, amp) in self.amplitudes.iter_mut().enumerate() {
            *amp *= if i & mask == 0 { phase_0 } else { phase_1 };
        }
    }

    /// General single-site unitary U(θ, φ, λ).
    pub(crate) fn apply_u(&mut self, site: usize, theta: f64, phi: f64, lambda: f64) {
        let mask = 1 << site;
        let c = (theta / 2.0).cos();
        let s = (theta / 2.0).sin();
        let e_il = Complex64::from_polar(1.0, lambda);
        let e_ip = Complex64::from_polar(1.0, phi);
        let e_ipl = Complex64::from_polar(1.0, phi + lambda);

        for i in 0..self.dim() {
            if i & mask == 0 {
                let j = i | mask;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = c * a - e_il * s * b;
                self.amplitudes[j] = e_ip * s * a + e_ipl * c * b;
            }
        }
    }

    // =========================================================================
    // Two-site gates
    // =========================================================================

    /// Controlled X.
    pub(crate) fn apply_cx(&mut self, control: usize, target: usize) {
        let ctrl_mask = 1 << control;
        let tgt_mask = 1 << target;
        for i in 0..self.dim() {
            if (i & ctrl_mask != 0) && (i & tgt_mask == 0) {
                self.amplitudes.swap(i, i | tgt_mask);
            }
        }
    }

    /// Controlled Z.
    pub(crate) fn apply_cz(&mut self, a: usize, b: usize) {
        let mask = (1 << a) | (1 << b);
        for (i, amp) in self.amplitudes.iter_mut().enumerate() {
            if i & mask == mask {
                *amp = -*amp;
            }
        }
    }

    /// Exchange two sites.
    pub(crate) fn apply_swap(&mut self, a: usize, b: usize) {
        let mask_a = 1 << a;
        let mask_b = 1 << b;
        for i in 0..self.dim() {
            if (i & mask_a != 0) && (i & mask_b == 0) {
                self.amplitudes.swap(i, (i & !mask_a) | mask_b);
            }
        }
    }

    /// exp(−iθ/2 Z⊗Z).
    pub(crate) fn apply_rzz(&mut self, a: usize, b: usize, theta: f64) {
        let mask_a = 1 << a;
        let mask_b = 1 << b;
        let aligned = Complex64::from_polar(1.0, -theta / 2.0);
        let anti = Complex64::from_polar(1.0, theta / 2.0);
        for (i, amp) in self.amplitudes.iter_mut().enumerate() {
            let parity = (i & mask_a != 0) != (i & mask_b != 0);
            *amp *= if parity { anti } else { aligned };
        }
    }

    // =========================================================================
    // Projection and expectation values
    // =========================================================================

    /// Probability of finding `site` in `outcome`.
    pub(crate) fn probability(&self, site: usize, outcome: bool) -> f64 {
        let mask = 1 << site;
        self.amplitudes
            .iter()
            .enumerate()
            .filter(|(i, _)| (i & mask != 0) == outcome)
            .map(|(_, amp)| amp.norm_sqr())
            .sum()
    }

    /// Collapse `site` onto `outcome` and renormalize.
    ///
    /// `probability` must be the (non-zero) probability of that outcome.
    pub(crate) fn project(&mut self, site: usize, outcome: bool, probability: f64) {
        let mask = 1 << site;
        let scale = 1.0 / probability.sqrt();
        for (i, amp) in self.amplitudes.iter_mut().enumerate() {
            if (i & mask != 0) == outcome {
                *amp *= scale;
            } else {
                *amp = Complex64::new(0.0, 0.0);
            }
        }
    }

    /// ⟨Z⟩ on `site`.
    pub(crate) fn expectation_z(&self, site: usize) -> f64 {
        self.probability(site, false) - self.probability(site, true)
    }

    /// Second Rényi entropy of sites `0..cut`, in nats.
    ///
    /// `cut` must not exceed the number of sites.
    ///
    /// Uses the purity of whichever side of the cut is smaller, since both
    /// reduced states share it.
    pub(crate) fn renyi2(&self, cut: usize) -> f64 {
        let low_dim = 1 << cut;
        let high_dim = 1 << (self.num_sites - cut);
        let keep_low = low_dim <= high_dim;
        let (kept_dim, traced_dim) = if keep_low {
            (low_dim, high_dim)
        } else {
            (high_dim, low_dim)
        };
        let index = |kept: usize, traced: usize| {
            if keep_low {
                (traced << cut) | kept
            } else {
                (kept << cut) | traced
            }
        };

        let mut purity = 0.0;
        for r in 0..kept_dim {
            for c in 0..kept_dim {
                let rho: Complex64 = (0..traced_dim)
                    .map(|t| self.amplitudes[index(r, t)] * self.amplitudes[index(c, t)].conj())
                    .sum();
                purity += rho.norm_sqr();
            }
        }
        -purity.ln()
    }
}
