// observables.rs - Thermodynamic averages over a sampled time series

use crate::lattice::Lattice;

/// One measurement of the lattice aggregates.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Sample {
    pub energy_per_site: f64,
    pub magnetisation: f64,
}

impl Sample {
    pub fn from_lattice(lattice: &Lattice) -> Self {
        Self {
            energy_per_site: lattice.energy_per_site(),
            magnetisation: lattice.magnetisation(),
        }
    }
}

/// Summary of an accumulated run at fixed temperature.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Summary {
    pub samples: usize,
    pub mean_energy: f64,
    pub energy_error: f64,
    pub mean_abs_magnetisation: f64,
    pub specific_heat: f64,
    pub susceptibility: f64,
    pub binder_cumulant: f64,
    pub tau_int: f64,
}

/// Time series accumulator for energy and magnetisation fluctuations.
#[derive(Debug, Clone, Default)]
pub struct Accumulator {
    energies: Vec<f64>,
    sum_e: f64,
    sum_e2: f64,
    sum_abs_m: f64,
    sum_m2: f64,
    sum_m4: f64,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sample: Sample) {
        let e = sample.energy_per_site;
        let m = sample.magnetisation;
        self.energies.push(e);
        self.sum_e += e;
        self.sum_e2 += e * e;
        self.sum_abs_m += m.abs();
        self.sum_m2 += m * m;
        self.sum_m4 += m.powi(4);
    }

    pub fn len(&self) -> usize {
        self.energies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.energies.is_empty()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn mean_energy(&self) -> f64 {
        if self.is_empty() { 0.0 } else { self.sum_e / self.len() as f64 }
    }

    pub fn mean_abs_magnetisation(&self) -> f64 {
        if self.is_empty() { 0.0 } else { self.sum_abs_m / self.len() as f64 }
    }

    /// Population variance of the energy per site.
    pub fn energy_variance(&self) -> f64 {
        if self.len() < 2 { return 0.0; }
        let n = self.len() as f64;
        ((self.sum_e2 / n) - (self.sum_e / n).powi(2)).max(0.0)
    }

    /// Population variance of |m|.
    pub fn abs_magnetisation_variance(&self) -> f64 {
        if self.len() < 2 { return 0.0; }
        let n = self.len() as f64;
        ((self.sum_m2 / n) - (self.sum_abs_m / n).powi(2)).max(0.0)
    }

    /// `C = β² N_sites Var(e)` with `e` the energy per site.
    pub fn specific_heat(&self, beta: f64, n_sites: usize) -> f64 {
        finite_or_zero(beta * beta * n_sites as f64 * self.energy_variance())
    }

    /// `χ = β N_sites Var(|m|)`.
    pub fn susceptibility(&self, beta: f64, n_sites: usize) -> f64 {
        finite_or_zero(beta * n_sites as f64 * self.abs_magnetisation_variance())
    }

    /// `U₄ = 1 − ⟨m⁴⟩ / (3⟨m²⟩²)`.
    pub fn binder_cumulant(&self) -> f64 {
        if self.is_empty() { return 0.0; }
        let n = self.len() as f64;
        let m2 = self.sum_m2 / n;
        let m4 = self.sum_m4 / n;
        if m2 > 0.0 {
            1.0 - m4 / (3.0 * m2 * m2)
        } else {
            0.0
        }
    }

    /// Integrated autocorrelation time of the energy series, with the window
    /// cut at the first lag where the normalised correlation drops below 0.1.
    pub fn autocorrelation_time(&self) -> f64 {
        let data = &self.energies;
        let n = data.len();
        if n < 10 { return 0.5; }

        let mean = self.mean_energy();
        let c0 = data.iter().map(|&x| (x - mean).powi(2)).sum::<f64>() / n as f64;
        if c0 == 0.0 { return 0.5; }

        let mut tau = 0.5;
        for t in 1..(n / 4).max(2) {
            let mut ct = 0.0;
            for i in 0..n - t {
                ct += (data[i] - mean) * (data[i + t] - mean);
            }
            let rho = ct / ((n - t) as f64 * c0);
            if rho < 0.1 { break; }
            tau += rho;
        }
        tau
    }

    /// Standard error of the mean energy corrected for autocorrelation.
    pub fn energy_error(&self) -> f64 {
        let n = self.len();
        if n < 2 { return 0.0; }
        let n_eff = n as f64 / (2.0 * self.autocorrelation_time());
        let sample_var = self.energy_variance() * n as f64 / (n - 1) as f64;
        (sample_var / n_eff).sqrt()
    }

    pub fn summary(&self, beta: f64, n_sites: usize) -> Summary {
        Summary {
            samples: self.len(),
            mean_energy: self.mean_energy(),
            energy_error: self.energy_error(),
            mean_abs_magnetisation: self.mean_abs_magnetisation(),
            specific_heat: self.specific_heat(beta, n_sites),
            susceptibility: self.susceptibility(beta, n_sites),
            binder_cumulant: self.binder_cumulant(),
            tau_int: self.autocorrelation_time(),
        }
    }
}

// β = ∞ with zero variance would otherwise give NaN.
fn finite_or_zero(x: f64) -> f64 {
    if x.is_finite() { x } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample(e: f64, m: f64) -> Sample {
        Sample { energy_per_site: e, magnetisation: m }
    }

    #[test]
    fn test_empty_accumulator() {
        let acc = Accumulator::new();
        assert!(acc.is_empty());
        assert_eq!(acc.mean_energy(), 0.0);
        assert_eq!(acc.binder_cumulant(), 0.0);
        assert_eq!(acc.energy_error(), 0.0);
    }

    #[test]
    fn test_constant_series_has_no_fluctuations() {
        let mut acc = Accumulator::new();
        for _ in 0..50 {
            acc.push(sample(-2.0, 1.0));
        }
        assert_relative_eq!(acc.mean_energy(), -2.0);
        assert_relative_eq!(acc.mean_abs_magnetisation(), 1.0);
        assert_eq!(acc.specific_heat(1.0, 16), 0.0);
        assert_eq!(acc.susceptibility(f64::INFINITY, 16), 0.0);
        // two-state limit
        assert_relative_eq!(acc.binder_cumulant(), 2.0 / 3.0, epsilon = 1e-12);
        assert_eq!(acc.autocorrelation_time(), 0.5);
    }

    #[test]
    fn test_specific_heat_and_susceptibility() {
        let mut acc = Accumulator::new();
        acc.push(sample(-1.0, 0.5));
        acc.push(sample(-3.0, -0.5));
        acc.push(sample(-1.0, 1.0));
        acc.push(sample(-3.0, -1.0));

        // Var(e) = 1, Var(|m|) = 0.0625
        assert_relative_eq!(acc.energy_variance(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(acc.specific_heat(0.5, 16), 4.0, epsilon = 1e-12);
        assert_relative_eq!(acc.abs_magnetisation_variance(), 0.0625, epsilon = 1e-12);
        assert_relative_eq!(acc.susceptibility(2.0, 16), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_correlated_series_has_longer_tau() {
        let mut alternating = Accumulator::new();
        let mut blocky = Accumulator::new();
        for i in 0..400 {
            alternating.push(sample(if i % 2 == 0 { -1.0 } else { -2.0 }, 0.0));
            blocky.push(sample(if (i / 40) % 2 == 0 { -1.0 } else { -2.0 }, 0.0));
        }
        assert_eq!(alternating.autocorrelation_time(), 0.5);
        assert!(blocky.autocorrelation_time() > 5.0);
        assert!(blocky.energy_error() > alternating.energy_error());
    }

    #[test]
    fn test_clear_resets() {
        let mut acc = Accumulator::new();
        acc.push(sample(-1.0, 0.2));
        acc.clear();
        assert!(acc.is_empty());
        assert_eq!(acc.summary(1.0, 4).samples, 0);
    }
}
