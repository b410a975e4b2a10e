//! Square Ising lattice with periodic boundaries.

use crate::error::{IsingError, Result};
use crate::neighbors::neighbor_sum;
use crate::thermo::{critical_temperature, inverse_temperature};
use rand::Rng;
use tracing::debug;

/// A binary spin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i8)]
pub enum Spin {
    Down = -1,
    Up = 1,
}

impl Spin {
    /// `+1` or `-1`.
    #[inline(always)]
    pub fn value(self) -> i32 {
        self as i8 as i32
    }

    #[inline(always)]
    pub fn flipped(self) -> Self {
        match self {
            Spin::Up => Spin::Down,
            Spin::Down => Spin::Up,
        }
    }
}

impl TryFrom<i8> for Spin {
    type Error = IsingError;

    fn try_from(value: i8) -> Result<Self> {
        match value {
            1 => Ok(Spin::Up),
            -1 => Ok(Spin::Down),
            other => Err(IsingError::InvalidConfiguration(format!(
                "spin must be +1 or -1, got {other}"
            ))),
        }
    }
}

/// One lattice site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Site {
    pub spin: Spin,
    /// Local order parameter `spin × neighbor_sum`.
    pub state: i32,
}

impl Site {
    /// Fresh site; `state` is filled in by the next property recomputation.
    pub fn new(spin: Spin) -> Self {
        Self { spin, state: 0 }
    }
}

/// Physical constants of a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatticeConfig {
    /// Boltzmann constant stand-in.
    pub k: f64,
    /// Coupling constant.
    pub j: f64,
    /// Temperature.
    pub t: f64,
}

impl Default for LatticeConfig {
    fn default() -> Self {
        Self { k: 1.0, j: 1.0, t: 0.01 }
    }
}

impl LatticeConfig {
    pub fn with_k(mut self, k: f64) -> Self {
        self.k = k;
        self
    }

    pub fn with_j(mut self, j: f64) -> Self {
        self.j = j;
        self
    }

    pub fn with_temperature(mut self, t: f64) -> Self {
        self.t = t;
        self
    }

    /// Reject constants that would make the thermodynamics meaningless.
    /// `T = 0` is allowed and freezes all energy-raising moves.
    pub fn validate(&self) -> Result<()> {
        if !(self.k.is_finite() && self.k > 0.0) {
            return Err(IsingError::InvalidConfiguration(format!(
                "k must be finite and > 0, got {}",
                self.k
            )));
        }
        if !self.j.is_finite() {
            return Err(IsingError::InvalidConfiguration(format!(
                "J must be finite, got {}",
                self.j
            )));
        }
        validate_temperature(self.t)
    }
}

fn validate_temperature(t: f64) -> Result<()> {
    if t.is_nan() || t < 0.0 {
        return Err(IsingError::InvalidConfiguration(format!(
            "T must be >= 0, got {t}"
        )));
    }
    Ok(())
}

/// `size × size` grid of spins on a torus, plus its aggregate observables.
///
/// Sites are stored row-major. `hamiltonian` and `magnetisation` are only
/// ever assigned by [`Lattice::recompute_system_properties`].
#[derive(Debug, Clone)]
pub struct Lattice {
    size: usize,
    sites: Vec<Site>,
    config: LatticeConfig,
    hamiltonian: f64,
    magnetisation: f64,
    tc: f64,
    beta: f64,
}

impl Lattice {
    /// Build a lattice with i.i.d. uniform spins drawn from `rng` in row-major order.
    pub fn new(size: usize, config: LatticeConfig, rng: &mut impl Rng) -> Result<Self> {
        Self::check_size(size)?;
        config.validate()?;

        let sites = (0..size * size)
            .map(|_| Site::new(if rng.gen_bool(0.5) { Spin::Up } else { Spin::Down }))
            .collect();

        let lattice = Self::assemble(size, sites, config);
        debug!(
            size,
            k = config.k,
            j = config.j,
            t = config.t,
            hamiltonian = lattice.hamiltonian,
            magnetisation = lattice.magnetisation,
            "built random lattice"
        );
        Ok(lattice)
    }

    /// Build a lattice from an explicit square grid of `±1` values.
    pub fn from_spins(grid: &[Vec<i8>], config: LatticeConfig) -> Result<Self> {
        let size = grid.len();
        Self::check_size(size)?;
        config.validate()?;

        let mut sites = Vec::with_capacity(size * size);
        for (row_idx, row) in grid.iter().enumerate() {
            if row.len() != size {
                return Err(IsingError::InvalidConfiguration(format!(
                    "grid must be square: row {row_idx} has {} entries, expected {size}",
                    row.len()
                )));
            }
            for &value in row {
                sites.push(Site::new(Spin::try_from(value)?));
            }
        }

        Ok(Self::assemble(size, sites, config))
    }

    fn check_size(size: usize) -> Result<()> {
        if size == 0 {
            return Err(IsingError::InvalidConfiguration(
                "lattice size must be a positive integer".into(),
            ));
        }
        Ok(())
    }

    fn assemble(size: usize, sites: Vec<Site>, config: LatticeConfig) -> Self {
        let mut lattice = Self {
            size,
            sites,
            config,
            hamiltonian: 0.0,
            magnetisation: 0.0,
            tc: 0.0,
            beta: 0.0,
        };
        lattice.refresh_thermodynamics();
        lattice.recompute_system_properties();
        lattice
    }

    /// Single pass over all sites: refresh each `state`, then set
    /// `hamiltonian = -J Σ(σᵢ Σσⱼ)/2` (each bond once) and `magnetisation = Σσ / N²`.
    pub fn recompute_system_properties(&mut self) {
        let size = self.size;
        let mut bond_total: i64 = 0;
        let mut spin_total: i64 = 0;

        for row in 0..size {
            for col in 0..size {
                let sum = neighbor_sum(&self.sites, size, row, col);
                let site = &mut self.sites[row * size + col];
                site.state = site.spin.value() * sum;
                bond_total += site.state as i64;
                spin_total += site.spin.value() as i64;
            }
        }

        self.hamiltonian = -self.config.j * bond_total as f64 / 2.0;
        self.magnetisation = spin_total as f64 / (size * size) as f64;
    }

    /// Recompute `Tc` and `β` from the current constants.
    pub fn refresh_thermodynamics(&mut self) {
        self.tc = critical_temperature(self.config.k, self.config.j);
        self.beta = inverse_temperature(self.config.k, self.config.t);
    }

    /// Change the temperature between sweeps (annealing). `T = 0` is allowed.
    pub fn set_temperature(&mut self, t: f64) -> Result<()> {
        validate_temperature(t)?;
        self.config.t = t;
        self.refresh_thermodynamics();
        Ok(())
    }

    /// Overwrite one spin. Aggregates stay stale until the next recomputation.
    pub fn set_spin(&mut self, row: usize, col: usize, spin: Spin) {
        let idx = self.index(row, col);
        self.sites[idx].spin = spin;
    }

    #[inline(always)]
    fn index(&self, row: usize, col: usize) -> usize {
        assert!(row < self.size && col < self.size, "site ({row}, {col}) out of range");
        row * self.size + col
    }

    /// Periodic neighbor sum of `(row, col)`.
    #[inline]
    pub fn neighbor_sum(&self, row: usize, col: usize) -> i32 {
        neighbor_sum(&self.sites, self.size, row, col)
    }

    /// Mutable access for the sampler's in-place updates.
    pub(crate) fn site_mut(&mut self, row: usize, col: usize) -> &mut Site {
        let idx = self.index(row, col);
        &mut self.sites[idx]
    }

    #[inline(always)]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of sites, `size²`.
    #[inline(always)]
    pub fn n_sites(&self) -> usize {
        self.sites.len()
    }

    /// Row-major read-only view of the grid.
    pub fn spins(&self) -> &[Site] {
        &self.sites
    }

    pub fn site(&self, row: usize, col: usize) -> &Site {
        &self.sites[self.index(row, col)]
    }

    /// Spin values as nested rows, for display collaborators.
    pub fn spin_grid(&self) -> Vec<Vec<i8>> {
        self.sites
            .chunks(self.size)
            .map(|row| row.iter().map(|s| s.spin as i8).collect())
            .collect()
    }

    pub fn hamiltonian(&self) -> f64 {
        self.hamiltonian
    }

    pub fn magnetisation(&self) -> f64 {
        self.magnetisation
    }

    pub fn energy_per_site(&self) -> f64 {
        self.hamiltonian / self.n_sites() as f64
    }

    pub fn abs_magnetisation(&self) -> f64 {
        self.magnetisation.abs()
    }

    pub fn config(&self) -> LatticeConfig {
        self.config
    }

    pub fn k(&self) -> f64 {
        self.config.k
    }

    pub fn j(&self) -> f64 {
        self.config.j
    }

    pub fn temperature(&self) -> f64 {
        self.config.t
    }

    /// Critical temperature as of the last refresh.
    pub fn critical_temperature(&self) -> f64 {
        self.tc
    }

    /// Inverse temperature as of the last refresh.
    pub fn beta(&self) -> f64 {
        self.beta
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn test_zero_size_rejected() {
        let mut rng = ChaCha20Rng::seed_from_u64(0);
        let err = Lattice::new(0, LatticeConfig::default(), &mut rng).unwrap_err();
        assert!(matches!(err, IsingError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_bad_constants_rejected() {
        let mut rng = ChaCha20Rng::seed_from_u64(0);
        for cfg in [
            LatticeConfig::default().with_temperature(-0.5),
            LatticeConfig::default().with_temperature(f64::NAN),
            LatticeConfig::default().with_k(0.0),
            LatticeConfig::default().with_k(-1.0),
            LatticeConfig::default().with_j(f64::INFINITY),
        ] {
            assert!(Lattice::new(4, cfg, &mut rng).is_err(), "{cfg:?} accepted");
        }
    }

    #[test]
    fn test_zero_temperature_is_valid() {
        let mut rng = ChaCha20Rng::seed_from_u64(0);
        let lattice = Lattice::new(4, LatticeConfig::default().with_temperature(0.0), &mut rng)
            .unwrap();
        assert!(lattice.beta().is_infinite());
    }

    #[test]
    fn test_defaults_and_derived_constants() {
        let mut rng = ChaCha20Rng::seed_from_u64(5);
        let lattice = Lattice::new(6, LatticeConfig::default(), &mut rng).unwrap();
        assert_eq!(lattice.size(), 6);
        assert_eq!(lattice.n_sites(), 36);
        assert_eq!(lattice.k(), 1.0);
        assert_eq!(lattice.j(), 1.0);
        assert_eq!(lattice.temperature(), 0.01);
        assert_relative_eq!(lattice.beta(), 100.0, epsilon = 1e-9);
        assert_relative_eq!(lattice.critical_temperature(), 2.269185314213022, epsilon = 1e-12);
    }

    #[test]
    fn test_from_spins_rejects_malformed_grids() {
        let cfg = LatticeConfig::default();
        assert!(Lattice::from_spins(&[], cfg).is_err());
        assert!(Lattice::from_spins(&[vec![1, 1], vec![1]], cfg).is_err());
        assert!(Lattice::from_spins(&[vec![1, 0], vec![1, 1]], cfg).is_err());
    }

    #[test]
    fn test_set_spin_leaves_aggregates_stale() {
        let mut lattice =
            Lattice::from_spins(&[vec![1, 1], vec![1, 1]], LatticeConfig::default()).unwrap();
        let before = lattice.hamiltonian();
        lattice.set_spin(0, 0, Spin::Down);
        assert_eq!(lattice.hamiltonian(), before);
        lattice.recompute_system_properties();
        assert_ne!(lattice.hamiltonian(), before);
        assert_eq!(lattice.magnetisation(), 0.5);
    }

    #[test]
    fn test_set_temperature_refreshes_beta() {
        let mut lattice = Lattice::from_spins(&[vec![1]], LatticeConfig::default()).unwrap();
        lattice.set_temperature(2.0).unwrap();
        assert_relative_eq!(lattice.beta(), 0.5);
        assert!(lattice.set_temperature(-1.0).is_err());
        assert_eq!(lattice.temperature(), 2.0);
    }

    #[test]
    fn test_spin_grid_round_trips() {
        let grid = vec![vec![1, -1, 1], vec![-1, -1, 1], vec![1, 1, -1]];
        let lattice = Lattice::from_spins(&grid, LatticeConfig::default()).unwrap();
        assert_eq!(lattice.spin_grid(), grid);
    }

    #[test]
    fn test_single_site_lattice() {
        let lattice = Lattice::from_spins(&[vec![-1]], LatticeConfig::default()).unwrap();
        assert_eq!(lattice.neighbor_sum(0, 0), -4);
        assert_eq!(lattice.site(0, 0).state, 4);
        assert_eq!(lattice.hamiltonian(), -2.0);
        assert_eq!(lattice.magnetisation(), -1.0);
    }
}
