//! Metropolis–Hastings single-spin-flip sweeps.

use crate::lattice::Lattice;
use crate::shuffle::random_permutation;
use crate::thermo::acceptance_probability;
use rand::Rng;
use tracing::{debug, trace};

/// Flip bookkeeping returned by [`MetropolisSampler::sweep`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepStats {
    pub attempted: u64,
    pub accepted: u64,
}

impl SweepStats {
    pub fn acceptance_rate(&self) -> f64 {
        if self.attempted == 0 {
            0.0
        } else {
            self.accepted as f64 / self.attempted as f64
        }
    }

    fn merge(&mut self, other: SweepStats) {
        self.attempted += other.attempted;
        self.accepted += other.accepted;
    }
}

/// Drives sweeps over a [`Lattice`] with an owned, seedable RNG.
///
/// Each iteration visits every site once in a random order (shuffled rows,
/// then an independently shuffled column order per row). Accepted flips are
/// written back immediately, so sites visited later in the same sweep see
/// the updated neighbors.
#[derive(Debug, Clone)]
pub struct MetropolisSampler<R: Rng> {
    rng: R,
}

impl<R: Rng> MetropolisSampler<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    pub fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }

    pub fn into_rng(self) -> R {
        self.rng
    }

    /// Run `iterations` full sweeps, recomputing aggregates after each one.
    pub fn sweep(&mut self, lattice: &mut Lattice, iterations: usize) -> SweepStats {
        let mut total = SweepStats::default();

        for iteration in 0..iterations {
            lattice.refresh_thermodynamics();
            let stats = self.single_sweep(lattice);
            lattice.recompute_system_properties();

            trace!(
                iteration,
                accepted = stats.accepted,
                hamiltonian = lattice.hamiltonian(),
                magnetisation = lattice.magnetisation(),
                "sweep"
            );
            total.merge(stats);
        }

        debug!(
            iterations,
            accepted = total.accepted,
            attempted = total.attempted,
            hamiltonian = lattice.hamiltonian(),
            magnetisation = lattice.magnetisation(),
            "completed sweeps"
        );
        total
    }

    fn single_sweep(&mut self, lattice: &mut Lattice) -> SweepStats {
        let size = lattice.size();
        let j = lattice.j();
        let beta = lattice.beta();
        let mut stats = SweepStats::default();

        for row in random_permutation(size, &mut self.rng) {
            for col in random_permutation(size, &mut self.rng) {
                let sum = lattice.neighbor_sum(row, col);
                let spin = lattice.site(row, col).spin;

                let current = spin.value() * sum;
                let flipped = -spin.value() * sum;
                let delta_h = -j * (flipped - current) as f64;

                let accept = if delta_h < 0.0 {
                    true
                } else {
                    let p: f64 = self.rng.gen();
                    p < acceptance_probability(beta, delta_h)
                };

                let site = lattice.site_mut(row, col);
                if accept {
                    site.spin = spin.flipped();
                    stats.accepted += 1;
                }
                site.state = site.spin.value() * sum;
                stats.attempted += 1;
            }
        }

        stats
    }
}
