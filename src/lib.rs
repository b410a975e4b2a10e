pub mod error;
pub mod lattice;
pub mod metropolis;
pub mod neighbors;
pub mod observables;
pub mod shuffle;
pub mod thermo;
pub mod utils;

pub use error::{IsingError, Result};
pub use lattice::{Lattice, LatticeConfig, Site, Spin};
pub use metropolis::{MetropolisSampler, SweepStats};
pub use observables::{Accumulator, Sample, Summary};
