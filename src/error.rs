//! Error type for lattice construction and configuration.

use thiserror::Error;

/// Errors raised by the simulator.
///
/// Only construction and reconfiguration can fail; sweeps and property
/// recomputation are total over a well-formed lattice.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum IsingError {
    /// Lattice size, physical constants or an explicit spin grid were rejected.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, IsingError>;
