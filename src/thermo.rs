//! Thermodynamic parameters derived from the lattice constants.

/// Onsager critical temperature of the square lattice: `Tc = 2J / (k ln(1 + √2))`.
pub fn critical_temperature(k: f64, j: f64) -> f64 {
    (2.0 * j) / (k * (1.0 + 2f64.sqrt()).ln())
}

/// Inverse temperature `β = 1/(kT)`; infinite at `T = 0`.
pub fn inverse_temperature(k: f64, t: f64) -> f64 {
    (k * t).recip()
}

/// Metropolis acceptance probability for an energy change `delta_h`.
///
/// `ΔH ≤ 0` is always accepted. With `β = ∞` any positive `ΔH` is certain
/// rejection; this avoids `∞ · 0 = NaN` at zero temperature.
pub fn acceptance_probability(beta: f64, delta_h: f64) -> f64 {
    if delta_h <= 0.0 {
        1.0
    } else if beta.is_infinite() {
        0.0
    } else {
        (-beta * delta_h).exp()
    }
}
