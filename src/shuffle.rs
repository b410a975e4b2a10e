//! Unbiased random visiting order for a sweep.

use rand::Rng;

/// Return `0..size` in a uniformly random order (Durstenfeld shuffle).
///
/// Walks from the last index down to 1 and swaps each slot with a uniformly
/// chosen index in `[0, i]`. Consumes exactly `size - 1` draws from `rng`
/// (none for `size <= 1`).
pub fn random_permutation(size: usize, rng: &mut impl Rng) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..size).collect();

    for i in (1..size).rev() {
        let j = rng.gen_range(0..=i);
        indices.swap(i, j);
    }

    indices
}
