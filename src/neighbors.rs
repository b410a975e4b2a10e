//! Periodic-boundary neighbor lookup on the square lattice.

use crate::lattice::Site;

/// Mathematical modulo: always in `[0, divisor)` whatever the sign of `dividend`.
#[inline]
pub fn modulo(dividend: isize, divisor: usize) -> usize {
    dividend.rem_euclid(divisor as isize) as usize
}

/// Sum of the four orthogonal neighbor spins of `(row, col)` on a torus.
///
/// `sites` is an `size × size` grid in row-major order. On a 1×1 lattice all
/// four lookups wrap onto the site itself.
#[inline]
pub fn neighbor_sum(sites: &[Site], size: usize, row: usize, col: usize) -> i32 {
    let (r, c) = (row as isize, col as isize);
    let at = |row: usize, col: usize| sites[row * size + col].spin.value();

    let left = at(row, modulo(c - 1, size));
    let right = at(row, modulo(c + 1, size));
    let up = at(modulo(r - 1, size), col);
    let down = at(modulo(r + 1, size), col);

    left + right + up + down
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lattice::Spin;

    fn grid(spins: &[i8]) -> Vec<Site> {
        spins
            .iter()
            .map(|&s| Site::new(Spin::try_from(s).unwrap()))
            .collect()
    }

    #[test]
    fn test_modulo_negative_dividend() {
        assert_eq!(modulo(-1, 4), 3);
        assert_eq!(modulo(-5, 4), 3);
        assert_eq!(modulo(4, 4), 0);
        assert_eq!(modulo(2, 4), 2);
        assert_eq!(modulo(-1, 1), 0);
    }

    #[test]
    fn test_single_site_wraps_to_itself() {
        assert_eq!(neighbor_sum(&grid(&[1]), 1, 0, 0), 4);
        assert_eq!(neighbor_sum(&grid(&[-1]), 1, 0, 0), -4);
    }

    #[test]
    fn test_corner_wraps_both_axes() {
        // 3x3, only the opposite corners of (0,0) along each axis are down.
        #[rustfmt::skip]
        let sites = grid(&[
             1,  1, -1,
             1,  1,  1,
            -1,  1,  1,
        ]);
        // left (0,2) = -1, right (0,1) = 1, up (2,0) = -1, down (1,0) = 1
        assert_eq!(neighbor_sum(&sites, 3, 0, 0), 0);
        // center sees no wrapped sites
        assert_eq!(neighbor_sum(&sites, 3, 1, 1), 4);
    }

    #[test]
    fn test_two_by_two_counts_each_neighbor_twice() {
        #[rustfmt::skip]
        let sites = grid(&[
             1, -1,
             1,  1,
        ]);
        // left and right of (0,0) are both (0,1); up and down both (1,0).
        assert_eq!(neighbor_sum(&sites, 2, 0, 0), -1 - 1 + 1 + 1);
        assert_eq!(neighbor_sum(&sites, 2, 0, 1), 4);
    }
}
