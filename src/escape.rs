//! The escape-time kernel.  Everything else in the crate is a way of
//! calling this over a grid of pixels.

use num::Complex;

use crate::planes::{Pixel, PlaneMapper};

/// The squared bailout radius.  Comparing |z|² against this avoids a
/// square root per iteration.
pub const BAILOUT_SQR: f64 = 4.0;

/// This is our classic iterator function: iterate z = z² + c from
/// zero and return the first n for which |z_n|² > 4, or
/// `max_iterations` if the orbit stays bounded that long.  A point
/// that lands exactly on the bailout circle has not escaped.
#[inline]
pub fn escape_time(c: Complex<f64>, max_iterations: u32) -> u32 {
    let mut z = Complex::new(0.0_f64, 0.0_f64);
    for n in 1..=max_iterations {
        z = z * z + c;
        if z.norm_sqr() > BAILOUT_SQR {
            return n;
        }
    }
    max_iterations
}

/// Fills `band`, a run of whole rows beginning at `first_row`, with
/// the escape time of every pixel in it.  This is the unit of work
/// every strategy hands to its workers.
pub fn render_rows(planes: &PlaneMapper, max_iterations: u32, first_row: usize, band: &mut [u32]) {
    let width = planes.width();
    debug_assert!(band.len() % width == 0);
    for (i, row) in band.chunks_mut(width).enumerate() {
        for (column, cell) in row.iter_mut().enumerate() {
            let point = planes.pixel_to_point(&Pixel(column, first_row + i));
            *cell = escape_time(point, max_iterations);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn origin_never_escapes() {
        for &cap in &[1u32, 2, 7, 50, 100, 2000] {
            assert_eq!(escape_time(Complex::new(0.0, 0.0), cap), cap);
        }
    }

    #[test]
    fn points_outside_radius_two_escape_on_the_first_step() {
        // z_1 = c, so |c| > 2 is already past the bailout.
        let mut rng = rand::thread_rng();
        for _ in 0..1000 {
            let radius = rng.gen_range(2.0001..50.0);
            let angle = rng.gen_range(0.0..std::f64::consts::PI * 2.0);
            let c = Complex::from_polar(radius, angle);
            if c.norm_sqr() <= BAILOUT_SQR {
                continue;
            }
            let n = escape_time(c, 100);
            assert!(n < 100);
            assert_eq!(n, 1);
        }
    }

    #[test]
    fn bailout_is_strict() {
        // z_1 = 2, |z_1|² == 4 exactly: not escaped yet.  z_2 = 6.
        assert_eq!(escape_time(Complex::new(2.0, 0.0), 50), 2);
        assert_eq!(escape_time(Complex::new(0.0, 2.0), 50), 2);
        // -2 sits on the boundary of the set and never escapes.
        assert_eq!(escape_time(Complex::new(-2.0, 0.0), 50), 50);
    }

    #[test]
    fn known_orbits() {
        // c = 1: 1, 2, 5 -> escapes at n = 3.
        assert_eq!(escape_time(Complex::new(1.0, 0.0), 50), 3);
        // c = -1 cycles between -1 and 0.
        assert_eq!(escape_time(Complex::new(-1.0, 0.0), 50), 50);
        // c = i cycles and stays bounded.
        assert_eq!(escape_time(Complex::new(0.0, 1.0), 50), 50);
    }

    #[test]
    fn cap_is_the_ceiling() {
        let mut rng = rand::thread_rng();
        for _ in 0..1000 {
            let c = Complex::new(rng.gen_range(-2.5..1.5), rng.gen_range(-1.5..1.5));
            let cap = rng.gen_range(1..200u32);
            let n = escape_time(c, cap);
            assert!(n >= 1 && n <= cap);
        }
    }

    #[test]
    fn render_rows_matches_pointwise_kernel() {
        let planes =
            PlaneMapper::new(6, 5, Complex::new(-2.0, -1.5), Complex::new(1.0, 1.5)).unwrap();
        let mut band = vec![0u32; 2 * 6];
        render_rows(&planes, 40, 3, &mut band);
        for row in 0..2 {
            for column in 0..6 {
                let expected = escape_time(planes.pixel_to_point(&Pixel(column, row + 3)), 40);
                assert_eq!(band[row * 6 + column], expected);
            }
        }
    }
}
