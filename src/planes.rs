//! Contains the PlaneMapper struct, which describes a relationship
//! between a rectangle on the integral plane with an origin at 0,0,
//! and a rectangle on the complex plane with an arbitrary pair of
//! corners defining the leftlower and rightupper corners of that
//! plane.
use num::Complex;

/// Describes the width and height of an integral plane that is assumed to start at
/// 0,0 and all values are assumed to be non-negative integers.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct IntegralPlane(pub usize, pub usize);

/// Describes the lower-left corner and upper-right corner of the
/// Complex plane, treating the real part of each value as the
/// x-component and the imaginary part of each value as the
/// y-component.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ComplexPlane(pub Complex<f64>, pub Complex<f64>);

/// Describes the column, row of a pixel in a grid.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Pixel(pub usize, pub usize);

/// Contains the definitions of two planes: an integral cartesian plane,
/// and a complex cartesian plane.  Maps pixels of the former onto the
/// centres of the cells they cover in the latter.
#[derive(Clone, Debug, PartialEq)]
pub struct PlaneMapper {
    /// The right-upper hand corner of the integral cartesian plane.
    /// The left-lower is assumed to be at 0,0
    pub integral_plane: IntegralPlane,
    /// The two coordinates defining the complex cartesian plane,
    /// left-lower and right-upper
    pub complex_plane: ComplexPlane,
    // Width and height of the complex region.  Kept as spans rather
    // than per-pixel steps so pixel_to_point divides last.
    spans: (f64, f64),
}

impl PlaneMapper {
    /// Constructor.  Takes the size of the integral plane, and two
    /// points describing the complex plane.  Rejects empty grids and
    /// regions that are empty, inverted, or not finite.
    pub fn new(
        width: usize,
        height: usize,
        leftlower: Complex<f64>,
        rightupper: Complex<f64>,
    ) -> Result<PlaneMapper, String> {
        if width == 0 || height == 0 {
            return Err(format!(
                "The integral plane must have a size, got {}x{}.",
                width, height
            ));
        }

        let corners = [leftlower.re, leftlower.im, rightupper.re, rightupper.im];
        if corners.iter().any(|v| !v.is_finite()) {
            return Err("The corners of the complex plane must be finite.".to_string());
        }

        if leftlower.re >= rightupper.re {
            return Err(
                "The left lower corner is not to the left of the right upper corner.".to_string(),
            );
        }

        if leftlower.im >= rightupper.im {
            return Err(
                "The left lower corner is not lower than the right upper corner.".to_string(),
            );
        }

        Ok(PlaneMapper {
            integral_plane: IntegralPlane(width, height),
            complex_plane: ComplexPlane(leftlower, rightupper),
            spans: (rightupper.re - leftlower.re, rightupper.im - leftlower.im),
        })
    }

    /// The total number of points in the integral grid.  Used to
    /// calculate memory needs.
    pub fn len(&self) -> usize {
        self.integral_plane.0 * self.integral_plane.1
    }

    /// True when the integral grid holds no points.
    pub fn is_empty(&self) -> bool {
        self.integral_plane.0 == 0 || self.integral_plane.1 == 0
    }

    /// Width of the integral plane, in pixels.
    pub fn width(&self) -> usize {
        self.integral_plane.0
    }

    /// Height of the integral plane, in pixels.
    pub fn height(&self) -> usize {
        self.integral_plane.1
    }

    /// Given a pixel on the integral cartesian plane, return the
    /// complex number at the centre of the cell that pixel covers.
    /// Every strategy shares this exact sequence of operations, so
    /// grids agree bit for bit.
    #[inline]
    pub fn pixel_to_point(&self, pixel: &Pixel) -> Complex<f64> {
        let leftlower = self.complex_plane.0;
        Complex::new(
            leftlower.re + (pixel.0 as f64 + 0.5) * self.spans.0 / self.integral_plane.0 as f64,
            leftlower.im + (pixel.1 as f64 + 0.5) * self.spans.1 / self.integral_plane.1 as f64,
        )
    }

    /// Given a pixel, the offset of that pixel into a row-major
    /// buffer for this plane.
    pub fn pixel_to_offset(&self, pixel: &Pixel) -> Option<usize> {
        if pixel.0 >= self.integral_plane.0 || pixel.1 >= self.integral_plane.1 {
            return None;
        }
        Some(pixel.1 * self.integral_plane.0 + pixel.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn planemapper_fails_on_bad_shape() {
        let pm = PlaneMapper::new(4, 4, Complex::new(-1.0, 1.0), Complex::new(1.0, -1.0));
        assert!(pm.is_err());
        let pm = PlaneMapper::new(4, 4, Complex::new(1.0, -1.0), Complex::new(-1.0, 1.0));
        assert!(pm.is_err());
    }

    #[test]
    fn planemapper_fails_on_degenerate_region() {
        let pm = PlaneMapper::new(4, 4, Complex::new(0.0, -1.0), Complex::new(0.0, 1.0));
        assert!(pm.is_err());
        let pm = PlaneMapper::new(4, 4, Complex::new(std::f64::NAN, -1.0), Complex::new(1.0, 1.0));
        assert!(pm.is_err());
        let pm = PlaneMapper::new(
            4,
            4,
            Complex::new(-1.0, -1.0),
            Complex::new(std::f64::INFINITY, 1.0),
        );
        assert!(pm.is_err());
    }

    #[test]
    fn planemapper_fails_on_empty_plane() {
        assert!(PlaneMapper::new(0, 4, Complex::new(-1.0, -1.0), Complex::new(1.0, 1.0)).is_err());
        assert!(PlaneMapper::new(4, 0, Complex::new(-1.0, -1.0), Complex::new(1.0, 1.0)).is_err());
    }

    #[test]
    fn planemapper_passes_on_good_shape() {
        let pm = PlaneMapper::new(4, 4, Complex::new(-1.0, -1.0), Complex::new(1.0, 1.0));
        assert!(pm.is_ok());
        let pm = pm.unwrap();
        assert_eq!(pm.len(), 16);
        assert!(!pm.is_empty());
    }

    #[test]
    fn pixel_to_point_samples_cell_centres() {
        let pm = PlaneMapper::new(4, 4, Complex::new(0.0, 0.0), Complex::new(4.0, 4.0)).unwrap();
        assert_eq!(pm.pixel_to_point(&Pixel(0, 0)), Complex::new(0.5, 0.5));
        assert_eq!(pm.pixel_to_point(&Pixel(2, 1)), Complex::new(2.5, 1.5));
        assert_eq!(pm.pixel_to_point(&Pixel(3, 3)), Complex::new(3.5, 3.5));
    }

    #[test]
    fn pixel_to_point_on_mixed_planes() {
        let pm = PlaneMapper::new(4, 4, Complex::new(-2.0, -1.5), Complex::new(1.0, 1.5)).unwrap();
        assert_eq!(pm.pixel_to_point(&Pixel(0, 0)), Complex::new(-1.625, -1.125));
        assert_eq!(pm.pixel_to_point(&Pixel(3, 3)), Complex::new(0.625, 1.125));
    }

    #[test]
    fn pixel_to_point_matches_the_written_formula() {
        let (x_min, x_max, y_min, y_max) = (-2.0_f64, 1.0_f64, -1.0_f64, 1.0_f64);
        let (w, h) = (800usize, 600usize);
        let pm = PlaneMapper::new(w, h, Complex::new(x_min, y_min), Complex::new(x_max, y_max))
            .unwrap();
        for &(px, py) in &[(0usize, 0usize), (17, 433), (799, 599), (400, 300)] {
            let x = x_min + (px as f64 + 0.5) * (x_max - x_min) / w as f64;
            let y = y_min + (py as f64 + 0.5) * (y_max - y_min) / h as f64;
            let p = pm.pixel_to_point(&Pixel(px, py));
            assert_eq!(p.re.to_bits(), x.to_bits());
            assert_eq!(p.im.to_bits(), y.to_bits());
        }
    }

    #[test]
    fn pixel_to_offset_is_row_major() {
        let pm = PlaneMapper::new(5, 3, Complex::new(-1.0, -1.0), Complex::new(1.0, 1.0)).unwrap();
        assert_eq!(pm.pixel_to_offset(&Pixel(0, 0)), Some(0));
        assert_eq!(pm.pixel_to_offset(&Pixel(4, 0)), Some(4));
        assert_eq!(pm.pixel_to_offset(&Pixel(0, 1)), Some(5));
        assert_eq!(pm.pixel_to_offset(&Pixel(4, 2)), Some(14));
        assert_eq!(pm.pixel_to_offset(&Pixel(5, 0)), None);
        assert_eq!(pm.pixel_to_offset(&Pixel(0, 3)), None);
    }
}
