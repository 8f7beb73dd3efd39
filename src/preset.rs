//! The preset catalog: fixed, named problem sizes that every strategy
//! is measured against, and the zoom views that can be laid over them.

use num::Complex;
use std::fmt;
use std::str::FromStr;

use crate::error::{BenchError, Result};
use crate::planes::PlaneMapper;

/// The region every catalog preset starts from, as
/// (leftlower, rightupper).
pub const DEFAULT_VIEW: (Complex<f64>, Complex<f64>) =
    (Complex { re: -2.0, im: -1.0 }, Complex { re: 1.0, im: 1.0 });

/// Names of the catalog presets, in the order reports list them.
pub const PRESET_ORDER: [&str; 3] = ["easy", "medium", "hard"];

/// A named, immutable problem definition: resolution, region of the
/// complex plane, and iteration cap.
#[derive(Clone, Debug, PartialEq)]
pub struct Preset {
    name: String,
    planes: PlaneMapper,
    max_iterations: u32,
}

impl Preset {
    /// Builds a preset, refusing anything that could not produce a
    /// grid: empty resolution, empty or inverted region, zero cap.
    pub fn new(
        name: &str,
        width: usize,
        height: usize,
        leftlower: Complex<f64>,
        rightupper: Complex<f64>,
        max_iterations: u32,
    ) -> Result<Self> {
        if max_iterations == 0 {
            return Err(BenchError::Configuration(format!(
                "preset '{}': the iteration cap must be at least 1",
                name
            )));
        }
        let planes = PlaneMapper::new(width, height, leftlower, rightupper)
            .map_err(|reason| BenchError::Configuration(format!("preset '{}': {}", name, reason)))?;
        Ok(Preset {
            name: name.to_string(),
            planes,
            max_iterations,
        })
    }

    /// Looks a preset up in the catalog by name.
    pub fn named(name: &str) -> Result<Self> {
        let (width, height, max_iterations) = match name {
            "easy" => (800, 600, 100),
            "medium" => (1200, 900, 150),
            "hard" => (2000, 1500, 2000),
            _ => return Err(BenchError::UnknownPreset(name.to_string())),
        };
        Preset::new(
            name,
            width,
            height,
            DEFAULT_VIEW.0,
            DEFAULT_VIEW.1,
            max_iterations,
        )
    }

    /// The same resolution and cap over a different region.  Any view
    /// but the default renames the preset `<name>@<view>`, so its
    /// timings never mix with the full-view runs.
    pub fn with_view(&self, view: View) -> Result<Self> {
        let (leftlower, rightupper) = view.region();
        let name = match view {
            View::Default => self.name.clone(),
            _ => format!("{}@{}", self.name, view),
        };
        Preset::new(
            &name,
            self.width(),
            self.height(),
            leftlower,
            rightupper,
            self.max_iterations,
        )
    }

    /// Name the preset is reported under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Grid width in pixels.
    pub fn width(&self) -> usize {
        self.planes.width()
    }

    /// Grid height in pixels.
    pub fn height(&self) -> usize {
        self.planes.height()
    }

    /// Iteration cap; also the value of every pixel inside the set.
    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    /// Left edge of the region.
    pub fn x_min(&self) -> f64 {
        self.planes.complex_plane.0.re
    }

    /// Right edge of the region.
    pub fn x_max(&self) -> f64 {
        self.planes.complex_plane.1.re
    }

    /// Bottom edge of the region.
    pub fn y_min(&self) -> f64 {
        self.planes.complex_plane.0.im
    }

    /// Top edge of the region.
    pub fn y_max(&self) -> f64 {
        self.planes.complex_plane.1.im
    }

    /// The pixel to complex plane mapping for this preset.
    pub fn planes(&self) -> &PlaneMapper {
        &self.planes
    }

    /// Number of pixels in a grid for this preset.
    pub fn pixel_count(&self) -> usize {
        self.planes.len()
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{:<14} {:>5}x{:<5} iterations={:<6} re=[{}, {}] im=[{}, {}]",
            self.name,
            self.width(),
            self.height(),
            self.max_iterations,
            self.x_min(),
            self.x_max(),
            self.y_min(),
            self.y_max()
        )
    }
}

/// Every preset in the catalog, in report order.  Fails if any entry
/// does not build.
pub fn catalog() -> Result<Vec<Preset>> {
    PRESET_ORDER.iter().map(|name| Preset::named(name)).collect()
}

/// Regions of the plane a preset can be pointed at.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum View {
    /// The whole set.
    Default,
    /// [-0.5, 0.5] on both axes.
    Center,
    /// [-0.1, 0.1] on both axes.
    Deep,
}

impl View {
    /// Every view, widest first.
    pub const ALL: [View; 3] = [View::Default, View::Center, View::Deep];

    /// The (leftlower, rightupper) corners of this view.
    pub fn region(self) -> (Complex<f64>, Complex<f64>) {
        match self {
            View::Default => DEFAULT_VIEW,
            View::Center => (Complex::new(-0.5, -0.5), Complex::new(0.5, 0.5)),
            View::Deep => (Complex::new(-0.1, -0.1), Complex::new(0.1, 0.1)),
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            View::Default => "default",
            View::Center => "center",
            View::Deep => "deep",
        };
        f.write_str(name)
    }
}

impl FromStr for View {
    type Err = BenchError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "default" => Ok(View::Default),
            "center" => Ok(View::Center),
            "deep" => Ok(View::Deep),
            _ => Err(BenchError::Configuration(format!("unknown view '{}'", s))),
        }
    }
}
