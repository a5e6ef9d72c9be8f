//! Depth and magnitude classification.
//!
//! Depth picks the marker fill color from an ordered band table, magnitude
//! scales the marker radius. Both functions are total and pure.

use serde::Serialize;

/// A `#rrggbb` display color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ColorCode(&'static str);

impl ColorCode {
    pub const CYAN: Self = Self("#00ffff");
    pub const GREEN: Self = Self("#00ff00");
    pub const LIGHT_GREEN: Self = Self("#80ff00");
    pub const YELLOW: Self = Self("#ffff00");
    pub const ORANGE: Self = Self("#ff8000");
    pub const DARK_ORANGE: Self = Self("#ff4000");
    pub const RED: Self = Self("#ff0000");

    /// The hex string, including the leading `#`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        self.0
    }

    /// Red, green and blue components.
    #[must_use]
    pub fn rgb(self) -> (u8, u8, u8) {
        let channel = |at: usize| {
            self.0
                .get(at..at + 2)
                .and_then(|hex| u8::from_str_radix(hex, 16).ok())
                .unwrap_or(0)
        };
        (channel(1), channel(3), channel(5))
    }
}

impl std::fmt::Display for ColorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A depth range, closed at its upper edge, drawn in one color.
///
/// The lower edge is implied by the previous band in the table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DepthBand {
    /// Inclusive upper bound in km (negative = above sea level)
    pub upper_bound: f64,
    pub color: ColorCode,
}

impl DepthBand {
    const fn new(upper_bound: f64, color: ColorCode) -> Self {
        Self { upper_bound, color }
    }
}

/// Finite depth bands, bounds strictly increasing.
pub const DEPTH_BANDS: [DepthBand; 6] = [
    DepthBand::new(-10.0, ColorCode::CYAN),
    DepthBand::new(10.0, ColorCode::GREEN),
    DepthBand::new(30.0, ColorCode::LIGHT_GREEN),
    DepthBand::new(50.0, ColorCode::YELLOW),
    DepthBand::new(70.0, ColorCode::ORANGE),
    DepthBand::new(90.0, ColorCode::DARK_ORANGE),
];

/// Color for anything deeper than the last finite band.
pub const DEEPEST: ColorCode = ColorCode::RED;

/// Marker radius for zero-magnitude events, so they stay visible.
pub const MIN_RADIUS: f64 = 1.0;

/// Radius units per magnitude unit.
pub const RADIUS_SCALE: f64 = 4.0;

/// Map a depth in km to its fill color.
///
/// Returns the color of the first band whose upper bound is `>= depth_km`,
/// or [`DEEPEST`] when no band matches (including NaN).
#[must_use]
pub fn depth_color(depth_km: f64) -> ColorCode {
    DEPTH_BANDS
        .iter()
        .find(|band| depth_km <= band.upper_bound)
        .map_or(DEEPEST, |band| band.color)
}

/// Map a magnitude to a marker radius.
///
/// Negative magnitudes are not clamped and yield negative radii.
#[must_use]
#[allow(clippy::float_cmp)] // exact zero is the special case
pub fn marker_radius(magnitude: f64) -> f64 {
    if magnitude == 0.0 {
        return MIN_RADIUS;
    }
    magnitude * RADIUS_SCALE
}
