/// RGB → CIE xy conversion, coerced into a lamp's gamut.
///
/// Pipeline: optional sRGB gamma expansion → Wide RGB D65 matrix → xy
/// projection → snap to the nearest gamut edge if the point is unreachable.

use crate::geometry::{Gamut, Point2};

/// An RGB intent with each channel nominally in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Rgb {
    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// From 8-bit channels.
    pub fn from_u8(r: u8, g: u8, b: u8) -> Self {
        Self::new(f64::from(r) / 255.0, f64::from(g) / 255.0, f64::from(b) / 255.0)
    }

    /// Clamp every channel into [0, 1]. NaN channels become 0.
    pub fn clamped(self) -> Self {
        let unit = |c: f64| if c.is_nan() { 0.0 } else { c.clamp(0.0, 1.0) };
        Self::new(unit(self.r), unit(self.g), unit(self.b))
    }

    pub fn is_normalized(&self) -> bool {
        [self.r, self.g, self.b].iter().all(|c| (0.0..=1.0).contains(c))
    }
}

/// A converted color: in-gamut chromaticity plus relative luminance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorSample {
    pub xy: Point2,
    pub luminance: f64,
}

/// sRGB transfer function inverse, per channel.
pub fn gamma_correction(c: f64) -> f64 {
    if c > 0.04045 {
        ((c + 0.055) / 1.055).powf(2.4)
    } else {
        c / 12.92
    }
}

/// Wide RGB D65 → XYZ.
fn rgb_to_xyz(rgb: Rgb) -> (f64, f64, f64) {
    let Rgb { r, g, b } = rgb;
    let x = r * 0.664511 + g * 0.154324 + b * 0.162028;
    let y = r * 0.283881 + g * 0.668433 + b * 0.047685;
    let z = r * 0.000088 + g * 0.072310 + b * 0.986039;
    (x, y, z)
}

/// Convert `rgb` to a chromaticity the lamp can show, plus luminance.
///
/// Inputs are not re-validated: channels outside [0, 1] produce a
/// geometrically defined but meaningless result.
pub fn convert(rgb: Rgb, gamut: &Gamut, gamma_correct: bool) -> ColorSample {
    let rgb = if gamma_correct {
        Rgb::new(
            gamma_correction(rgb.r),
            gamma_correction(rgb.g),
            gamma_correction(rgb.b),
        )
    } else {
        rgb
    };

    let (x, y, z) = rgb_to_xyz(rgb);
    let sum = x + y + z;
    // Black has no chromaticity; pin it to the origin.
    let xy = if sum == 0.0 {
        Point2::new(0.0, 0.0)
    } else {
        Point2::new(x / sum, y / sum)
    };

    let xy = if gamut.contains(xy) {
        xy
    } else {
        gamut.nearest_boundary_point(xy)
    };

    ColorSample { xy, luminance: y }
}
