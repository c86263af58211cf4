//! Color-space conversion between sRGB, CIELAB and CIELCH
//!
//! RGB <-> LAB goes through linear sRGB and CIE XYZ under the D65 white point.
//! LAB <-> LCH is the Cartesian/polar change of coordinates on the (a, b) plane.
//!
//! All functions are pure. The CIELAB cube root is computed by Newton iteration
//! with a fixed starting point and stopping rule, so identical inputs give
//! bit-identical outputs on any IEEE-754 double implementation.

use serde::{Deserialize, Serialize};

/// 8-bit sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb { r: 255, g: 255, b: 255 };
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Lowercase `#rrggbb` form.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// CIELAB color (D65).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Lab {
    pub l: f64,
    pub a: f64,
    pub b: f64,
}

/// CIELCH color, the polar form of [`Lab`]. Hue is in degrees, `[0, 360)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Lch {
    pub l: f64,
    pub c: f64,
    pub h: f64,
}

/// D65 reference white.
const XN: f64 = 0.95047;
const YN: f64 = 1.0;
const ZN: f64 = 1.08883;

/// CIELAB linear-segment threshold, (6/29)^3.
const EPSILON: f64 = 216.0 / 24389.0;
/// 6/29
const DELTA: f64 = 6.0 / 29.0;

/// Chroma under which a color counts as achromatic and gets hue 0.
pub const ACHROMATIC_CHROMA: f64 = 1e-9;

/// Linearize one 8-bit sRGB channel.
pub fn srgb_to_linear(c: u8) -> f64 {
    let c = f64::from(c) / 255.0;
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Gamma-encode a linear channel. The result is not clamped.
pub fn linear_to_srgb(c: f64) -> f64 {
    if c <= 0.003_130_8 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

/// Cube root by Newton iteration.
///
/// Starts on the tangent of `x^(1/3)` at 1, which never lies below the root,
/// so the iterates decrease monotonically; iteration stops as soon as they stop
/// decreasing.
pub fn cbrt(x: f64) -> f64 {
    if x == 0.0 || !x.is_finite() {
        return x;
    }
    if x < 0.0 {
        return -cbrt(-x);
    }

    let mut y = 1.0 + (x - 1.0) / 3.0;
    for _ in 0..200 {
        let next = (2.0 * y + x / (y * y)) / 3.0;
        if next >= y {
            break;
        }
        y = next;
    }
    y
}

fn lab_f(t: f64) -> f64 {
    if t > EPSILON {
        cbrt(t)
    } else {
        t / (3.0 * DELTA * DELTA) + 4.0 / 29.0
    }
}

fn lab_f_inv(t: f64) -> f64 {
    if t > DELTA {
        t * t * t
    } else {
        3.0 * DELTA * DELTA * (t - 4.0 / 29.0)
    }
}

fn channel_to_u8(linear: f64) -> u8 {
    let encoded = linear_to_srgb(linear) * 255.0;
    encoded.round().clamp(0.0, 255.0) as u8
}

/// sRGB -> CIELAB.
pub fn rgb_to_lab(rgb: Rgb) -> Lab {
    let r = srgb_to_linear(rgb.r);
    let g = srgb_to_linear(rgb.g);
    let b = srgb_to_linear(rgb.b);

    let x = 0.412_456_4 * r + 0.357_576_1 * g + 0.180_437_5 * b;
    let y = 0.212_672_9 * r + 0.715_152_2 * g + 0.072_175_0 * b;
    let z = 0.019_333_9 * r + 0.119_192_0 * g + 0.950_304_1 * b;

    let fx = lab_f(x / XN);
    let fy = lab_f(y / YN);
    let fz = lab_f(z / ZN);

    Lab { l: 116.0 * fy - 16.0, a: 500.0 * (fx - fy), b: 200.0 * (fy - fz) }
}

/// CIELAB -> sRGB. Out-of-gamut values are clamped per channel here and
/// nowhere earlier.
pub fn lab_to_rgb(lab: Lab) -> Rgb {
    let fy = (lab.l + 16.0) / 116.0;
    let fx = fy + lab.a / 500.0;
    let fz = fy - lab.b / 200.0;

    let x = XN * lab_f_inv(fx);
    let y = YN * lab_f_inv(fy);
    let z = ZN * lab_f_inv(fz);

    let r = 3.240_454_2 * x - 1.537_138_5 * y - 0.498_531_4 * z;
    let g = -0.969_266_0 * x + 1.876_010_8 * y + 0.041_556_0 * z;
    let b = 0.055_643_4 * x - 0.204_025_9 * y + 1.057_225_2 * z;

    Rgb { r: channel_to_u8(r), g: channel_to_u8(g), b: channel_to_u8(b) }
}

/// Normalize an angle in degrees to `[0, 360)`.
pub fn normalize_hue(h: f64) -> f64 {
    let wrapped = h.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// CIELAB -> CIELCH. Achromatic colors get hue 0.
pub fn lab_to_lch(lab: Lab) -> Lch {
    let c = (lab.a * lab.a + lab.b * lab.b).sqrt();
    let h = if c < ACHROMATIC_CHROMA { 0.0 } else { normalize_hue(lab.b.atan2(lab.a).to_degrees()) };
    Lch { l: lab.l, c, h }
}

/// CIELCH -> CIELAB.
pub fn lch_to_lab(lch: Lch) -> Lab {
    let rad = lch.h.to_radians();
    Lab { l: lch.l, a: lch.c * rad.cos(), b: lch.c * rad.sin() }
}

pub fn rgb_to_lch(rgb: Rgb) -> Lch {
    lab_to_lch(rgb_to_lab(rgb))
}

pub fn lch_to_rgb(lch: Lch) -> Rgb {
    lab_to_rgb(lch_to_lab(lch))
}

/// CIE76 color difference.
pub fn delta_e(a: Lab, b: Lab) -> f64 {
    let dl = a.l - b.l;
    let da = a.a - b.a;
    let db = a.b - b.b;
    (dl * dl + da * da + db * db).sqrt()
}

/// Signed shortest distance from hue `a` to hue `b`, in `(-180, 180]`.
pub fn hue_difference(a: f64, b: f64) -> f64 {
    let d = normalize_hue(b - a);
    if d > 180.0 {
        d - 360.0
    } else {
        d
    }
}
