//! Color values and CSS color literal parsing
//!
//! A [`Color`] carries an explicit representation tag (sRGB, CIELAB or
//! CIELCH). Colors never mutate; every conversion returns a new value.
//!
//! Literal parsing supports the following formats:
//! - Hex: `#RGB`, `#RGBA`, `#RRGGBB`, `#RRGGBBAA`
//! - Functional: `rgb()`, `rgba()`, `hsl()`, `hsla()`, `hwb()`, `oklch()`
//! - Named: `red`, `blue`, `transparent`, etc.

use lightningcss::traits::Parse;
use lightningcss::values::color::CssColor;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::convert::{self, Lab, Lch, Rgb};

/// A color in one of the three supported representations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "space", rename_all = "lowercase")]
pub enum Color {
    Rgb(Rgb),
    Lab(Lab),
    Lch(Lch),
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color::Rgb(Rgb::new(r, g, b))
    }

    pub const fn lch(l: f64, c: f64, h: f64) -> Self {
        Color::Lch(Lch { l, c, h })
    }

    /// Convert to 8-bit sRGB, clamping out-of-gamut values.
    pub fn to_rgb(self) -> Rgb {
        match self {
            Color::Rgb(rgb) => rgb,
            Color::Lab(lab) => convert::lab_to_rgb(lab),
            Color::Lch(lch) => convert::lch_to_rgb(lch),
        }
    }

    pub fn to_lab(self) -> Lab {
        match self {
            Color::Rgb(rgb) => convert::rgb_to_lab(rgb),
            Color::Lab(lab) => lab,
            Color::Lch(lch) => convert::lch_to_lab(lch),
        }
    }

    pub fn to_lch(self) -> Lch {
        match self {
            Color::Rgb(rgb) => convert::rgb_to_lch(rgb),
            Color::Lab(lab) => convert::lab_to_lch(lab),
            Color::Lch(lch) => lch,
        }
    }

    /// Perceptual distance (CIE76) to another color.
    pub fn delta_e(self, other: Color) -> f64 {
        convert::delta_e(self.to_lab(), other.to_lab())
    }
}

impl From<Rgb> for Color {
    fn from(rgb: Rgb) -> Self {
        Color::Rgb(rgb)
    }
}

/// A color plus an alpha channel in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorValue {
    pub color: Color,
    pub alpha: f64,
}

impl ColorValue {
    pub const fn opaque(color: Color) -> Self {
        Self { color, alpha: 1.0 }
    }

    pub const fn new(color: Color, alpha: f64) -> Self {
        Self { color, alpha }
    }

    /// A copy with alpha multiplied by `factor`. The receiver is untouched.
    pub fn with_alpha_factor(&self, factor: f64) -> Self {
        Self { color: self.color, alpha: (self.alpha * factor).clamp(0.0, 1.0) }
    }

    pub fn is_opaque(&self) -> bool {
        self.alpha >= 1.0
    }
}

impl From<Color> for ColorValue {
    fn from(color: Color) -> Self {
        ColorValue::opaque(color)
    }
}

/// Error type for color parsing failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    /// Input string was empty
    #[error("empty color string")]
    Empty,
    /// Invalid length (must be 3, 4, 6, or 8 hex chars after #)
    #[error("invalid color length {0}, expected 3, 4, 6, or 8")]
    InvalidLength(usize),
    /// Contains non-hex characters
    #[error("invalid hex character '{0}'")]
    InvalidHex(char),
    /// CSS parsing error from lightningcss
    #[error("CSS parse error: {0}")]
    CssParse(String),
}

/// Parse a CSS color string into a color value.
///
/// # Examples
///
/// ```
/// use hueforge::color::{parse_color, Color};
///
/// let teal = parse_color("#1DE9B6").unwrap();
/// assert_eq!(teal.color, Color::rgb(29, 233, 182));
/// assert_eq!(teal.alpha, 1.0);
///
/// let blue = parse_color("blue").unwrap();
/// assert_eq!(blue.color, Color::rgb(0, 0, 255));
///
/// let half = parse_color("rgba(255, 0, 0, 0.5)").unwrap();
/// assert!((half.alpha - 0.5).abs() < 0.01);
/// ```
///
/// # Errors
///
/// Returns `ColorError` if the input is invalid or unparseable.
pub fn parse_color(s: &str) -> Result<ColorValue, ColorError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(ColorError::Empty);
    }

    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex_color(hex);
    }

    parse_css_color(s)
}

/// Parse the digits of a hex color (without the leading '#')
fn parse_hex_color(hex: &str) -> Result<ColorValue, ColorError> {
    if let Some(c) = hex.chars().find(|c| !c.is_ascii_hexdigit()) {
        return Err(ColorError::InvalidHex(c));
    }

    let digits: Vec<u8> = hex.bytes().map(hex_value).collect();
    let (r, g, b, a) = match digits.as_slice() {
        [r, g, b] => (r * 17, g * 17, b * 17, 255),
        [r, g, b, a] => (r * 17, g * 17, b * 17, a * 17),
        [r1, r0, g1, g0, b1, b0] => (r1 * 16 + r0, g1 * 16 + g0, b1 * 16 + b0, 255),
        [r1, r0, g1, g0, b1, b0, a1, a0] => {
            (r1 * 16 + r0, g1 * 16 + g0, b1 * 16 + b0, a1 * 16 + a0)
        }
        _ => return Err(ColorError::InvalidLength(digits.len())),
    };

    Ok(ColorValue::new(Color::rgb(r, g, b), f64::from(a) / 255.0))
}

/// Parse a CSS color using lightningcss (rgb, hsl, hwb, oklch, named colors)
fn parse_css_color(s: &str) -> Result<ColorValue, ColorError> {
    let css_color = CssColor::parse_string(s).map_err(|e| ColorError::CssParse(e.to_string()))?;
    css_color_to_value(css_color)
}

/// Convert a lightningcss CssColor to a color value
fn css_color_to_value(color: CssColor) -> Result<ColorValue, ColorError> {
    use lightningcss::values::color::FloatColor;

    let rgb_color = color
        .to_rgb()
        .map_err(|_| ColorError::CssParse("cannot convert color to RGB".to_string()))?;

    match rgb_color {
        CssColor::RGBA(rgba) => Ok(ColorValue::new(
            Color::rgb(rgba.red, rgba.green, rgba.blue),
            f64::from(rgba.alpha) / 255.0,
        )),
        CssColor::Float(float_color) => match float_color.as_ref() {
            // Float colors show up when components have 'none' values
            FloatColor::RGB(rgb) => {
                let r = (rgb.r * 255.0).round().clamp(0.0, 255.0) as u8;
                let g = (rgb.g * 255.0).round().clamp(0.0, 255.0) as u8;
                let b = (rgb.b * 255.0).round().clamp(0.0, 255.0) as u8;
                Ok(ColorValue::new(Color::rgb(r, g, b), f64::from(rgb.alpha).clamp(0.0, 1.0)))
            }
            _ => Err(ColorError::CssParse("unexpected float color format".to_string())),
        },
        _ => Err(ColorError::CssParse("color conversion did not produce RGB".to_string())),
    }
}

/// Value of an ASCII hex digit. Callers check `is_ascii_hexdigit` first.
fn hex_value(b: u8) -> u8 {
    match b {
        b'0'..=b'9' => b - b'0',
        b'a'..=b'f' => b - b'a' + 10,
        b'A'..=b'F' => b - b'A' + 10,
        _ => 0,
    }
}
