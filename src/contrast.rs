//! WCAG 2.1 contrast ratios and contrast matrices.
//!
//! Ratios are computed in sRGB relative-luminance space:
//! `(L_lighter + 0.05) / (L_darker + 0.05)`, always in `[1, 21]`.
//!
//! Matrix cells are independent and are computed in parallel.

use std::collections::BTreeMap;
use std::fmt;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::color::{Color, ColorValue};
use crate::convert::{srgb_to_linear, Rgb};
use crate::error::CompileError;
use crate::scale::Step;
use crate::system::PrimitiveSystem;
use crate::theme::ResolvedTokenMap;

/// WCAG compliance level, weakest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WcagLevel {
    #[serde(rename = "fail")]
    Fail,
    #[serde(rename = "AA-large")]
    AaLarge,
    #[serde(rename = "AA")]
    Aa,
    #[serde(rename = "AAA")]
    Aaa,
}

impl WcagLevel {
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio >= 7.0 {
            WcagLevel::Aaa
        } else if ratio >= 4.5 {
            WcagLevel::Aa
        } else if ratio >= 3.0 {
            WcagLevel::AaLarge
        } else {
            WcagLevel::Fail
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            WcagLevel::Fail => "fail",
            WcagLevel::AaLarge => "AA-large",
            WcagLevel::Aa => "AA",
            WcagLevel::Aaa => "AAA",
        }
    }
}

impl fmt::Display for WcagLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Relative luminance of an sRGB color, in `[0, 1]`.
pub fn relative_luminance(rgb: Rgb) -> f64 {
    0.2126 * srgb_to_linear(rgb.r) + 0.7152 * srgb_to_linear(rgb.g) + 0.0722 * srgb_to_linear(rgb.b)
}

/// Contrast ratio between two colors. Symmetric in its arguments.
pub fn contrast(fg: Color, bg: Color) -> f64 {
    contrast_rgb(fg.to_rgb(), bg.to_rgb())
}

pub fn contrast_rgb(fg: Rgb, bg: Rgb) -> f64 {
    let a = relative_luminance(fg);
    let b = relative_luminance(bg);
    let (lighter, darker) = if a >= b { (a, b) } else { (b, a) };
    (lighter + 0.05) / (darker + 0.05)
}

/// Blend a translucent color over an opaque backdrop, channel by channel in
/// gamma-encoded sRGB (the way browsers paint it).
pub fn composite_over(fg: ColorValue, backdrop: Rgb) -> Rgb {
    let a = fg.alpha.clamp(0.0, 1.0);
    let top = fg.color.to_rgb();
    let mix = |t: u8, b: u8| (f64::from(t) * a + f64::from(b) * (1.0 - a)).round() as u8;
    Rgb::new(mix(top.r, backdrop.r), mix(top.g, backdrop.g), mix(top.b, backdrop.b))
}

/// Contrast of two token values. A translucent foreground is composited over
/// the background first; background alpha is ignored.
pub fn contrast_values(fg: ColorValue, bg: ColorValue) -> f64 {
    let backdrop = bg.color.to_rgb();
    let top = if fg.is_opaque() { fg.color.to_rgb() } else { composite_over(fg, backdrop) };
    contrast_rgb(top, backdrop)
}

/// One matrix cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ContrastCell {
    pub ratio: f64,
    pub level: WcagLevel,
}

impl ContrastCell {
    fn from_ratio(ratio: f64) -> Self {
        Self { ratio, level: WcagLevel::from_ratio(ratio) }
    }
}

/// Count of matrix cells per compliance level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ContrastSummary {
    pub aaa: usize,
    pub aa: usize,
    pub aa_large: usize,
    pub fail: usize,
}

/// Contrast ratios keyed by `(foreground, background)` name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContrastMatrix {
    cells: BTreeMap<(String, String), ContrastCell>,
}

impl ContrastMatrix {
    fn from_pairs(fg: &[(String, ColorValue)], bg: &[(String, ColorValue)]) -> Self {
        let pairs: Vec<(usize, usize)> =
            (0..fg.len()).flat_map(|i| (0..bg.len()).map(move |j| (i, j))).collect();

        let cells = pairs
            .par_iter()
            .map(|&(i, j)| {
                let (fg_name, fg_value) = &fg[i];
                let (bg_name, bg_value) = &bg[j];
                let cell = ContrastCell::from_ratio(contrast_values(*fg_value, *bg_value));
                ((fg_name.clone(), bg_name.clone()), cell)
            })
            .collect::<BTreeMap<_, _>>();

        Self { cells }
    }

    /// Matrix over resolved theme tokens, addressed by dot path.
    pub fn from_tokens(
        tokens: &ResolvedTokenMap,
        foreground: &[String],
        background: &[String],
    ) -> Result<Self, CompileError> {
        let pick = |names: &[String], side: &str| {
            names
                .iter()
                .map(|name| {
                    tokens
                        .get(name)
                        .map(|v| (name.clone(), *v))
                        .ok_or_else(|| CompileError::unknown(format!("contrast.{side}"), name.as_str()))
                })
                .collect::<Result<Vec<_>, _>>()
        };
        let fg = pick(foreground, "foreground_tokens")?;
        let bg = pick(background, "background_tokens")?;
        Ok(Self::from_pairs(&fg, &bg))
    }

    pub fn get(&self, foreground: &str, background: &str) -> Option<ContrastCell> {
        self.cells.get(&(foreground.to_string(), background.to_string())).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, ContrastCell)> {
        self.cells.iter().map(|((f, b), cell)| (f.as_str(), b.as_str(), *cell))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Rename every cell to `<prefix>:<name>` on both axes.
    pub fn prefixed(self, prefix: &str) -> Self {
        let cells = self
            .cells
            .into_iter()
            .map(|((f, b), cell)| ((format!("{prefix}:{f}"), format!("{prefix}:{b}")), cell))
            .collect();
        Self { cells }
    }

    /// Merge another matrix into this one. Cells of `other` win on name clashes.
    pub fn extend(&mut self, other: ContrastMatrix) {
        self.cells.extend(other.cells);
    }

    pub fn summary(&self) -> ContrastSummary {
        let mut summary = ContrastSummary::default();
        for cell in self.cells.values() {
            match cell.level {
                WcagLevel::Aaa => summary.aaa += 1,
                WcagLevel::Aa => summary.aa += 1,
                WcagLevel::AaLarge => summary.aa_large += 1,
                WcagLevel::Fail => summary.fail += 1,
            }
        }
        summary
    }
}

fn family_entries(
    system: &PrimitiveSystem,
    families: &[String],
    steps: &[Step],
    side: &str,
) -> Result<Vec<(String, ColorValue)>, CompileError> {
    let mut out = Vec::with_capacity(families.len() * steps.len());
    for family_name in families {
        let family = system
            .family(family_name)
            .ok_or_else(|| CompileError::unknown(format!("contrast.{side}"), family_name.as_str()))?;
        for &step in steps {
            out.push((format!("{}-{}", family_name, step), ColorValue::opaque(family.scale.get(step))));
        }
    }
    Ok(out)
}

/// Cross product of every foreground `(family, step)` against every
/// background `(family, step)`. Cells are named `<family>-<step>`.
pub fn generate_contrast_matrix(
    system: &PrimitiveSystem,
    fg_families: &[String],
    bg_families: &[String],
    fg_steps: &[Step],
    bg_steps: &[Step],
) -> Result<ContrastMatrix, CompileError> {
    let fg = family_entries(system, fg_families, fg_steps, "foreground")?;
    let bg = family_entries(system, bg_families, bg_steps, "background")?;
    let matrix = ContrastMatrix::from_pairs(&fg, &bg);
    tracing::debug!(cells = matrix.len(), "computed primitive contrast matrix");
    Ok(matrix)
}

/// A pair of theme tokens that must reach a minimum level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContrastRequirement {
    pub foreground: String,
    pub background: String,
    #[serde(default = "default_required_level")]
    pub level: WcagLevel,
}

fn default_required_level() -> WcagLevel {
    WcagLevel::Aa
}

/// Check every requirement against one resolved theme, stopping at the first
/// failure. Returns the measured ratios in requirement order.
pub fn check_requirements(
    tokens: &ResolvedTokenMap,
    requirements: &[ContrastRequirement],
) -> Result<Vec<f64>, CompileError> {
    requirements
        .iter()
        .map(|req| {
            let fg = tokens
                .get(&req.foreground)
                .ok_or_else(|| CompileError::unknown("contrast.require", req.foreground.as_str()))?;
            let bg = tokens
                .get(&req.background)
                .ok_or_else(|| CompileError::unknown("contrast.require", req.background.as_str()))?;
            let ratio = contrast_values(*fg, *bg);
            if WcagLevel::from_ratio(ratio) < req.level {
                return Err(CompileError::ContrastRequirement {
                    foreground: req.foreground.clone(),
                    background: req.background.clone(),
                    ratio,
                    required: req.level.to_string(),
                });
            }
            Ok(ratio)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, eps: f64) -> bool {
        (a - b).abs() < eps
    }

    #[test]
    fn test_luminance_extremes() {
        assert!(approx_eq(relative_luminance(Rgb::BLACK), 0.0, 1e-12));
        assert!(approx_eq(relative_luminance(Rgb::WHITE), 1.0, 1e-9));
        assert!(approx_eq(relative_luminance(Rgb::new(255, 0, 0)), 0.2126, 1e-9));
        assert!(approx_eq(relative_luminance(Rgb::new(0, 255, 0)), 0.7152, 1e-9));
    }

    #[test]
    fn test_white_black_is_21() {
        let ratio = contrast(Color::rgb(255, 255, 255), Color::rgb(0, 0, 0));
        assert!(approx_eq(ratio, 21.0, 1e-9), "B/W contrast: {ratio}");
    }

    #[test]
    fn test_white_on_near_black() {
        let ratio = contrast(Color::rgb(255, 255, 255), Color::rgb(10, 10, 10));
        assert!(ratio >= 19.0, "contrast: {ratio}");
    }

    #[test]
    fn test_symmetric_and_bounded() {
        let samples = [
            Color::rgb(29, 233, 182),
            Color::rgb(0, 0, 0),
            Color::rgb(255, 255, 255),
            Color::rgb(120, 30, 200),
            Color::rgb(128, 128, 128),
        ];
        for a in samples {
            for b in samples {
                let ab = contrast(a, b);
                assert_eq!(ab, contrast(b, a));
                assert!((1.0..=21.0 + 1e-9).contains(&ab), "out of range: {ab}");
            }
        }
    }

    #[test]
    fn test_level_thresholds() {
        assert_eq!(WcagLevel::from_ratio(7.0), WcagLevel::Aaa);
        assert_eq!(WcagLevel::from_ratio(6.99), WcagLevel::Aa);
        assert_eq!(WcagLevel::from_ratio(4.5), WcagLevel::Aa);
        assert_eq!(WcagLevel::from_ratio(4.49), WcagLevel::AaLarge);
        assert_eq!(WcagLevel::from_ratio(3.0), WcagLevel::AaLarge);
        assert_eq!(WcagLevel::from_ratio(2.99), WcagLevel::Fail);
        assert!(WcagLevel::Aaa > WcagLevel::Aa);
    }

    #[test]
    fn test_level_serde_names() {
        assert_eq!(serde_json::to_string(&WcagLevel::AaLarge).unwrap(), "\"AA-large\"");
        let parsed: WcagLevel = serde_json::from_str("\"AAA\"").unwrap();
        assert_eq!(parsed, WcagLevel::Aaa);
    }

    #[test]
    fn test_composite_over() {
        let half_black = ColorValue::new(Color::rgb(0, 0, 0), 0.5);
        assert_eq!(composite_over(half_black, Rgb::WHITE), Rgb::new(128, 128, 128));

        let clear = ColorValue::new(Color::rgb(0, 0, 0), 0.0);
        assert_eq!(composite_over(clear, Rgb::WHITE), Rgb::WHITE);
    }

    #[test]
    fn test_translucent_foreground_lowers_contrast() {
        let bg = ColorValue::opaque(Color::rgb(255, 255, 255));
        let solid = ColorValue::opaque(Color::rgb(0, 0, 0));
        let faded = solid.with_alpha_factor(0.3);
        assert!(contrast_values(faded, bg) < contrast_values(solid, bg));
    }

    #[test]
    fn test_matrix_cross_product() {
        let system = PrimitiveSystem::from_colors([
            ("teal", Color::rgb(29, 233, 182)),
            ("slate", Color::rgb(55, 71, 79)),
        ]);
        let matrix = generate_contrast_matrix(
            &system,
            &["slate".to_string(), "teal".to_string()],
            &["slate".to_string()],
            &[Step::S700, Step::S900],
            &[Step::S0, Step::S50, Step::S100],
        )
        .unwrap();

        assert_eq!(matrix.len(), 2 * 2 * 3);
        let cell = matrix.get("slate-900", "slate-0").unwrap();
        assert!(cell.ratio > 7.0);
        assert_eq!(cell.level, WcagLevel::Aaa);

        let summary = matrix.summary();
        assert_eq!(summary.aaa + summary.aa + summary.aa_large + summary.fail, 12);
    }

    #[test]
    fn test_matrix_unknown_family() {
        let system = PrimitiveSystem::from_colors([("teal", Color::rgb(29, 233, 182))]);
        let err = generate_contrast_matrix(
            &system,
            &["coral".to_string()],
            &["teal".to_string()],
            &[Step::S500],
            &[Step::S0],
        )
        .unwrap_err();
        assert_eq!(err, CompileError::unknown("contrast.foreground", "coral"));
    }
}
