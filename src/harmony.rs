//! Harmony generation by fixed hue rotation in CIELCH.
//!
//! Lightness and chroma of the base are kept for every derived entry; only
//! the hue moves.

use std::fmt;

use crate::color::Color;
use crate::convert::{normalize_hue, Lch};

/// Fixed harmony labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HarmonyLabel {
    Base,
    Analogous,
    Triadic,
    Complement,
    SplitComplement,
    Tetradic,
}

impl HarmonyLabel {
    pub const ALL: [HarmonyLabel; 6] = [
        HarmonyLabel::Base,
        HarmonyLabel::Analogous,
        HarmonyLabel::Triadic,
        HarmonyLabel::Complement,
        HarmonyLabel::SplitComplement,
        HarmonyLabel::Tetradic,
    ];

    /// Hue rotation in degrees.
    pub const fn rotation(self) -> f64 {
        match self {
            HarmonyLabel::Base => 0.0,
            HarmonyLabel::Analogous => 30.0,
            HarmonyLabel::Triadic => 120.0,
            HarmonyLabel::Complement => 180.0,
            HarmonyLabel::SplitComplement => 150.0,
            HarmonyLabel::Tetradic => 90.0,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            HarmonyLabel::Base => "base",
            HarmonyLabel::Analogous => "analogous",
            HarmonyLabel::Triadic => "triadic",
            HarmonyLabel::Complement => "complement",
            HarmonyLabel::SplitComplement => "split-complement",
            HarmonyLabel::Tetradic => "tetradic",
        }
    }

    pub fn parse(s: &str) -> Option<HarmonyLabel> {
        HarmonyLabel::ALL.into_iter().find(|label| label.as_str() == s)
    }
}

impl fmt::Display for HarmonyLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// The six harmony colors of one base color.
#[derive(Debug, Clone, PartialEq)]
pub struct HarmonySet {
    colors: [Color; 6],
}

impl HarmonySet {
    pub fn get(&self, label: HarmonyLabel) -> Color {
        self.colors[label as usize]
    }

    pub fn base(&self) -> Color {
        self.get(HarmonyLabel::Base)
    }

    pub fn complement(&self) -> Color {
        self.get(HarmonyLabel::Complement)
    }

    /// Entries in canonical label order.
    pub fn iter(&self) -> impl Iterator<Item = (HarmonyLabel, Color)> + '_ {
        HarmonyLabel::ALL.into_iter().map(move |label| (label, self.get(label)))
    }
}

/// Derive the harmony set of `base`. The `base` entry is the input itself.
pub fn generate_harmony(base: Color) -> HarmonySet {
    let lch = base.to_lch();
    let colors = HarmonyLabel::ALL.map(|label| match label {
        HarmonyLabel::Base => base,
        _ => Color::Lch(Lch { l: lch.l, c: lch.c, h: normalize_hue(lch.h + label.rotation()) }),
    });
    HarmonySet { colors }
}
