//! Primitive color system: one scale and one harmony set per color family.
//!
//! Built once per compile pass from the author's base-color map and never
//! mutated afterwards.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use rayon::prelude::*;
use regex::Regex;

use crate::color::{parse_color, Color};
use crate::error::CompileError;
use crate::harmony::{generate_harmony, HarmonyLabel, HarmonySet};
use crate::scale::{generate_scale, PrimitiveScale, Step};

/// What a `family.selector` reference points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Selector {
    Step(Step),
    Harmony(HarmonyLabel),
}

impl Selector {
    /// Parse a selector. Numeric text must be a canonical step, anything else
    /// must be a harmony label. `path` only feeds error messages.
    pub fn parse(path: &str, text: &str) -> Result<Selector, CompileError> {
        if text.chars().all(|c| c.is_ascii_digit()) {
            return Step::parse(text).map(Selector::Step).ok_or_else(|| {
                CompileError::InvalidStep { path: path.to_string(), step: text.to_string() }
            });
        }
        HarmonyLabel::parse(text).map(Selector::Harmony).ok_or_else(|| {
            CompileError::InvalidHarmonyLabel { path: path.to_string(), label: text.to_string() }
        })
    }

    /// Suffix used in primitive token names.
    pub fn token_suffix(self) -> String {
        match self {
            Selector::Step(step) => step.to_string(),
            Selector::Harmony(label) => label.as_str().to_string(),
        }
    }
}

/// Scale and harmony set of one family.
#[derive(Debug, Clone, PartialEq)]
pub struct Family {
    pub scale: PrimitiveScale,
    pub harmony: HarmonySet,
}

impl Family {
    pub fn from_base(base: Color) -> Self {
        Self { scale: generate_scale(base), harmony: generate_harmony(base) }
    }

    pub fn get(&self, selector: Selector) -> Color {
        match selector {
            Selector::Step(step) => self.scale.get(step),
            Selector::Harmony(label) => self.harmony.get(label),
        }
    }
}

fn family_name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-z][a-z0-9-]*$").expect("static regex"))
}

/// Whether `name` is usable as a family name.
pub fn is_valid_family_name(name: &str) -> bool {
    family_name_re().is_match(name)
}

/// All color families of a compile pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrimitiveSystem {
    families: BTreeMap<String, Family>,
}

impl PrimitiveSystem {
    /// Build from `family -> color literal`. Families are independent and are
    /// generated in parallel.
    pub fn build(base_colors: &BTreeMap<String, String>) -> Result<Self, CompileError> {
        let families = base_colors
            .par_iter()
            .map(|(name, literal)| {
                if !is_valid_family_name(name) {
                    return Err(CompileError::invalid_color(
                        name.as_str(),
                        literal.as_str(),
                        "family names must match [a-z][a-z0-9-]*",
                    ));
                }
                let value = parse_color(literal).map_err(|e| {
                    CompileError::invalid_color(name.as_str(), literal.as_str(), e.to_string())
                })?;
                if !value.is_opaque() {
                    tracing::warn!(family = %name, "seed color alpha ignored");
                }
                Ok((name.clone(), Family::from_base(value.color)))
            })
            .collect::<Result<BTreeMap<_, _>, _>>()?;

        tracing::debug!(families = families.len(), "built primitive system");
        Ok(Self { families })
    }

    /// Build directly from parsed colors.
    pub fn from_colors<I, S>(colors: I) -> Self
    where
        I: IntoIterator<Item = (S, Color)>,
        S: Into<String>,
    {
        let families =
            colors.into_iter().map(|(name, c)| (name.into(), Family::from_base(c))).collect();
        Self { families }
    }

    pub fn family(&self, name: &str) -> Option<&Family> {
        self.families.get(name)
    }

    pub fn family_names(&self) -> impl Iterator<Item = &str> {
        self.families.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.families.len()
    }

    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }

    /// Look up `family.selector`. `path` names the token asking, for errors.
    pub fn lookup(&self, path: &str, family: &str, selector: Selector) -> Result<Color, CompileError> {
        self.family(family)
            .map(|f| f.get(selector))
            .ok_or_else(|| CompileError::unknown(path, format!("{}.{}", family, selector.token_suffix())))
    }

    /// Every primitive as a flat `(token name, color)` list, ordered by family
    /// then by step and harmony label.
    pub fn primitive_tokens(&self) -> Vec<(String, Color)> {
        let mut out = Vec::with_capacity(self.families.len() * 17);
        for (name, family) in &self.families {
            for (step, color) in family.scale.iter() {
                out.push((format!("{}-{}", name, step), color));
            }
            for (label, color) in family.harmony.iter() {
                out.push((format!("{}-{}", name, label), color));
            }
        }
        out
    }
}
