//! Production optimization of resolved tokens.
//!
//! Two order-independent passes over immutable input:
//!
//! 1. Pruning: tokens in a prunable scope (the generated primitives) whose
//!    color is within a ΔE threshold of a reference color (white, black) are
//!    dropped, unless some theme entry still references them.
//! 2. Normalization: colors become integer RGB plus alpha in thousandths, and
//!    identical values share one slot in a value table. Token names are never
//!    merged; only storage is shared.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::Serialize;

use crate::color::{Color, ColorValue};
use crate::convert::Rgb;

/// Pruning settings.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizeOptions {
    /// Tokens strictly closer than this ΔE to a reference are prunable
    pub threshold: f64,
    /// Colors that prunable tokens are compared against
    pub references: Vec<Color>,
}

impl Default for OptimizeOptions {
    fn default() -> Self {
        Self { threshold: 1.0, references: vec![Color::rgb(255, 255, 255), Color::rgb(0, 0, 0)] }
    }
}

impl OptimizeOptions {
    /// Normalize and share values without dropping anything.
    pub fn disabled() -> Self {
        Self { threshold: 0.0, references: Vec::new() }
    }
}

/// Integer RGB plus alpha in thousandths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NormalizedColor {
    pub rgb: Rgb,
    pub alpha_milli: u16,
}

impl NormalizedColor {
    pub fn from_value(value: &ColorValue) -> Self {
        let alpha_milli = (value.alpha.clamp(0.0, 1.0) * 1000.0).round() as u16;
        Self { rgb: value.color.to_rgb(), alpha_milli }
    }

    pub fn alpha(&self) -> f64 {
        f64::from(self.alpha_milli) / 1000.0
    }

    pub fn is_opaque(&self) -> bool {
        self.alpha_milli >= 1000
    }
}

/// One group of tokens to optimize, emitted under one selector.
#[derive(Debug, Clone, PartialEq)]
pub struct ScopeInput {
    pub selector: String,
    pub tokens: Vec<(String, ColorValue)>,
    /// Whether tokens of this scope may be dropped
    pub prunable: bool,
}

/// A scope after optimization: token name -> index into the value table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimizedScope {
    pub selector: String,
    pub tokens: BTreeMap<String, usize>,
}

/// Result of [`optimize`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OptimizedTokens {
    values: Vec<NormalizedColor>,
    scopes: Vec<OptimizedScope>,
    #[serde(skip)]
    dropped: Vec<String>,
}

impl OptimizedTokens {
    pub fn values(&self) -> &[NormalizedColor] {
        &self.values
    }

    pub fn scopes(&self) -> &[OptimizedScope] {
        &self.scopes
    }

    /// Names dropped by pruning, sorted.
    pub fn dropped(&self) -> &[String] {
        &self.dropped
    }

    /// Value of `name` in the scope emitted under `selector`.
    pub fn value_of(&self, selector: &str, name: &str) -> Option<NormalizedColor> {
        self.scopes
            .iter()
            .filter(|s| s.selector == selector)
            .find_map(|s| s.tokens.get(name))
            .map(|&i| self.values[i])
    }

    /// Number of emitted tokens across all scopes.
    pub fn token_count(&self) -> usize {
        self.scopes.iter().map(|s| s.tokens.len()).sum()
    }
}

fn is_prunable(value: &ColorValue, options: &OptimizeOptions) -> bool {
    value.is_opaque()
        && options.references.iter().any(|r| value.color.delta_e(*r) < options.threshold)
}

/// Optimize a set of scopes. `keep` names tokens that must survive pruning.
pub fn optimize(
    scopes: &[ScopeInput],
    keep: &BTreeSet<String>,
    options: &OptimizeOptions,
) -> OptimizedTokens {
    let mut values: Vec<NormalizedColor> = Vec::new();
    let mut slots: HashMap<NormalizedColor, usize> = HashMap::new();
    let mut dropped = Vec::new();
    let mut out_scopes = Vec::with_capacity(scopes.len());

    for scope in scopes {
        let mut tokens = BTreeMap::new();
        for (name, value) in &scope.tokens {
            if scope.prunable && !keep.contains(name) && is_prunable(value, options) {
                dropped.push(name.clone());
                continue;
            }
            let normalized = NormalizedColor::from_value(value);
            let index = *slots.entry(normalized).or_insert_with(|| {
                values.push(normalized);
                values.len() - 1
            });
            tokens.insert(name.clone(), index);
        }
        out_scopes.push(OptimizedScope { selector: scope.selector.clone(), tokens });
    }

    dropped.sort();
    tracing::debug!(
        dropped = dropped.len(),
        unique_values = values.len(),
        "optimized token set"
    );
    OptimizedTokens { values, scopes: out_scopes, dropped }
}
