//! Token resolution.
//!
//! Evaluation runs wave by wave over the validated dependency graph; entries
//! within a wave are independent and are evaluated in parallel. References are
//! read-only projections of their target: an alpha override produces a new
//! value and never touches the entry it points at.

use std::collections::BTreeMap;

use rayon::prelude::*;

use crate::color::ColorValue;
use crate::error::CompileError;
use crate::system::PrimitiveSystem;
use crate::theme::graph::DependencyGraph;
use crate::theme::spec::{ThemeSpec, TokenExpr, TokenPath};

/// Fully resolved theme, one concrete color per path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedTokenMap {
    tokens: BTreeMap<TokenPath, ColorValue>,
}

impl ResolvedTokenMap {
    /// Look up by dotted path (`surface.background`).
    pub fn get(&self, path: &str) -> Option<&ColorValue> {
        TokenPath::parse(path).and_then(|p| self.tokens.get(&p))
    }

    pub fn get_path(&self, path: &TokenPath) -> Option<&ColorValue> {
        self.tokens.get(path)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TokenPath, &ColorValue)> {
        self.tokens.iter()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Reject family references the system cannot satisfy, in path order.
fn check_family_refs(spec: &ThemeSpec, system: &PrimitiveSystem) -> Result<(), CompileError> {
    for (path, expr) in spec.iter() {
        if let TokenExpr::FamilyRef { family, selector } = expr {
            system.lookup(path.as_str(), family, *selector)?;
        }
    }
    Ok(())
}

fn evaluate(
    path: &TokenPath,
    expr: &TokenExpr,
    system: &PrimitiveSystem,
    resolved: &BTreeMap<TokenPath, ColorValue>,
) -> Result<ColorValue, CompileError> {
    match expr {
        TokenExpr::Literal(value) => Ok(*value),
        TokenExpr::FamilyRef { family, selector } => {
            system.lookup(path.as_str(), family, *selector).map(ColorValue::opaque)
        }
        TokenExpr::PathRef { target, alpha } => {
            let value = resolved
                .get(target)
                .ok_or_else(|| CompileError::unknown(path.as_str(), target.as_str()))?;
            Ok(value.with_alpha_factor(alpha.unwrap_or(1.0)))
        }
    }
}

/// Resolve every entry of `spec` against `system`.
///
/// Unknown families, unknown paths and cycles are all detected before any
/// value is computed; the first problem aborts the pass.
pub fn resolve(spec: &ThemeSpec, system: &PrimitiveSystem) -> Result<ResolvedTokenMap, CompileError> {
    check_family_refs(spec, system)?;
    let graph = DependencyGraph::build(spec)?;

    let mut resolved: BTreeMap<TokenPath, ColorValue> = BTreeMap::new();
    for (depth, wave) in graph.waves().into_iter().enumerate() {
        let values = wave
            .par_iter()
            .map(|path| {
                let expr =
                    spec.get(path).ok_or_else(|| CompileError::unknown(path.as_str(), path.as_str()))?;
                evaluate(path, expr, system, &resolved).map(|v| (path.clone(), v))
            })
            .collect::<Result<Vec<_>, _>>()?;

        tracing::trace!(depth, entries = values.len(), "resolved wave");
        resolved.extend(values);
    }

    tracing::debug!(tokens = resolved.len(), "resolved theme");
    Ok(ResolvedTokenMap { tokens: resolved })
}
