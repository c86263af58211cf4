//! Theme specification: typed token paths and parsed token expressions.
//!
//! A theme is authored as a nested table whose leaves are strings. Each leaf is
//! parsed up front into one of three expression kinds:
//!
//! - a color literal (`#1DE9B6`, `rgb(0 0 0 / 50%)`, `white`)
//! - a family reference (`teal.500`, `teal.complement`)
//! - a path reference (`reference('surface.background', alpha: 40%)`)

use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::color::{parse_color, ColorValue};
use crate::error::CompileError;
use crate::system::Selector;

fn segment_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("static regex"))
}

fn family_ref_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([a-z][a-z0-9-]*)\.([a-z0-9-]+)$").expect("static regex"))
}

fn reference_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r#"^reference\(\s*(['"]?)([A-Za-z0-9_.-]+)(['"]?)\s*(?:,\s*(?:alpha\s*:\s*)?([0-9]*\.?[0-9]+)\s*(%?)\s*)?\)$"#,
        )
        .expect("static regex")
    })
}

/// Dot-separated path of a theme entry, e.g. `surface.background`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TokenPath(String);

impl TokenPath {
    /// Parse a dotted path. Every segment must be non-empty and made of
    /// letters, digits, `-` or `_`.
    pub fn parse(s: &str) -> Option<TokenPath> {
        let s = s.trim();
        if s.is_empty() || !s.split('.').all(|seg| segment_re().is_match(seg)) {
            return None;
        }
        Some(TokenPath(s.to_string()))
    }

    /// Join a parent path and a child key.
    pub fn child(parent: Option<&TokenPath>, key: &str) -> Option<TokenPath> {
        match parent {
            Some(p) => TokenPath::parse(&format!("{}.{}", p.0, key)),
            None => TokenPath::parse(key),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.')
    }

    /// Name used for the emitted custom property (`surface-background`).
    pub fn token_name(&self) -> String {
        self.0.replace('.', "-")
    }
}

impl fmt::Display for TokenPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for TokenPath {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        TokenPath::parse(&value).ok_or_else(|| format!("invalid token path '{}'", value))
    }
}

impl From<TokenPath> for String {
    fn from(path: TokenPath) -> Self {
        path.0
    }
}

/// A parsed theme leaf.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenExpr {
    Literal(ColorValue),
    FamilyRef { family: String, selector: Selector },
    PathRef { target: TokenPath, alpha: Option<f64> },
}

impl TokenExpr {
    /// Path this expression depends on, if any.
    pub fn dependency(&self) -> Option<&TokenPath> {
        match self {
            TokenExpr::PathRef { target, .. } => Some(target),
            _ => None,
        }
    }
}

fn parse_alpha(path: &str, text: &str, number: &str, percent: bool) -> Result<f64, CompileError> {
    let value: f64 = number
        .parse()
        .map_err(|_| CompileError::invalid_color(path, text, "alpha is not a number"))?;
    let alpha = if percent { value / 100.0 } else { value };
    if !(0.0..=1.0).contains(&alpha) {
        return Err(CompileError::invalid_color(path, text, "alpha must be within 0-100%"));
    }
    Ok(alpha)
}

/// Parse one theme leaf found at `path`.
pub fn parse_expr(path: &str, text: &str) -> Result<TokenExpr, CompileError> {
    let trimmed = text.trim();

    if trimmed.starts_with("reference(") {
        let caps = reference_re().captures(trimmed).ok_or_else(|| {
            CompileError::invalid_color(path, text, "malformed reference expression")
        })?;
        if caps[1] != caps[3] {
            return Err(CompileError::invalid_color(path, text, "unbalanced quotes in reference"));
        }
        let target = TokenPath::parse(&caps[2])
            .ok_or_else(|| CompileError::invalid_color(path, text, "invalid reference path"))?;
        let alpha = match caps.get(4) {
            Some(number) => Some(parse_alpha(path, text, number.as_str(), !caps[5].is_empty())?),
            None => None,
        };
        return Ok(TokenExpr::PathRef { target, alpha });
    }

    if let Some(caps) = family_ref_re().captures(trimmed) {
        let selector = Selector::parse(path, &caps[2])?;
        return Ok(TokenExpr::FamilyRef { family: caps[1].to_string(), selector });
    }

    parse_color(trimmed)
        .map(TokenExpr::Literal)
        .map_err(|e| CompileError::invalid_color(path, text, e.to_string()))
}

/// Nested authoring form of a theme.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SpecNode {
    Leaf(String),
    Branch(BTreeMap<String, SpecNode>),
}

/// A theme with every leaf parsed, keyed by path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThemeSpec {
    entries: BTreeMap<TokenPath, TokenExpr>,
}

impl ThemeSpec {
    /// Flatten and parse a nested theme table.
    pub fn from_tree(root: &BTreeMap<String, SpecNode>) -> Result<Self, CompileError> {
        let mut entries = BTreeMap::new();
        flatten(None, root, &mut entries)?;
        check_token_names(&entries)?;
        Ok(Self { entries })
    }

    /// Build from flat `(path, expression)` pairs.
    pub fn from_entries<'a, I>(entries: I) -> Result<Self, CompileError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut out = BTreeMap::new();
        for (path, text) in entries {
            let key = TokenPath::parse(path)
                .ok_or_else(|| CompileError::invalid_color(path, text, "invalid token path"))?;
            let expr = parse_expr(path, text)?;
            insert_entry(&mut out, key, expr)?;
        }
        check_token_names(&out)?;
        Ok(Self { entries: out })
    }

    pub fn get(&self, path: &TokenPath) -> Option<&TokenExpr> {
        self.entries.get(path)
    }

    pub fn contains(&self, path: &TokenPath) -> bool {
        self.entries.contains_key(path)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TokenPath, &TokenExpr)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every `(family, selector)` pair referenced directly by this theme.
    pub fn family_refs(&self) -> impl Iterator<Item = (&str, Selector)> {
        self.entries.values().filter_map(|expr| match expr {
            TokenExpr::FamilyRef { family, selector } => Some((family.as_str(), *selector)),
            _ => None,
        })
    }
}

fn flatten(
    parent: Option<&TokenPath>,
    node: &BTreeMap<String, SpecNode>,
    out: &mut BTreeMap<TokenPath, TokenExpr>,
) -> Result<(), CompileError> {
    for (key, child) in node {
        // A dotted key would alias a nested entry with the same path.
        let path = segment_re().is_match(key).then(|| TokenPath::child(parent, key)).flatten();
        let path = path.ok_or_else(|| {
            let shown = parent.map(|p| format!("{}.{}", p, key)).unwrap_or_else(|| key.clone());
            CompileError::invalid_color(shown, key.as_str(), "invalid token path segment")
        })?;
        match child {
            SpecNode::Leaf(text) => {
                let expr = parse_expr(path.as_str(), text)?;
                insert_entry(out, path, expr)?;
            }
            SpecNode::Branch(children) => flatten(Some(&path), children, out)?,
        }
    }
    Ok(())
}

fn insert_entry(
    out: &mut BTreeMap<TokenPath, TokenExpr>,
    path: TokenPath,
    expr: TokenExpr,
) -> Result<(), CompileError> {
    if out.contains_key(&path) {
        return Err(CompileError::DuplicateToken {
            name: path.token_name(),
            path: path.to_string(),
            other: path.to_string(),
        });
    }
    out.insert(path, expr);
    Ok(())
}

/// Distinct paths must map to distinct custom properties; `a.b-c` and
/// `a-b.c` both flatten to `--a-b-c`.
fn check_token_names(entries: &BTreeMap<TokenPath, TokenExpr>) -> Result<(), CompileError> {
    let mut names: BTreeMap<String, &TokenPath> = BTreeMap::new();
    for path in entries.keys() {
        if let Some(other) = names.insert(path.token_name(), path) {
            return Err(CompileError::DuplicateToken {
                name: path.token_name(),
                path: path.to_string(),
                other: other.to_string(),
            });
        }
    }
    Ok(())
}
