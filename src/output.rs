//! Serialization of optimized tokens and contrast reports
//!
//! - CSS: `--name: value;` custom properties, one block per scope
//! - JSON: shared value table plus per-scope name -> index maps
//! - Contrast report: pair name -> ratio and level

use std::collections::{BTreeMap, HashMap};
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::contrast::{ContrastMatrix, ContrastSummary, WcagLevel};
use crate::optimize::{NormalizedColor, OptimizedTokens};

/// Error type for output operations
#[derive(Debug)]
pub enum OutputError {
    /// IO error during file operations
    Io(io::Error),
    /// JSON encoding error
    Json(serde_json::Error),
}

impl std::fmt::Display for OutputError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputError::Io(e) => write!(f, "IO error: {}", e),
            OutputError::Json(e) => write!(f, "JSON error: {}", e),
        }
    }
}

impl std::error::Error for OutputError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OutputError::Io(e) => Some(e),
            OutputError::Json(e) => Some(e),
        }
    }
}

impl From<io::Error> for OutputError {
    fn from(e: io::Error) -> Self {
        OutputError::Io(e)
    }
}

impl From<serde_json::Error> for OutputError {
    fn from(e: serde_json::Error) -> Self {
        OutputError::Json(e)
    }
}

/// CSS literal of a normalized color: `#rrggbb` when opaque, otherwise
/// `rgb(r g b / a)`.
pub fn css_literal(color: &NormalizedColor) -> String {
    if color.is_opaque() {
        return color.rgb.to_hex();
    }
    let alpha = format!("{:.3}", color.alpha());
    let alpha = alpha.trim_end_matches('0').trim_end_matches('.');
    let alpha = if alpha.is_empty() { "0" } else { alpha };
    format!("rgb({} {} {} / {})", color.rgb.r, color.rgb.g, color.rgb.b, alpha)
}

/// Render every scope as a CSS rule of custom properties.
///
/// With `share_values`, a token whose value was already written in the same
/// block is emitted as `var(--first-name)` instead of repeating the literal.
pub fn render_css(tokens: &OptimizedTokens, share_values: bool) -> String {
    let mut out = String::new();
    for scope in tokens.scopes() {
        if scope.tokens.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(&scope.selector);
        out.push_str(" {\n");

        let mut first_owner: HashMap<usize, &str> = HashMap::new();
        for (name, &index) in &scope.tokens {
            let value = match first_owner.get(&index) {
                Some(owner) if share_values => format!("var(--{})", owner),
                _ => {
                    first_owner.insert(index, name);
                    css_literal(&tokens.values()[index])
                }
            };
            out.push_str(&format!("  --{}: {};\n", name, value));
        }
        out.push_str("}\n");
    }
    out
}

#[derive(Serialize)]
struct TokensDocument<'a> {
    values: Vec<String>,
    scopes: BTreeMap<&'a str, &'a BTreeMap<String, usize>>,
}

/// Render tokens as JSON: the shared value table and per-selector indices.
///
/// Scopes that share a selector are merged.
pub fn render_tokens_json(tokens: &OptimizedTokens) -> Result<String, OutputError> {
    let mut scopes: BTreeMap<&str, &BTreeMap<String, usize>> = BTreeMap::new();
    let mut merged: Vec<(String, BTreeMap<String, usize>)> = Vec::new();
    for scope in tokens.scopes() {
        match merged.iter_mut().find(|(sel, _)| *sel == scope.selector) {
            Some((_, map)) => map.extend(scope.tokens.iter().map(|(k, v)| (k.clone(), *v))),
            None => merged.push((scope.selector.clone(), scope.tokens.clone())),
        }
    }
    for (selector, map) in &merged {
        scopes.insert(selector.as_str(), map);
    }

    let doc = TokensDocument { values: tokens.values().iter().map(css_literal).collect(), scopes };
    Ok(serde_json::to_string_pretty(&doc)?)
}

#[derive(Serialize)]
struct PairReport {
    ratio: f64,
    level: WcagLevel,
}

#[derive(Serialize)]
struct ContrastReport {
    pairs: BTreeMap<String, PairReport>,
    summary: ContrastSummary,
}

/// Render a contrast matrix as JSON, keyed `"<fg> on <bg>"`, ratios rounded
/// to two decimals.
pub fn render_contrast_report(matrix: &ContrastMatrix) -> Result<String, OutputError> {
    let pairs = matrix
        .iter()
        .map(|(fg, bg, cell)| {
            let ratio = (cell.ratio * 100.0).round() / 100.0;
            (format!("{} on {}", fg, bg), PairReport { ratio, level: cell.level })
        })
        .collect();
    let report = ContrastReport { pairs, summary: matrix.summary() };
    Ok(serde_json::to_string_pretty(&report)?)
}

/// Sibling file a target is staged in before the final rename.
fn staging_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(".");
    name.push(path.file_name().unwrap_or_default());
    name.push(".hueforge-tmp");
    path.with_file_name(name)
}

fn stage(path: &Path, contents: &str) -> Result<(), OutputError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, contents)?;
    Ok(())
}

/// Write every `(path, contents)` pair, creating parent directories as
/// needed.
///
/// All files are staged first and only renamed into place once every one of
/// them was written, so a failure leaves none of the targets touched. The
/// error carries the target that failed.
pub fn write_outputs(files: &[(PathBuf, String)]) -> Result<(), (PathBuf, OutputError)> {
    let mut staged: Vec<(PathBuf, &Path)> = Vec::with_capacity(files.len());
    for (path, contents) in files {
        let tmp = staging_path(path);
        if let Err(e) = stage(&tmp, contents) {
            for (tmp, _) in &staged {
                let _ = fs::remove_file(tmp);
            }
            return Err((path.clone(), e));
        }
        staged.push((tmp, path));
    }
    for (tmp, path) in &staged {
        fs::rename(tmp, path).map_err(|e| (path.to_path_buf(), OutputError::from(e)))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{Color, ColorValue};
    use crate::convert::Rgb;
    use crate::optimize::{optimize, OptimizeOptions, ScopeInput};
    use std::collections::BTreeSet;

    fn tokens(entries: &[(&str, ColorValue)]) -> OptimizedTokens {
        let scope = ScopeInput {
            selector: ":root".to_string(),
            tokens: entries.iter().map(|(n, v)| (n.to_string(), *v)).collect(),
            prunable: false,
        };
        optimize(&[scope], &BTreeSet::new(), &OptimizeOptions::disabled())
    }

    #[test]
    fn test_css_literal_forms() {
        let opaque = NormalizedColor { rgb: Rgb::new(29, 233, 182), alpha_milli: 1000 };
        assert_eq!(css_literal(&opaque), "#1de9b6");

        let half = NormalizedColor { rgb: Rgb::new(0, 0, 0), alpha_milli: 500 };
        assert_eq!(css_literal(&half), "rgb(0 0 0 / 0.5)");

        let clear = NormalizedColor { rgb: Rgb::new(0, 0, 0), alpha_milli: 0 };
        assert_eq!(css_literal(&clear), "rgb(0 0 0 / 0)");

        let third = NormalizedColor { rgb: Rgb::new(1, 2, 3), alpha_milli: 333 };
        assert_eq!(css_literal(&third), "rgb(1 2 3 / 0.333)");
    }

    #[test]
    fn test_render_css_block() {
        let t = tokens(&[
            ("accent", ColorValue::opaque(Color::rgb(29, 233, 182))),
            ("muted", ColorValue::new(Color::rgb(29, 233, 182), 0.4)),
        ]);
        let css = render_css(&t, false);
        assert_eq!(css, ":root {\n  --accent: #1de9b6;\n  --muted: rgb(29 233 182 / 0.4);\n}\n");
    }

    #[test]
    fn test_render_css_shared_values() {
        let t = tokens(&[
            ("a", ColorValue::opaque(Color::rgb(1, 1, 1))),
            ("b", ColorValue::opaque(Color::rgb(1, 1, 1))),
        ]);
        assert!(render_css(&t, false).contains("--b: #010101;"));
        assert!(render_css(&t, true).contains("--b: var(--a);"));
    }

    #[test]
    fn test_render_tokens_json() {
        let t = tokens(&[
            ("a", ColorValue::opaque(Color::rgb(255, 0, 0))),
            ("b", ColorValue::opaque(Color::rgb(255, 0, 0))),
        ]);
        let json: serde_json::Value = serde_json::from_str(&render_tokens_json(&t).unwrap()).unwrap();
        assert_eq!(json["values"], serde_json::json!(["#ff0000"]));
        assert_eq!(json["scopes"][":root"]["a"], 0);
        assert_eq!(json["scopes"][":root"]["b"], 0);
    }

    #[test]
    fn test_write_outputs_creates_dirs() {
        let temp = tempfile::TempDir::new().expect("should create temp dir");
        let path = temp.path().join("nested").join("tokens.css");
        write_outputs(&[(path.clone(), ":root {}\n".to_string())]).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), ":root {}\n");
        assert_eq!(fs::read_dir(temp.path().join("nested")).unwrap().count(), 1);
    }

    #[test]
    fn test_write_outputs_failure_touches_no_target() {
        let temp = tempfile::TempDir::new().expect("should create temp dir");
        // A plain file where the second target needs a directory
        fs::write(temp.path().join("blocked"), "").unwrap();
        let css = temp.path().join("dist").join("tokens.css");
        let json = temp.path().join("blocked").join("tokens.json");

        let files = vec![(css.clone(), ":root {}\n".to_string()), (json.clone(), "{}".to_string())];
        let (failed, _) = write_outputs(&files).unwrap_err();
        assert_eq!(failed, json);
        assert!(!css.exists());
        assert_eq!(fs::read_dir(temp.path().join("dist")).unwrap().count(), 0);
    }

    #[test]
    fn test_write_outputs_replaces_existing() {
        let temp = tempfile::TempDir::new().expect("should create temp dir");
        let path = temp.path().join("tokens.css");
        fs::write(&path, "old").unwrap();
        write_outputs(&[(path.clone(), "new".to_string())]).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
    }
}
