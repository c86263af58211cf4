//! End-to-end compile pass.
//!
//! The pipeline turns a loaded [`HueforgeConfig`] into emitted-ready tokens:
//! primitive system, then every theme resolved and checked, then the
//! optimizer. Any error aborts the whole pass; nothing is partially emitted.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;

use crate::color::ColorValue;
use crate::config::HueforgeConfig;
use crate::contrast::{check_requirements, generate_contrast_matrix, ContrastMatrix};
use crate::error::CompileError;
use crate::optimize::{optimize, OptimizeOptions, OptimizedTokens, ScopeInput};
use crate::system::PrimitiveSystem;
use crate::theme::{resolve, ResolvedTokenMap, Theme, ThemeSpec};

/// Selector the primitive palette is emitted under.
pub const PRIMITIVE_SELECTOR: &str = ":root";

/// One theme after resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledTheme {
    pub name: String,
    pub selector: String,
    pub tokens: ResolvedTokenMap,
}

/// Everything a compile pass produces.
#[derive(Debug, Clone)]
pub struct CompileOutput {
    pub system: PrimitiveSystem,
    /// Themes in emission order: `:root` themes first, then by name
    pub themes: Vec<CompiledTheme>,
    pub tokens: OptimizedTokens,
    /// Present when the config asks for a matrix
    pub contrast: Option<ContrastMatrix>,
}

impl CompileOutput {
    pub fn theme(&self, name: &str) -> Option<&CompiledTheme> {
        self.themes.iter().find(|t| t.name == name)
    }
}

/// Parse every configured theme. Themes on `:root` come first so that later
/// selectors of equal specificity override them in CSS.
pub fn parse_themes(config: &HueforgeConfig) -> Result<Vec<Theme>, CompileError> {
    let mut themes = config
        .themes
        .iter()
        .map(|(name, theme)| {
            Ok(Theme {
                name: name.clone(),
                selector: theme.effective_selector(name),
                spec: ThemeSpec::from_tree(&theme.tokens)?,
            })
        })
        .collect::<Result<Vec<_>, CompileError>>()?;
    themes.sort_by(|a, b| {
        (a.selector != PRIMITIVE_SELECTOR, &a.name).cmp(&(b.selector != PRIMITIVE_SELECTOR, &b.name))
    });
    Ok(themes)
}

/// Primitive token names referenced directly by any theme.
pub fn referenced_primitives(themes: &[Theme]) -> BTreeSet<String> {
    themes
        .iter()
        .flat_map(|t| t.spec.family_refs())
        .map(|(family, selector)| format!("{}-{}", family, selector.token_suffix()))
        .collect()
}

fn optimize_options(config: &HueforgeConfig) -> OptimizeOptions {
    if config.optimize.enabled {
        OptimizeOptions { threshold: config.optimize.threshold, ..OptimizeOptions::default() }
    } else {
        OptimizeOptions::disabled()
    }
}

fn contrast_matrix(
    config: &HueforgeConfig,
    system: &PrimitiveSystem,
    themes: &[CompiledTheme],
) -> Result<Option<ContrastMatrix>, CompileError> {
    let contrast = &config.contrast;
    if !contrast.has_matrix() {
        return Ok(None);
    }

    let mut matrix = ContrastMatrix::default();
    if !contrast.foreground.is_empty() && !contrast.background.is_empty() {
        matrix.extend(generate_contrast_matrix(
            system,
            &contrast.foreground,
            &contrast.background,
            &contrast.fg_steps(),
            &contrast.bg_steps(),
        )?);
    }
    if !contrast.foreground_tokens.is_empty() && !contrast.background_tokens.is_empty() {
        for theme in themes {
            let cells = ContrastMatrix::from_tokens(
                &theme.tokens,
                &contrast.foreground_tokens,
                &contrast.background_tokens,
            )?;
            matrix.extend(cells.prefixed(&theme.name));
        }
    }
    Ok(Some(matrix))
}

/// Custom property names already claimed, per selector.
#[derive(Default)]
struct EmittedNames {
    owners: BTreeMap<(String, String), String>,
}

impl EmittedNames {
    /// Claim `name` under `selector` for `owner`, failing if another entry
    /// already emits the same property there.
    fn claim(&mut self, selector: &str, name: &str, owner: String) -> Result<(), CompileError> {
        let key = (selector.to_string(), name.to_string());
        if let Some(other) = self.owners.get(&key) {
            return Err(CompileError::DuplicateToken {
                name: name.to_string(),
                path: owner,
                other: other.clone(),
            });
        }
        self.owners.insert(key, owner);
        Ok(())
    }
}

/// Run a full compile pass over `config`.
pub fn compile(config: &HueforgeConfig) -> Result<CompileOutput, CompileError> {
    let start = Instant::now();

    let system = PrimitiveSystem::build(&config.colors)?;
    let themes = parse_themes(config)?;
    let keep = referenced_primitives(&themes);

    let mut compiled = Vec::with_capacity(themes.len());
    for theme in &themes {
        let tokens = resolve(&theme.spec, &system)?;
        check_requirements(&tokens, &config.contrast.require)?;
        tracing::debug!(theme = %theme.name, tokens = tokens.len(), "theme compiled");
        compiled.push(CompiledTheme {
            name: theme.name.clone(),
            selector: theme.selector.clone(),
            tokens,
        });
    }

    let contrast = contrast_matrix(config, &system, &compiled)?;

    let mut names = EmittedNames::default();
    let mut scopes = Vec::with_capacity(compiled.len() + 1);
    if config.optimize.emit_primitives {
        let mut tokens = Vec::new();
        for (name, color) in system.primitive_tokens() {
            names.claim(PRIMITIVE_SELECTOR, &name, format!("primitive {}", name))?;
            tokens.push((name, ColorValue::opaque(color)));
        }
        scopes.push(ScopeInput { selector: PRIMITIVE_SELECTOR.to_string(), tokens, prunable: true });
    }
    for theme in &compiled {
        let mut tokens = Vec::with_capacity(theme.tokens.len());
        for (path, value) in theme.tokens.iter() {
            let name = path.token_name();
            names.claim(&theme.selector, &name, format!("{}:{}", theme.name, path))?;
            tokens.push((name, *value));
        }
        scopes.push(ScopeInput { selector: theme.selector.clone(), tokens, prunable: false });
    }

    let tokens = optimize(&scopes, &keep, &optimize_options(config));

    tracing::info!(
        project = %config.project.name,
        families = system.len(),
        themes = compiled.len(),
        tokens = tokens.token_count(),
        dropped = tokens.dropped().len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "compile finished"
    );

    Ok(CompileOutput { system, themes: compiled, tokens, contrast })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::Rgb;

    fn config(toml: &str) -> HueforgeConfig {
        toml::from_str(toml).expect("test config should parse")
    }

    const SITE: &str = r##"
[project]
name = "site"

[colors]
teal = "#1DE9B6"
paper = "#ffffff"

[themes.light.tokens.accent]
default = "teal.500"
muted = "reference('accent.default', alpha: 40%)"

[themes.dark]
[themes.dark.tokens.accent]
default = "teal.300"
"##;

    #[test]
    fn test_compile_site() {
        let out = compile(&config(SITE)).unwrap();
        assert_eq!(out.system.len(), 2);
        assert_eq!(out.themes.len(), 2);
        assert_eq!(out.themes[0].name, "light");
        assert_eq!(out.themes[0].selector, ":root");
        assert_eq!(out.themes[1].selector, "[data-theme=\"dark\"]");

        let muted = out.theme("light").unwrap().tokens.get("accent.muted").unwrap();
        assert!((muted.alpha - 0.4).abs() < 1e-12);
        assert!(out.contrast.is_none());
    }

    #[test]
    fn test_compile_prunes_unreferenced_white() {
        let out = compile(&config(SITE)).unwrap();
        let dropped = out.tokens.dropped();
        assert!(dropped.contains(&"paper-0".to_string()));
        assert!(dropped.contains(&"paper-base".to_string()));
        assert!(out.tokens.value_of(":root", "paper-500").is_some());
        assert!(out.tokens.value_of(":root", "accent-default").is_some());
    }

    #[test]
    fn test_referenced_primitive_survives() {
        let mut cfg = config(SITE);
        cfg.themes.get_mut("dark").unwrap().tokens.insert(
            "surface".to_string(),
            crate::theme::SpecNode::Leaf("paper.0".to_string()),
        );
        let out = compile(&cfg).unwrap();
        assert_eq!(out.tokens.value_of(":root", "paper-0").unwrap().rgb, Rgb::WHITE);
        assert!(out.tokens.dropped().contains(&"paper-base".to_string()));
    }

    #[test]
    fn test_disabled_optimizer_keeps_everything() {
        let mut cfg = config(SITE);
        cfg.optimize.enabled = false;
        let out = compile(&cfg).unwrap();
        assert!(out.tokens.dropped().is_empty());
        // 17 primitives per family plus three theme tokens
        assert_eq!(out.tokens.token_count(), 2 * 17 + 3);
    }

    #[test]
    fn test_unknown_family_aborts() {
        let cfg = config(
            r##"
[project]
name = "site"
[colors]
teal = "#1DE9B6"
[themes.light.tokens]
accent = "coral.500"
"##,
        );
        let err = compile(&cfg).unwrap_err();
        assert_eq!(err.kind(), "unknown_reference");
    }

    #[test]
    fn test_cycle_aborts() {
        let cfg = config(
            r##"
[project]
name = "site"
[colors]
teal = "#1DE9B6"
[themes.light.tokens]
a = "reference(b)"
b = "reference(a)"
"##,
        );
        match compile(&cfg).unwrap_err() {
            CompileError::CyclicReference { chain } => assert_eq!(chain, vec!["a", "b", "a"]),
            other => panic!("expected cycle, got {other:?}"),
        }
    }

    #[test]
    fn test_requirement_failure_aborts() {
        let cfg = config(
            r##"
[project]
name = "site"
[colors]
teal = "#1DE9B6"
[themes.light.tokens]
text = "teal.100"
background = "#ffffff"
[[contrast.require]]
foreground = "text"
background = "background"
level = "AA"
"##,
        );
        let err = compile(&cfg).unwrap_err();
        assert_eq!(err.kind(), "contrast_requirement");
    }

    #[test]
    fn test_contrast_matrix_named_per_theme() {
        let cfg = config(
            r##"
[project]
name = "site"
[colors]
slate = "#37474F"
[themes.light.tokens]
text = "slate.900"
background = "slate.0"
[contrast]
foreground = ["slate"]
background = ["slate"]
foreground_steps = [900]
background_steps = [0]
foreground_tokens = ["text"]
background_tokens = ["background"]
"##,
        );
        let out = compile(&cfg).unwrap();
        let matrix = out.contrast.unwrap();
        assert_eq!(matrix.len(), 2);
        let primitive = matrix.get("slate-900", "slate-0").unwrap();
        let themed = matrix.get("light:text", "light:background").unwrap();
        assert!((primitive.ratio - themed.ratio).abs() < 1e-12);
    }

    #[test]
    fn test_theme_token_shadowing_primitive_aborts() {
        let cfg = config(
            r##"
[project]
name = "site"
[colors]
teal = "#1DE9B6"
[themes.light.tokens.teal]
500 = "#000000"
"##,
        );
        match compile(&cfg).unwrap_err() {
            CompileError::DuplicateToken { name, path, other } => {
                assert_eq!(name, "teal-500");
                assert_eq!(path, "light:teal.500");
                assert_eq!(other, "primitive teal-500");
            }
            other => panic!("expected duplicate token, got {other:?}"),
        }
    }

    #[test]
    fn test_theme_token_without_primitives_is_allowed() {
        let mut cfg = config(
            r##"
[project]
name = "site"
[colors]
teal = "#1DE9B6"
[themes.light.tokens.teal]
500 = "#000000"
"##,
        );
        cfg.optimize.emit_primitives = false;
        let out = compile(&cfg).unwrap();
        assert_eq!(out.tokens.value_of(":root", "teal-500").unwrap().rgb, Rgb::BLACK);
    }

    #[test]
    fn test_aliased_theme_paths_abort() {
        let cfg = config(
            r##"
[project]
name = "site"
[colors]
teal = "#1DE9B6"
[themes.light.tokens]
"a.b-c" = "#ff0000"
[themes.light.tokens.a-b]
c = "#0000ff"
"##,
        );
        assert_eq!(compile(&cfg).unwrap_err().kind(), "invalid_color_input");

        let cfg = config(
            r##"
[project]
name = "site"
[colors]
teal = "#1DE9B6"
[themes.light.tokens.a]
b-c = "#ff0000"
[themes.light.tokens.a-b]
c = "#0000ff"
"##,
        );
        assert_eq!(compile(&cfg).unwrap_err().kind(), "duplicate_token");
    }

    #[test]
    fn test_compile_is_deterministic() {
        let cfg = config(SITE);
        let a = compile(&cfg).unwrap();
        let b = compile(&cfg).unwrap();
        assert_eq!(a.tokens, b.tokens);
        assert_eq!(a.themes, b.themes);
    }
}
