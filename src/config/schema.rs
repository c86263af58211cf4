//! Configuration schema types for `hueforge.toml`
//!
//! Defines the structure and validation rules for a token project.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::contrast::ContrastRequirement;
use crate::scale::Step;
use crate::system::is_valid_family_name;
use crate::theme::SpecNode;

/// Project metadata and output locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Project name (required)
    pub name: String,
    /// CSS custom-property output
    #[serde(default = "default_out")]
    pub out: PathBuf,
    /// Optional JSON token output
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens_json: Option<PathBuf>,
    /// Optional contrast report output
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contrast_report: Option<PathBuf>,
}

fn default_out() -> PathBuf {
    PathBuf::from("build/tokens.css")
}

/// One theme: the selector it is emitted under and its token tree
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThemeConfig {
    /// CSS selector; see [`ThemeConfig::effective_selector`] for the default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
    /// Nested role tree
    #[serde(default)]
    pub tokens: BTreeMap<String, SpecNode>,
}

impl ThemeConfig {
    /// `:root` for themes named `default` or `light`, otherwise
    /// `[data-theme="<name>"]`, unless a selector is given.
    pub fn effective_selector(&self, name: &str) -> String {
        match &self.selector {
            Some(selector) => selector.clone(),
            None if name == "default" || name == "light" => ":root".to_string(),
            None => format!("[data-theme=\"{}\"]", name),
        }
    }
}

/// Contrast matrix and requirement settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContrastConfig {
    /// Families used as foregrounds in the primitive matrix
    #[serde(default)]
    pub foreground: Vec<String>,
    /// Families used as backgrounds in the primitive matrix
    #[serde(default)]
    pub background: Vec<String>,
    #[serde(default = "default_foreground_steps")]
    pub foreground_steps: Vec<u16>,
    #[serde(default = "default_background_steps")]
    pub background_steps: Vec<u16>,
    /// Theme token paths used as foregrounds in the per-theme matrix
    #[serde(default)]
    pub foreground_tokens: Vec<String>,
    /// Theme token paths used as backgrounds in the per-theme matrix
    #[serde(default)]
    pub background_tokens: Vec<String>,
    /// Pairs every theme must satisfy
    #[serde(default)]
    pub require: Vec<ContrastRequirement>,
}

fn default_foreground_steps() -> Vec<u16> {
    vec![500, 600, 700, 800, 900]
}

fn default_background_steps() -> Vec<u16> {
    vec![0, 50, 100]
}

impl Default for ContrastConfig {
    fn default() -> Self {
        Self {
            foreground: Vec::new(),
            background: Vec::new(),
            foreground_steps: default_foreground_steps(),
            background_steps: default_background_steps(),
            foreground_tokens: Vec::new(),
            background_tokens: Vec::new(),
            require: Vec::new(),
        }
    }
}

impl ContrastConfig {
    /// Canonical foreground steps; non-canonical values are skipped
    /// (validation reports them).
    pub fn fg_steps(&self) -> Vec<Step> {
        self.foreground_steps.iter().copied().filter_map(Step::from_value).collect()
    }

    pub fn bg_steps(&self) -> Vec<Step> {
        self.background_steps.iter().copied().filter_map(Step::from_value).collect()
    }

    /// Whether any matrix is configured.
    pub fn has_matrix(&self) -> bool {
        (!self.foreground.is_empty() && !self.background.is_empty())
            || (!self.foreground_tokens.is_empty() && !self.background_tokens.is_empty())
    }
}

/// Production optimizer settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizeConfig {
    /// Drop unreferenced primitives indistinguishable from white/black
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// ΔE threshold for "indistinguishable"
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    /// Emit the generated primitive palette alongside theme tokens
    #[serde(default = "default_true")]
    pub emit_primitives: bool,
    /// Write repeated values as `var()` aliases in CSS
    #[serde(default)]
    pub share_values: bool,
}

fn default_true() -> bool {
    true
}

fn default_threshold() -> f64 {
    1.0
}

impl Default for OptimizeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold: default_threshold(),
            emit_primitives: true,
            share_values: false,
        }
    }
}

/// Watch mode configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Debounce delay in milliseconds
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u32,
    /// Clear terminal between rebuilds
    #[serde(default = "default_true")]
    pub clear_screen: bool,
}

fn default_debounce_ms() -> u32 {
    100
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 100,
            clear_screen: true,
        }
    }
}

/// Complete `hueforge.toml` configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HueforgeConfig {
    /// Project metadata (required)
    pub project: ProjectConfig,
    /// Base colors, family name -> color literal
    #[serde(default)]
    pub colors: BTreeMap<String, String>,
    /// Named themes
    #[serde(default)]
    pub themes: BTreeMap<String, ThemeConfig>,
    /// Contrast settings
    #[serde(default)]
    pub contrast: ContrastConfig,
    /// Optimizer settings
    #[serde(default)]
    pub optimize: OptimizeConfig,
    /// Watch mode settings
    #[serde(default)]
    pub watch: WatchConfig,
}

/// Configuration validation error
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    /// Path to the invalid field (e.g., "contrast.foreground_steps")
    pub field: String,
    /// Error message
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "hueforge.toml: '{}' {}", self.field, self.message)
    }
}

impl HueforgeConfig {
    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();
        let mut push = |field: String, message: &str| {
            errors.push(ConfigValidationError { field, message: message.to_string() });
        };

        if self.project.name.is_empty() {
            push("project.name".to_string(), "must be a non-empty string");
        }

        if self.colors.is_empty() {
            push("colors".to_string(), "must define at least one base color");
        }
        for name in self.colors.keys() {
            if !is_valid_family_name(name) {
                push(format!("colors.{}", name), "family names must match [a-z][a-z0-9-]*");
            }
        }

        let mut selectors: BTreeMap<String, &str> = BTreeMap::new();
        for (name, theme) in &self.themes {
            let selector = theme.effective_selector(name);
            if let Some(other) = selectors.insert(selector, name) {
                push(format!("themes.{}.selector", name), &format!("duplicates theme '{}'", other));
            }
        }

        for (field, steps) in [
            ("contrast.foreground_steps", &self.contrast.foreground_steps),
            ("contrast.background_steps", &self.contrast.background_steps),
        ] {
            for step in steps {
                if Step::from_value(*step).is_none() {
                    push(field.to_string(), &format!("{} is not a canonical step", step));
                }
            }
        }

        for (field, families) in [
            ("contrast.foreground", &self.contrast.foreground),
            ("contrast.background", &self.contrast.background),
        ] {
            for family in families {
                if !self.colors.contains_key(family) {
                    push(field.to_string(), &format!("unknown family '{}'", family));
                }
            }
        }

        if self.optimize.threshold.is_nan() || self.optimize.threshold < 0.0 {
            push("optimize.threshold".to_string(), "must be a non-negative number");
        }

        if self.watch.debounce_ms == 0 {
            push("watch.debounce_ms".to_string(), "must be a positive integer");
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_parse() {
        let toml = r##"
[project]
name = "site"

[colors]
teal = "#1DE9B6"
"##;
        let config: HueforgeConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.project.name, "site");
        assert_eq!(config.project.out, PathBuf::from("build/tokens.css"));
        assert!(config.optimize.enabled);
        assert_eq!(config.contrast.background_steps, vec![0, 50, 100]);
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_full_config_parse() {
        let toml = r##"
[project]
name = "site"
out = "dist/tokens.css"
tokens_json = "dist/tokens.json"
contrast_report = "dist/contrast.json"

[colors]
teal = "#1DE9B6"
slate = "#37474F"

[themes.light.tokens.surface]
background = "slate.0"
text = "slate.900"

[themes.light.tokens.accent]
default = "teal.500"
muted = "reference('accent.default', alpha: 40%)"

[themes.dark]
selector = ".dark"
[themes.dark.tokens.surface]
background = "slate.900"
text = "slate.0"

[contrast]
foreground = ["slate"]
background = ["slate"]
foreground_steps = [700, 900]
foreground_tokens = ["surface.text"]
background_tokens = ["surface.background"]

[[contrast.require]]
foreground = "surface.text"
background = "surface.background"
level = "AAA"

[optimize]
threshold = 2.0
share_values = true

[watch]
debounce_ms = 250
clear_screen = false
"##;
        let config: HueforgeConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.colors.len(), 2);
        assert_eq!(config.themes.len(), 2);
        assert_eq!(config.themes["light"].effective_selector("light"), ":root");
        assert_eq!(config.themes["dark"].effective_selector("dark"), ".dark");
        assert_eq!(config.contrast.fg_steps(), vec![Step::S700, Step::S900]);
        assert_eq!(config.contrast.require.len(), 1);
        assert!(config.contrast.has_matrix());
        assert!(config.optimize.share_values);
        assert_eq!(config.watch.debounce_ms, 250);
        assert!(config.validate().is_empty(), "{:?}", config.validate());
    }

    #[test]
    fn test_default_theme_selectors() {
        let theme = ThemeConfig::default();
        assert_eq!(theme.effective_selector("default"), ":root");
        assert_eq!(theme.effective_selector("dark"), "[data-theme=\"dark\"]");
    }

    #[test]
    fn test_validation_collects_all_errors() {
        let toml = r##"
[project]
name = ""

[colors]
"Bad Name" = "#000"

[contrast]
foreground = ["missing"]
foreground_steps = [550]

[optimize]
threshold = -1.0

[watch]
debounce_ms = 0
"##;
        let config: HueforgeConfig = toml::from_str(toml).unwrap();
        let fields: Vec<String> = config.validate().into_iter().map(|e| e.field).collect();
        for expected in [
            "project.name",
            "colors.Bad Name",
            "contrast.foreground_steps",
            "contrast.foreground",
            "optimize.threshold",
            "watch.debounce_ms",
        ] {
            assert!(fields.iter().any(|f| f == expected), "missing {expected} in {fields:?}");
        }
    }

    #[test]
    fn test_duplicate_selectors_rejected() {
        let toml = r##"
[project]
name = "site"

[colors]
teal = "#1DE9B6"

[themes.default.tokens]
a = "teal.500"

[themes.light.tokens]
a = "teal.600"
"##;
        let config: HueforgeConfig = toml::from_str(toml).unwrap();
        let errors = config.validate();
        assert!(errors.iter().any(|e| e.field == "themes.light.selector"));
    }

    #[test]
    fn test_validation_error_display() {
        let err = ConfigValidationError {
            field: "colors".to_string(),
            message: "must define at least one base color".to_string(),
        };
        assert_eq!(err.to_string(), "hueforge.toml: 'colors' must define at least one base color");
    }
}
