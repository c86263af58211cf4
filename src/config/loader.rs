//! Configuration loading and discovery for `hueforge.toml`
//!
//! Provides functions to find, load, and merge configuration. JSON and JSON5
//! files with the same schema are accepted alongside TOML.

use super::schema::HueforgeConfig;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Config file names, in discovery order.
pub const CONFIG_FILE_NAMES: &[&str] = &["hueforge.toml", "hueforge.json5", "hueforge.json"];

/// Configuration loading error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error
    #[error("Failed to parse hueforge.toml: {0}")]
    Parse(#[from] toml::de::Error),
    /// JSON / JSON5 parsing error
    #[error("Failed to parse JSON config: {0}")]
    ParseJson(#[from] json5::Error),
    /// No config file could be found
    #[error("No hueforge.toml found in {0} or any parent directory")]
    NotFound(PathBuf),
    /// Validation error
    #[error("Config validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<String>),
}

/// CLI arguments that can override config values
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    /// Override CSS output path
    pub out: Option<PathBuf>,
    /// Override JSON token output path
    pub tokens_json: Option<PathBuf>,
    /// Override contrast report path
    pub contrast_report: Option<PathBuf>,
    /// Force value sharing in CSS output
    pub share_values: Option<bool>,
    /// Disable pruning
    pub no_optimize: Option<bool>,
}

/// Find a config file by walking up from the current working directory.
///
/// # Example
/// ```ignore
/// if let Some(config_path) = find_config() {
///     println!("Found config at: {}", config_path.display());
/// }
/// ```
pub fn find_config() -> Option<PathBuf> {
    env::current_dir().ok().and_then(find_config_from)
}

/// Find a config file by walking up from a specific directory.
///
/// This is the internal implementation that allows specifying the start directory,
/// useful for testing.
pub fn find_config_from(start: PathBuf) -> Option<PathBuf> {
    let mut current = start;

    loop {
        for name in CONFIG_FILE_NAMES {
            let config_path = current.join(name);
            if config_path.exists() {
                return Some(config_path);
            }
        }

        // Move to parent directory
        if !current.pop() {
            // Reached root, no config found
            return None;
        }
    }
}

/// Load configuration from a config file.
///
/// If a path is provided, loads from that file. Otherwise, uses `find_config()`
/// to locate the config file; when none exists this is an error, since a
/// compile pass without base colors has nothing to do.
///
/// # Example
/// ```ignore
/// // Load from discovered config
/// let config = load_config(None)?;
///
/// // Load from specific path
/// let config = load_config(Some(Path::new("site/hueforge.toml")))?;
/// ```
pub fn load_config(path: Option<&Path>) -> Result<HueforgeConfig, ConfigError> {
    let config_path = match path {
        Some(p) => p.to_path_buf(),
        None => find_config().ok_or_else(|| {
            ConfigError::NotFound(env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
        })?,
    };
    load_config_file(&config_path)
}

/// Load configuration from a specific file path.
pub fn load_config_file(path: &Path) -> Result<HueforgeConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let config = parse_config(path, &contents)?;
    tracing::debug!(path = %path.display(), "loaded config");
    Ok(config)
}

/// Parse and validate config text; the extension of `path` picks the format.
pub fn parse_config(path: &Path, contents: &str) -> Result<HueforgeConfig, ConfigError> {
    let config: HueforgeConfig = match path.extension().and_then(|e| e.to_str()) {
        Some("json") | Some("json5") => json5::from_str(contents)?,
        _ => toml::from_str(contents)?,
    };

    // Validate the config
    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors.into_iter().map(|e| e.to_string()).collect()));
    }

    Ok(config)
}

/// Merge CLI overrides into a configuration.
///
/// CLI arguments take precedence over config file values.
pub fn merge_cli_overrides(config: &mut HueforgeConfig, overrides: &CliOverrides) {
    if let Some(ref out) = overrides.out {
        config.project.out = out.clone();
    }

    if let Some(ref tokens_json) = overrides.tokens_json {
        config.project.tokens_json = Some(tokens_json.clone());
    }

    if let Some(ref report) = overrides.contrast_report {
        config.project.contrast_report = Some(report.clone());
    }

    if let Some(share) = overrides.share_values {
        config.optimize.share_values = share;
    }

    if overrides.no_optimize == Some(true) {
        config.optimize.enabled = false;
    }
}

/// Get the project root directory from a config file path.
///
/// Returns the parent directory of the config file.
pub fn project_root(config_path: &Path) -> Option<&Path> {
    config_path.parent()
}

/// Resolve a path relative to the project root.
///
/// If the path is absolute, returns it unchanged.
/// If relative, joins it with the project root.
pub fn resolve_path(project_root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        project_root.join(path)
    }
}
