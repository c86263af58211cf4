//! Build command implementation

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use super::watch::{watch_and_rebuild, BuildResult, WatchOptions};
use super::{EXIT_ERROR, EXIT_SUCCESS};
use crate::config::loader::{
    find_config, load_config_file, merge_cli_overrides, project_root, resolve_path, CliOverrides,
};
use crate::output::{render_contrast_report, render_css, render_tokens_json, write_outputs};
use crate::pipeline::compile;

/// Locate the config file, either the explicit path or by discovery.
pub(crate) fn locate_config(explicit: Option<&Path>) -> Result<PathBuf, String> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => find_config().ok_or_else(|| {
            "No hueforge.toml found in the current directory or any parent".to_string()
        }),
    }
}

/// One full pass: load, compile, render and (unless `dry_run`) write.
///
/// The config is re-read on every call so watch mode sees edits.
pub(crate) fn build_once(config_path: &Path, overrides: &CliOverrides, dry_run: bool) -> BuildResult {
    let mut config = match load_config_file(config_path) {
        Ok(config) => config,
        Err(e) => return BuildResult::failed(e.to_string()),
    };
    merge_cli_overrides(&mut config, overrides);
    let root = project_root(config_path).unwrap_or_else(|| Path::new("."));

    let output = match compile(&config) {
        Ok(output) => output,
        Err(e) => return BuildResult::failed(e.to_string()),
    };

    let mut files: Vec<(PathBuf, String)> = Vec::new();
    files.push((
        resolve_path(root, &config.project.out),
        render_css(&output.tokens, config.optimize.share_values),
    ));
    if let Some(ref path) = config.project.tokens_json {
        match render_tokens_json(&output.tokens) {
            Ok(json) => files.push((resolve_path(root, path), json)),
            Err(e) => return BuildResult::failed(e.to_string()),
        }
    }
    if let Some(ref path) = config.project.contrast_report {
        match output.contrast {
            Some(ref matrix) => match render_contrast_report(matrix) {
                Ok(json) => files.push((resolve_path(root, path), json)),
                Err(e) => return BuildResult::failed(e.to_string()),
            },
            None => tracing::warn!("contrast_report is set but no contrast matrix is configured"),
        }
    }

    let mut result = BuildResult {
        tokens_emitted: output.tokens.token_count(),
        tokens_dropped: output.tokens.dropped().len(),
        ..BuildResult::default()
    };
    if !dry_run {
        if let Err((path, e)) = write_outputs(&files) {
            return BuildResult::failed(format!("{}: {}", path.display(), e));
        }
    }
    result.written = files.into_iter().map(|(path, _)| path).collect();
    result
}

/// Run the build command
pub fn run_build(
    config: Option<&Path>,
    overrides: CliOverrides,
    watch: bool,
    dry_run: bool,
) -> ExitCode {
    let config_path = match locate_config(config) {
        Ok(path) => path,
        Err(msg) => {
            eprintln!("Error: {}", msg);
            return ExitCode::from(EXIT_ERROR);
        }
    };
    tracing::info!(config = %config_path.display(), "using config");

    if watch {
        let watch_config = match load_config_file(&config_path) {
            Ok(config) => config.watch,
            Err(e) => {
                eprintln!("Error loading config: {}", e);
                return ExitCode::from(EXIT_ERROR);
            }
        };

        println!("Starting watch mode...");
        println!("Press Ctrl+C to stop");
        println!();

        let options = WatchOptions { config_path: config_path.clone(), config: watch_config };
        return match watch_and_rebuild(options, || build_once(&config_path, &overrides, dry_run)) {
            Ok(()) => ExitCode::from(EXIT_SUCCESS),
            Err(e) => {
                eprintln!("Watch error: {}", e);
                ExitCode::from(EXIT_ERROR)
            }
        };
    }

    let result = build_once(&config_path, &overrides, dry_run);
    if !result.success() {
        for error in &result.errors {
            eprintln!("Error: {}", error);
        }
        return ExitCode::from(EXIT_ERROR);
    }

    if dry_run {
        println!("Dry run - would write:");
        for path in &result.written {
            println!("  {}", path.display());
        }
    } else {
        for path in &result.written {
            println!("Wrote {}", path.display());
        }
    }
    println!("{} tokens emitted, {} primitives dropped", result.tokens_emitted, result.tokens_dropped);
    ExitCode::from(EXIT_SUCCESS)
}
