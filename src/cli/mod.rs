//! Command-line interface implementation
//!
//! This module provides the CLI entry point and dispatches to submodules
//! for specific command implementations.

mod build;
mod contrast;
mod inspect;
mod watch;

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

/// Exit codes
pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;
pub(crate) const EXIT_INVALID_ARGS: u8 = 2;

/// Environment variable holding a `tracing` filter directive.
pub const LOG_ENV: &str = "HUEFORGE_LOG";

/// Hueforge - Compile base colors and theme specs into design tokens
#[derive(Parser)]
#[command(name = "hueforge")]
#[command(about = "Hueforge - Compile base colors and theme specs into CSS design tokens")]
#[command(version)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug); HUEFORGE_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Worker threads for parallel generation (default: one per core)
    #[arg(long, global = true, value_parser = clap::value_parser!(u16).range(1..))]
    pub jobs: Option<u16>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compile hueforge.toml into CSS custom properties
    Build {
        /// Config file (default: discover hueforge.toml from the current directory up)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Override the CSS output path
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Also write the JSON token table here
        #[arg(long)]
        tokens_json: Option<PathBuf>,

        /// Also write the contrast report here
        #[arg(long)]
        contrast_report: Option<PathBuf>,

        /// Alias repeated values with var() in CSS
        #[arg(long)]
        share_values: bool,

        /// Keep every primitive, skipping the pruning pass
        #[arg(long)]
        no_optimize: bool,

        /// Rebuild whenever the config file changes
        #[arg(short, long)]
        watch: bool,

        /// Compile and report without writing files
        #[arg(long)]
        dry_run: bool,
    },

    /// Print the configured contrast matrix
    Contrast {
        /// Config file (default: discover hueforge.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the primitive scale and harmony set of one color
    Scale {
        /// Base color (hex or any CSS color)
        color: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the WCAG contrast ratio of a foreground on a background
    Check {
        /// Foreground color
        foreground: String,

        /// Background color
        background: String,
    },
}

/// Install the stderr `tracing` subscriber.
///
/// `HUEFORGE_LOG` wins when set; otherwise `-v` flags pick the level.
pub fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn init_thread_pool(jobs: Option<u16>) {
    let Some(jobs) = jobs else {
        return;
    };
    if let Err(e) = rayon::ThreadPoolBuilder::new().num_threads(usize::from(jobs)).build_global() {
        tracing::warn!(error = %e, "could not configure worker pool");
    }
}

/// Run the CLI
pub fn run() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() { EXIT_INVALID_ARGS } else { EXIT_SUCCESS };
            let _ = e.print();
            return ExitCode::from(code);
        }
    };

    init_logging(cli.verbose);
    init_thread_pool(cli.jobs);

    match cli.command {
        Commands::Build {
            config,
            out,
            tokens_json,
            contrast_report,
            share_values,
            no_optimize,
            watch,
            dry_run,
        } => {
            let overrides = crate::config::loader::CliOverrides {
                out,
                tokens_json,
                contrast_report,
                share_values: share_values.then_some(true),
                no_optimize: no_optimize.then_some(true),
            };
            build::run_build(config.as_deref(), overrides, watch, dry_run)
        }
        Commands::Contrast { config, json } => contrast::run_contrast(config.as_deref(), json),
        Commands::Scale { color, json } => inspect::run_scale(&color, json),
        Commands::Check { foreground, background } => inspect::run_check(&foreground, &background),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_build_flags() {
        let cli = Cli::try_parse_from([
            "hueforge",
            "-vv",
            "--jobs",
            "2",
            "build",
            "--out",
            "dist/tokens.css",
            "--dry-run",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.jobs, Some(2));
        match cli.command {
            Commands::Build { out, dry_run, watch, .. } => {
                assert_eq!(out, Some(PathBuf::from("dist/tokens.css")));
                assert!(dry_run);
                assert!(!watch);
            }
            _ => panic!("expected build"),
        }
    }

    #[test]
    fn test_zero_jobs_rejected() {
        assert!(Cli::try_parse_from(["hueforge", "--jobs", "0", "scale", "#fff"]).is_err());
    }

    #[test]
    fn test_check_requires_two_colors() {
        assert!(Cli::try_parse_from(["hueforge", "check", "#000"]).is_err());
    }
}
