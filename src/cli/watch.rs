//! Watch mode for automatic rebuilds on config changes
//!
//! Provides file system watching with debouncing for the `hueforge build --watch` command.

use notify::RecursiveMode;
use notify_debouncer_mini::{new_debouncer, DebouncedEventKind};
use std::path::{Path, PathBuf};
use std::sync::mpsc::channel;
use std::time::{Duration, Instant};

use crate::config::schema::WatchConfig;

/// Error during watch mode
#[derive(Debug)]
pub enum WatchError {
    /// Failed to initialize file watcher
    WatcherInit(notify::Error),
    /// Failed to add watch path
    WatchPath(notify::Error),
    /// Channel receive error
    ChannelError(String),
    /// Config file not found
    ConfigNotFound(PathBuf),
}

impl std::fmt::Display for WatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WatchError::WatcherInit(e) => write!(f, "Failed to initialize file watcher: {}", e),
            WatchError::WatchPath(e) => write!(f, "Failed to watch path: {}", e),
            WatchError::ChannelError(msg) => write!(f, "Watch channel error: {}", msg),
            WatchError::ConfigNotFound(path) => {
                write!(f, "Config file not found: {}", path.display())
            }
        }
    }
}

impl std::error::Error for WatchError {}

/// Options for watch mode
#[derive(Debug, Clone)]
pub struct WatchOptions {
    /// Config file to watch
    pub config_path: PathBuf,
    /// Watch configuration (debounce, clear screen)
    pub config: WatchConfig,
}

/// Result of a single build attempt
#[derive(Debug, Default)]
pub struct BuildResult {
    /// Number of tokens emitted
    pub tokens_emitted: usize,
    /// Number of primitives dropped by the optimizer
    pub tokens_dropped: usize,
    /// Files written
    pub written: Vec<PathBuf>,
    /// Errors; a failed build carries exactly one
    pub errors: Vec<String>,
    /// Build duration
    pub duration: Duration,
}

impl BuildResult {
    /// A result for a pass that failed with `message`
    pub fn failed(message: impl Into<String>) -> Self {
        Self { errors: vec![message.into()], ..Self::default() }
    }

    /// Check if build succeeded (no errors)
    pub fn success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Clear the terminal screen
fn clear_screen() {
    // ANSI escape code to clear screen and move cursor to top-left
    print!("\x1B[2J\x1B[1;1H");
}

/// Format duration for display
fn format_duration(duration: Duration) -> String {
    let millis = duration.as_millis();
    if millis < 1000 {
        format!("{}ms", millis)
    } else {
        format!("{:.2}s", duration.as_secs_f64())
    }
}

/// Get current timestamp for logging
fn timestamp() -> String {
    use std::time::SystemTime;
    let now = SystemTime::now().duration_since(SystemTime::UNIX_EPOCH).unwrap_or_default();
    let secs = now.as_secs() % 86400; // seconds since midnight
    let hours = (secs / 3600) % 24;
    let minutes = (secs / 60) % 60;
    let seconds = secs % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

/// Perform a single build iteration, timing it.
pub fn do_build<F>(build_fn: &mut F) -> BuildResult
where
    F: FnMut() -> BuildResult,
{
    let start = Instant::now();
    let mut result = build_fn();
    result.duration = start.elapsed();
    result
}

/// Whether a change event at `path` concerns the watched config file.
fn is_relevant_file(path: &Path, config_path: &Path) -> bool {
    match (path.file_name(), config_path.file_name()) {
        (Some(changed), Some(watched)) => changed == watched,
        _ => false,
    }
}

/// Watch the config file and rebuild whenever it changes.
///
/// The parent directory is watched rather than the file itself so that
/// editors that save by renaming a temp file are still picked up.
///
/// This function blocks and runs until interrupted (Ctrl+C). A failing
/// build is reported and watching continues.
pub fn watch_and_rebuild<F>(options: WatchOptions, mut build_fn: F) -> Result<(), WatchError>
where
    F: FnMut() -> BuildResult,
{
    if !options.config_path.is_file() {
        return Err(WatchError::ConfigNotFound(options.config_path.clone()));
    }
    let watch_dir = match options.config_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    };

    // Create channel for debounced events
    let (tx, rx) = channel();

    let debounce_duration = Duration::from_millis(u64::from(options.config.debounce_ms));
    let mut debouncer = new_debouncer(debounce_duration, tx).map_err(WatchError::WatcherInit)?;

    debouncer
        .watcher()
        .watch(&watch_dir, RecursiveMode::NonRecursive)
        .map_err(WatchError::WatchPath)?;

    if options.config.clear_screen {
        clear_screen();
    }
    println!("[{}] Building...", timestamp());
    let result = do_build(&mut build_fn);
    print_build_result(&result, false);
    let mut last_failed = !result.success();
    println!("[{}] Watching {} for changes...", timestamp(), options.config_path.display());

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                let relevant = events.iter().any(|e| {
                    matches!(e.kind, DebouncedEventKind::Any)
                        && is_relevant_file(&e.path, &options.config_path)
                });
                if !relevant {
                    continue;
                }

                if options.config.clear_screen {
                    clear_screen();
                }
                tracing::debug!(path = %options.config_path.display(), "config changed");
                println!("[{}] Building...", timestamp());
                let result = do_build(&mut build_fn);
                print_build_result(&result, last_failed);
                last_failed = !result.success();

                println!(
                    "[{}] Watching {} for changes...",
                    timestamp(),
                    options.config_path.display()
                );
            }
            Ok(Err(error)) => {
                // Watch error (non-fatal) - log but continue watching
                tracing::warn!(error = ?error, "watch error");
                eprintln!("[{}] Watch error: {:?}", timestamp(), error);
            }
            Err(e) => {
                return Err(WatchError::ChannelError(e.to_string()));
            }
        }
    }
}

/// Print build result to console; `recovered_from` notes a previous failure.
fn print_build_result(result: &BuildResult, recovered_from: bool) {
    if result.success() {
        if recovered_from {
            println!("[{}] Fixed", timestamp());
        }
        println!(
            "[{}] Build complete ({}) - Tokens: {} | Dropped: {}",
            timestamp(),
            format_duration(result.duration),
            result.tokens_emitted,
            result.tokens_dropped
        );
        for path in &result.written {
            println!("[{}] Wrote {}", timestamp(), path.display());
        }
    } else {
        println!("[{}] Build failed ({})", timestamp(), format_duration(result.duration));
        for error in &result.errors {
            eprintln!("[{}] Error: {}", timestamp(), error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_result_default() {
        let result = BuildResult::default();
        assert_eq!(result.tokens_emitted, 0);
        assert!(result.written.is_empty());
        assert!(result.success());
    }

    #[test]
    fn test_build_result_failed() {
        let result = BuildResult::failed("cyclic reference: a -> b -> a");
        assert!(!result.success());
        assert_eq!(result.errors.len(), 1);
    }

    #[test]
    fn test_is_relevant_file() {
        let config = Path::new("/site/hueforge.toml");
        assert!(is_relevant_file(Path::new("/site/hueforge.toml"), config));
        assert!(!is_relevant_file(Path::new("/site/readme.md"), config));
        assert!(!is_relevant_file(Path::new("/site/hueforge.toml~"), config));
        assert!(!is_relevant_file(Path::new("/"), config));
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(50)), "50ms");
        assert_eq!(format_duration(Duration::from_millis(999)), "999ms");
        assert_eq!(format_duration(Duration::from_millis(1000)), "1.00s");
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.50s");
    }

    #[test]
    fn test_watch_error_config_not_found() {
        let options = WatchOptions {
            config_path: PathBuf::from("/nonexistent/hueforge.toml"),
            config: WatchConfig::default(),
        };

        let result = watch_and_rebuild(options, BuildResult::default);
        assert!(matches!(result, Err(WatchError::ConfigNotFound(_))));
    }

    #[test]
    fn test_do_build_times_callback() {
        let mut calls = 0;
        let mut build = || {
            calls += 1;
            BuildResult { tokens_emitted: 12, ..BuildResult::default() }
        };
        let result = do_build(&mut build);
        assert_eq!(result.tokens_emitted, 12);
        assert!(result.success());
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_watch_error_display() {
        let err = WatchError::ConfigNotFound(PathBuf::from("hueforge.toml"));
        assert_eq!(err.to_string(), "Config file not found: hueforge.toml");
    }
}
