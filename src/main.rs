//! Hueforge - Command-line tool for compiling color design tokens

use std::process::ExitCode;

use hueforge::cli;

fn main() -> ExitCode {
    cli::run()
}
