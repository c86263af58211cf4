//! Contrast command implementation

use std::path::Path;
use std::process::ExitCode;

use super::build::locate_config;
use super::{EXIT_ERROR, EXIT_SUCCESS};
use crate::config::loader::load_config_file;
use crate::contrast::ContrastMatrix;
use crate::output::render_contrast_report;
use crate::pipeline::compile;

/// Render the matrix as an aligned text table with a summary line.
pub(crate) fn format_table(matrix: &ContrastMatrix) -> String {
    let fg_width = matrix.iter().map(|(fg, _, _)| fg.len()).max().unwrap_or(0);
    let bg_width = matrix.iter().map(|(_, bg, _)| bg.len()).max().unwrap_or(0);

    let mut out = String::new();
    for (fg, bg, cell) in matrix.iter() {
        out.push_str(&format!(
            "{:<fw$}  on  {:<bw$}  {:>6.2}  {}\n",
            fg,
            bg,
            cell.ratio,
            cell.level,
            fw = fg_width,
            bw = bg_width
        ));
    }
    let s = matrix.summary();
    out.push_str(&format!(
        "\n{} pairs: {} AAA, {} AA, {} AA-large, {} fail\n",
        matrix.len(),
        s.aaa,
        s.aa,
        s.aa_large,
        s.fail
    ));
    out
}

/// Run the contrast command
pub fn run_contrast(config: Option<&Path>, json: bool) -> ExitCode {
    let config_path = match locate_config(config) {
        Ok(path) => path,
        Err(msg) => {
            eprintln!("Error: {}", msg);
            return ExitCode::from(EXIT_ERROR);
        }
    };
    let config = match load_config_file(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let output = match compile(&config) {
        Ok(output) => output,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let Some(matrix) = output.contrast else {
        eprintln!("Error: no contrast matrix configured");
        eprintln!("Set [contrast] foreground/background or foreground_tokens/background_tokens");
        return ExitCode::from(EXIT_ERROR);
    };

    if json {
        match render_contrast_report(&matrix) {
            Ok(report) => println!("{}", report),
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::from(EXIT_ERROR);
            }
        }
    } else {
        print!("{}", format_table(&matrix));
    }
    ExitCode::from(EXIT_SUCCESS)
}
