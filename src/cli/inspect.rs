//! Single-color inspection commands (scale, check)

use std::collections::BTreeMap;
use std::process::ExitCode;

use super::{EXIT_ERROR, EXIT_SUCCESS};
use crate::color::{parse_color, Color, ColorValue};
use crate::contrast::{contrast_values, WcagLevel};
use crate::harmony::generate_harmony;
use crate::scale::generate_scale;

fn parse_arg(input: &str) -> Result<ColorValue, ExitCode> {
    parse_color(input).map_err(|e| {
        eprintln!("Error: invalid color '{}': {}", input, e);
        ExitCode::from(EXIT_ERROR)
    })
}

fn describe(color: Color) -> String {
    let lch = color.to_lch();
    format!("{}  L {:>5.1}  C {:>5.1}  H {:>5.1}", color.to_rgb().to_hex(), lch.l, lch.c, lch.h)
}

/// Scale and harmony of `base` as a text listing; the anchor step is starred.
pub(crate) fn format_scale(base: Color) -> String {
    let scale = generate_scale(base);
    let harmony = generate_harmony(base);

    let mut out = String::from("scale\n");
    for (step, color) in scale.iter() {
        let marker = if step == scale.anchor() { '*' } else { ' ' };
        out.push_str(&format!("  {:>3}{} {}\n", step, marker, describe(color)));
    }
    out.push_str("harmony\n");
    for (label, color) in harmony.iter() {
        out.push_str(&format!("  {:<16} {}\n", label, describe(color)));
    }
    out
}

pub(crate) fn scale_json(base: Color) -> serde_json::Value {
    let scale = generate_scale(base);
    let steps: BTreeMap<String, String> =
        scale.iter().map(|(s, c)| (s.to_string(), c.to_rgb().to_hex())).collect();
    let harmony: BTreeMap<String, String> =
        generate_harmony(base).iter().map(|(l, c)| (l.to_string(), c.to_rgb().to_hex())).collect();
    serde_json::json!({
        "anchor": scale.anchor().value(),
        "scale": steps,
        "harmony": harmony,
    })
}

/// Run the scale command
pub fn run_scale(input: &str, json: bool) -> ExitCode {
    let value = match parse_arg(input) {
        Ok(v) => v,
        Err(code) => return code,
    };
    if !value.is_opaque() {
        tracing::warn!("alpha of the base color is ignored");
    }

    if json {
        match serde_json::to_string_pretty(&scale_json(value.color)) {
            Ok(s) => println!("{}", s),
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::from(EXIT_ERROR);
            }
        }
    } else {
        print!("{}", format_scale(value.color));
    }
    ExitCode::from(EXIT_SUCCESS)
}

/// Run the check command
pub fn run_check(foreground: &str, background: &str) -> ExitCode {
    let fg = match parse_arg(foreground) {
        Ok(v) => v,
        Err(code) => return code,
    };
    let bg = match parse_arg(background) {
        Ok(v) => v,
        Err(code) => return code,
    };

    let ratio = contrast_values(fg, bg);
    println!("{:.2}:1 {}", ratio, WcagLevel::from_ratio(ratio));
    ExitCode::from(EXIT_SUCCESS)
}
