//! Hueforge - Compile base colors and theme specs into design tokens
//!
//! This library provides functionality to:
//! - Convert colors between sRGB, CIELAB and CIELCH
//! - Generate 11-step primitive scales and hue harmonies from base colors
//! - Resolve nested theme specs with typed references and alpha modifiers
//! - Measure WCAG contrast across palettes and themes
//! - Prune and deduplicate tokens for production CSS output

pub mod cli;
pub mod color;
pub mod config;
pub mod contrast;
pub mod convert;
pub mod error;
pub mod harmony;
pub mod optimize;
pub mod output;
pub mod pipeline;
pub mod scale;
pub mod system;
pub mod theme;

pub use error::CompileError;
pub use pipeline::{compile, CompileOutput};
