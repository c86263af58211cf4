//! Configuration module for hueforge projects
//!
//! Provides types and parsing for `hueforge.toml` project configuration.

pub mod loader;
pub mod schema;

pub use schema::*;
