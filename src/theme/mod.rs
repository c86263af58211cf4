//! Theme specifications and their resolution into concrete tokens.
//!
//! A theme moves through three stages:
//! 1. [`spec`] parses the authored tree into typed expressions
//! 2. [`graph`] validates references and orders entries by dependency
//! 3. [`resolve`] evaluates every entry into a [`ResolvedTokenMap`]

pub mod graph;
pub mod resolve;
pub mod spec;

pub use graph::DependencyGraph;
pub use resolve::{resolve, ResolvedTokenMap};
pub use spec::{parse_expr, SpecNode, ThemeSpec, TokenExpr, TokenPath};

/// A named theme bound to the CSS selector it is emitted under.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub name: String,
    pub selector: String,
    pub spec: ThemeSpec,
}
