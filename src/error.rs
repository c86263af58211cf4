//! Error types for a compile pass
//!
//! Every failure aborts the whole pass: a partially resolved token map is
//! never emitted.

use thiserror::Error;

/// Error raised while building primitives, resolving tokens or checking contrast.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    /// A color literal (seed color or theme literal) could not be parsed
    #[error("invalid color at '{path}': {reason} (input: '{input}')")]
    InvalidColorInput {
        /// Token path or family name where the literal appeared
        path: String,
        /// The offending input text
        input: String,
        /// Why it was rejected
        reason: String,
    },
    /// A reference points at a family, token or path that does not exist
    #[error("unknown reference '{reference}' at '{path}'")]
    UnknownReference {
        /// Token path holding the reference
        path: String,
        /// The reference that failed to resolve
        reference: String,
    },
    /// Resolution revisited a path that was still being resolved
    #[error("cyclic reference: {}", .chain.join(" -> "))]
    CyclicReference {
        /// Full loop, first element repeated at the end
        chain: Vec<String>,
    },
    /// A numeric step outside the canonical step set
    #[error("invalid step '{step}' at '{path}', expected one of 0, 50, 100, 200, ..., 900")]
    InvalidStep {
        /// Token path holding the reference
        path: String,
        /// The step as written
        step: String,
    },
    /// A harmony label outside the fixed label set
    #[error(
        "invalid harmony label '{label}' at '{path}', expected one of base, analogous, triadic, complement, split-complement, tetradic"
    )]
    InvalidHarmonyLabel {
        /// Token path holding the reference
        path: String,
        /// The label as written
        label: String,
    },
    /// Two authored entries would emit the same custom property
    #[error("token '{path}' emits '--{name}', already emitted by '{other}'")]
    DuplicateToken {
        /// Custom property name without the leading dashes
        name: String,
        /// Path of the entry that collided
        path: String,
        /// Entry that claimed the name first
        other: String,
    },
    /// A configured contrast requirement was not met
    #[error("contrast of '{foreground}' on '{background}' is {ratio:.2}, below required {required}")]
    ContrastRequirement {
        /// Foreground token name
        foreground: String,
        /// Background token name
        background: String,
        /// Measured ratio
        ratio: f64,
        /// Level that was required
        required: String,
    },
}

impl CompileError {
    /// Shorthand for an invalid literal.
    pub fn invalid_color(
        path: impl Into<String>,
        input: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        CompileError::InvalidColorInput {
            path: path.into(),
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for an unknown reference.
    pub fn unknown(path: impl Into<String>, reference: impl Into<String>) -> Self {
        CompileError::UnknownReference { path: path.into(), reference: reference.into() }
    }

    /// Short machine-friendly name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            CompileError::InvalidColorInput { .. } => "invalid_color_input",
            CompileError::UnknownReference { .. } => "unknown_reference",
            CompileError::CyclicReference { .. } => "cyclic_reference",
            CompileError::InvalidStep { .. } => "invalid_step",
            CompileError::InvalidHarmonyLabel { .. } => "invalid_harmony_label",
            CompileError::DuplicateToken { .. } => "duplicate_token",
            CompileError::ContrastRequirement { .. } => "contrast_requirement",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_display_lists_chain() {
        let err = CompileError::CyclicReference {
            chain: vec!["a".to_string(), "b".to_string(), "a".to_string()],
        };
        assert_eq!(err.to_string(), "cyclic reference: a -> b -> a");
        assert_eq!(err.kind(), "cyclic_reference");
    }

    #[test]
    fn test_unknown_display() {
        let err = CompileError::unknown("surface.text", "slate.950");
        assert_eq!(err.to_string(), "unknown reference 'slate.950' at 'surface.text'");
    }

    #[test]
    fn test_duplicate_token_display() {
        let err = CompileError::DuplicateToken {
            name: "a-b-c".to_string(),
            path: "a-b.c".to_string(),
            other: "a.b-c".to_string(),
        };
        assert_eq!(err.to_string(), "token 'a-b.c' emits '--a-b-c', already emitted by 'a.b-c'");
        assert_eq!(err.kind(), "duplicate_token");
    }

    #[test]
    fn test_contrast_requirement_display() {
        let err = CompileError::ContrastRequirement {
            foreground: "text".to_string(),
            background: "bg".to_string(),
            ratio: 3.14159,
            required: "AA".to_string(),
        };
        assert_eq!(err.to_string(), "contrast of 'text' on 'bg' is 3.14, below required AA");
    }
}
