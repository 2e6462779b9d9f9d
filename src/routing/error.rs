//! Routing error types

use thiserror::Error;

/// Errors raised while building, resolving or reversing a route table
#[derive(Debug, Error)]
pub enum RouteError {
    /// No pattern matched, or a placeholder failed to convert
    #[error("No route matched path '{path}'")]
    NotFound { path: String },

    #[error("Reverse for '{name}' not found: {reason}")]
    NoReverseMatch { name: String, reason: String },

    #[error("Duplicate route name '{0}'")]
    DuplicateName(String),

    #[error("Duplicate route pattern '{0}'")]
    DuplicatePattern(String),

    #[error("Invalid route pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Route pattern '{pattern}' refers to unknown converter '{converter}'")]
    UnknownConverter { pattern: String, converter: String },

    #[error("Failed to compile route pattern: {0}")]
    Regex(#[from] regex::Error),
}

impl RouteError {
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound { path: path.into() }
    }

    pub fn no_reverse_match(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::NoReverseMatch {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_pattern(pattern: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error should be surfaced to clients as 404
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
