// SPDX-License-Identifier: MIT

//! Typed error handling for condition trees

use thiserror::Error;

/// Errors raised while building or mutating an expression tree.
///
/// Integrity problems are not errors; they are collected into an
/// [`IntegrityViolationList`](super::IntegrityViolationList) instead.
#[derive(Debug, Error)]
pub enum ExpressionError {
    /// The expression cannot be placed where it was added (wrong capability
    /// or a UUID that already exists in the subtree)
    #[error("Invalid expression: {reason}")]
    InvalidExpression { reason: String },

    /// The factory has no plugin registered under this id
    #[error("Plugin '{plugin_id}' not found")]
    PluginNotFound { plugin_id: String },

    /// Malformed configuration record or settings
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

impl ExpressionError {
    /// Create an invalid expression error
    pub fn invalid_expression(reason: impl Into<String>) -> Self {
        Self::InvalidExpression {
            reason: reason.into(),
        }
    }

    /// Create a plugin not found error
    pub fn plugin_not_found(plugin_id: impl Into<String>) -> Self {
        Self::PluginNotFound {
            plugin_id: plugin_id.into(),
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

pub type Result<T> = std::result::Result<T, ExpressionError>;
