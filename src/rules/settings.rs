// SPDX-License-Identifier: MIT

//! Runtime settings read from the environment

use crate::expression::{ExpressionError, Result};
use std::env;

/// Limits applied while building condition trees
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    /// Deepest configuration nesting accepted by the registry
    pub max_depth: usize,
}

impl Settings {
    pub const MAX_DEPTH_VAR: &'static str = "KINETIC_MAX_CONDITION_DEPTH";
    pub const DEFAULT_MAX_DEPTH: usize = 32;

    /// Read settings from environment variables, falling back to defaults
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let max_depth = match lookup(Self::MAX_DEPTH_VAR) {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|depth| *depth > 0)
                .ok_or_else(|| {
                    ExpressionError::config(format!(
                        "{} must be a positive integer, got '{}'",
                        Self::MAX_DEPTH_VAR,
                        raw
                    ))
                })?,
            None => Self::DEFAULT_MAX_DEPTH,
        };
        Ok(Self { max_depth })
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_depth: Self::DEFAULT_MAX_DEPTH,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_unset() {
        let settings = Settings::from_lookup(|_| None).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.max_depth, 32);
    }

    #[test]
    fn test_reads_max_depth() {
        let settings = Settings::from_lookup(|key| {
            (key == Settings::MAX_DEPTH_VAR).then(|| " 8 ".to_string())
        })
        .unwrap();
        assert_eq!(settings.max_depth, 8);
    }

    #[test]
    fn test_rejects_invalid_max_depth() {
        for raw in ["zero", "0", "-3"] {
            let result = Settings::from_lookup(|_| Some(raw.to_string()));
            assert!(matches!(result, Err(ExpressionError::Config(_))), "{}", raw);
        }
    }
}
