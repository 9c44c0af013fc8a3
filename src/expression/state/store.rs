// SPDX-License-Identifier: MIT

//! Runtime state storage for condition evaluation

use serde_json::Value;
use std::collections::HashMap;

/// Runtime variables a condition tree is evaluated against
#[derive(Debug, Clone, Default)]
pub struct ExecutionState {
    variables: HashMap<String, Value>,
}

impl ExecutionState {
    /// Create an empty ExecutionState
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a state from a JSON object; every top-level key becomes a variable.
    /// Non-object values yield an empty state.
    pub fn from_json(value: Value) -> Self {
        let variables = match value {
            Value::Object(map) => map.into_iter().collect(),
            _ => HashMap::new(),
        };
        Self { variables }
    }

    pub fn set_variable(&mut self, name: &str, value: Value) {
        self.variables.insert(name.to_string(), value);
    }

    pub fn with_variable(mut self, name: &str, value: Value) -> Self {
        self.set_variable(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    pub fn has_variable(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    /// Get a nested value using dot notation (e.g., "node.title")
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        let mut parts = path.split('.');
        let mut current = self.variables.get(parts.next()?)?;
        for part in parts {
            current = match current {
                Value::Array(items) => items.get(part.parse::<usize>().ok()?)?,
                other => other.get(part)?,
            };
        }
        Some(current)
    }
}
