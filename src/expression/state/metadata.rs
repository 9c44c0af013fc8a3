// SPDX-License-Identifier: MIT

//! Typed data context used for static validation

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Supported data types
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Number,
    Boolean,
    Array,
    Object,
    /// Type not known statically
    Any,
}

impl FieldType {
    /// Whether selectors may descend into values of this type
    pub fn is_traversable(self) -> bool {
        matches!(self, FieldType::Array | FieldType::Object | FieldType::Any)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::Array => "array",
            FieldType::Object => "object",
            FieldType::Any => "any",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "string" => Ok(FieldType::String),
            "number" => Ok(FieldType::Number),
            "boolean" | "bool" => Ok(FieldType::Boolean),
            "array" | "list" => Ok(FieldType::Array),
            "object" => Ok(FieldType::Object),
            "any" => Ok(FieldType::Any),
            other => Err(format!("Unknown field type: {}", other)),
        }
    }
}

/// Why a data selector could not be resolved
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    #[error("Data selector '{selector}' is empty")]
    Empty { selector: String },

    #[error("Variable '{name}' is not defined")]
    Undefined { name: String },

    #[error("Cannot select '{selector}': '{name}' is a {field_type}")]
    NotTraversable {
        selector: String,
        name: String,
        field_type: FieldType,
    },
}

/// The data definitions available at some point of a condition tree.
///
/// Containers and conditions mutate this while it is handed down the tree:
/// conditions may narrow a variable's type and containers may open a scope
/// that is discarded again once their children have been visited.
#[derive(Debug, Clone, Default)]
pub struct ExecutionMetadataState {
    definitions: HashMap<String, FieldType>,
    scopes: Vec<HashMap<String, FieldType>>,
}

impl ExecutionMetadataState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_definition(mut self, name: &str, field_type: FieldType) -> Self {
        self.set_definition(name, field_type);
        self
    }

    pub fn set_definition(&mut self, name: &str, field_type: FieldType) {
        self.definitions.insert(name.to_string(), field_type);
    }

    pub fn remove_definition(&mut self, name: &str) -> Option<FieldType> {
        self.definitions.remove(name)
    }

    pub fn has_definition(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    pub fn definition(&self, name: &str) -> Option<FieldType> {
        self.definitions.get(name).copied()
    }

    /// Resolve the type a dotted data selector refers to.
    ///
    /// Only top-level variables carry a declared type; anything selected
    /// below an array or object resolves to [`FieldType::Any`].
    pub fn resolve_selector(&self, selector: &str) -> Result<FieldType, SelectorError> {
        let mut parts = selector.split('.');
        let name = match parts.next() {
            Some(name) if !name.is_empty() => name,
            _ => {
                return Err(SelectorError::Empty {
                    selector: selector.to_string(),
                })
            }
        };
        let field_type = self
            .definition(name)
            .ok_or_else(|| SelectorError::Undefined {
                name: name.to_string(),
            })?;

        if parts.next().is_none() {
            return Ok(field_type);
        }
        if field_type.is_traversable() {
            Ok(FieldType::Any)
        } else {
            Err(SelectorError::NotTraversable {
                selector: selector.to_string(),
                name: name.to_string(),
                field_type,
            })
        }
    }

    /// Narrow the declared type of a top-level variable.
    ///
    /// Returns false when the selector points below the top level or names
    /// an undefined variable; nothing is changed then.
    pub fn assert_type(&mut self, selector: &str, field_type: FieldType) -> bool {
        match self.definitions.get_mut(selector) {
            Some(current) => {
                *current = field_type;
                true
            }
            None => false,
        }
    }

    /// Remember the current definitions so they can be restored by `pop_scope`
    pub fn push_scope(&mut self) {
        self.scopes.push(self.definitions.clone());
    }

    /// Restore the definitions saved by the matching `push_scope`.
    /// Returns false when no scope is open.
    pub fn pop_scope(&mut self) -> bool {
        match self.scopes.pop() {
            Some(saved) => {
                self.definitions = saved;
                true
            }
            None => false,
        }
    }

    /// Reset the definitions to those saved by the innermost open scope,
    /// keeping the scope open. Returns false when no scope is open.
    pub fn restore_scope(&mut self) -> bool {
        match self.scopes.last() {
            Some(saved) => {
                self.definitions = saved.clone();
                true
            }
            None => false,
        }
    }

    pub fn scope_depth(&self) -> usize {
        self.scopes.len()
    }

    /// Get all variable names
    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.definitions.keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> ExecutionMetadataState {
        ExecutionMetadataState::new()
            .with_definition("node", FieldType::Object)
            .with_definition("count", FieldType::Number)
            .with_definition("data", FieldType::Any)
    }

    #[test]
    fn test_resolve_top_level() {
        let state = state();
        assert_eq!(state.resolve_selector("count"), Ok(FieldType::Number));
        assert_eq!(state.resolve_selector("node"), Ok(FieldType::Object));
    }

    #[test]
    fn test_resolve_nested() {
        let state = state();
        assert_eq!(state.resolve_selector("node.title"), Ok(FieldType::Any));
        assert_eq!(state.resolve_selector("data.a.b"), Ok(FieldType::Any));
        assert_eq!(
            state.resolve_selector("count.value"),
            Err(SelectorError::NotTraversable {
                selector: "count.value".to_string(),
                name: "count".to_string(),
                field_type: FieldType::Number,
            })
        );
    }

    #[test]
    fn test_resolve_undefined_and_empty() {
        let state = state();
        assert_eq!(
            state.resolve_selector("user.name"),
            Err(SelectorError::Undefined {
                name: "user".to_string()
            })
        );
        assert!(matches!(
            state.resolve_selector(""),
            Err(SelectorError::Empty { .. })
        ));
    }

    #[test]
    fn test_assert_type() {
        let mut state = state();
        assert!(state.assert_type("data", FieldType::String));
        assert_eq!(state.definition("data"), Some(FieldType::String));

        assert!(!state.assert_type("missing", FieldType::String));
        assert!(!state.has_definition("missing"));
    }

    #[test]
    fn test_scopes_restore_definitions() {
        let mut state = state();
        state.push_scope();
        state.assert_type("data", FieldType::Number);
        state.set_definition("item", FieldType::String);
        assert_eq!(state.scope_depth(), 1);

        assert!(state.pop_scope());
        assert_eq!(state.definition("data"), Some(FieldType::Any));
        assert!(!state.has_definition("item"));
        assert!(!state.pop_scope());
    }

    #[test]
    fn test_restore_scope_keeps_it_open() {
        let mut state = state();
        assert!(!state.restore_scope());

        state.push_scope();
        state.assert_type("data", FieldType::Number);
        assert!(state.restore_scope());
        assert_eq!(state.definition("data"), Some(FieldType::Any));
        assert_eq!(state.scope_depth(), 1);

        state.assert_type("data", FieldType::String);
        assert!(state.pop_scope());
        assert_eq!(state.definition("data"), Some(FieldType::Any));
    }

    #[test]
    fn test_field_type_from_str() {
        assert_eq!("string".parse::<FieldType>(), Ok(FieldType::String));
        assert_eq!("Bool".parse::<FieldType>(), Ok(FieldType::Boolean));
        assert_eq!("list".parse::<FieldType>(), Ok(FieldType::Array));
        assert!("date".parse::<FieldType>().is_err());
    }

    #[test]
    fn test_field_type_deserialize() {
        let types: Vec<FieldType> = serde_yaml::from_str("[string, number, any]").unwrap();
        assert_eq!(
            types,
            vec![FieldType::String, FieldType::Number, FieldType::Any]
        );
    }
}
