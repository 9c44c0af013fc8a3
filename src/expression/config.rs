// SPDX-License-Identifier: MIT

//! Serializable configuration records for expressions
//!
//! A record looks like:
//! ```yaml
//! id: rules_and
//! uuid: 9a1e...
//! negate: true
//! conditions:
//!   - id: rules_constant
//!     value: true
//! ```

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Configuration record of a single expression and, for containers, its
/// nested children.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
pub struct ExpressionConfig {
    /// Plugin id used by the factory to build the expression
    pub id: String,
    /// Stable identifier; generated when the record is instantiated without one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub negate: bool,
    /// Nested child records, in evaluation order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<ExpressionConfig>,
    /// Plugin specific options
    #[serde(flatten)]
    pub options: Map<String, Value>,
}

impl ExpressionConfig {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            uuid: None,
            negate: false,
            conditions: Vec::new(),
            options: Map::new(),
        }
    }

    pub fn with_uuid(mut self, uuid: impl Into<String>) -> Self {
        self.uuid = Some(uuid.into());
        self
    }

    pub fn with_negate(mut self, negate: bool) -> Self {
        self.negate = negate;
        self
    }

    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    pub fn with_condition(mut self, condition: ExpressionConfig) -> Self {
        self.conditions.push(condition);
        self
    }

    /// UUID of the record, assigning a fresh v4 UUID when none is set
    pub fn ensure_uuid(&mut self) -> &str {
        self.uuid
            .get_or_insert_with(|| Uuid::new_v4().to_string())
            .as_str()
    }

    /// Get a plugin option
    pub fn option(&self, key: &str) -> Option<&Value> {
        self.options.get(key)
    }

    /// Label set in the record, if any
    pub fn label(&self) -> Option<&str> {
        self.options.get("label").and_then(Value::as_str)
    }

    /// Nesting depth of the record; a record without children has depth 1
    pub fn depth(&self) -> usize {
        1 + self
            .conditions
            .iter()
            .map(ExpressionConfig::depth)
            .max()
            .unwrap_or(0)
    }

    /// Merge `overlay` on top of this record.
    ///
    /// Options from the overlay replace existing ones, `uuid` is only taken
    /// when the overlay sets one, and children are replaced when the overlay
    /// lists any.
    ///
    /// An unset `negate` reads as `false`, so an overlay can only turn
    /// negation on; a record that is negated stays negated. Clear it on the
    /// built condition with `set_negated(false)`.
    pub fn overlay(mut self, overlay: ExpressionConfig) -> Self {
        if overlay.uuid.is_some() {
            self.uuid = overlay.uuid;
        }
        if overlay.negate {
            self.negate = true;
        }
        if !overlay.conditions.is_empty() {
            self.conditions = overlay.conditions;
        }
        for (key, value) in overlay.options {
            self.options.insert(key, value);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_nested_record() {
        let yaml = r#"
            id: rules_and
            negate: true
            conditions:
              - id: rules_constant
                value: true
              - id: rules_or
                uuid: inner
                conditions:
                  - id: rules_constant
                    value: false
        "#;
        let config: ExpressionConfig = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.id, "rules_and");
        assert!(config.negate);
        assert!(config.uuid.is_none());
        assert_eq!(config.conditions.len(), 2);
        assert_eq!(config.conditions[0].option("value"), Some(&json!(true)));
        assert_eq!(config.conditions[1].uuid.as_deref(), Some("inner"));
        assert_eq!(config.depth(), 3);
    }

    #[test]
    fn test_serialize_omits_defaults() {
        let config = ExpressionConfig::new("rules_constant").with_option("value", false);
        let value = serde_json::to_value(&config).unwrap();

        assert_eq!(value, json!({"id": "rules_constant", "value": false}));
    }

    #[test]
    fn test_overlay() {
        let base = ExpressionConfig::new("rules_data_comparison")
            .with_uuid("base")
            .with_option("selector", "node.title")
            .with_option("operator", "==");
        let overlay = ExpressionConfig::new("rules_data_comparison")
            .with_negate(true)
            .with_option("operator", "!=")
            .with_option("value", "draft");

        let merged = base.overlay(overlay);

        assert_eq!(merged.uuid.as_deref(), Some("base"));
        assert!(merged.negate);
        assert_eq!(merged.option("selector"), Some(&json!("node.title")));
        assert_eq!(merged.option("operator"), Some(&json!("!=")));
        assert_eq!(merged.option("value"), Some(&json!("draft")));
    }

    #[test]
    fn test_overlay_only_sets_negation() {
        let negated = ExpressionConfig::new("rules_constant").with_negate(true);
        let merged = negated.overlay(ExpressionConfig::new("rules_constant").with_negate(false));
        assert!(merged.negate);

        let plain = ExpressionConfig::new("rules_constant");
        let merged = plain.overlay(ExpressionConfig::new("rules_constant").with_negate(true));
        assert!(merged.negate);
    }

    #[test]
    fn test_ensure_uuid() {
        let mut config = ExpressionConfig::new("rules_and");
        let generated = config.ensure_uuid().to_string();
        assert!(Uuid::parse_str(&generated).is_ok());
        assert_eq!(config.ensure_uuid(), generated);

        let mut config = ExpressionConfig::new("rules_and").with_uuid("fixed");
        assert_eq!(config.ensure_uuid(), "fixed");
    }

    #[test]
    fn test_label() {
        let config = ExpressionConfig::new("rules_or").with_option("label", "Either way");
        assert_eq!(config.label(), Some("Either way"));
        assert_eq!(ExpressionConfig::new("rules_or").label(), None);
    }

    #[test]
    fn test_schema_names_record_fields() {
        let schema = serde_json::to_value(schemars::schema_for!(ExpressionConfig)).unwrap();
        let properties = &schema["properties"];

        assert!(properties.get("id").is_some());
        assert!(properties.get("negate").is_some());
        assert!(properties.get("conditions").is_some());
    }
}
