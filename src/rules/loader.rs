// SPDX-License-Identifier: MIT

//! Condition loader - YAML/JSON file loading and parsing
//!
//! Files ending in `.json` are parsed as JSON, everything else as YAML.

use crate::expression::{
    require_condition, ConditionExpression, ExpressionConfig, ExpressionFactory, Result,
};
use std::fs;
use std::path::Path;

/// Loads condition configuration records from files
pub struct ConditionLoader;

impl ConditionLoader {
    pub fn new() -> Self {
        Self
    }

    /// Load a configuration record from a YAML or JSON file
    pub fn load_config<P: AsRef<Path>>(&self, path: P) -> Result<ExpressionConfig> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        log::debug!("Loading condition configuration from {}", path.display());

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::parse_json(&content)
        } else {
            Self::parse_yaml(&content)
        }
    }

    /// Load a file and build the condition tree it describes
    pub fn load_condition<P: AsRef<Path>>(
        &self,
        path: P,
        factory: &dyn ExpressionFactory,
    ) -> Result<Box<dyn ConditionExpression>> {
        let config = self.load_config(path)?;
        let plugin_id = config.id.clone();
        require_condition(factory.create_instance(&plugin_id, config)?)
    }

    /// Parse a configuration record from a YAML string
    pub fn parse_yaml(content: &str) -> Result<ExpressionConfig> {
        let config: ExpressionConfig = serde_yaml::from_str(content)?;
        Ok(config)
    }

    /// Parse a configuration record from a JSON string
    pub fn parse_json(content: &str) -> Result<ExpressionConfig> {
        let config: ExpressionConfig = serde_json::from_str(content)?;
        Ok(config)
    }

    /// Serialize a configuration record to YAML
    pub fn to_yaml(config: &ExpressionConfig) -> Result<String> {
        Ok(serde_yaml::to_string(config)?)
    }
}

impl Default for ConditionLoader {
    fn default() -> Self {
        Self::new()
    }
}
