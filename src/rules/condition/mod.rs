// SPDX-License-Identifier: MIT

//! Leaf conditions
//!
//! A [`RulesCondition`] wraps a stateless [`ConditionPlugin`] with the
//! identity, negation and configuration every condition carries. Plugins read
//! their options from the configuration on every call, so an invalid option
//! never fails construction; it is reported by the integrity check instead.

mod comparison;
mod constant;
mod is_type;

pub use comparison::{CompareOp, DataComparison};
pub use constant::ConstantCondition;
pub use is_type::DataIsType;

use crate::expression::{
    ConditionExpression, ExecutionMetadataState, ExecutionState, Expression, ExpressionConfig,
    FieldType, IntegrityViolation, IntegrityViolationList,
};
use crate::rules::registry::PluginDefinition;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// Boolean logic of a leaf condition
pub trait ConditionPlugin: fmt::Debug + Send + Sync {
    fn evaluate(&self, options: &Map<String, Value>, state: &ExecutionState) -> bool;

    /// Report options that are missing or do not fit the available data
    fn check_options(
        &self,
        _options: &Map<String, Value>,
        _metadata: &ExecutionMetadataState,
    ) -> IntegrityViolationList {
        IntegrityViolationList::new()
    }

    /// Record what holds for later expressions once this condition passed
    fn assert_metadata(
        &self,
        _options: &Map<String, Value>,
        _metadata: &mut ExecutionMetadataState,
    ) {
    }
}

/// A condition expression backed by a condition plugin
#[derive(Debug, Clone)]
pub struct RulesCondition {
    uuid: String,
    definition_label: String,
    configuration: ExpressionConfig,
    plugin: Arc<dyn ConditionPlugin>,
}

impl RulesCondition {
    pub fn new(
        mut config: ExpressionConfig,
        definition: &PluginDefinition,
        plugin: Arc<dyn ConditionPlugin>,
    ) -> Self {
        if !config.conditions.is_empty() {
            log::warn!(
                "Ignoring {} nested conditions of leaf condition '{}'",
                config.conditions.len(),
                config.id
            );
            config.conditions.clear();
        }
        let uuid = config.ensure_uuid().to_string();
        Self {
            uuid,
            definition_label: definition.label.clone(),
            configuration: config,
            plugin,
        }
    }

    /// Set the negation flag
    pub fn negate(&mut self, negate: bool) -> &mut Self {
        self.configuration.negate = negate;
        self
    }

    pub fn is_negated(&self) -> bool {
        self.configuration.negate
    }

    pub fn option(&self, key: &str) -> Option<&Value> {
        self.configuration.option(key)
    }

    /// Apply the plugin's assertions; a negated condition passing says the
    /// opposite of them, so it asserts nothing
    fn assert_metadata(&self, metadata: &mut ExecutionMetadataState) {
        if !self.is_negated() {
            self.plugin.assert_metadata(&self.configuration.options, metadata);
        }
    }
}

impl Expression for RulesCondition {
    fn uuid(&self) -> &str {
        &self.uuid
    }

    fn plugin_id(&self) -> &str {
        &self.configuration.id
    }

    fn label(&self) -> String {
        self.configuration
            .label()
            .unwrap_or(self.definition_label.as_str())
            .to_string()
    }

    fn configuration(&self) -> ExpressionConfig {
        self.configuration.clone()
    }

    fn check_integrity(&self, metadata: &mut ExecutionMetadataState) -> IntegrityViolationList {
        let options = &self.configuration.options;
        let violations = self
            .plugin
            .check_options(options, metadata)
            .into_iter()
            .map(|v| match v.uuid {
                Some(_) => v,
                None => v.with_uuid(self.uuid.clone()),
            })
            .collect();
        self.assert_metadata(metadata);
        violations
    }

    fn prepare_execution_metadata_state(
        &self,
        metadata: &mut ExecutionMetadataState,
        until: Option<&str>,
    ) -> bool {
        if until == Some(self.uuid.as_str()) {
            return true;
        }
        self.assert_metadata(metadata);
        false
    }

    fn clone_expression(&self) -> Box<dyn Expression> {
        Box::new(self.clone())
    }

    fn into_condition(self: Box<Self>) -> Option<Box<dyn ConditionExpression>> {
        Some(self)
    }
}

impl ConditionExpression for RulesCondition {
    fn execute_with_state(&self, state: &ExecutionState) -> bool {
        let result = self.plugin.evaluate(&self.configuration.options, state);
        log::trace!("Condition '{}' evaluated to {}", self.label(), result);
        if self.is_negated() {
            !result
        } else {
            result
        }
    }

    fn set_negated(&mut self, negate: bool) {
        self.negate(negate);
    }

    fn is_negated(&self) -> bool {
        RulesCondition::is_negated(self)
    }

    fn clone_condition(&self) -> Box<dyn ConditionExpression> {
        Box::new(self.clone())
    }
}

fn string_option<'a>(options: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    options.get(key).and_then(Value::as_str)
}

/// Resolve the `selector` option, reporting why it cannot be used
fn check_selector(
    options: &Map<String, Value>,
    metadata: &ExecutionMetadataState,
    violations: &mut IntegrityViolationList,
) -> Option<FieldType> {
    let Some(selector) = string_option(options, "selector") else {
        violations.push(
            IntegrityViolation::new("Missing required option 'selector'")
                .with_context_name("selector"),
        );
        return None;
    };
    match metadata.resolve_selector(selector) {
        Ok(field_type) => Some(field_type),
        Err(err) => {
            violations.push(IntegrityViolation::new(err.to_string()).with_context_name("selector"));
            None
        }
    }
}
