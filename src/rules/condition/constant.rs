// SPDX-License-Identifier: MIT

use super::ConditionPlugin;
use crate::expression::{
    ExecutionMetadataState, ExecutionState, IntegrityViolation, IntegrityViolationList,
};
use serde_json::{Map, Value};

/// Condition with a fixed outcome, taken from the boolean `value` option
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstantCondition;

impl ConstantCondition {
    pub const PLUGIN_ID: &'static str = "rules_constant";
}

impl ConditionPlugin for ConstantCondition {
    fn evaluate(&self, options: &Map<String, Value>, _state: &ExecutionState) -> bool {
        options
            .get("value")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    fn check_options(
        &self,
        options: &Map<String, Value>,
        _metadata: &ExecutionMetadataState,
    ) -> IntegrityViolationList {
        let mut violations = IntegrityViolationList::new();
        match options.get("value") {
            Some(Value::Bool(_)) => {}
            Some(other) => violations.push(
                IntegrityViolation::new(format!("Expected a boolean, got {}", other))
                    .with_context_name("value"),
            ),
            None => violations.push(
                IntegrityViolation::new("Missing required option 'value'")
                    .with_context_name("value"),
            ),
        }
        violations
    }
}
