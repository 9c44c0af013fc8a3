// SPDX-License-Identifier: MIT

use super::{check_selector, string_option, ConditionPlugin};
use crate::expression::{
    ExecutionMetadataState, ExecutionState, FieldType, IntegrityViolation, IntegrityViolationList,
};
use serde_json::{Map, Value};

/// Checks that the value at `selector` has the data `type`.
///
/// Once this condition passed, the selected variable is known to be of that
/// type, so later expressions see the narrowed type in the metadata state.
#[derive(Debug, Clone, Copy, Default)]
pub struct DataIsType;

impl DataIsType {
    pub const PLUGIN_ID: &'static str = "rules_data_is_type";

    fn field_type(options: &Map<String, Value>) -> Option<Result<FieldType, String>> {
        string_option(options, "type").map(|name| name.parse())
    }
}

fn value_has_type(value: &Value, field_type: FieldType) -> bool {
    match field_type {
        FieldType::String => value.is_string(),
        FieldType::Number => value.is_number(),
        FieldType::Boolean => value.is_boolean(),
        FieldType::Array => value.is_array(),
        FieldType::Object => value.is_object(),
        FieldType::Any => !value.is_null(),
    }
}

impl ConditionPlugin for DataIsType {
    fn evaluate(&self, options: &Map<String, Value>, state: &ExecutionState) -> bool {
        let (Some(selector), Some(Ok(field_type))) =
            (string_option(options, "selector"), Self::field_type(options))
        else {
            return false;
        };
        state
            .get_path(selector)
            .is_some_and(|value| value_has_type(value, field_type))
    }

    fn check_options(
        &self,
        options: &Map<String, Value>,
        metadata: &ExecutionMetadataState,
    ) -> IntegrityViolationList {
        let mut violations = IntegrityViolationList::new();
        check_selector(options, metadata, &mut violations);

        match Self::field_type(options) {
            Some(Ok(_)) => {}
            Some(Err(message)) => {
                violations.push(IntegrityViolation::new(message).with_context_name("type"))
            }
            None => violations.push(
                IntegrityViolation::new("Missing required option 'type'").with_context_name("type"),
            ),
        }
        violations
    }

    fn assert_metadata(&self, options: &Map<String, Value>, metadata: &mut ExecutionMetadataState) {
        if let (Some(selector), Some(Ok(field_type))) =
            (string_option(options, "selector"), Self::field_type(options))
        {
            if metadata.assert_type(selector, field_type) {
                log::trace!("Asserted '{}' is of type {}", selector, field_type);
            }
        }
    }
}
