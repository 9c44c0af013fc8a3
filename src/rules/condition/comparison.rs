// SPDX-License-Identifier: MIT

//! Data comparison condition
//!
//! Compares the value found at a data selector with a literal:
//! ```yaml
//! id: rules_data_comparison
//! selector: node.status
//! operator: "!="
//! value: draft
//! ```

use super::{check_selector, string_option, ConditionPlugin};
use crate::expression::{
    ExecutionMetadataState, ExecutionState, FieldType, IntegrityViolation, IntegrityViolationList,
};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// ==
    Eq,
    /// !=
    NotEq,
    /// >
    Gt,
    /// >=
    Gte,
    /// <
    Lt,
    /// <=
    Lte,
    /// contains (for strings and arrays)
    Contains,
}

impl CompareOp {
    fn is_ordering(self) -> bool {
        matches!(
            self,
            CompareOp::Gt | CompareOp::Gte | CompareOp::Lt | CompareOp::Lte
        )
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompareOp::Eq => write!(f, "=="),
            CompareOp::NotEq => write!(f, "!="),
            CompareOp::Gt => write!(f, ">"),
            CompareOp::Gte => write!(f, ">="),
            CompareOp::Lt => write!(f, "<"),
            CompareOp::Lte => write!(f, "<="),
            CompareOp::Contains => write!(f, "contains"),
        }
    }
}

impl FromStr for CompareOp {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "==" | "=" => Ok(CompareOp::Eq),
            "!=" => Ok(CompareOp::NotEq),
            ">" => Ok(CompareOp::Gt),
            ">=" => Ok(CompareOp::Gte),
            "<" => Ok(CompareOp::Lt),
            "<=" => Ok(CompareOp::Lte),
            "contains" => Ok(CompareOp::Contains),
            other => Err(format!("Unknown operator: {}", other)),
        }
    }
}

/// Compares selected data with the `value` option; the operator defaults to `==`
#[derive(Debug, Clone, Copy, Default)]
pub struct DataComparison;

impl DataComparison {
    pub const PLUGIN_ID: &'static str = "rules_data_comparison";

    fn operator(options: &Map<String, Value>) -> Result<CompareOp, String> {
        string_option(options, "operator").map_or(Ok(CompareOp::Eq), |op| op.parse())
    }
}

impl ConditionPlugin for DataComparison {
    fn evaluate(&self, options: &Map<String, Value>, state: &ExecutionState) -> bool {
        let Some(selector) = string_option(options, "selector") else {
            return false;
        };
        let Ok(op) = Self::operator(options) else {
            return false;
        };
        let left = state.get_path(selector);
        let right = options.get("value").unwrap_or(&Value::Null);

        match op {
            CompareOp::Eq => values_equal(left, right),
            CompareOp::NotEq => !values_equal(left, right),
            CompareOp::Gt => compare_numbers(left, right, |a, b| a > b),
            CompareOp::Gte => compare_numbers(left, right, |a, b| a >= b),
            CompareOp::Lt => compare_numbers(left, right, |a, b| a < b),
            CompareOp::Lte => compare_numbers(left, right, |a, b| a <= b),
            CompareOp::Contains => check_contains(left, right),
        }
    }

    fn check_options(
        &self,
        options: &Map<String, Value>,
        metadata: &ExecutionMetadataState,
    ) -> IntegrityViolationList {
        let mut violations = IntegrityViolationList::new();
        let field_type = check_selector(options, metadata, &mut violations);

        let op = match Self::operator(options) {
            Ok(op) => op,
            Err(message) => {
                violations.push(IntegrityViolation::new(message).with_context_name("operator"));
                return violations;
            }
        };

        if op.is_ordering() && !options.get("value").is_some_and(Value::is_number) {
            violations.push(
                IntegrityViolation::new(format!("Operator '{}' requires a numeric value", op))
                    .with_context_name("value"),
            );
        }

        if let Some(field_type) = field_type {
            let fits = match op {
                CompareOp::Eq | CompareOp::NotEq => true,
                CompareOp::Contains => {
                    matches!(field_type, FieldType::String | FieldType::Array | FieldType::Any)
                }
                _ => matches!(field_type, FieldType::Number | FieldType::Any),
            };
            if !fits {
                violations.push(
                    IntegrityViolation::new(format!(
                        "Operator '{}' cannot be applied to {} data",
                        op, field_type
                    ))
                    .with_context_name("selector"),
                );
            }
        }
        violations
    }
}

fn numbers_equal(a: f64, b: f64) -> bool {
    (a - b).abs() < f64::EPSILON
}

fn values_equal(left: Option<&Value>, right: &Value) -> bool {
    match (left, right) {
        (None, Value::Null) => true,
        (None, _) => false,
        (Some(Value::Number(n)), Value::Number(rn)) => match (n.as_f64(), rn.as_f64()) {
            (Some(a), Some(b)) => numbers_equal(a, b),
            _ => false,
        },
        (Some(left), right) => left == right,
    }
}

fn compare_numbers<F>(left: Option<&Value>, right: &Value, cmp: F) -> bool
where
    F: Fn(f64, f64) -> bool,
{
    match (left.and_then(Value::as_f64), right.as_f64()) {
        (Some(a), Some(b)) => cmp(a, b),
        _ => false,
    }
}

fn check_contains(left: Option<&Value>, right: &Value) -> bool {
    match (left, right) {
        // String contains substring
        (Some(Value::String(s)), Value::String(substr)) => s.contains(substr.as_str()),
        // Array contains value
        (Some(Value::Array(items)), needle) => items
            .iter()
            .any(|item| values_equal(Some(item), needle)),
        _ => false,
    }
}
