// SPDX-License-Identifier: MIT

//! Capabilities shared by every node of a condition tree

use super::config::ExpressionConfig;
use super::error::{ExpressionError, Result};
use super::integrity::IntegrityViolationList;
use super::state::{ExecutionMetadataState, ExecutionState};
use super::ExpressionContainer;
use std::fmt;

/// Any node of an expression tree.
///
/// An expression is identified by a UUID that never changes once it is
/// constructed, and can always be turned back into the configuration
/// record it was built from.
pub trait Expression: fmt::Debug + Send + Sync {
    /// Stable identifier, unique within the tree
    fn uuid(&self) -> &str;

    /// Plugin id this expression was created from
    fn plugin_id(&self) -> &str;

    /// Human-readable label
    fn label(&self) -> String {
        self.plugin_id().to_string()
    }

    /// Rebuild the configuration record from the live expression
    fn configuration(&self) -> ExpressionConfig;

    /// Validate the expression against the data available in `metadata`.
    ///
    /// Implementations may update `metadata` to reflect what holds after
    /// this expression, so later siblings are checked against it.
    fn check_integrity(&self, metadata: &mut ExecutionMetadataState) -> IntegrityViolationList;

    /// Update `metadata` to describe the data available after this
    /// expression, stopping at the expression with UUID `until`.
    ///
    /// Returns true when `until` was found; `metadata` then describes the
    /// data available right before it.
    fn prepare_execution_metadata_state(
        &self,
        metadata: &mut ExecutionMetadataState,
        until: Option<&str>,
    ) -> bool;

    /// Deep copy of the expression, keeping UUIDs
    fn clone_expression(&self) -> Box<dyn Expression>;

    /// Narrow to the condition capability; None for other expression kinds
    fn into_condition(self: Box<Self>) -> Option<Box<dyn ConditionExpression>> {
        None
    }
}

/// An expression that evaluates to a boolean
pub trait ConditionExpression: Expression {
    /// Evaluate the condition, applying its negation
    fn execute_with_state(&self, state: &ExecutionState) -> bool;

    fn set_negated(&mut self, negate: bool);

    fn is_negated(&self) -> bool;

    /// Deep copy of the condition, keeping UUIDs
    fn clone_condition(&self) -> Box<dyn ConditionExpression>;

    /// Access the condition as a container of further conditions
    fn as_container(&self) -> Option<&dyn ExpressionContainer> {
        None
    }

    fn as_container_mut(&mut self) -> Option<&mut dyn ExpressionContainer> {
        None
    }
}

impl Clone for Box<dyn Expression> {
    fn clone(&self) -> Self {
        self.clone_expression()
    }
}

impl Clone for Box<dyn ConditionExpression> {
    fn clone(&self) -> Self {
        self.clone_condition()
    }
}

/// Collect the UUIDs of `condition` and all of its descendants, pre-order
pub fn collect_uuids(condition: &dyn ConditionExpression, uuids: &mut Vec<String>) {
    uuids.push(condition.uuid().to_string());
    if let Some(container) = condition.as_container() {
        for child in container.conditions() {
            collect_uuids(child.as_ref(), uuids);
        }
    }
}

/// Narrow `expression` to a condition, failing with an invalid expression
/// error that names the rejected plugin
pub fn require_condition(expression: Box<dyn Expression>) -> Result<Box<dyn ConditionExpression>> {
    let plugin_id = expression.plugin_id().to_string();
    let uuid = expression.uuid().to_string();
    expression.into_condition().ok_or_else(|| {
        ExpressionError::invalid_expression(format!(
            "Expression '{}' ({}) is not a condition",
            plugin_id, uuid
        ))
    })
}
