// SPDX-License-Identifier: MIT

//! Boolean combination policies for condition containers

use super::traversal::TraversalHooks;
use crate::expression::{ConditionExpression, ExecutionMetadataState, ExecutionState};
use std::fmt;

/// How a container combines the results of its children.
///
/// `evaluate` runs child conditions through their own `execute_with_state`
/// so each child applies its own negation; the container negates only the
/// combined result.
pub trait ContainerPolicy: TraversalHooks + fmt::Debug + Send + Sync {
    fn evaluate(&self, conditions: &[Box<dyn ConditionExpression>], state: &ExecutionState)
        -> bool;

    fn clone_policy(&self) -> Box<dyn ContainerPolicy>;
}

impl Clone for Box<dyn ContainerPolicy> {
    fn clone(&self) -> Self {
        self.clone_policy()
    }
}

/// True when every child is true; stops at the first false child.
/// An empty AND is false.
#[derive(Debug, Clone, Copy, Default)]
pub struct AndPolicy;

impl AndPolicy {
    pub const PLUGIN_ID: &'static str = "rules_and";
}

impl TraversalHooks for AndPolicy {}

impl ContainerPolicy for AndPolicy {
    fn evaluate(
        &self,
        conditions: &[Box<dyn ConditionExpression>],
        state: &ExecutionState,
    ) -> bool {
        for condition in conditions {
            if !condition.execute_with_state(state) {
                log::debug!(
                    "AND evaluated to FALSE because condition '{}' is FALSE",
                    condition.label()
                );
                return false;
            }
        }
        if conditions.is_empty() {
            log::debug!("AND evaluated to FALSE because it has no conditions");
            return false;
        }
        log::debug!("AND evaluated to TRUE");
        true
    }

    fn clone_policy(&self) -> Box<dyn ContainerPolicy> {
        Box::new(*self)
    }
}

/// True when any child is true; stops at the first true child.
/// An empty OR is false.
///
/// Type assertions made by the children of an OR only hold on the branch
/// that made them: every child is checked against the metadata the OR was
/// entered with, and nothing they assert survives the container.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrPolicy;

impl OrPolicy {
    pub const PLUGIN_ID: &'static str = "rules_or";
}

impl TraversalHooks for OrPolicy {
    fn before_traversal(&self, metadata: &mut ExecutionMetadataState) {
        metadata.push_scope();
    }

    /// A later branch only runs when the earlier ones were false, so each
    /// child starts from the metadata the OR was entered with
    fn before_child(&self, metadata: &mut ExecutionMetadataState) {
        metadata.restore_scope();
    }

    fn after_traversal(&self, metadata: &mut ExecutionMetadataState) {
        metadata.pop_scope();
    }
}

impl ContainerPolicy for OrPolicy {
    fn evaluate(
        &self,
        conditions: &[Box<dyn ConditionExpression>],
        state: &ExecutionState,
    ) -> bool {
        for condition in conditions {
            if condition.execute_with_state(state) {
                log::debug!(
                    "OR evaluated to TRUE because condition '{}' is TRUE",
                    condition.label()
                );
                return true;
            }
        }
        log::debug!("OR evaluated to FALSE");
        false
    }

    fn clone_policy(&self) -> Box<dyn ContainerPolicy> {
        Box::new(*self)
    }
}
