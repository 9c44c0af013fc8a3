// SPDX-License-Identifier: MIT

//! Condition containers
//!
//! A container is a condition owning an ordered list of child conditions.
//! The combination logic (AND, OR) is supplied by a [`ContainerPolicy`],
//! which also provides the hooks run around static traversals.

mod policy;
pub mod traversal;

pub use policy::{AndPolicy, ContainerPolicy, OrPolicy};
pub use traversal::TraversalHooks;

use crate::expression::{
    collect_uuids, require_condition, ConditionExpression, ExecutionMetadataState,
    ExecutionState, Expression, ExpressionConfig, ExpressionContainer, ExpressionError,
    ExpressionFactory, IntegrityViolationList, Result,
};
use crate::rules::registry::PluginDefinition;
use std::fmt;
use std::sync::Arc;

/// A condition combining an ordered list of child conditions
pub struct ConditionContainer {
    uuid: String,
    definition_label: String,
    /// Configuration without children; `conditions` is rebuilt on demand
    configuration: ExpressionConfig,
    conditions: Vec<Box<dyn ConditionExpression>>,
    policy: Box<dyn ContainerPolicy>,
    factory: Arc<dyn ExpressionFactory>,
}

impl ConditionContainer {
    /// Create an empty container
    pub fn new(
        plugin_id: &str,
        policy: Box<dyn ContainerPolicy>,
        factory: Arc<dyn ExpressionFactory>,
    ) -> Self {
        let mut configuration = ExpressionConfig::new(plugin_id);
        let uuid = configuration.ensure_uuid().to_string();
        Self {
            uuid,
            definition_label: plugin_id.to_string(),
            configuration,
            conditions: Vec::new(),
            policy,
            factory,
        }
    }

    /// Build a container and all of its children from a configuration record.
    ///
    /// Every child record is instantiated through `factory`, in order; any
    /// failure there aborts construction.
    pub fn from_config(
        mut config: ExpressionConfig,
        definition: &PluginDefinition,
        policy: Box<dyn ContainerPolicy>,
        factory: Arc<dyn ExpressionFactory>,
    ) -> Result<Self> {
        let children = std::mem::take(&mut config.conditions);
        let uuid = config.ensure_uuid().to_string();

        let mut container = Self {
            uuid,
            definition_label: definition.label.clone(),
            configuration: config,
            conditions: Vec::with_capacity(children.len()),
            policy,
            factory,
        };
        for child in children {
            let expression = container.factory.create_instance(&child.id.clone(), child)?;
            container.add_expression_object(expression)?;
        }
        Ok(container)
    }

    /// Append an expression to the end of the container.
    ///
    /// Only conditions are accepted, and none of the UUIDs of `expression`
    /// (including its descendants) may already exist in this subtree.
    pub fn add_expression_object(&mut self, expression: Box<dyn Expression>) -> Result<&mut Self> {
        let condition = require_condition(expression)?;
        self.push_condition(condition)
    }

    /// Create an expression through the factory and append it
    pub fn add_expression(
        &mut self,
        plugin_id: &str,
        config: Option<ExpressionConfig>,
    ) -> Result<&mut Self> {
        let mut config = config.unwrap_or_else(|| ExpressionConfig::new(plugin_id));
        config.id = plugin_id.to_string();
        let expression = self.factory.create_instance(plugin_id, config)?;
        self.add_expression_object(expression)
    }

    /// Create a condition through the factory, apply the optional
    /// configuration overlay and append it
    pub fn add_condition(
        &mut self,
        condition_id: &str,
        config: Option<ExpressionConfig>,
    ) -> Result<&mut Self> {
        let condition = self.factory.create_condition(condition_id)?;
        let condition = match config {
            Some(overlay) => {
                let merged = condition.configuration().overlay(overlay);
                require_condition(self.factory.create_instance(condition_id, merged)?)?
            }
            None => condition,
        };
        self.push_condition(condition)
    }

    /// Append an expression to the container with UUID `parent_uuid`,
    /// which is this container or one nested anywhere below it.
    ///
    /// The UUIDs of `expression` are checked against this whole tree, not
    /// only the subtree of the parent.
    pub fn add_expression_object_to(
        &mut self,
        parent_uuid: &str,
        expression: Box<dyn Expression>,
    ) -> Result<&mut Self> {
        let condition = require_condition(expression)?;
        if parent_uuid == self.uuid {
            return self.push_condition(condition);
        }
        self.ensure_unique(condition.as_ref())?;

        let parent = self
            .get_expression_mut(parent_uuid)
            .and_then(|c| c.as_container_mut())
            .ok_or_else(|| {
                ExpressionError::invalid_expression(format!(
                    "No container with UUID '{}' in the tree",
                    parent_uuid
                ))
            })?;
        parent.add_condition_object(condition)?;
        Ok(self)
    }

    fn ensure_unique(&self, condition: &dyn ConditionExpression) -> Result<()> {
        let mut incoming = Vec::new();
        collect_uuids(condition, &mut incoming);

        match incoming
            .iter()
            .find(|uuid| **uuid == self.uuid || self.get_expression(uuid).is_some())
        {
            Some(duplicate) => Err(ExpressionError::invalid_expression(format!(
                "A condition with UUID '{}' already exists in container '{}'",
                duplicate, self.uuid
            ))),
            None => Ok(()),
        }
    }

    fn push_condition(&mut self, condition: Box<dyn ConditionExpression>) -> Result<&mut Self> {
        self.ensure_unique(condition.as_ref())?;

        log::debug!(
            "Adding condition '{}' ({}) to container '{}'",
            condition.plugin_id(),
            condition.uuid(),
            self.uuid
        );
        self.conditions.push(condition);
        Ok(self)
    }

    /// Set the negation flag
    pub fn negate(&mut self, negate: bool) -> &mut Self {
        self.configuration.negate = negate;
        self
    }

    pub fn is_negated(&self) -> bool {
        self.configuration.negate
    }

    /// Find a condition anywhere in the subtree.
    ///
    /// Direct children are checked first, then each child container is
    /// searched in order.
    pub fn get_expression(&self, uuid: &str) -> Option<&dyn ConditionExpression> {
        if let Some(found) = self.conditions.iter().find(|c| c.uuid() == uuid) {
            return Some(found.as_ref());
        }
        self.conditions
            .iter()
            .filter_map(|c| c.as_container())
            .find_map(|c| c.get_expression(uuid))
    }

    pub fn get_expression_mut(&mut self, uuid: &str) -> Option<&mut dyn ConditionExpression> {
        if let Some(index) = self.conditions.iter().position(|c| c.uuid() == uuid) {
            return Some(self.conditions[index].as_mut());
        }
        self.conditions
            .iter_mut()
            .filter_map(|c| c.as_container_mut())
            .find_map(|c| c.get_expression_mut(uuid))
    }

    /// Remove the first condition with this UUID from the subtree
    pub fn delete_expression(&mut self, uuid: &str) -> bool {
        if let Some(index) = self.conditions.iter().position(|c| c.uuid() == uuid) {
            let removed = self.conditions.remove(index);
            log::debug!(
                "Removed condition '{}' ({}) from container '{}'",
                removed.plugin_id(),
                uuid,
                self.uuid
            );
            return true;
        }
        self.conditions
            .iter_mut()
            .filter_map(|c| c.as_container_mut())
            .any(|c| c.delete_expression(uuid))
    }

    /// Evaluate the children with the container's policy, without negation
    pub fn evaluate(&self, state: &ExecutionState) -> bool {
        self.policy.evaluate(&self.conditions, state)
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Child conditions in evaluation order
    pub fn iter(&self) -> std::slice::Iter<'_, Box<dyn ConditionExpression>> {
        self.conditions.iter()
    }
}

impl Clone for ConditionContainer {
    fn clone(&self) -> Self {
        Self {
            uuid: self.uuid.clone(),
            definition_label: self.definition_label.clone(),
            configuration: self.configuration.clone(),
            conditions: self.conditions.clone(),
            policy: self.policy.clone(),
            factory: Arc::clone(&self.factory),
        }
    }
}

impl fmt::Debug for ConditionContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConditionContainer")
            .field("uuid", &self.uuid)
            .field("plugin_id", &self.configuration.id)
            .field("negate", &self.configuration.negate)
            .field("policy", &self.policy)
            .field("conditions", &self.conditions)
            .finish()
    }
}

impl Expression for ConditionContainer {
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
        let mut configuration = self.configuration.clone();
        configuration.conditions = self.conditions.iter().map(|c| c.configuration()).collect();
        configuration
    }

    fn check_integrity(&self, metadata: &mut ExecutionMetadataState) -> IntegrityViolationList {
        let negated = self.is_negated();
        if negated {
            metadata.push_scope();
        }
        let violations = traversal::check_integrity_all(&*self.policy, &self.conditions, metadata);
        if negated {
            metadata.pop_scope();
        }
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
        // Children of a negated container assert for later siblings only;
        // once it passed, none of it holds
        let negated = self.is_negated();
        if negated {
            metadata.push_scope();
        }
        let found = traversal::prepare_until(&*self.policy, &self.conditions, metadata, until);
        if negated && !found {
            metadata.pop_scope();
        }
        found
    }

    fn clone_expression(&self) -> Box<dyn Expression> {
        Box::new(self.clone())
    }

    fn into_condition(self: Box<Self>) -> Option<Box<dyn ConditionExpression>> {
        Some(self)
    }
}

impl ConditionExpression for ConditionContainer {
    fn execute_with_state(&self, state: &ExecutionState) -> bool {
        let result = self.evaluate(state);
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
        ConditionContainer::is_negated(self)
    }

    fn clone_condition(&self) -> Box<dyn ConditionExpression> {
        Box::new(self.clone())
    }

    fn as_container(&self) -> Option<&dyn ExpressionContainer> {
        Some(self)
    }

    fn as_container_mut(&mut self) -> Option<&mut dyn ExpressionContainer> {
        Some(self)
    }
}

impl ExpressionContainer for ConditionContainer {
    fn conditions(&self) -> &[Box<dyn ConditionExpression>] {
        &self.conditions
    }

    fn add_expression_object(&mut self, expression: Box<dyn Expression>) -> Result<()> {
        ConditionContainer::add_expression_object(self, expression).map(|_| ())
    }

    fn add_condition_object(&mut self, condition: Box<dyn ConditionExpression>) -> Result<()> {
        self.push_condition(condition).map(|_| ())
    }

    fn get_expression(&self, uuid: &str) -> Option<&dyn ConditionExpression> {
        ConditionContainer::get_expression(self, uuid)
    }

    fn get_expression_mut(&mut self, uuid: &str) -> Option<&mut dyn ConditionExpression> {
        ConditionContainer::get_expression_mut(self, uuid)
    }

    fn delete_expression(&mut self, uuid: &str) -> bool {
        ConditionContainer::delete_expression(self, uuid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::registry::ExpressionRegistry;
    use crate::rules::settings::Settings;

    fn factory() -> Arc<dyn ExpressionFactory> {
        Arc::new(ExpressionRegistry::with_builtins(Settings::default()))
    }

    fn constant(uuid: &str, value: bool) -> ExpressionConfig {
        ExpressionConfig::new("rules_constant")
            .with_uuid(uuid)
            .with_option("value", value)
    }

    #[test]
    fn test_new_container_is_empty() {
        let container = ConditionContainer::new("rules_and", Box::new(AndPolicy), factory());
        assert!(container.is_empty());
        assert!(!container.is_negated());
        assert!(!container.uuid().is_empty());
        assert_eq!(container.configuration().uuid.as_deref(), Some(container.uuid()));
    }

    #[test]
    fn test_add_expression_keeps_order() {
        let mut container = ConditionContainer::new("rules_or", Box::new(OrPolicy), factory());
        container
            .add_expression("rules_constant", Some(constant("first", false)))
            .unwrap()
            .add_expression("rules_constant", Some(constant("second", true)))
            .unwrap();

        let uuids: Vec<_> = container.iter().map(|c| c.uuid()).collect();
        assert_eq!(uuids, vec!["first", "second"]);
        assert!(container.execute_with_state(&ExecutionState::empty()));
    }

    #[test]
    fn test_label_from_configuration() {
        let registry = ExpressionRegistry::with_builtins(Settings::default());
        let definition = registry.get("rules_and").unwrap();
        let config = ExpressionConfig::new("rules_and").with_option("label", "Published nodes");
        let container =
            ConditionContainer::from_config(config, &definition, Box::new(AndPolicy), factory())
                .unwrap();
        assert_eq!(container.label(), "Published nodes");

        let plain = ConditionContainer::from_config(
            ExpressionConfig::new("rules_and"),
            &definition,
            Box::new(AndPolicy),
            factory(),
        )
        .unwrap();
        assert_eq!(plain.label(), "And");
    }

    #[test]
    fn test_failed_add_leaves_children_unchanged() {
        let mut container = ConditionContainer::new("rules_and", Box::new(AndPolicy), factory());
        container
            .add_expression("rules_constant", Some(constant("only", true)))
            .unwrap();

        assert!(container
            .add_expression("rules_constant", Some(constant("only", false)))
            .is_err());
        assert!(container.add_expression("rules_unknown", None).is_err());
        assert_eq!(container.len(), 1);
        assert!(container.execute_with_state(&ExecutionState::empty()));
    }
}
