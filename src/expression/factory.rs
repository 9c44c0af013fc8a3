// SPDX-License-Identifier: MIT

use super::base::{require_condition, ConditionExpression, Expression};
use super::config::ExpressionConfig;
use super::error::Result;

/// Builds expressions from configuration records.
///
/// Containers hold on to the factory they were built with so children added
/// later by plugin id use the same set of plugins.
pub trait ExpressionFactory: Send + Sync {
    /// Create the expression registered under `plugin_id`
    fn create_instance(&self, plugin_id: &str, config: ExpressionConfig)
        -> Result<Box<dyn Expression>>;

    /// Create a condition with an empty configuration
    fn create_condition(&self, condition_id: &str) -> Result<Box<dyn ConditionExpression>> {
        let expression = self.create_instance(condition_id, ExpressionConfig::new(condition_id))?;
        require_condition(expression)
    }
}
