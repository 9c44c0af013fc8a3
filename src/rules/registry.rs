// SPDX-License-Identifier: MIT

//! Plugin registry used as the expression factory

use crate::expression::{Expression, ExpressionConfig, ExpressionError, ExpressionFactory, Result};
use crate::rules::condition::{ConstantCondition, DataComparison, DataIsType, RulesCondition};
use crate::rules::container::{AndPolicy, ConditionContainer, OrPolicy};
use crate::rules::settings::Settings;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

/// Builds an expression from its configuration record.
///
/// The factory is handed in so containers can build their children and keep
/// it for conditions added later.
pub type ExpressionConstructor = fn(
    ExpressionConfig,
    &PluginDefinition,
    Arc<dyn ExpressionFactory>,
) -> Result<Box<dyn Expression>>;

/// A registered expression plugin
#[derive(Clone)]
pub struct PluginDefinition {
    pub id: String,
    pub label: String,
    constructor: ExpressionConstructor,
}

impl PluginDefinition {
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        constructor: ExpressionConstructor,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            constructor,
        }
    }
}

impl fmt::Debug for PluginDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginDefinition")
            .field("id", &self.id)
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// Expression factory backed by registered plugin definitions.
///
/// Clones share the same set of plugins.
#[derive(Clone)]
pub struct ExpressionRegistry {
    plugins: Arc<RwLock<HashMap<String, PluginDefinition>>>,
    settings: Settings,
}

impl ExpressionRegistry {
    pub fn new() -> Self {
        Self::with_settings(Settings::default())
    }

    pub fn with_settings(settings: Settings) -> Self {
        Self {
            plugins: Arc::new(RwLock::new(HashMap::new())),
            settings,
        }
    }

    /// Registry with the built-in containers and conditions registered
    pub fn with_builtins(settings: Settings) -> Self {
        let registry = Self::with_settings(settings);
        registry.register_builtins();
        registry
    }

    pub fn register(&self, definition: PluginDefinition) {
        let mut plugins = self.plugins.write().unwrap_or_else(PoisonError::into_inner);
        if plugins.contains_key(&definition.id) {
            log::warn!("Replacing expression plugin '{}'", definition.id);
        }
        plugins.insert(definition.id.clone(), definition);
    }

    pub fn get(&self, plugin_id: &str) -> Option<PluginDefinition> {
        let plugins = self.plugins.read().unwrap_or_else(PoisonError::into_inner);
        plugins.get(plugin_id).cloned()
    }

    pub fn contains(&self, plugin_id: &str) -> bool {
        self.get(plugin_id).is_some()
    }

    /// Registered plugin ids, sorted
    pub fn plugin_ids(&self) -> Vec<String> {
        let plugins = self.plugins.read().unwrap_or_else(PoisonError::into_inner);
        let mut ids: Vec<String> = plugins.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    fn register_builtins(&self) {
        self.register(PluginDefinition::new(
            AndPolicy::PLUGIN_ID,
            "And",
            |config, definition, factory| {
                let container = ConditionContainer::from_config(
                    config,
                    definition,
                    Box::new(AndPolicy),
                    factory,
                )?;
                Ok(Box::new(container))
            },
        ));
        self.register(PluginDefinition::new(
            OrPolicy::PLUGIN_ID,
            "Or",
            |config, definition, factory| {
                let container = ConditionContainer::from_config(
                    config,
                    definition,
                    Box::new(OrPolicy),
                    factory,
                )?;
                Ok(Box::new(container))
            },
        ));
        self.register(PluginDefinition::new(
            ConstantCondition::PLUGIN_ID,
            "Constant",
            |config, definition, _factory| {
                Ok(Box::new(RulesCondition::new(
                    config,
                    definition,
                    Arc::new(ConstantCondition),
                )))
            },
        ));
        self.register(PluginDefinition::new(
            DataComparison::PLUGIN_ID,
            "Data comparison",
            |config, definition, _factory| {
                Ok(Box::new(RulesCondition::new(
                    config,
                    definition,
                    Arc::new(DataComparison),
                )))
            },
        ));
        self.register(PluginDefinition::new(
            DataIsType::PLUGIN_ID,
            "Data is of type",
            |config, definition, _factory| {
                Ok(Box::new(RulesCondition::new(
                    config,
                    definition,
                    Arc::new(DataIsType),
                )))
            },
        ));
    }
}

impl Default for ExpressionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ExpressionFactory for ExpressionRegistry {
    fn create_instance(
        &self,
        plugin_id: &str,
        mut config: ExpressionConfig,
    ) -> Result<Box<dyn Expression>> {
        let definition = self
            .get(plugin_id)
            .ok_or_else(|| ExpressionError::plugin_not_found(plugin_id))?;

        let depth = config.depth();
        if depth > self.settings.max_depth {
            return Err(ExpressionError::config(format!(
                "Configuration of '{}' is nested {} levels deep, the limit is {}",
                plugin_id, depth, self.settings.max_depth
            )));
        }

        config.id = plugin_id.to_string();
        log::trace!("Creating expression '{}'", plugin_id);
        (definition.constructor)(config, &definition, Arc::new(self.clone()))
    }
}
