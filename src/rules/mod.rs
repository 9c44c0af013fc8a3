// SPDX-License-Identifier: MIT

//! Concrete condition trees
//!
//! This module provides:
//! - `ConditionContainer` with the `rules_and` and `rules_or` policies
//! - `RulesCondition` leaf conditions and their built-in plugins
//! - `ExpressionRegistry` - the factory building trees from configuration
//! - `ConditionLoader` - YAML/JSON configuration files
//! - `Settings` - limits read from the environment

pub mod condition;
pub mod container;
pub mod loader;
pub mod registry;
pub mod settings;

pub use condition::{ConditionPlugin, RulesCondition};
pub use container::{AndPolicy, ConditionContainer, ContainerPolicy, OrPolicy, TraversalHooks};
pub use loader::ConditionLoader;
pub use registry::{ExpressionConstructor, ExpressionRegistry, PluginDefinition};
pub use settings::Settings;
