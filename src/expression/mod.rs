// SPDX-License-Identifier: MIT

//! Expression capabilities
//!
//! Every node of a condition tree is an [`Expression`]; nodes that yield a
//! boolean are [`ConditionExpression`]s, and conditions owning further
//! conditions also implement [`ExpressionContainer`].

mod base;
mod config;
mod container;
pub mod error;
mod factory;
mod integrity;
pub mod state;

pub use base::{collect_uuids, require_condition, ConditionExpression, Expression};
pub use config::ExpressionConfig;
pub use container::ExpressionContainer;
pub use error::{ExpressionError, Result};
pub use factory::ExpressionFactory;
pub use integrity::{IntegrityViolation, IntegrityViolationList};
pub use state::{ExecutionMetadataState, ExecutionState, FieldType, SelectorError};
