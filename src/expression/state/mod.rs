// SPDX-License-Identifier: MIT

//! State passed through a condition tree
//!
//! This module provides:
//! - `ExecutionState` - runtime values a condition is evaluated against
//! - `ExecutionMetadataState` - the typed data context available at a point
//!   in the tree, used for validation before anything runs

mod metadata;
mod store;

pub use metadata::{ExecutionMetadataState, FieldType, SelectorError};
pub use store::ExecutionState;
