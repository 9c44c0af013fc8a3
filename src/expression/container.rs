// SPDX-License-Identifier: MIT

//! Identity-addressed access to nested conditions

use super::base::{ConditionExpression, Expression};
use super::error::Result;

/// A condition that owns an ordered list of child conditions.
///
/// Lookups and deletions search the whole subtree depth-first: direct
/// children are checked first, then each child container in order.
///
/// A container only knows its own subtree. Adding to a nested container
/// reached through `get_expression_mut` does not see UUIDs elsewhere in the
/// tree; add through the root (`ConditionContainer::add_expression_object_to`)
/// to keep UUIDs unique across the whole tree.
pub trait ExpressionContainer {
    /// Child conditions in evaluation order
    fn conditions(&self) -> &[Box<dyn ConditionExpression>];

    /// Append an expression; fails without changing anything when it is
    /// not a condition or one of its UUIDs already exists in the subtree
    fn add_expression_object(&mut self, expression: Box<dyn Expression>) -> Result<()>;

    /// Append a condition, with the same UUID check as `add_expression_object`
    fn add_condition_object(&mut self, condition: Box<dyn ConditionExpression>) -> Result<()>;

    /// Find a condition anywhere in the subtree
    fn get_expression(&self, uuid: &str) -> Option<&dyn ConditionExpression>;

    fn get_expression_mut(&mut self, uuid: &str) -> Option<&mut dyn ConditionExpression>;

    /// Remove the first condition with this UUID from the subtree.
    /// Returns false when it was not found.
    fn delete_expression(&mut self, uuid: &str) -> bool;
}
