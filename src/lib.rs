// SPDX-License-Identifier: MIT

//! Composite boolean condition trees.
//!
//! `expression` holds the capabilities every node of a tree implements,
//! `rules` holds the concrete containers, leaf conditions and the registry
//! that builds trees from configuration records.

pub mod expression;
pub mod rules;
