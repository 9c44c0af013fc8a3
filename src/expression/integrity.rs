// SPDX-License-Identifier: MIT

//! Integrity violations collected during static validation

use std::fmt;

/// A structural or type problem found while checking a tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegrityViolation {
    pub message: String,
    /// Name of the option or context the problem relates to
    pub context_name: Option<String>,
    /// UUID of the expression that reported the problem
    pub uuid: Option<String>,
}

impl IntegrityViolation {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context_name: None,
            uuid: None,
        }
    }

    pub fn with_context_name(mut self, name: impl Into<String>) -> Self {
        self.context_name = Some(name.into());
        self
    }

    pub fn with_uuid(mut self, uuid: impl Into<String>) -> Self {
        self.uuid = Some(uuid.into());
        self
    }
}

impl fmt::Display for IntegrityViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.context_name {
            Some(name) => write!(f, "{}: {}", name, self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Ordered list of violations; concatenation keeps order and duplicates
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntegrityViolationList {
    violations: Vec<IntegrityViolation>,
}

impl IntegrityViolationList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, violation: IntegrityViolation) {
        self.violations.push(violation);
    }

    /// Append all violations of `other`
    pub fn add_all(&mut self, other: IntegrityViolationList) {
        self.violations.extend(other.violations);
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, IntegrityViolation> {
        self.violations.iter()
    }

    /// Violations reported by the expression with the given UUID
    pub fn for_uuid<'a>(&'a self, uuid: &'a str) -> impl Iterator<Item = &'a IntegrityViolation> {
        self.violations
            .iter()
            .filter(move |v| v.uuid.as_deref() == Some(uuid))
    }
}

impl From<Vec<IntegrityViolation>> for IntegrityViolationList {
    fn from(violations: Vec<IntegrityViolation>) -> Self {
        Self { violations }
    }
}

impl FromIterator<IntegrityViolation> for IntegrityViolationList {
    fn from_iter<I: IntoIterator<Item = IntegrityViolation>>(iter: I) -> Self {
        Self {
            violations: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for IntegrityViolationList {
    type Item = IntegrityViolation;
    type IntoIter = std::vec::IntoIter<IntegrityViolation>;

    fn into_iter(self) -> Self::IntoIter {
        self.violations.into_iter()
    }
}

impl<'a> IntoIterator for &'a IntegrityViolationList {
    type Item = &'a IntegrityViolation;
    type IntoIter = std::slice::Iter<'a, IntegrityViolation>;

    fn into_iter(self) -> Self::IntoIter {
        self.violations.iter()
    }
}
