// SPDX-License-Identifier: MIT

//! Static traversals over a container's children
//!
//! Both traversals run the same hooks around the children. Integrity
//! checking always visits every child; metadata preparation stops as soon as
//! the target expression is reached and then skips `after_traversal`, so the
//! metadata is left exactly as it stands right before the target.

use crate::expression::{ConditionExpression, ExecutionMetadataState, IntegrityViolationList};

/// Side effects a container applies to the metadata state around its children
pub trait TraversalHooks {
    /// Called before the first child is visited
    fn before_traversal(&self, _metadata: &mut ExecutionMetadataState) {}

    /// Called before each child is visited
    fn before_child(&self, _metadata: &mut ExecutionMetadataState) {}

    /// Called after the last child has been visited
    fn after_traversal(&self, _metadata: &mut ExecutionMetadataState) {}
}

/// Check every child, concatenating their violations in order
pub fn check_integrity_all<H>(
    hooks: &H,
    children: &[Box<dyn ConditionExpression>],
    metadata: &mut ExecutionMetadataState,
) -> IntegrityViolationList
where
    H: TraversalHooks + ?Sized,
{
    hooks.before_traversal(metadata);

    let mut violations = IntegrityViolationList::new();
    for child in children {
        hooks.before_child(metadata);
        log::trace!("Checking integrity of '{}'", child.uuid());
        violations.add_all(child.check_integrity(metadata));
    }

    hooks.after_traversal(metadata);
    violations
}

/// Prepare the metadata state child by child until `until` is found.
///
/// Returns true as soon as a child reports the target.
pub fn prepare_until<H>(
    hooks: &H,
    children: &[Box<dyn ConditionExpression>],
    metadata: &mut ExecutionMetadataState,
    until: Option<&str>,
) -> bool
where
    H: TraversalHooks + ?Sized,
{
    hooks.before_traversal(metadata);

    for child in children {
        hooks.before_child(metadata);
        if child.prepare_execution_metadata_state(metadata, until) {
            log::trace!("Reached '{}' while preparing metadata", child.uuid());
            return true;
        }
    }

    hooks.after_traversal(metadata);
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::{
        ConditionExpression, ExecutionState, Expression, ExpressionConfig, IntegrityViolation,
    };
    use std::sync::{Arc, Mutex};

    type CallLog = Arc<Mutex<Vec<String>>>;

    struct RecordingHooks {
        log: CallLog,
    }

    impl TraversalHooks for RecordingHooks {
        fn before_traversal(&self, _metadata: &mut ExecutionMetadataState) {
            self.log.lock().unwrap().push("before".to_string());
        }

        fn after_traversal(&self, _metadata: &mut ExecutionMetadataState) {
            self.log.lock().unwrap().push("after".to_string());
        }
    }

    #[derive(Debug, Clone)]
    struct Probe {
        uuid: String,
        violation: bool,
        log: CallLog,
    }

    impl Expression for Probe {
        fn uuid(&self) -> &str {
            &self.uuid
        }

        fn plugin_id(&self) -> &str {
            "probe"
        }

        fn configuration(&self) -> ExpressionConfig {
            ExpressionConfig::new("probe").with_uuid(self.uuid.clone())
        }

        fn check_integrity(&self, _metadata: &mut ExecutionMetadataState) -> IntegrityViolationList {
            self.log.lock().unwrap().push(format!("check {}", self.uuid));
            let mut list = IntegrityViolationList::new();
            if self.violation {
                list.push(IntegrityViolation::new("broken").with_uuid(self.uuid.clone()));
            }
            list
        }

        fn prepare_execution_metadata_state(
            &self,
            _metadata: &mut ExecutionMetadataState,
            until: Option<&str>,
        ) -> bool {
            if until == Some(self.uuid.as_str()) {
                return true;
            }
            self.log.lock().unwrap().push(format!("prepare {}", self.uuid));
            false
        }

        fn clone_expression(&self) -> Box<dyn Expression> {
            Box::new(self.clone())
        }

        fn into_condition(self: Box<Self>) -> Option<Box<dyn ConditionExpression>> {
            Some(self)
        }
    }

    impl ConditionExpression for Probe {
        fn execute_with_state(&self, _state: &ExecutionState) -> bool {
            true
        }

        fn set_negated(&mut self, _negate: bool) {}

        fn is_negated(&self) -> bool {
            false
        }

        fn clone_condition(&self) -> Box<dyn ConditionExpression> {
            Box::new(self.clone())
        }
    }

    fn probes(log: &CallLog, violations: &[bool]) -> Vec<Box<dyn ConditionExpression>> {
        violations
            .iter()
            .enumerate()
            .map(|(i, violation)| {
                Box::new(Probe {
                    uuid: format!("c{}", i),
                    violation: *violation,
                    log: log.clone(),
                }) as Box<dyn ConditionExpression>
            })
            .collect()
    }

    fn calls(log: &CallLog) -> Vec<String> {
        log.lock().unwrap().clone()
    }

    #[test]
    fn test_check_integrity_visits_all_children() {
        let log = CallLog::default();
        let hooks = RecordingHooks { log: log.clone() };
        let children = probes(&log, &[false, true, false, true]);
        let mut metadata = ExecutionMetadataState::new();

        let violations = check_integrity_all(&hooks, &children, &mut metadata);

        let uuids: Vec<_> = violations.iter().filter_map(|v| v.uuid.clone()).collect();
        assert_eq!(uuids, vec!["c1", "c3"]);
        assert_eq!(
            calls(&log),
            vec!["before", "check c0", "check c1", "check c2", "check c3", "after"]
        );
    }

    #[test]
    fn test_prepare_until_stops_at_target() {
        let log = CallLog::default();
        let hooks = RecordingHooks { log: log.clone() };
        let children = probes(&log, &[false, true, false, true]);
        let mut metadata = ExecutionMetadataState::new();

        let found = prepare_until(&hooks, &children, &mut metadata, Some("c2"));

        assert!(found);
        assert_eq!(calls(&log), vec!["before", "prepare c0", "prepare c1"]);
    }

    #[test]
    fn test_prepare_until_without_target_runs_after_hook() {
        let log = CallLog::default();
        let hooks = RecordingHooks { log: log.clone() };
        let children = probes(&log, &[false, false]);
        let mut metadata = ExecutionMetadataState::new();

        assert!(!prepare_until(&hooks, &children, &mut metadata, None));
        assert!(!prepare_until(&hooks, &children, &mut metadata, Some("missing")));
        assert_eq!(
            calls(&log),
            vec![
                "before",
                "prepare c0",
                "prepare c1",
                "after",
                "before",
                "prepare c0",
                "prepare c1",
                "after"
            ]
        );
    }

    #[test]
    fn test_empty_children_still_run_hooks() {
        let log = CallLog::default();
        let hooks = RecordingHooks { log: log.clone() };
        let mut metadata = ExecutionMetadataState::new();

        assert!(check_integrity_all(&hooks, &[], &mut metadata).is_empty());
        assert_eq!(calls(&log), vec!["before", "after"]);
    }
}
