//! Heal a reference tree's gaps from a more complete donor.
//!
//! Same walk as Fill, driven by the donor's shape. A reference leaf is
//! eligible when it is absent, `null` or `""`; a donor value is usable when
//! it is neither `null` nor `""`. Non-empty reference leaves are never
//! touched, including when the donor has a branch at their path.

use crate::catalog::{Branch, KeyPath, is_vacant};
use crate::fill::Insertion;
use crate::walk::{MergeVisitor, walk_into};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromoteReport {
    pub filled: Vec<Insertion>,
    pub branches_created: usize,
}

impl PromoteReport {
    pub fn changed(&self) -> bool {
        !self.filled.is_empty() || self.branches_created > 0
    }
}

struct PromoteVisitor {
    report: PromoteReport,
}

impl MergeVisitor for PromoteVisitor {
    fn enter_branch(&mut self, _path: &KeyPath, parent: &mut Branch, segment: &str) -> bool {
        let existing = parent.get(segment);
        if existing.is_some_and(Value::is_object) {
            return true;
        }
        if !is_vacant(existing) {
            return false;
        }
        parent.insert(segment.to_string(), Value::Object(Branch::new()));
        self.report.branches_created += 1;
        true
    }

    fn leaf(&mut self, path: &KeyPath, value: &Value, parent: &mut Branch, segment: &str) {
        if !is_vacant(parent.get(segment)) || is_vacant(Some(value)) {
            return;
        }
        parent.insert(segment.to_string(), value.clone());
        self.report.filled.push(Insertion {
            path: path.clone(),
            value: value.clone(),
        });
    }
}

/// Fill `reference`'s vacant leaves from `donor`.
pub fn promote(reference: &mut Branch, donor: &Branch) -> PromoteReport {
    let mut visitor = PromoteVisitor {
        report: PromoteReport::default(),
    };
    walk_into(donor, reference, &mut visitor);
    tracing::debug!(
        filled = visitor.report.filled.len(),
        branches_created = visitor.report.branches_created,
        "promote complete"
    );
    visitor.report
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn branch(value: Value) -> Branch {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object fixture, got {other}"),
        }
    }

    #[test]
    fn fills_empty_null_and_absent_reference_leaves() {
        let mut reference = branch(json!({"a": "", "b": null, "c": "keep"}));
        let donor = branch(json!({"a": "A", "b": "B", "c": "C", "d": "D"}));

        let report = promote(&mut reference, &donor);
        assert_eq!(
            Value::Object(reference),
            json!({"a": "A", "b": "B", "c": "keep", "d": "D"})
        );
        let filled: Vec<String> = report.filled.iter().map(|row| row.path.dotted()).collect();
        assert_eq!(filled, vec!["a", "b", "d"]);
    }

    #[test]
    fn empty_donor_values_are_not_eligible() {
        let mut reference = branch(json!({"a": ""}));
        let donor = branch(json!({"a": "", "b": null}));

        let report = promote(&mut reference, &donor);
        assert!(!report.changed());
        assert_eq!(Value::Object(reference), json!({"a": ""}));
    }

    #[test]
    fn donor_branch_never_clobbers_non_empty_reference_leaf() {
        let mut reference = branch(json!({"a": "text", "b": ""}));
        let donor = branch(json!({"a": {"x": "1"}, "b": {"y": "2"}}));

        let report = promote(&mut reference, &donor);
        assert_eq!(Value::Object(reference), json!({"a": "text", "b": {"y": "2"}}));
        assert_eq!(report.branches_created, 1);
        assert_eq!(report.filled.len(), 1);
    }

    #[test]
    fn donor_leaf_never_replaces_reference_branch() {
        let mut reference = branch(json!({"a": {"x": ""}}));
        let donor = branch(json!({"a": "flat"}));
        assert!(!promote(&mut reference, &donor).changed());
        assert_eq!(Value::Object(reference), json!({"a": {"x": ""}}));
    }

    #[test]
    fn nested_vacancies_are_healed() {
        let mut reference = branch(json!({"general": {"cart": {"title": "", "empty": "Empty"}}}));
        let donor = branch(json!({"general": {"cart": {"title": "Kurv", "empty": "Tom"}}}));

        let report = promote(&mut reference, &donor);
        assert_eq!(
            Value::Object(reference),
            json!({"general": {"cart": {"title": "Kurv", "empty": "Empty"}}})
        );
        assert_eq!(report.filled[0].path, KeyPath::parse("general.cart.title"));
    }
}
