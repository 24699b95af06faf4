//! Missing/extra key sets between a reference and a target tree.

use crate::catalog::{Branch, KeyPath, Slot, dotted_leaves};
use crate::walk::{Drive, Visitor, walk_paired};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffReport {
    /// Reference leaf paths with no leaf at the same path in the target.
    pub missing: Vec<KeyPath>,
    /// Target leaf paths with no leaf at the same path in the reference.
    pub extra: Vec<KeyPath>,
}

impl DiffReport {
    pub fn is_clean(&self) -> bool {
        self.missing.is_empty() && self.extra.is_empty()
    }
}

struct Unmatched<'a> {
    opposing_leaves: BTreeMap<String, &'a Value>,
    paths: Vec<KeyPath>,
}

impl Visitor for Unmatched<'_> {
    fn leaf(&mut self, path: &KeyPath, _value: &Value, opposing: Slot<'_>) {
        if !opposing.is_leaf() && !self.opposing_leaves.contains_key(&path.dotted()) {
            self.paths.push(path.clone());
        }
    }
}

fn unmatched(reference: &Branch, target: &Branch, drive: Drive) -> Vec<KeyPath> {
    let opposing = match drive {
        Drive::Reference => target,
        Drive::Target => reference,
    };
    let mut visitor = Unmatched {
        opposing_leaves: dotted_leaves(opposing),
        paths: Vec::new(),
    };
    walk_paired(reference, target, drive, &mut visitor);
    visitor.paths.sort();
    visitor.paths
}

/// Compare leaf path sets by dotted form. A path that is a branch on one
/// side and a leaf on the other fails both directions; a segment containing
/// `.` matches the nested spelling of the same path.
pub fn diff(reference: &Branch, target: &Branch) -> DiffReport {
    DiffReport {
        missing: unmatched(reference, target, Drive::Reference),
        extra: unmatched(reference, target, Drive::Target),
    }
}
