//! Deep-merge missing reference keys into a target.
//!
//! Fill only adds. A key that exists in the target keeps its value whatever
//! it is, `""` and `null` included. The one structural correction is that a
//! missing or non-branch target node under a reference branch becomes a
//! fresh empty branch so the descent can continue.
//!
//! Presence is judged by dotted path, so a target that spells `a.b` as
//! `{"a.b": ..}` or as `{"a": {"b": ..}}` already has the reference's
//! `a.b` whichever spelling the reference uses.

use crate::catalog::{Branch, KeyPath, dotted_leaves};
use crate::walk::{MergeVisitor, walk_into};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

/// One leaf written into a tree, with the value that was written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insertion {
    pub path: KeyPath,
    pub value: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FillReport {
    pub inserted: Vec<Insertion>,
    pub branches_created: usize,
}

impl FillReport {
    /// Whether the target was mutated (and therefore needs a backup + write).
    pub fn changed(&self) -> bool {
        !self.inserted.is_empty() || self.branches_created > 0
    }
}

struct FillVisitor {
    /// Dotted paths of the target's leaves before the merge.
    present: BTreeSet<String>,
    /// Reference branches whose leaves the target already has, all of them
    /// under another spelling.
    covered: BTreeSet<KeyPath>,
    report: FillReport,
}

/// Collect reference branches with at least one leaf, every one of which is
/// in `present`. Returns (leaf count, all present) for `node`.
fn collect_covered(
    node: &Branch,
    prefix: &KeyPath,
    present: &BTreeSet<String>,
    covered: &mut BTreeSet<KeyPath>,
) -> (usize, bool) {
    let mut leaves = 0;
    let mut all_present = true;
    for (segment, child) in node {
        let path = prefix.child(segment);
        match child {
            Value::Object(children) => {
                let (count, all) = collect_covered(children, &path, present, covered);
                if count > 0 && all {
                    covered.insert(path);
                }
                leaves += count;
                all_present &= all;
            }
            _ => {
                leaves += 1;
                all_present &= present.contains(&path.dotted());
            }
        }
    }
    (leaves, all_present)
}

impl MergeVisitor for FillVisitor {
    fn enter_branch(&mut self, path: &KeyPath, parent: &mut Branch, segment: &str) -> bool {
        if !parent.get(segment).is_some_and(Value::is_object) {
            if self.covered.contains(path) {
                return false;
            }
            parent.insert(segment.to_string(), Value::Object(Branch::new()));
            self.report.branches_created += 1;
        }
        true
    }

    fn leaf(&mut self, path: &KeyPath, value: &Value, parent: &mut Branch, segment: &str) {
        if parent.contains_key(segment) || self.present.contains(&path.dotted()) {
            return;
        }
        parent.insert(segment.to_string(), value.clone());
        self.report.inserted.push(Insertion {
            path: path.clone(),
            value: value.clone(),
        });
    }
}

/// Copy every reference leaf the target lacks into the target.
///
/// Idempotent: a second call against the same reference reports nothing.
pub fn fill(reference: &Branch, target: &mut Branch) -> FillReport {
    let present: BTreeSet<String> = dotted_leaves(target).into_keys().collect();
    let mut covered = BTreeSet::new();
    collect_covered(reference, &KeyPath::root(), &present, &mut covered);
    let mut visitor = FillVisitor {
        present,
        covered,
        report: FillReport::default(),
    };
    walk_into(reference, target, &mut visitor);
    tracing::debug!(
        inserted = visitor.report.inserted.len(),
        branches_created = visitor.report.branches_created,
        "fill complete"
    );
    visitor.report
}
