//! Reconstruct a tree strictly from a template's shape.
//!
//! The output has exactly the template's key paths in the template's order.
//! A target leaf at a template leaf path wins, even when it is `""` and
//! whichever way the target spells the dotted path; everything else comes
//! from the template. Target-only paths are dropped.

use crate::catalog::{Branch, KeyPath, Slot, dotted_leaves, ensure_branch, identical};
use crate::walk::{Drive, Visitor, walk_paired};
use serde_json::Value;
use std::collections::BTreeMap;

struct Builder<'t> {
    target_leaves: BTreeMap<String, &'t Value>,
    out: Branch,
}

impl Builder<'_> {
    fn place(&mut self, path: &KeyPath, node: Value) {
        let Some((segment, parents)) = path.segments().split_last() else {
            return;
        };
        ensure_branch(&mut self.out, parents).insert(segment.clone(), node);
    }
}

impl Visitor for Builder<'_> {
    fn branch(&mut self, path: &KeyPath, _node: &Branch, _opposing: Slot<'_>) {
        self.place(path, Value::Object(Branch::new()));
    }

    fn leaf(&mut self, path: &KeyPath, value: &Value, opposing: Slot<'_>) {
        let chosen = opposing
            .leaf()
            .or_else(|| self.target_leaves.get(&path.dotted()).copied())
            .unwrap_or(value)
            .clone();
        self.place(path, chosen);
    }
}

/// Build a new tree shaped like `template`, keeping `target`'s values where
/// it has a leaf at the same path. Neither input is modified.
pub fn rebuild(template: &Branch, target: &Branch) -> Branch {
    let mut builder = Builder {
        target_leaves: dotted_leaves(target),
        out: Branch::new(),
    };
    walk_paired(template, target, Drive::Reference, &mut builder);
    builder.out
}

/// A rebuilt tree plus whether it differs from the input in content or
/// key order.
#[derive(Debug, Clone, PartialEq)]
pub struct RebuildOutcome {
    pub tree: Branch,
    pub changed: bool,
}

pub fn rebuild_with_outcome(template: &Branch, target: &Branch) -> RebuildOutcome {
    let tree = rebuild(template, target);
    let changed = !identical(&tree, target);
    tracing::debug!(changed, "rebuild complete");
    RebuildOutcome { tree, changed }
}
