//! The tree walker every operation is built on.
//!
//! Three traversal shapes:
//!
//! - [`walk`] / [`walk_paired`]: read-only, depth-first, children in the
//!   insertion order of the *driving* tree. Paired walks look each driving
//!   path up in the opposing tree and hand the visitor the resulting
//!   [`Slot`].
//! - [`walk_into`]: driving tree read-only, target tree mutable. The
//!   visitor decides what a driving branch means for the target and
//!   whether to descend.
//! - [`for_each_leaf_mut`]: every leaf of one tree, mutably.
//!
//! A branch/leaf mismatch is never an error here; it shows up as a
//! `Slot::Leaf` where a branch was expected (or the reverse) and the
//! visitor applies its own policy.

use crate::catalog::{Branch, KeyPath, Slot};
use serde_json::Value;

/// Which tree's shape drives a paired walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Drive {
    Reference,
    Target,
}

/// Read-only visitor.
pub trait Visitor {
    fn leaf(&mut self, path: &KeyPath, value: &Value, opposing: Slot<'_>);

    fn branch(&mut self, path: &KeyPath, node: &Branch, opposing: Slot<'_>) {
        let _ = (path, node, opposing);
    }
}

/// Visitor for walks that write into the target tree.
pub trait MergeVisitor {
    /// Called for each driving branch before descent. `parent` is the target
    /// branch that should hold `segment`. Returns whether to descend; descent
    /// only happens if `parent[segment]` is a branch afterwards.
    fn enter_branch(&mut self, path: &KeyPath, parent: &mut Branch, segment: &str) -> bool;

    /// Called for each driving leaf with the target branch that would hold it.
    fn leaf(&mut self, path: &KeyPath, value: &Value, parent: &mut Branch, segment: &str);
}

/// Walk one tree. Every opposing slot is `Absent`.
pub fn walk<V: Visitor + ?Sized>(node: &Branch, prefix: &KeyPath, visitor: &mut V) {
    descend(node, None, prefix, visitor);
}

/// Walk `reference` and `target` together, driven by one side's shape.
pub fn walk_paired<V: Visitor + ?Sized>(
    reference: &Branch,
    target: &Branch,
    drive: Drive,
    visitor: &mut V,
) {
    let (driving, opposing) = match drive {
        Drive::Reference => (reference, target),
        Drive::Target => (target, reference),
    };
    descend(driving, Some(opposing), &KeyPath::root(), visitor);
}

fn descend<V: Visitor + ?Sized>(
    driving: &Branch,
    opposing: Option<&Branch>,
    prefix: &KeyPath,
    visitor: &mut V,
) {
    for (segment, node) in driving {
        let path = prefix.child(segment);
        let other = opposing.map_or(Slot::Absent, |branch| Slot::of(branch.get(segment)));
        match node {
            Value::Object(children) => {
                visitor.branch(&path, children, other);
                descend(children, other.branch(), &path, visitor);
            }
            leaf => visitor.leaf(&path, leaf, other),
        }
    }
}

/// Drive `target` with `driving`'s shape, letting the visitor mutate it.
pub fn walk_into<V: MergeVisitor + ?Sized>(driving: &Branch, target: &mut Branch, visitor: &mut V) {
    merge_descend(driving, target, &KeyPath::root(), visitor);
}

fn merge_descend<V: MergeVisitor + ?Sized>(
    driving: &Branch,
    target: &mut Branch,
    prefix: &KeyPath,
    visitor: &mut V,
) {
    for (segment, node) in driving {
        let path = prefix.child(segment);
        match node {
            Value::Object(children) => {
                if visitor.enter_branch(&path, target, segment)
                    && let Some(Value::Object(next)) = target.get_mut(segment.as_str())
                {
                    merge_descend(children, next, &path, visitor);
                }
            }
            leaf => visitor.leaf(&path, leaf, target, segment),
        }
    }
}

struct LeafFn<F>(F);

impl<F> Visitor for LeafFn<F>
where
    F: FnMut(&KeyPath, &Value),
{
    fn leaf(&mut self, path: &KeyPath, value: &Value, _opposing: Slot<'_>) {
        (self.0)(path, value);
    }
}

/// Call `f` for every leaf of one tree, in walk order.
pub fn for_each_leaf<F>(root: &Branch, f: F)
where
    F: FnMut(&KeyPath, &Value),
{
    walk(root, &KeyPath::root(), &mut LeafFn(f));
}

/// Call `f` for every leaf of one tree with mutable access to the value.
pub fn for_each_leaf_mut<F>(root: &mut Branch, mut f: F)
where
    F: FnMut(&KeyPath, &mut Value),
{
    fn descend_mut<F: FnMut(&KeyPath, &mut Value)>(node: &mut Branch, prefix: &KeyPath, f: &mut F) {
        for (segment, child) in node.iter_mut() {
            let path = prefix.child(segment);
            match child {
                Value::Object(children) => descend_mut(children, &path, f),
                leaf => f(&path, leaf),
            }
        }
    }
    descend_mut(root, &KeyPath::root(), &mut f);
}
