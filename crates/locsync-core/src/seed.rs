//! Key registration and seeding helpers.
//!
//! - [`declare`]: make sure key paths exist (new keys get a placeholder).
//! - [`seed_value`]: write a value where a leaf is vacant.
//! - [`skeleton`]: the reference's shape with every leaf blanked.
//! - [`pending`]: the translation worklist of a target.

use crate::catalog::{Branch, KeyPath, Slot, ensure_branch, is_vacant};
use crate::fill::Insertion;
use crate::walk::{Drive, Visitor, walk_paired};
use serde_json::Value;

/// Ensure every path exists, creating intermediate branches. A leaf is only
/// written when absent or `null`. Returns the paths that were written.
pub fn declare<'a, I>(root: &mut Branch, paths: I, value: &Value) -> Vec<KeyPath>
where
    I: IntoIterator<Item = &'a KeyPath>,
{
    let mut written = Vec::new();
    for path in paths {
        let Some((segment, parents)) = path.segments().split_last() else {
            continue;
        };
        let parent = ensure_branch(root, parents);
        if matches!(parent.get(segment), None | Some(Value::Null)) {
            parent.insert(segment.clone(), value.clone());
            written.push(path.clone());
        }
    }
    written
}

/// Write `value` at `path` when the current leaf is absent, `null` or `""`.
pub fn seed_value(root: &mut Branch, path: &KeyPath, value: &Value) -> bool {
    let Some((segment, parents)) = path.segments().split_last() else {
        return false;
    };
    let parent = ensure_branch(root, parents);
    if !is_vacant(parent.get(segment)) {
        return false;
    }
    parent.insert(segment.clone(), value.clone());
    true
}

/// Same shape as `reference`, every leaf replaced by `""`.
pub fn skeleton(reference: &Branch) -> Branch {
    reference
        .iter()
        .map(|(segment, node)| {
            let blank = match node {
                Value::Object(children) => Value::Object(skeleton(children)),
                _ => Value::String(String::new()),
            };
            (segment.clone(), blank)
        })
        .collect()
}

struct Pending {
    rows: Vec<Insertion>,
}

impl Visitor for Pending {
    fn leaf(&mut self, path: &KeyPath, value: &Value, opposing: Slot<'_>) {
        let untranslated = matches!(
            opposing.leaf(),
            Some(Value::String(text)) if text.trim().is_empty()
        );
        if value.is_string() && untranslated {
            self.rows.push(Insertion {
                path: path.clone(),
                value: value.clone(),
            });
        }
    }
}

/// Reference string leaves whose target leaf is a blank string: the rows a
/// translator has to fill in. Absent target keys are Fill's job, not this.
pub fn pending(reference: &Branch, target: &Branch) -> Vec<Insertion> {
    let mut visitor = Pending { rows: Vec::new() };
    walk_paired(reference, target, Drive::Reference, &mut visitor);
    visitor.rows
}
