//! Property tests over randomly generated catalog trees.
//!
//! Keys are drawn from a tiny alphabet so reference and target trees
//! overlap heavily, including branch/leaf conflicts at the same path.

use locsync_core::{
    Branch, KeyPath, Slot, Visitor, diff, fill, for_each_leaf, identical, is_vacant, lookup,
    promote, rebuild, walk,
};
use proptest::prelude::*;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

fn leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::String(String::new())),
        "[a-z]{1,5}".prop_map(Value::String),
        any::<i32>().prop_map(Value::from),
        any::<bool>().prop_map(Value::Bool),
        Just(Value::Null),
        prop::collection::vec("[a-z]{0,3}", 0..3)
            .prop_map(|items| Value::Array(items.into_iter().map(Value::String).collect())),
    ]
}

fn node() -> impl Strategy<Value = Value> {
    leaf().prop_recursive(3, 32, 4, |inner| {
        prop::collection::btree_map("[a-d]", inner, 0..4)
            .prop_map(|children| Value::Object(children.into_iter().collect()))
    })
}

fn tree() -> impl Strategy<Value = Branch> {
    prop::collection::btree_map("[a-d]", node(), 0..5)
        .prop_map(|children| children.into_iter().collect::<Branch>())
}

fn leaves(root: &Branch) -> BTreeMap<KeyPath, Value> {
    let mut out = BTreeMap::new();
    for_each_leaf(root, |path, value| {
        out.insert(path.clone(), value.clone());
    });
    out
}

#[derive(Default)]
struct AllPaths {
    paths: BTreeSet<KeyPath>,
}

impl Visitor for AllPaths {
    fn leaf(&mut self, path: &KeyPath, _value: &Value, _opposing: Slot<'_>) {
        self.paths.insert(path.clone());
    }

    fn branch(&mut self, path: &KeyPath, _node: &Branch, _opposing: Slot<'_>) {
        self.paths.insert(path.clone());
    }
}

fn all_paths(root: &Branch) -> BTreeSet<KeyPath> {
    let mut visitor = AllPaths::default();
    walk(root, &KeyPath::root(), &mut visitor);
    visitor.paths
}

proptest! {
    #[test]
    fn fill_is_idempotent(reference in tree(), target in tree()) {
        let mut once = target.clone();
        fill(&reference, &mut once);
        let mut twice = once.clone();
        let second = fill(&reference, &mut twice);
        prop_assert!(!second.changed());
        prop_assert!(identical(&once, &twice));
    }

    #[test]
    fn fill_never_changes_existing_leaves(reference in tree(), target in tree()) {
        let before = leaves(&target);
        let mut filled = target.clone();
        fill(&reference, &mut filled);

        for (path, value) in before {
            // A reference branch at a target leaf path is the one structural
            // correction Fill makes.
            if lookup(&reference, &path).branch().is_some() {
                continue;
            }
            prop_assert_eq!(lookup(&filled, &path).leaf(), Some(&value), "path {}", path);
        }
    }

    #[test]
    fn fill_covers_every_reference_path(reference in tree(), target in tree()) {
        let mut filled = target.clone();
        fill(&reference, &mut filled);
        for path in all_paths(&reference) {
            prop_assert!(!lookup(&filled, &path).is_absent(), "path {}", path);
        }
    }

    #[test]
    fn rebuild_has_exact_template_paths(template in tree(), target in tree()) {
        let rebuilt = rebuild(&template, &target);
        prop_assert_eq!(all_paths(&rebuilt), all_paths(&template));
    }

    #[test]
    fn rebuild_is_idempotent(template in tree(), target in tree()) {
        let once = rebuild(&template, &target);
        let twice = rebuild(&template, &once);
        prop_assert!(identical(&once, &twice));
    }

    #[test]
    fn rebuild_keeps_target_leaves_at_template_leaf_paths(template in tree(), target in tree()) {
        let rebuilt = rebuild(&template, &target);
        for (path, value) in leaves(&template) {
            let expected = lookup(&target, &path).leaf().unwrap_or(&value);
            prop_assert_eq!(lookup(&rebuilt, &path).leaf(), Some(expected), "path {}", path);
        }
    }

    #[test]
    fn diff_is_complementary(reference in tree(), target in tree()) {
        let report = diff(&reference, &target);
        let every_reference_leaf_present = leaves(&reference)
            .keys()
            .all(|path| lookup(&target, path).is_leaf());
        let no_target_only_leaf = leaves(&target)
            .keys()
            .all(|path| lookup(&reference, path).is_leaf());

        prop_assert_eq!(report.missing.is_empty(), every_reference_leaf_present);
        prop_assert_eq!(report.extra.is_empty(), no_target_only_leaf);
        prop_assert!(report.missing.windows(2).all(|pair| pair[0] < pair[1]));
        prop_assert!(report.extra.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn diff_after_rebuild_is_clean(template in tree(), target in tree()) {
        let rebuilt = rebuild(&template, &target);
        prop_assert!(diff(&template, &rebuilt).is_clean());
    }

    #[test]
    fn promote_never_changes_non_empty_reference_leaves(reference in tree(), donor in tree()) {
        let before = leaves(&reference);
        let mut healed = reference.clone();
        promote(&mut healed, &donor);

        for (path, value) in before {
            if is_vacant(Some(&value)) {
                continue;
            }
            prop_assert_eq!(lookup(&healed, &path).leaf(), Some(&value), "path {}", path);
        }
    }
}
