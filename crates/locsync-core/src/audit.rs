//! Data-quality audits: self-referencing placeholders and empty strings.
//!
//! A leaf whose trimmed string value equals its own dotted key path is a
//! placeholder artifact left by tooling that seeded keys with their names.
//! Repair substitutes a label derived from the last segment. This is a
//! heuristic: a short key that legitimately translates to itself (`ok` =
//! `"ok"` at the root) is repaired too.

use crate::catalog::{Branch, KeyPath};
use crate::walk::{for_each_leaf, for_each_leaf_mut};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::OnceLock;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Repair {
    pub path: KeyPath,
    pub previous: String,
    pub replacement: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelfRefReport {
    pub repaired: Vec<Repair>,
}

impl SelfRefReport {
    pub fn changed(&self) -> bool {
        !self.repaired.is_empty()
    }
}

fn word_start_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b\w").expect("word-start regex must compile"))
}

/// `input_name_label` -> `Input Name Label`.
pub fn humanize(segment: &str) -> String {
    let spaced = segment.replace(['_', '.'], " ");
    word_start_re()
        .replace_all(&spaced, |caps: &Captures<'_>| caps[0].to_uppercase())
        .into_owned()
}

pub fn is_self_reference(path: &KeyPath, value: &Value) -> bool {
    value
        .as_str()
        .is_some_and(|text| text.trim() == path.dotted())
}

/// Replace every self-referencing leaf with a humanized label.
pub fn audit_self_refs(root: &mut Branch) -> SelfRefReport {
    let mut report = SelfRefReport::default();
    for_each_leaf_mut(root, |path, value| {
        if !is_self_reference(path, value) {
            return;
        }
        let Some(segment) = path.last_segment() else {
            return;
        };
        let replacement = humanize(segment);
        let previous = std::mem::replace(value, Value::String(replacement.clone()));
        report.repaired.push(Repair {
            path: path.clone(),
            previous: previous.as_str().unwrap_or_default().to_string(),
            replacement,
        });
    });
    tracing::debug!(repaired = report.repaired.len(), "self-reference audit complete");
    report
}

/// Every leaf whose value is exactly `""`, in walk order.
pub fn audit_empty(root: &Branch) -> Vec<KeyPath> {
    let mut empty = Vec::new();
    for_each_leaf(root, |path, value| {
        if value.as_str() == Some("") {
            empty.push(path.clone());
        }
    });
    empty
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
    fn humanize_splits_and_capitalizes_words() {
        assert_eq!(humanize("title"), "Title");
        assert_eq!(humanize("input_name_label"), "Input Name Label");
        assert_eq!(humanize("max_range.notice"), "Max Range Notice");
        assert_eq!(humanize("already Cased"), "Already Cased");
    }

    #[test]
    fn repairs_self_referencing_leaf() {
        let mut root = branch(json!({
            "general": {"cart": {"title": "general.cart.title", "empty": "Your cart is empty"}}
        }));

        let report = audit_self_refs(&mut root);
        assert_eq!(
            Value::Object(root),
            json!({"general": {"cart": {"title": "Title", "empty": "Your cart is empty"}}})
        );
        assert_eq!(
            report.repaired,
            vec![Repair {
                path: KeyPath::parse("general.cart.title"),
                previous: "general.cart.title".to_string(),
                replacement: "Title".to_string(),
            }]
        );
    }

    #[test]
    fn surrounding_whitespace_still_matches() {
        let mut root = branch(json!({"a": {"b_c": "  a.b_c \n"}}));
        let report = audit_self_refs(&mut root);
        assert!(report.changed());
        assert_eq!(Value::Object(root), json!({"a": {"b_c": "B C"}}));
    }

    #[test]
    fn other_paths_and_non_strings_are_untouched() {
        let mut root = branch(json!({"a": {"b": "a.c", "n": 1, "l": ["a.l"]}}));
        assert!(!audit_self_refs(&mut root).changed());
    }

    #[test]
    fn empty_audit_lists_only_empty_strings() {
        let root = branch(json!({"a": "", "b": {"c": "", "d": " ", "e": null}, "f": []}));
        let empty: Vec<String> = audit_empty(&root).iter().map(KeyPath::dotted).collect();
        assert_eq!(empty, vec!["a", "b.c"]);
    }
}
