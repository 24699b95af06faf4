//! Catalog model: ordered key/value trees addressed by key paths.
//!
//! A catalog is a single root branch. Branches are insertion-ordered maps
//! (`serde_json` with `preserve_order`), everything else is a leaf. Arrays
//! are leaves too: they are never recursed into.
//!
//! ```text
//! Catalog(locale="fr")
//!   └─ general            (branch)
//!        ├─ cart          (branch)
//!        │    └─ title    (leaf)  key path "general.cart.title"
//!        └─ tags          (leaf, array)
//! ```

use crate::error::CatalogError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

/// A branch node: insertion-ordered segment names to child nodes.
pub type Branch = Map<String, Value>;

pub const PATH_SEPARATOR: char = '.';

/// Address of a node from the catalog root.
///
/// Stored as segments so a segment containing `.` is never re-split;
/// displayed and serialized in dotted form. Ordering is lexicographic on
/// the dotted form, which is what reports sort by.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct KeyPath {
    segments: Vec<String>,
}

impl KeyPath {
    pub fn root() -> Self {
        Self::default()
    }

    /// Split a dotted path. The empty string is the root.
    pub fn parse(dotted: &str) -> Self {
        if dotted.is_empty() {
            return Self::root();
        }
        Self {
            segments: dotted.split(PATH_SEPARATOR).map(str::to_string).collect(),
        }
    }

    pub fn child(&self, segment: &str) -> Self {
        let mut segments = Vec::with_capacity(self.segments.len() + 1);
        segments.extend(self.segments.iter().cloned());
        segments.push(segment.to_string());
        Self { segments }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn last_segment(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    pub fn dotted(&self) -> String {
        self.segments.join(".")
    }

    fn dotted_bytes(&self) -> impl Iterator<Item = u8> + '_ {
        self.segments.iter().enumerate().flat_map(|(index, segment)| {
            let separator = (index > 0).then_some(PATH_SEPARATOR as u8);
            separator.into_iter().chain(segment.bytes())
        })
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, segment) in self.segments.iter().enumerate() {
            if index > 0 {
                write!(f, "{PATH_SEPARATOR}")?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}

impl Ord for KeyPath {
    fn cmp(&self, other: &Self) -> Ordering {
        self.dotted_bytes()
            .cmp(other.dotted_bytes())
            .then_with(|| self.segments.cmp(&other.segments))
    }
}

impl PartialOrd for KeyPath {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<&str> for KeyPath {
    fn from(dotted: &str) -> Self {
        Self::parse(dotted)
    }
}

impl Serialize for KeyPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for KeyPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let dotted = String::deserialize(deserializer)?;
        Ok(Self::parse(&dotted))
    }
}

/// What a key path resolves to in one tree.
///
/// `Absent` is distinct from an explicit `null` leaf and from `""`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Slot<'a> {
    Absent,
    Leaf(&'a Value),
    Branch(&'a Branch),
}

impl<'a> Slot<'a> {
    pub fn of(node: Option<&'a Value>) -> Self {
        match node {
            None => Slot::Absent,
            Some(Value::Object(branch)) => Slot::Branch(branch),
            Some(leaf) => Slot::Leaf(leaf),
        }
    }

    pub fn leaf(self) -> Option<&'a Value> {
        match self {
            Slot::Leaf(value) => Some(value),
            _ => None,
        }
    }

    pub fn branch(self) -> Option<&'a Branch> {
        match self {
            Slot::Branch(branch) => Some(branch),
            _ => None,
        }
    }

    pub fn is_leaf(self) -> bool {
        matches!(self, Slot::Leaf(_))
    }

    pub fn is_absent(self) -> bool {
        matches!(self, Slot::Absent)
    }
}

/// Resolve a key path against a tree. A leaf on the way down makes the
/// path absent.
pub fn lookup<'a>(root: &'a Branch, path: &KeyPath) -> Slot<'a> {
    let Some((last, parents)) = path.segments().split_last() else {
        return Slot::Branch(root);
    };
    let mut current = root;
    for segment in parents {
        match current.get(segment) {
            Some(Value::Object(next)) => current = next,
            _ => return Slot::Absent,
        }
    }
    Slot::of(current.get(last))
}

/// Every leaf keyed by its dotted path, the form paths are compared in.
///
/// `{"a.b": ..}` and `{"a": {"b": ..}}` spell the same path and share one
/// entry; the first in walk order wins.
pub fn dotted_leaves(root: &Branch) -> BTreeMap<String, &Value> {
    fn collect<'a>(node: &'a Branch, prefix: &str, out: &mut BTreeMap<String, &'a Value>) {
        for (segment, child) in node {
            let dotted = if prefix.is_empty() {
                segment.clone()
            } else {
                format!("{prefix}{PATH_SEPARATOR}{segment}")
            };
            match child {
                Value::Object(children) => collect(children, &dotted, out),
                leaf => {
                    out.entry(dotted).or_insert(leaf);
                }
            }
        }
    }
    let mut out = BTreeMap::new();
    collect(root, "", &mut out);
    out
}

/// Walk down `segments`, replacing anything that is not a branch with a
/// fresh empty branch, and return the innermost branch.
pub fn ensure_branch<'a>(root: &'a mut Branch, segments: &[String]) -> &'a mut Branch {
    let mut current = root;
    for segment in segments {
        let slot = current
            .entry(segment.clone())
            .or_insert_with(|| Value::Object(Branch::new()));
        current = make_branch(slot);
    }
    current
}

/// Turn `slot` into a branch unless it already is one.
pub fn make_branch(slot: &mut Value) -> &mut Branch {
    if !slot.is_object() {
        *slot = Value::Object(Branch::new());
    }
    match slot {
        Value::Object(branch) => branch,
        _ => unreachable!("slot was replaced with a branch above"),
    }
}

/// Absent, `null`, or the empty string.
pub fn is_vacant(node: Option<&Value>) -> bool {
    match node {
        None | Some(Value::Null) => true,
        Some(Value::String(text)) => text.is_empty(),
        Some(_) => false,
    }
}

/// Structural and value equality that also requires the same key order.
///
/// `Map` equality ignores order; serialization does not, so rewrites use
/// this to decide whether anything observable changed.
pub fn identical(left: &Branch, right: &Branch) -> bool {
    left.len() == right.len()
        && left
            .iter()
            .zip(right.iter())
            .all(|((left_key, left_node), (right_key, right_node))| {
                left_key == right_key
                    && match (left_node, right_node) {
                        (Value::Object(a), Value::Object(b)) => identical(a, b),
                        (a, b) => a == b,
                    }
            })
}

pub fn kind_name(node: &Value) -> &'static str {
    match node {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Plain-text rendering of a leaf for tabular reports: strings verbatim,
/// everything else as compact JSON.
pub fn leaf_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Locale identifier for a store name: everything before the first `.`
/// (`en.default.json` -> `en`, `pt-BR.json` -> `pt-BR`).
pub fn locale_from_name(name: &str) -> &str {
    name.split_once('.').map_or(name, |(head, _)| head)
}

/// One locale's translation tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    locale: String,
    root: Branch,
}

impl Catalog {
    pub fn new(locale: impl Into<String>, root: Branch) -> Self {
        Self {
            locale: locale.into(),
            root,
        }
    }

    /// Accept a decoded document as a catalog. The root must be an object.
    pub fn from_value(locale: impl Into<String>, value: Value) -> Result<Self, CatalogError> {
        let locale = locale.into();
        match value {
            Value::Object(root) => Ok(Self { locale, root }),
            other => Err(CatalogError::RootNotBranch {
                locale,
                found: kind_name(&other),
            }),
        }
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn root(&self) -> &Branch {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Branch {
        &mut self.root
    }

    pub fn into_root(self) -> Branch {
        self.root
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.root)
    }

    /// Every leaf path in walk order.
    pub fn leaf_paths(&self) -> Vec<KeyPath> {
        let mut paths = Vec::new();
        crate::walk::for_each_leaf(&self.root, |path, _| paths.push(path.clone()));
        paths
    }

    pub fn leaf_count(&self) -> usize {
        let mut count = 0;
        crate::walk::for_each_leaf(&self.root, |_, _| count += 1);
        count
    }
}
