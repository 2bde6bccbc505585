//! Structural failure representation.
//!
//! A failed cast carries an `ErrorTree`: positional failures live in a
//! `List`, keyed failures (hash fields, array indices) in a `Map`, and the
//! opaque message payloads sit at the leaves. Merging follows the same
//! join discipline everywhere: lists union, maps merge key-wise, and a
//! list meeting a map is filed under the map's `base` key.
use std::fmt;

use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use serde_json::Value;

/// Synthetic key that receives positional errors when they meet keyed ones.
pub const BASE_KEY: &str = "base";

// ------------------------------- Payloads --------------------------------- //

/// Opaque, lazily rendered error message: a list of message keys to try in
/// order plus the offending value. Only stored and compared here.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorKey {
    pub keys: Vec<String>,
    pub value: Value,
}

impl ErrorKey {
    pub fn new<I, S>(keys: I, value: Value) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { keys: keys.into_iter().map(Into::into).collect(), value }
    }

    /// `['.kind', 'datacaster.errors.kind']`, optionally preceded by a
    /// caller-supplied key.
    pub fn standard(kind: &str, custom: Option<&str>, value: Value) -> Self {
        let mut keys = Vec::with_capacity(3);
        if let Some(custom) = custom {
            keys.push(custom.to_string());
        }
        keys.push(format!(".{kind}"));
        keys.push(format!("datacaster.errors.{kind}"));
        Self { keys, value }
    }

    /// Most specific message key.
    pub fn primary(&self) -> &str {
        self.keys.first().map(String::as_str).unwrap_or_default()
    }
}

/// Key of a keyed failure: a hash field or a zero-based array position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PathKey {
    Index(usize),
    Field(String),
}

impl PathKey {
    pub fn base() -> Self {
        PathKey::Field(BASE_KEY.to_string())
    }
}

impl fmt::Display for PathKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathKey::Index(i) => write!(f, "{i}"),
            PathKey::Field(name) => f.write_str(name),
        }
    }
}

impl Serialize for PathKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl From<usize> for PathKey {
    fn from(i: usize) -> Self { PathKey::Index(i) }
}

impl From<&str> for PathKey {
    fn from(s: &str) -> Self { PathKey::Field(s.to_string()) }
}

impl From<String> for PathKey {
    fn from(s: String) -> Self { PathKey::Field(s) }
}

// ------------------------------- Tree ------------------------------------ //

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ErrorTree {
    Leaf(ErrorKey),
    List(Vec<ErrorTree>),
    Map(IndexMap<PathKey, ErrorTree>),
}

impl ErrorTree {
    pub fn empty() -> Self { ErrorTree::List(Vec::new()) }

    /// A single message, already wrapped as a one-element list.
    pub fn message(key: ErrorKey) -> Self {
        ErrorTree::List(vec![ErrorTree::Leaf(key)])
    }

    pub fn keyed<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, ErrorTree)>,
        K: Into<PathKey>,
    {
        ErrorTree::Map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Leaves are promoted to one-element lists so that every top-level
    /// tree is list- or map-shaped.
    pub fn normalized(self) -> Self {
        match self {
            ErrorTree::Leaf(key) => ErrorTree::message(key),
            other => other,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            ErrorTree::Leaf(_) => false,
            ErrorTree::List(xs) => xs.is_empty(),
            ErrorTree::Map(m) => m.is_empty(),
        }
    }

    pub fn get(&self, key: impl Into<PathKey>) -> Option<&ErrorTree> {
        match self {
            ErrorTree::Map(m) => m.get(&key.into()),
            _ => None,
        }
    }

    pub fn keys(&self) -> Vec<&PathKey> {
        match self {
            ErrorTree::Map(m) => m.keys().collect(),
            _ => Vec::new(),
        }
    }

    /// Every leaf payload, depth-first.
    pub fn messages(&self) -> Vec<&ErrorKey> {
        let mut out = Vec::new();
        self.collect_messages(&mut out);
        out
    }

    fn collect_messages<'a>(&'a self, out: &mut Vec<&'a ErrorKey>) {
        match self {
            ErrorTree::Leaf(key) => out.push(key),
            ErrorTree::List(xs) => xs.iter().for_each(|x| x.collect_messages(out)),
            ErrorTree::Map(m) => m.values().for_each(|x| x.collect_messages(out)),
        }
    }

    /// Structural equality that ignores list order (lists are sets here).
    pub fn equivalent(&self, other: &ErrorTree) -> bool {
        match (self, other) {
            (ErrorTree::Leaf(a), ErrorTree::Leaf(b)) => a == b,
            (ErrorTree::List(a), ErrorTree::List(b)) => {
                a.iter().all(|x| b.iter().any(|y| x.equivalent(y)))
                    && b.iter().all(|y| a.iter().any(|x| x.equivalent(y)))
            }
            (ErrorTree::Map(a), ErrorTree::Map(b)) => {
                a.len() == b.len()
                    && a.iter().all(|(k, x)| b.get(k).is_some_and(|y| x.equivalent(y)))
            }
            _ => false,
        }
    }

    pub fn merge(self, other: ErrorTree) -> ErrorTree {
        merge(Some(self), Some(other))
    }
}

// -------------------------------- Merge ----------------------------------- //

/// Merge two optional trees. A missing side yields the other; two missing
/// sides yield an empty list.
pub fn merge(left: Option<ErrorTree>, right: Option<ErrorTree>) -> ErrorTree {
    let (left, right) = match (left, right) {
        (None, None) => return ErrorTree::empty(),
        (Some(x), None) | (None, Some(x)) => return x,
        (Some(l), Some(r)) => (shape(l), shape(r)),
    };

    match (left, right) {
        (Shape::List(l), Shape::List(r)) => ErrorTree::List(union(l, r)),
        (Shape::Map(l), Shape::Map(r)) => ErrorTree::Map(merge_maps(l, r)),
        (Shape::List(list), Shape::Map(map)) | (Shape::Map(map), Shape::List(list)) => {
            ErrorTree::Map(add_to_base(map, list))
        }
    }
}

enum Shape {
    List(Vec<ErrorTree>),
    Map(IndexMap<PathKey, ErrorTree>),
}

fn shape(tree: ErrorTree) -> Shape {
    match tree {
        leaf @ ErrorTree::Leaf(_) => Shape::List(vec![leaf]),
        ErrorTree::List(xs) => Shape::List(xs),
        ErrorTree::Map(m) => Shape::Map(m),
    }
}

fn union(left: Vec<ErrorTree>, right: Vec<ErrorTree>) -> Vec<ErrorTree> {
    let mut out: Vec<ErrorTree> = Vec::with_capacity(left.len() + right.len());
    for x in left.into_iter().chain(right) {
        if !out.contains(&x) {
            out.push(x);
        }
    }
    out
}

fn merge_maps(
    mut left: IndexMap<PathKey, ErrorTree>,
    right: IndexMap<PathKey, ErrorTree>,
) -> IndexMap<PathKey, ErrorTree> {
    for (k, r) in right {
        match left.get_mut(&k) {
            Some(slot) => {
                let prior = std::mem::replace(slot, ErrorTree::empty());
                *slot = merge(Some(prior), Some(r));
            }
            None => {
                left.insert(k, r);
            }
        }
    }
    left
}

fn add_to_base(mut map: IndexMap<PathKey, ErrorTree>, list: Vec<ErrorTree>) -> IndexMap<PathKey, ErrorTree> {
    let slot = map.entry(PathKey::base()).or_insert_with(ErrorTree::empty);
    let prior = std::mem::replace(slot, ErrorTree::empty());
    *slot = merge(Some(prior), Some(ErrorTree::List(list)));
    map
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn msg(kind: &str) -> ErrorTree {
        ErrorTree::message(ErrorKey::standard(kind, None, json!(null)))
    }

    #[test]
    fn missing_sides() {
        assert_eq!(merge(None, None), ErrorTree::empty());
        assert_eq!(merge(Some(msg("a")), None), msg("a"));
        assert_eq!(merge(None, Some(msg("b"))), msg("b"));
    }

    #[test]
    fn lists_union_without_duplicates() {
        let merged = msg("a").merge(msg("b")).merge(msg("a"));
        match merged {
            ErrorTree::List(xs) => assert_eq!(xs.len(), 2),
            other => panic!("expected list, got {other:?}"),
        }
    }

    #[test]
    fn maps_merge_keywise() {
        let left = ErrorTree::keyed([("a", msg("integer"))]);
        let right = ErrorTree::keyed([("a", msg("int32")), ("b", msg("string"))]);
        let merged = left.merge(right);
        assert_eq!(merged.keys().len(), 2);
        assert_eq!(merged.get("a").map(|x| x.messages().len()), Some(2));
        assert_eq!(merged.get("b"), Some(&msg("string")));
    }

    #[test]
    fn list_meeting_map_lands_in_base() {
        let map = ErrorTree::keyed([("a", msg("integer")), ("base", msg("x"))]);
        let merged = msg("hash").merge(map.clone());
        let base = merged.get("base").expect("base entry");
        assert!(base.equivalent(&msg("x").merge(msg("hash"))));

        let flipped = map.merge(msg("hash"));
        assert!(merged.equivalent(&flipped));
    }

    #[test]
    fn existing_base_keeps_its_position() {
        let map = ErrorTree::keyed([("base", msg("x")), ("a", msg("integer"))]);
        let merged = map.merge(msg("hash"));
        let keys: Vec<PathKey> = merged.keys().into_iter().cloned().collect();
        assert_eq!(keys, vec![PathKey::base(), PathKey::from("a")]);
    }

    #[test]
    fn merge_is_idempotent_for_maps() {
        let tree = ErrorTree::keyed([
            (PathKey::Index(2), msg("integer")),
            (PathKey::Index(5), msg("integer")),
        ]);
        assert_eq!(tree.clone().merge(tree.clone()), tree);
    }

    #[test]
    fn serializes_with_string_keys() {
        let tree = ErrorTree::keyed([(PathKey::Index(1), msg("integer"))]);
        let v = serde_json::to_value(&tree).unwrap();
        assert_eq!(v["1"][0]["keys"][0], ".integer");
    }
}
