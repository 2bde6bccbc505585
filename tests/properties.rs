//! Property-based tests for the caster algebra.
//!
//! These cover the laws composite nodes must hold for any input, not just
//! the hand-picked fixtures in the unit tests.

use std::collections::BTreeSet;

use json_caster::error_tree::merge;
use json_caster::leaf::{compare, integer, pick, string, transform};
use json_caster::{
    ArrayOptions, Caster, ErrorKey, ErrorTree, PathKey, SchemaFragment, and, array_of, or,
};
use proptest::prelude::*;
use serde_json::{Map, Value, json};

/// Strategy for generating random JSON values with controlled complexity
fn json_value_strategy() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        (-5i64..5).prop_map(|n| Value::Number(n.into())),
        "[ab]{0,2}".prop_map(Value::String),
    ];

    leaf.prop_recursive(2, 8, 3, |inner| {
        prop_oneof![
            proptest::collection::vec(inner.clone(), 0..3).prop_map(Value::Array),
            proptest::collection::hash_map("[ab]", inner, 0..3)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

/// A small pool of casters that succeed or fail depending on the input.
fn caster_pool() -> Vec<Caster> {
    vec![
        integer(),
        string(),
        pick("a"),
        compare(json!(1)),
        transform(|v| json!({"a": v.clone()})),
        transform(|v| match v {
            Value::Number(n) => json!(n.as_i64().unwrap_or(0) + 1),
            other => other.clone(),
        }),
    ]
}

fn caster_strategy() -> impl Strategy<Value = Caster> {
    let pool = caster_pool();
    (0..pool.len()).prop_map(move |i| pool[i].clone())
}

fn message_strategy() -> impl Strategy<Value = ErrorTree> {
    "[a-d]".prop_map(|kind| ErrorTree::message(ErrorKey::standard(&kind, None, Value::Null)))
}

/// Lists of distinct messages, built by merging so they carry no duplicates.
fn list_strategy() -> impl Strategy<Value = ErrorTree> {
    proptest::collection::vec(message_strategy(), 1..4)
        .prop_map(|xs| xs.into_iter().fold(ErrorTree::empty(), ErrorTree::merge))
}

fn map_strategy() -> impl Strategy<Value = ErrorTree> {
    proptest::collection::vec(("[xyz]", list_strategy()), 1..4).prop_map(|entries| {
        entries
            .into_iter()
            .fold(ErrorTree::keyed(Vec::<(String, ErrorTree)>::new()), |acc, (k, v)| {
                acc.merge(ErrorTree::keyed([(k, v)]))
            })
    })
}

/// Object fragments whose keywords never conflict: a property's type is a
/// function of its name.
fn fragment_strategy() -> impl Strategy<Value = SchemaFragment> {
    (
        proptest::collection::btree_set("[pqrs]", 0..3),
        proptest::collection::btree_set("[pqrs]", 0..2),
        proptest::option::of("[uv]"),
    )
        .prop_map(|(props, required, description)| {
            let properties: Map<String, Value> = props
                .iter()
                .map(|p| {
                    let ty = if p.as_str() < "r" { "integer" } else { "string" };
                    (p.clone(), json!({"type": ty}))
                })
                .collect();
            let mut schema = json!({"type": "object", "properties": properties});
            if !required.is_empty() {
                schema["required"] = json!(required.into_iter().collect::<Vec<_>>());
            }
            if let Some(d) = description {
                schema["description"] = json!(d);
            }
            SchemaFragment::from_value(schema)
        })
}

proptest! {
    #[test]
    fn and_is_associative(
        a in caster_strategy(),
        b in caster_strategy(),
        c in caster_strategy(),
        value in json_value_strategy(),
    ) {
        // The identity rewrite keeps each inner sequence as its own node.
        let left = and(a.clone(), and(b.clone(), c.clone()).with_attributes(|x| x));
        let right = and(and(a, b).with_attributes(|x| x), c);
        prop_assert_eq!(left.call(&value), right.call(&value));
    }

    #[test]
    fn or_falls_back_to_right(
        a in caster_strategy(),
        b in caster_strategy(),
        value in json_value_strategy(),
    ) {
        let expected = match a.call(&value) {
            valid if valid.is_valid() => valid,
            _ => b.call(&value),
        };
        prop_assert_eq!(or(a, b).call(&value), expected);
    }

    #[test]
    fn list_merge_commutes(x in list_strategy(), y in list_strategy()) {
        let xy = merge(Some(x.clone()), Some(y.clone()));
        let yx = merge(Some(y), Some(x));
        prop_assert!(xy.equivalent(&yx));
    }

    #[test]
    fn map_merge_commutes(x in map_strategy(), y in map_strategy()) {
        let xy = x.clone().merge(y.clone());
        let yx = y.merge(x);
        prop_assert!(xy.equivalent(&yx));
    }

    #[test]
    fn map_merge_is_idempotent(x in map_strategy()) {
        prop_assert_eq!(x.clone().merge(x.clone()), x);
    }

    #[test]
    fn array_preserves_order(xs in proptest::collection::vec(-100i64..100, 1..8)) {
        let input = json!(xs);
        let result = array_of(integer(), ArrayOptions::default()).call(&input);
        prop_assert_eq!(result.value(), Some(&input));
    }

    #[test]
    fn array_reports_exactly_failing_positions(
        cells in proptest::collection::vec(any::<bool>(), 1..8),
    ) {
        let input: Vec<Value> = cells
            .iter()
            .map(|ok| if *ok { json!(1) } else { json!("x") })
            .collect();
        let bad: BTreeSet<usize> = cells.iter().enumerate().filter(|(_, ok)| !**ok).map(|(i, _)| i).collect();

        let result = array_of(integer(), ArrayOptions::default()).call(&Value::Array(input));
        match result.errors() {
            None => prop_assert!(bad.is_empty()),
            Some(errors) => {
                let keys: BTreeSet<usize> = errors
                    .keys()
                    .into_iter()
                    .filter_map(|k| match k {
                        PathKey::Index(i) => Some(*i),
                        PathKey::Field(_) => None,
                    })
                    .collect();
                prop_assert_eq!(keys, bad);
            }
        }
    }

    #[test]
    fn empty_fragment_is_identity(x in fragment_strategy()) {
        prop_assert_eq!(SchemaFragment::empty().apply(&x).unwrap(), x.clone());
        prop_assert_eq!(x.apply(&SchemaFragment::empty()).unwrap(), x);
    }

    #[test]
    fn fragment_apply_is_associative(
        x in fragment_strategy(),
        y in fragment_strategy(),
        z in fragment_strategy(),
    ) {
        let left = x.apply(&y).unwrap().apply(&z).unwrap();
        let right = x.apply(&y.apply(&z).unwrap()).unwrap();
        prop_assert_eq!(left, right);
    }
}

#[test]
fn empty_array_needs_permission() {
    let strict = array_of(integer(), ArrayOptions::default());
    assert!(!strict.call(&json!([])).is_valid());
    let lenient = array_of(integer(), ArrayOptions::allow_empty());
    assert!(lenient.call(&json!([])).is_valid());
}
