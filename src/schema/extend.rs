//! Extendable `oneOf` merging.
//!
//! Switches on the same discriminant are often AND-composed to add fields
//! per branch. Each incoming branch is paired with the existing branch that
//! shares the most properties, counted as identical (name, schema) pairs;
//! the first best candidate wins ties. This is a heuristic, not type
//! matching: a branch without any shared property is kept as it is, and
//! existing branches that nobody picked are dropped.
use serde_json::{Map, Value};

pub fn pair_branches(existing: &[Value], incoming: &[Value]) -> Vec<Value> {
    incoming
        .iter()
        .map(|branch| match best_candidate(existing, branch) {
            Some(candidate) => deep_merge(branch, candidate),
            None => branch.clone(),
        })
        .collect()
}

fn best_candidate<'a>(existing: &'a [Value], branch: &Value) -> Option<&'a Value> {
    let mut best: Option<(&Value, usize)> = None;
    for candidate in existing {
        if candidate.as_object().is_none_or(Map::is_empty) {
            continue;
        }
        let score = shared_properties(candidate, branch);
        if best.is_none_or(|(_, top)| score > top) {
            best = Some((candidate, score));
        }
    }
    best.filter(|(_, score)| *score >= 1).map(|(c, _)| c)
}

fn shared_properties(a: &Value, b: &Value) -> usize {
    let (Some(pa), Some(pb)) = (properties(a), properties(b)) else { return 0 };
    pa.iter().filter(|(k, v)| pb.get(*k) == Some(v)).count()
}

fn properties(v: &Value) -> Option<&Map<String, Value>> {
    v.get("properties").and_then(Value::as_object)
}

// ------------------------------ Deep merge -------------------------------- //

/// `second` wins on scalars; nested maps merge, arrays union, and a `null`
/// in `second` leaves `first` in place. Non-object inputs yield `second`.
pub fn deep_merge(first: &Value, second: &Value) -> Value {
    match (first, second) {
        (Value::Object(a), Value::Object(b)) => Value::Object(deep_merge_maps(a, b)),
        _ => second.clone(),
    }
}

fn deep_merge_maps(first: &Map<String, Value>, second: &Map<String, Value>) -> Map<String, Value> {
    let mut out = first.clone();
    for (k, v2) in second {
        let merged = match out.get(k) {
            None => v2.clone(),
            Some(v1) => match (v1, v2) {
                (Value::Object(a), Value::Object(b)) => Value::Object(deep_merge_maps(a, b)),
                (Value::Array(a), Value::Array(b)) => {
                    let mut xs = Vec::with_capacity(a.len() + b.len());
                    for x in a.iter().chain(b) {
                        if !xs.contains(x) {
                            xs.push(x.clone());
                        }
                    }
                    Value::Array(xs)
                }
                (_, Value::Null) => v1.clone(),
                _ => v2.clone(),
            },
        };
        out.insert(k.clone(), merged);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deep_merge_rules() {
        let a = json!({"p": {"x": 1, "y": [1, 2]}, "keep": "a", "over": "a"});
        let b = json!({"p": {"y": [2, 3], "z": true}, "keep": null, "over": "b"});
        assert_eq!(
            deep_merge(&a, &b),
            json!({"p": {"x": 1, "y": [1, 2, 3], "z": true}, "keep": "a", "over": "b"})
        );
    }

    #[test]
    fn pairs_by_identical_properties() {
        let kind = |k: &str| json!({"type": "string", "enum": [k]});
        let existing = vec![
            json!({"type": "object", "properties": {"kind": kind("string"), "string": {}}}),
            json!({"type": "object", "properties": {"kind": kind("integer"), "integer": {}}}),
            json!({}),
        ];
        let incoming = vec![
            json!({"type": "object", "properties": {"kind": kind("integer"), "n": {"type": "integer"}}, "required": ["kind"]}),
            json!({"type": "object", "properties": {"kind": kind("none")}}),
        ];
        let out = pair_branches(&existing, &incoming);
        assert_eq!(out.len(), 2);
        assert_eq!(
            out[0],
            json!({
                "type": "object",
                "properties": {"kind": kind("integer"), "n": {"type": "integer"}, "integer": {}},
                "required": ["kind"]
            })
        );
        assert_eq!(out[1], incoming[1]);
    }

    #[test]
    fn ties_favor_first_candidate() {
        let existing = vec![
            json!({"properties": {"a": {}, "first": true}}),
            json!({"properties": {"a": {}, "second": true}}),
        ];
        let incoming = vec![json!({"properties": {"a": {}}})];
        let out = pair_branches(&existing, &incoming);
        assert_eq!(out[0], json!({"properties": {"a": {}, "first": true}}));
    }
}
