use serde_json::{Map, Value};

use super::extend;
use crate::attributes::Attributes;
use crate::error::{SchemaError, SchemaResult};

/// Root-level merge of two non-empty, unfocused schemas.
pub(crate) fn merge(
    left: &Map<String, Value>,
    right: &Map<String, Value>,
    attributes: &Attributes,
) -> SchemaResult<Map<String, Value>> {
    if right.is_empty() {
        return Ok(left.clone());
    }
    if left.is_empty() {
        return Ok(right.clone());
    }

    // checks that run after a projection or transform say nothing about
    // the object/array being described
    if is_container(left) && !is_container(right) {
        return Ok(left.clone());
    }

    check_nesting(left, right)?;

    let mut out = Map::new();
    for key in union_keys(left, right) {
        let merged = match key.as_str() {
            "required" => merge_required(left, right),
            "properties" => merge_properties(left, right)?,
            "items" => merge_items(left, right)?,
            "description" => pick_right(left, right, &key),
            "oneOf" if attributes.extendable => merge_one_of(left, right),
            _ => merge_keyword(left, right, &key)?,
        };
        out.insert(key, merged);
    }
    Ok(out)
}

fn is_container(schema: &Map<String, Value>) -> bool {
    matches!(
        schema.get("type").and_then(Value::as_str),
        Some("object") | Some("array")
    )
}

fn has(schema: &Map<String, Value>, keyword: &str) -> bool {
    schema.get(keyword).is_some_and(|v| !v.is_null())
}

fn check_nesting(left: &Map<String, Value>, right: &Map<String, Value>) -> SchemaResult<()> {
    let (lp, li) = (has(left, "properties"), has(left, "items"));
    let (rp, ri) = (has(right, "properties"), has(right, "items"));

    if lp && (ri || li) || li && (lp || rp) || ri && rp {
        return Err(nesting_conflict(left, right));
    }
    Ok(())
}

fn nesting_conflict(left: &Map<String, Value>, right: &Map<String, Value>) -> SchemaError {
    SchemaError::NestingConflict {
        left: Value::Object(left.clone()),
        right: Value::Object(right.clone()),
    }
}

fn union_keys(left: &Map<String, Value>, right: &Map<String, Value>) -> Vec<String> {
    let mut keys: Vec<String> = left.keys().cloned().collect();
    for k in right.keys() {
        if !left.contains_key(k) {
            keys.push(k.clone());
        }
    }
    keys
}

// ------------------------------ Keywords ---------------------------------- //

fn merge_required(left: &Map<String, Value>, right: &Map<String, Value>) -> Value {
    let mut out: Vec<Value> = Vec::new();
    let sides = [left.get("required"), right.get("required")];
    for name in sides.into_iter().flatten().filter_map(Value::as_array).flatten() {
        if !out.contains(name) {
            out.push(name.clone());
        }
    }
    Value::Array(out)
}

fn merge_properties(left: &Map<String, Value>, right: &Map<String, Value>) -> SchemaResult<Value> {
    let empty = Map::new();
    let lp = left.get("properties").and_then(Value::as_object).unwrap_or(&empty);
    let rp = right.get("properties").and_then(Value::as_object).unwrap_or(&empty);

    let mut out = Map::new();
    for name in union_keys(lp, rp) {
        let one = lp.get(&name);
        let two = rp.get(&name);
        let merged = match (one, two) {
            (Some(Value::Object(a)), Some(Value::Object(b))) => {
                Value::Object(merge(a, b, &Attributes::default())?)
            }
            (Some(x), None) | (None, Some(x)) => x.clone(),
            // boolean schemas and the like: only an empty object or an
            // identical value can stand beside them
            (Some(a), Some(b)) if is_empty_object(a) => b.clone(),
            (Some(a), Some(b)) if is_empty_object(b) || a == b => a.clone(),
            _ => return Err(nesting_conflict(left, right)),
        };
        out.insert(name, merged);
    }
    Ok(Value::Object(out))
}

fn merge_items(left: &Map<String, Value>, right: &Map<String, Value>) -> SchemaResult<Value> {
    match (left.get("items"), right.get("items")) {
        (Some(Value::Object(a)), Some(Value::Object(b))) => {
            Ok(Value::Object(merge(a, b, &Attributes::default())?))
        }
        (Some(x), None) | (None, Some(x)) => Ok(x.clone()),
        (Some(a), Some(b)) if a == b => Ok(a.clone()),
        _ => Err(nesting_conflict(left, right)),
    }
}

fn is_empty_object(v: &Value) -> bool {
    v.as_object().is_some_and(Map::is_empty)
}

fn pick_right(left: &Map<String, Value>, right: &Map<String, Value>, key: &str) -> Value {
    right.get(key).or(left.get(key)).cloned().unwrap_or(Value::Null)
}

fn merge_one_of(left: &Map<String, Value>, right: &Map<String, Value>) -> Value {
    match (left.get("oneOf"), right.get("oneOf")) {
        (Some(Value::Array(existing)), Some(Value::Array(incoming))) => {
            Value::Array(extend::pair_branches(existing, incoming))
        }
        _ => pick_right(left, right, "oneOf"),
    }
}

fn merge_keyword(left: &Map<String, Value>, right: &Map<String, Value>, key: &str) -> SchemaResult<Value> {
    match (left.get(key), right.get(key)) {
        (Some(a), Some(b)) if a != b => Err(SchemaError::FieldConflict {
            field: key.to_string(),
            left: Value::Object(left.clone()),
            right: Value::Object(right.clone()),
        }),
        _ => Ok(pick_right(left, right, key)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(m) => m,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn nested_properties_merge_recursively() {
        let a = map(json!({"type": "object", "properties": {"x": {"type": "integer"}}}));
        let b = map(json!({"type": "object", "properties": {"x": {"enum": [1, 2]}, "y": {}}}));
        let out = merge(&a, &b, &Attributes::default()).unwrap();
        assert_eq!(
            Value::Object(out),
            json!({"type": "object", "properties": {"x": {"type": "integer", "enum": [1, 2]}, "y": {}}})
        );
    }

    #[test]
    fn boolean_property_schemas() {
        let a = map(json!({"properties": {"x": true}}));
        let b = map(json!({"properties": {"x": {}}}));
        let out = merge(&a, &b, &Attributes::default()).unwrap();
        assert_eq!(out["properties"]["x"], json!(true));

        let c = map(json!({"properties": {"x": false}}));
        assert!(merge(&a, &c, &Attributes::default()).is_err());
    }

    #[test]
    fn one_of_conflicts_unless_extendable() {
        let a = map(json!({"oneOf": [{"type": "string"}]}));
        let b = map(json!({"oneOf": [{"type": "integer"}]}));
        assert!(merge(&a, &b, &Attributes::default()).is_err());

        let extendable = Attributes { extendable: true, ..Attributes::default() };
        let out = merge(&a, &b, &extendable).unwrap();
        assert_eq!(out["oneOf"], json!([{"type": "integer"}]));
    }
}
