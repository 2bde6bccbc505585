//! Property renaming after key projection.
//!
//! A hash-building caster reads input key `from` and writes output key `to`;
//! downstream checks describe `to`, but the published schema must describe
//! the input, so the description is moved back onto `from`. When several
//! input keys feed the same output key the output description can't be
//! attributed to any of them and is dropped.
use serde_json::{Map, Value};

use super::extend::deep_merge;
use crate::attributes::Remapping;

pub(crate) fn remap(schema: &mut Map<String, Value>, mapping: &Remapping) {
    let union = ["oneOf", "anyOf"]
        .into_iter()
        .find(|k| schema.get(*k).is_some_and(Value::is_array));

    if let Some(keyword) = union {
        if let Some(branches) = schema.get_mut(keyword).and_then(Value::as_array_mut) {
            for branch in branches.iter_mut().filter_map(Value::as_object_mut) {
                remap_object(branch, mapping);
            }
        }
        return;
    }
    remap_object(schema, mapping);
}

fn remap_object(value: &mut Map<String, Value>, mapping: &Remapping) {
    if value.get("type").and_then(Value::as_str) != Some("object") {
        return;
    }

    for (from, to) in mapping.iter() {
        let one_to_one = mapping.sources_of(to) == 1;

        if let Some(properties) = value.get_mut("properties").and_then(Value::as_object_mut) {
            let properties_from = from.and_then(|f| properties.shift_remove(f));
            let properties_to = properties.shift_remove(to);

            if let Some(from) = from {
                if properties_from.is_some() || properties_to.is_some() {
                    let empty = || Value::Object(Map::new());
                    let moved = if one_to_one {
                        deep_merge(
                            &properties_to.unwrap_or_else(empty),
                            &properties_from.unwrap_or_else(empty),
                        )
                    } else {
                        properties_from.unwrap_or_else(empty)
                    };
                    properties.insert(from.to_string(), moved);
                }
            }
        }

        if let Some(required) = value.get_mut("required").and_then(Value::as_array_mut) {
            let required_from = from.is_some_and(|f| remove_all(required, f));
            let required_to = remove_all(required, to);

            if let Some(from) = from {
                if one_to_one && (required_from || required_to) {
                    required.push(Value::from(from));
                }
            }
        }
    }
}

fn remove_all(xs: &mut Vec<Value>, name: &str) -> bool {
    let before = xs.len();
    xs.retain(|x| x.as_str() != Some(name));
    xs.len() != before
}
