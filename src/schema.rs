//! JSON-Schema fragments and their merge algebra.
//!
//! A fragment is a plain JSON-Schema-shaped map plus a focus path: a list
//! of property names naming a nested `properties[...]` location that
//! subsequent merges target instead of the root. `apply` never mutates its
//! inputs; every operation hands back a new fragment.
//!
//! Merge rules (`apply`):
//! - an empty side yields the other side unchanged (focus included);
//! - a focused left side merges into its focus target;
//! - an object/array schema absorbs a scalar one (post-projection checks);
//! - `required` unions, `properties` merge per key, `items` merge as schemas,
//!   `description` prefers the right side;
//! - any other keyword must agree on both sides, except `oneOf` in
//!   extendable mode, which pairs branches (see [`extend`]).
pub mod extend;
pub mod merge;
pub mod remap;

use serde_json::{Map, Value};
use tracing::debug;

use crate::attributes::{Attributes, Remapping};
use crate::error::SchemaResult;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaFragment {
    schema: Map<String, Value>,
    focus: Vec<String>,
}

impl SchemaFragment {
    pub fn empty() -> Self { Self::default() }

    pub fn new(schema: Map<String, Value>) -> Self {
        Self { schema, focus: Vec::new() }
    }

    /// Non-object values describe nothing and become the empty fragment.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(schema) => Self::new(schema),
            _ => Self::empty(),
        }
    }

    pub fn is_empty(&self) -> bool { self.schema.is_empty() }

    pub fn focus(&self) -> &[String] { &self.focus }

    pub fn as_map(&self) -> &Map<String, Value> { &self.schema }

    pub fn get(&self, keyword: &str) -> Option<&Value> { self.schema.get(keyword) }

    pub fn to_value(&self) -> Value { Value::Object(self.schema.clone()) }

    pub fn into_value(self) -> Value { Value::Object(self.schema) }

    // ------------------------------ Focus -------------------------------- //

    /// Requires `key` on the (focused) object and moves the focus onto it.
    pub fn with_focus_key(&self, key: &str) -> SchemaResult<Self> {
        let mut properties = Map::new();
        properties.insert(key.to_string(), Value::Object(Map::new()));
        let mut requirement = Map::new();
        requirement.insert("type".into(), Value::from("object"));
        requirement.insert("properties".into(), Value::Object(properties));

        let mut out = self.apply(&SchemaFragment::new(requirement))?;
        out.focus = self.focus.clone();
        out.focus.push(key.to_string());
        Ok(out)
    }

    pub fn without_focus(&self) -> Self {
        Self { schema: self.schema.clone(), focus: Vec::new() }
    }

    /// The map the focus path points at.
    fn target(&self) -> Map<String, Value> {
        let mut node = &self.schema;
        for key in &self.focus {
            match node
                .get("properties")
                .and_then(|p| p.get(key))
                .and_then(Value::as_object)
            {
                Some(next) => node = next,
                None => return Map::new(),
            }
        }
        node.clone()
    }

    fn with_updated_target(&self, target: Map<String, Value>) -> Self {
        let mut out = self.clone();
        replace_at(&mut out.schema, &self.focus, target);
        out
    }

    /// Sets `description` on the focus target. Written in place rather than
    /// merged, since a container schema absorbs scalar-only fragments.
    pub fn with_description(&self, text: &str) -> Self {
        let mut target = self.target();
        target.insert("description".into(), Value::from(text));
        self.with_updated_target(target)
    }

    // ------------------------------ Merge -------------------------------- //

    pub fn apply(&self, other: &SchemaFragment) -> SchemaResult<Self> {
        self.apply_with(other, &Attributes::default())
    }

    /// Merges `other` into this fragment; `attributes` are those of the
    /// caster `other` came from.
    pub fn apply_with(&self, other: &SchemaFragment, attributes: &Attributes) -> SchemaResult<Self> {
        if other.is_empty() {
            return Ok(self.clone());
        }
        if self.is_empty() {
            return Ok(other.clone());
        }
        if !self.focus.is_empty() {
            let merged = SchemaFragment::new(self.target()).apply(other)?;
            return Ok(self.with_updated_target(merged.schema));
        }

        merge::merge(&self.schema, &other.schema, attributes)
            .map(SchemaFragment::new)
            .inspect_err(|err| debug!(%err, "schema merge rejected"))
    }

    /// Renames properties according to a key projection; see [`remap`].
    pub fn remap(&self, mapping: &Remapping) -> Self {
        if mapping.is_empty() {
            return self.clone();
        }
        let mut out = self.clone();
        remap::remap(&mut out.schema, mapping);
        out
    }
}

fn replace_at(node: &mut Map<String, Value>, path: &[String], target: Map<String, Value>) {
    let Some((key, rest)) = path.split_first() else {
        *node = target;
        return;
    };
    let properties = node
        .entry("properties")
        .or_insert_with(|| Value::Object(Map::new()));
    if let Value::Object(properties) = properties {
        let child = properties
            .entry(key.clone())
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(child) = child {
            replace_at(child, rest, target);
        }
    }
}

impl From<Value> for SchemaFragment {
    fn from(value: Value) -> Self { Self::from_value(value) }
}

impl From<SchemaFragment> for Value {
    fn from(fragment: SchemaFragment) -> Self { fragment.into_value() }
}

impl PartialEq<Value> for SchemaFragment {
    fn eq(&self, other: &Value) -> bool {
        other.as_object().is_some_and(|o| o == &self.schema)
    }
}

// ------------------------------- Tests ------------------------------------ //
