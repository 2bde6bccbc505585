//! Hash validation and hash construction.
use indexmap::IndexMap;
use serde_json::{Map, Value, json};

use super::{Leaf, fail};
use crate::attributes::{Attributes, Remapping};
use crate::caster::{Caster, Node};
use crate::context::Context;
use crate::error::SchemaResult;
use crate::error_tree::{ErrorTree, PathKey};
use crate::result::CastResult;
use crate::schema::SchemaFragment;

type Fields = Vec<(String, Caster)>;

fn collect_fields<I, K>(fields: I) -> Fields
where
    I: IntoIterator<Item = (K, Caster)>,
    K: Into<String>,
{
    fields.into_iter().map(|(k, c)| (k.into(), c)).collect()
}

// ------------------------------ hash_schema ------------------------------- //

/// Validates selected fields of an object; other keys pass through.
#[derive(Debug)]
pub(crate) struct HashSchema {
    fields: Fields,
}

pub fn hash_schema<I, K>(fields: I) -> Caster
where
    I: IntoIterator<Item = (K, Caster)>,
    K: Into<String>,
{
    let fields = collect_fields(fields);
    Caster::from_node(Node::Leaf(Leaf::HashSchema(HashSchema { fields })))
}

impl HashSchema {
    pub(crate) fn cast(&self, value: &Value, ctx: &mut Context) -> CastResult {
        let Some(input) = value.as_object() else {
            return fail("hash_value", value);
        };

        let mut output = input.clone();
        let mut failures: IndexMap<PathKey, ErrorTree> = IndexMap::new();
        for (key, caster) in &self.fields {
            let field = input.get(key);
            let result = ctx.checked_key(key.as_str(), |ctx| {
                caster.cast(field.unwrap_or(&Value::Null), ctx)
            });
            match result {
                // an absent field that stays null stays absent
                CastResult::Valid(Value::Null) if field.is_none() => {}
                CastResult::Valid(v) => {
                    output.insert(key.clone(), v);
                }
                CastResult::Invalid(errors) => {
                    failures.insert(PathKey::Field(key.clone()), errors);
                }
            }
        }

        if failures.is_empty() {
            CastResult::valid(Value::Object(output))
        } else {
            CastResult::invalid(ErrorTree::Map(failures))
        }
    }

    pub(crate) fn to_json_schema(&self) -> SchemaResult<SchemaFragment> {
        let mut properties = Map::new();
        let mut required = Vec::new();
        for (key, caster) in &self.fields {
            properties.insert(key.clone(), caster.to_json_schema()?.into_value());
            if caster.to_json_schema_attributes().required {
                required.push(Value::from(key.as_str()));
            }
        }

        let mut schema = json!({"type": "object", "properties": properties});
        if !required.is_empty() {
            schema["required"] = Value::Array(required);
        }
        Ok(SchemaFragment::from_value(schema))
    }
}

// --------------------------- transform_to_hash ---------------------------- //

/// Builds a new object; every field caster sees the whole input.
#[derive(Debug)]
pub(crate) struct TransformToHash {
    fields: Fields,
}

pub fn transform_to_hash<I, K>(fields: I) -> Caster
where
    I: IntoIterator<Item = (K, Caster)>,
    K: Into<String>,
{
    let fields = collect_fields(fields);
    Caster::from_node(Node::Leaf(Leaf::TransformToHash(TransformToHash { fields })))
}

impl TransformToHash {
    pub(crate) fn cast(&self, value: &Value, ctx: &mut Context) -> CastResult {
        let mut output = Map::new();
        let mut failures: IndexMap<PathKey, ErrorTree> = IndexMap::new();
        for (key, caster) in &self.fields {
            match caster.cast(value, ctx) {
                CastResult::Valid(v) => {
                    output.insert(key.clone(), v);
                }
                CastResult::Invalid(errors) => {
                    failures.insert(PathKey::Field(key.clone()), errors);
                }
            }
        }

        if failures.is_empty() {
            CastResult::valid(Value::Object(output))
        } else {
            CastResult::invalid(ErrorTree::Map(failures))
        }
    }

    /// Describes the input the fields read from, not the built object.
    pub(crate) fn to_json_schema(&self) -> SchemaResult<SchemaFragment> {
        let mut fragment = SchemaFragment::from_value(json!({"type": "object"}));
        for (_, caster) in &self.fields {
            fragment = fragment.apply(&caster.to_json_schema()?.without_focus())?;
        }
        Ok(fragment)
    }

    pub(crate) fn attributes(&self) -> Attributes {
        let mut picked = Vec::new();
        let mut remapped = Remapping::new();
        for (key, caster) in &self.fields {
            let field = caster.to_json_schema_attributes();
            if field.picked.is_empty() {
                remapped.insert(None, key.clone());
            }
            for source in field.picked {
                remapped.insert(Some(source.clone()), key.clone());
                if !picked.contains(&source) {
                    picked.push(source);
                }
            }
        }
        Attributes { picked, remapped, ..Attributes::default() }
    }
}
