use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::{Map, Value};

use super::Caster;
use crate::context::Context;
use crate::error::SchemaResult;
use crate::error_tree::{ErrorKey, ErrorTree, PathKey};
use crate::result::CastResult;
use crate::schema::SchemaFragment;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ArrayOptions {
    pub allow_empty: bool,
    /// Extra message key tried first when the input is not an array.
    pub array_error: Option<String>,
    /// Extra message key tried first when the input is empty.
    pub empty_error: Option<String>,
}

impl ArrayOptions {
    pub fn allow_empty() -> Self {
        Self { allow_empty: true, ..Self::default() }
    }
}

#[derive(Debug)]
pub(crate) struct ArrayNode {
    element: Caster,
    options: ArrayOptions,
}

impl ArrayNode {
    pub(crate) fn new(element: Caster, options: ArrayOptions) -> Self { Self { element, options } }

    pub(crate) fn cast(&self, value: &Value, ctx: &mut Context) -> CastResult {
        let Some(items) = value.as_array() else {
            return CastResult::error(ErrorKey::standard(
                "array",
                self.options.array_error.as_deref(),
                value.clone(),
            ));
        };
        if items.is_empty() && !self.options.allow_empty {
            return CastResult::error(ErrorKey::standard(
                "empty",
                self.options.empty_error.as_deref(),
                value.clone(),
            ));
        }

        ctx.will_check();

        let mut values = Vec::with_capacity(items.len());
        let mut failures: IndexMap<PathKey, ErrorTree> = IndexMap::new();
        for (index, item) in items.iter().enumerate() {
            match ctx.checked_key(index, |ctx| self.element.cast(item, ctx)) {
                CastResult::Valid(v) => values.push(v),
                CastResult::Invalid(errors) => {
                    failures.insert(PathKey::Index(index), errors);
                }
            }
        }

        if failures.is_empty() {
            CastResult::valid(Value::Array(values))
        } else {
            CastResult::invalid(ErrorTree::Map(failures))
        }
    }

    pub(crate) fn to_json_schema(&self) -> SchemaResult<SchemaFragment> {
        let mut schema = Map::new();
        schema.insert("type".into(), Value::from("array"));
        schema.insert("items".into(), self.element.to_json_schema()?.into_value());
        Ok(SchemaFragment::new(schema))
    }
}
