use serde_json::{Map, Value};
use tracing::trace;

use super::Caster;
use crate::attributes::Attributes;
use crate::context::Context;
use crate::error::SchemaResult;
use crate::result::CastResult;
use crate::schema::SchemaFragment;

#[derive(Debug)]
pub(crate) struct OrNode {
    left: Caster,
    right: Caster,
}

impl OrNode {
    pub(crate) fn new(left: Caster, right: Caster) -> Self { Self { left, right } }

    /// The left failure is discarded; the right result is returned as is.
    pub(crate) fn cast(&self, value: &Value, ctx: &mut Context) -> CastResult {
        match self.left.cast(value, ctx) {
            valid @ CastResult::Valid(_) => valid,
            CastResult::Invalid(_) => {
                trace!("left alternative rejected, trying right");
                self.right.cast(value, ctx)
            }
        }
    }

    pub(crate) fn to_json_schema(&self) -> SchemaResult<SchemaFragment> {
        let branches = vec![
            self.left.to_json_schema()?.into_value(),
            self.right.to_json_schema()?.into_value(),
        ];
        let mut schema = Map::new();
        schema.insert("anyOf".into(), Value::Array(branches));
        Ok(SchemaFragment::new(schema))
    }

    pub(crate) fn attributes(&self) -> Attributes {
        let required = self.left.to_json_schema_attributes().required
            && self.right.to_json_schema_attributes().required;
        Attributes::default().with_required(required)
    }
}
