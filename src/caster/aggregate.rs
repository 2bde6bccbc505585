use serde_json::Value;
use tracing::trace;

use super::Caster;
use crate::attributes::Attributes;
use crate::context::Context;
use crate::error::SchemaResult;
use crate::error_tree;
use crate::result::CastResult;
use crate::schema::SchemaFragment;

/// Sequential composition for hash schemas: after a failure on the left the
/// right side still runs against the original input so its errors surface
/// too.
#[derive(Debug)]
pub(crate) struct AggregateNode {
    left: Caster,
    right: Caster,
}

impl AggregateNode {
    pub(crate) fn new(left: Caster, right: Caster) -> Self { Self { left, right } }

    pub(crate) fn cast(&self, value: &Value, ctx: &mut Context) -> CastResult {
        let left_errors = match self.left.cast(value, ctx) {
            CastResult::Valid(next) => return self.right.cast(&next, ctx),
            CastResult::Invalid(errors) => errors,
        };

        trace!("left side failed, collecting right side errors");
        match self.right.cast(value, ctx) {
            CastResult::Valid(_) => CastResult::Invalid(left_errors),
            CastResult::Invalid(right_errors) => {
                CastResult::invalid(error_tree::merge(Some(left_errors), Some(right_errors)))
            }
        }
    }

    pub(crate) fn to_json_schema(&self) -> SchemaResult<SchemaFragment> {
        SchemaFragment::empty()
            .apply(&self.left.to_json_schema()?)?
            .apply(&self.right.to_json_schema()?)
    }

    pub(crate) fn attributes(&self) -> Attributes {
        let required = [&self.left, &self.right]
            .into_iter()
            .any(|c| c.to_json_schema_attributes().required);
        Attributes::default().with_required(required)
    }
}

#[cfg(test)]
mod tests {
    use crate::caster::and_aggregating;
    use crate::leaf::{hash_schema, integer, string};
    use crate::result::CastResult;
    use serde_json::json;

    #[test]
    fn collects_errors_from_both_sides() {
        let caster = and_aggregating(
            hash_schema([("a", integer())]),
            hash_schema([("b", integer())]),
        );
        let err = caster.call(&json!({"a": "x", "b": "y"})).into_result().unwrap_err();
        assert_eq!(err.keys().len(), 2);
        assert!(err.get("a").is_some());
        assert!(err.get("b").is_some());
    }

    #[test]
    fn right_success_keeps_left_failure() {
        let caster = and_aggregating(
            hash_schema([("a", integer())]),
            hash_schema([("b", string())]),
        );
        let err = caster.call(&json!({"a": "x", "b": "y"})).into_result().unwrap_err();
        assert_eq!(err.keys().len(), 1);
        assert!(err.get("a").is_some());
    }

    #[test]
    fn chains_when_left_passes() {
        let caster = and_aggregating(hash_schema([("a", integer())]), hash_schema([("b", integer())]));
        assert_eq!(
            caster.call(&json!({"a": 1, "b": 2})),
            CastResult::valid(json!({"a": 1, "b": 2}))
        );
    }

    #[test]
    fn schema_merges_both_sides() {
        let caster = and_aggregating(hash_schema([("a", integer())]), hash_schema([("b", string())]));
        assert_eq!(
            caster.to_json_schema().unwrap().into_value(),
            json!({
                "type": "object",
                "properties": {"a": {"type": "integer"}, "b": {"type": "string"}},
                "required": ["a", "b"]
            })
        );
    }
}
