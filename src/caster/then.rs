use serde_json::{Map, Value};
use tracing::trace;

use super::{Caster, Node};
use crate::attributes::Attributes;
use crate::context::Context;
use crate::error::SchemaResult;
use crate::result::CastResult;
use crate::schema::SchemaFragment;

/// `left.then(c)` awaiting its else-clause. Only `else_` turns it into a
/// caster, so a conditional can never be evaluated without one.
#[must_use = "a conditional needs an else-clause; use `and` when there is none"]
#[derive(Debug, Clone)]
pub struct PendingThen {
    left: Caster,
    then: Caster,
}

impl PendingThen {
    pub(crate) fn new(left: Caster, then: Caster) -> Self { Self { left, then } }

    pub fn else_(self, else_caster: impl Into<Caster>) -> Caster {
        Caster::from_node(Node::Then(ThenNode {
            left: self.left,
            then: self.then,
            otherwise: else_caster.into(),
        }))
    }
}

#[derive(Debug)]
pub(crate) struct ThenNode {
    left: Caster,
    then: Caster,
    otherwise: Caster,
}

impl ThenNode {
    pub(crate) fn cast(&self, value: &Value, ctx: &mut Context) -> CastResult {
        match self.left.cast(value, ctx) {
            CastResult::Valid(next) => self.then.cast(&next, ctx),
            CastResult::Invalid(_) => {
                trace!("condition rejected, taking else branch");
                self.otherwise.cast(value, ctx)
            }
        }
    }

    /// `oneOf[left & then, not(left) & else]`
    pub(crate) fn to_json_schema(&self) -> SchemaResult<SchemaFragment> {
        let taken = super::and(self.left.clone(), self.then.clone()).to_json_schema()?;

        let mut negated = Map::new();
        negated.insert("not".into(), self.left.to_json_schema()?.into_value());
        let untaken = SchemaFragment::new(negated).apply(&self.otherwise.to_json_schema()?)?;

        let mut schema = Map::new();
        schema.insert(
            "oneOf".into(),
            Value::Array(vec![taken.into_value(), untaken.into_value()]),
        );
        Ok(SchemaFragment::new(schema))
    }

    pub(crate) fn attributes(&self) -> Attributes {
        let required = self.left.to_json_schema_attributes().required
            && self.otherwise.to_json_schema_attributes().required;
        Attributes::default().with_required(required)
    }
}

#[cfg(test)]
mod tests {
    use crate::caster::then;
    use crate::leaf::{integer, integer32, string};
    use crate::result::CastResult;
    use serde_json::json;

    #[test]
    fn branches_on_condition() {
        let caster = then(integer(), integer32()).else_(string());
        assert_eq!(caster.call(&json!(5)), CastResult::valid(json!(5)));
        assert_eq!(caster.call(&json!("abc")), CastResult::valid(json!("abc")));

        // the condition passed, so the else branch is not consulted
        let err = caster.call(&json!(1_i64 << 40)).into_result().unwrap_err();
        assert_eq!(err.messages()[0].primary(), ".integer32");
    }

    #[test]
    fn schema_is_one_of_both_branches() {
        let caster = integer().then(integer32()).else_(string());
        assert_eq!(
            caster.to_json_schema().unwrap().into_value(),
            json!({"oneOf": [
                {"type": "integer", "format": "int32"},
                {"not": {"type": "integer"}, "type": "string"}
            ]})
        );
    }
}
