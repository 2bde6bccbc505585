use serde_json::Value;

use super::Caster;
use crate::attributes::{Attributes, Remapping};
use crate::context::Context;
use crate::error::SchemaResult;
use crate::result::CastResult;
use crate::schema::SchemaFragment;

#[derive(Debug)]
pub(crate) struct AndNode {
    pub(crate) casters: Vec<Caster>,
}

impl AndNode {
    pub(crate) fn new(casters: Vec<Caster>) -> Self { Self { casters } }

    /// Threads the value through every child; the first failure wins.
    pub(crate) fn cast(&self, value: &Value, ctx: &mut Context) -> CastResult {
        let mut current = value.clone();
        for caster in &self.casters {
            match caster.cast(&current, ctx) {
                CastResult::Valid(next) => current = next,
                invalid @ CastResult::Invalid(_) => return invalid,
            }
        }
        CastResult::valid(current)
    }

    pub(crate) fn to_json_schema(&self) -> SchemaResult<SchemaFragment> {
        let mut fragment = SchemaFragment::empty();
        let mut mapping = Remapping::new();
        for caster in &self.casters {
            let attributes = caster.to_json_schema_attributes();
            fragment = fragment.apply_with(&caster.to_json_schema()?, &attributes)?;
            mapping.extend(&attributes.remapped);
        }
        Ok(fragment.remap(&mapping))
    }

    pub(crate) fn attributes(&self) -> Attributes {
        let children: Vec<Attributes> = self
            .casters
            .iter()
            .map(Caster::to_json_schema_attributes)
            .collect();

        let mut remapped = Remapping::new();
        for child in &children {
            remapped.extend(&child.remapped);
        }

        Attributes {
            required: children.iter().any(|a| a.required),
            picked: children.iter().flat_map(|a| a.picked.iter().cloned()).collect(),
            remapped,
            extendable: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::caster::and;
    use crate::leaf::{compare, integer, integer32, optional, pick, transform};
    use crate::result::CastResult;
    use serde_json::json;

    #[test]
    fn stops_at_first_failure() {
        let caster = and(integer(), compare(json!(2)));
        assert_eq!(caster.call(&json!(2)), CastResult::valid(json!(2)));

        let err = caster.call(&json!("2")).into_result().unwrap_err();
        assert_eq!(err.messages()[0].primary(), ".integer");

        let err = caster.call(&json!(3)).into_result().unwrap_err();
        assert_eq!(err.messages()[0].primary(), ".compare");
    }

    #[test]
    fn threads_transformed_value() {
        let caster = transform(|v| json!({"n": v.clone()})) & pick("n") & integer32();
        assert_eq!(caster.call(&json!(7)), CastResult::valid(json!(7)));
    }

    #[test]
    fn optional_later_child_keeps_requirement() {
        let caster = integer() & optional(integer());
        assert!(caster.to_json_schema_attributes().required);
        let caster = optional(integer()) & optional(integer());
        assert!(!caster.to_json_schema_attributes().required);
    }

    #[test]
    fn schema_folds_children_into_focus() {
        let caster = pick("a") & integer();
        assert_eq!(
            caster.to_json_schema().unwrap().into_value(),
            json!({"type": "object", "properties": {"a": {"type": "integer"}}})
        );
        assert_eq!(caster.to_json_schema_attributes().picked, vec!["a".to_string()]);
    }
}
