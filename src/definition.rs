//! Declarative caster trees.
//!
//! A `Definition` is the serde form of a caster tree, so trees can live in
//! JSON files:
//!
//! ```json
//! {"and": [
//!     {"hash_schema": {"id": "integer"}},
//!     {"hash_schema": {"email": {"pattern": "@"}}}
//! ]}
//! ```
use indexmap::IndexMap;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use crate::caster::{self, ArrayOptions, Caster, Matcher, SwitchBase};
use crate::error::ContractError;
use crate::leaf;
use crate::path_de::{self, PathError};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Definition {
    Integer,
    Integer32,
    Number,
    String,
    Boolean,
    Array,
    Hash,
    Uuid,
    Pass,
    Pattern(String),
    IncludedIn(Vec<Value>),
    Compare(Value),
    Pick(String),
    PickAll(Vec<String>),
    Default(Value),
    Optional(Box<Definition>),
    HashSchema(IndexMap<String, Definition>),
    TransformToHash(IndexMap<String, Definition>),
    And(Vec<Definition>),
    AndAggregating(Vec<Definition>),
    Or(Vec<Definition>),
    Then {
        #[serde(rename = "if")]
        condition: Box<Definition>,
        then: Box<Definition>,
        #[serde(rename = "else")]
        otherwise: Box<Definition>,
    },
    Switch(SwitchDefinition),
    ArrayOf {
        of: Box<Definition>,
        #[serde(flatten)]
        options: ArrayOptions,
    },
    Describe {
        description: String,
        of: Box<Definition>,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct SwitchDefinition {
    #[serde(default)]
    pub on: Option<KeyShape>,
    #[serde(default)]
    pub base: Option<Box<Definition>>,
    pub clauses: Vec<ClauseDefinition>,
    #[serde(default, rename = "else")]
    pub otherwise: Option<Box<Definition>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum KeyShape {
    Key(String),
    Keys(Vec<String>),
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClauseDefinition {
    #[serde(flatten)]
    pub when: WhenDefinition,
    pub then: Definition,
    #[serde(default)]
    pub strict: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WhenDefinition {
    /// Literal the projected value is compared against.
    Equals(Value),
    /// Caster the projected value must pass.
    Matches(Definition),
}

impl Definition {
    pub fn from_json_str(src: &str) -> Result<Self, PathError> { path_de::from_str_with_path(src) }

    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, PathError> { path_de::from_slice_with_path(bytes) }

    pub fn build(&self) -> Result<Caster, ContractError> {
        let caster = match self {
            Definition::Integer => leaf::integer(),
            Definition::Integer32 => leaf::integer32(),
            Definition::Number => leaf::number(),
            Definition::String => leaf::string(),
            Definition::Boolean => leaf::boolean(),
            Definition::Array => leaf::array(),
            Definition::Hash => leaf::hash(),
            Definition::Uuid => leaf::uuid(),
            Definition::Pass => leaf::pass(),
            Definition::Pattern(source) => {
                let re = Regex::new(source).map_err(|err| ContractError::InvalidPattern {
                    pattern: source.clone(),
                    reason: err.to_string(),
                })?;
                leaf::pattern(re)
            }
            Definition::IncludedIn(values) => leaf::included_in(values.iter().cloned()),
            Definition::Compare(value) => leaf::compare(value.clone()),
            Definition::Pick(key) => leaf::pick(key.as_str()),
            Definition::PickAll(keys) => leaf::pick_all(keys.iter().cloned()),
            Definition::Default(value) => leaf::default(value.clone()),
            Definition::Optional(inner) => leaf::optional(inner.build()?),
            Definition::HashSchema(fields) => leaf::hash_schema(build_fields(fields)?),
            Definition::TransformToHash(fields) => leaf::transform_to_hash(build_fields(fields)?),
            Definition::And(items) => fold(items, "and", |a, b| caster::and(a, b))?,
            Definition::AndAggregating(items) => fold(items, "and_aggregating", |a, b| caster::and_aggregating(a, b))?,
            Definition::Or(items) => fold(items, "or", |a, b| caster::or(a, b))?,
            Definition::Then { condition, then, otherwise } => {
                caster::then(condition.build()?, then.build()?).else_(otherwise.build()?)
            }
            Definition::Switch(switch) => switch.build()?,
            Definition::ArrayOf { of, options } => caster::array_of(of.build()?, options.clone()),
            Definition::Describe { description, of } => of.build()?.describe(description.as_str()),
        };
        Ok(caster)
    }
}

impl SwitchDefinition {
    fn build(&self) -> Result<Caster, ContractError> {
        let base = match (&self.on, &self.base) {
            (Some(_), Some(_)) => return Err(ContractError::AmbiguousSwitchBase),
            (Some(KeyShape::Key(key)), None) => SwitchBase::Key(key.clone()),
            (Some(KeyShape::Keys(keys)), None) => SwitchBase::Keys(keys.clone()),
            (None, Some(base)) => SwitchBase::Caster(base.build()?),
            (None, None) => SwitchBase::None,
        };

        let mut switch = caster::switch(base);
        for clause in &self.clauses {
            let matcher = match &clause.when {
                WhenDefinition::Equals(value) => Matcher::Literal(value.clone()),
                WhenDefinition::Matches(definition) => Matcher::Caster(definition.build()?),
            };
            let then = clause.then.build()?;
            switch = if clause.strict { switch.on_strict(matcher, then) } else { switch.on(matcher, then) };
        }
        if let Some(otherwise) = &self.otherwise {
            switch = switch.else_(otherwise.build()?)?;
        }
        switch.build()
    }
}

fn build_fields(fields: &IndexMap<String, Definition>) -> Result<Vec<(String, Caster)>, ContractError> {
    fields
        .iter()
        .map(|(key, definition)| Ok((key.clone(), definition.build()?)))
        .collect()
}

fn fold(
    items: &[Definition],
    name: &'static str,
    combine: fn(Caster, Caster) -> Caster,
) -> Result<Caster, ContractError> {
    let mut casters = items.iter().map(Definition::build);
    let first = casters.next().ok_or(ContractError::EmptyComposition(name))??;
    casters.try_fold(first, |acc, next| Ok(combine(acc, next?)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::CastResult;
    use serde_json::json;

    #[test]
    fn builds_hash_composition() {
        let definition = Definition::from_json_str(
            r#"{"and": [
                {"hash_schema": {"id": "integer"}},
                {"hash_schema": {"email": {"pattern": "@"}}}
            ]}"#,
        )
        .unwrap();
        let caster = definition.build().unwrap();
        assert_eq!(
            caster.call(&json!({"id": 1, "email": "a@b.com"})),
            CastResult::valid(json!({"id": 1, "email": "a@b.com"}))
        );
        assert_eq!(
            caster.to_json_schema().unwrap().get("required"),
            Some(&json!(["id", "email"]))
        );
    }

    #[test]
    fn builds_switch_with_clauses() {
        let definition = Definition::from_json_str(
            r#"{"switch": {
                "on": "kind",
                "clauses": [
                    {"equals": "string", "then": {"hash_schema": {"id": "string"}}},
                    {"equals": "integer", "then": {"hash_schema": {"id": "integer"}}, "strict": true}
                ],
                "else": "pass"
            }}"#,
        )
        .unwrap();
        let caster = definition.build().unwrap();
        assert!(caster.call(&json!({"kind": "string", "id": "x"})).is_valid());
        assert!(!caster.call(&json!({"kind": "integer", "id": "x"})).is_valid());
        assert!(caster.call(&json!({"kind": "other"})).is_valid());
    }

    #[test]
    fn then_and_array_options() {
        let definition = Definition::from_json_str(
            r#"{"array_of": {
                "of": {"then": {"if": "integer", "then": "integer32", "else": "string"}},
                "allow_empty": true
            }}"#,
        )
        .unwrap();
        let caster = definition.build().unwrap();
        assert_eq!(caster.call(&json!([])), CastResult::valid(json!([])));
        assert!(caster.call(&json!([1, "a"])).is_valid());
    }

    #[test]
    fn contract_errors_surface_on_build() {
        let empty_or = Definition::from_json_str(r#"{"or": []}"#).unwrap();
        assert_eq!(empty_or.build().unwrap_err(), ContractError::EmptyComposition("or"));

        let no_clauses = Definition::from_json_str(r#"{"switch": {"on": "kind", "clauses": []}}"#).unwrap();
        assert_eq!(no_clauses.build().unwrap_err(), ContractError::SwitchWithoutClauses);

        let bad_pattern = Definition::from_json_str(r#"{"pattern": "("}"#).unwrap();
        assert!(matches!(bad_pattern.build(), Err(ContractError::InvalidPattern { .. })));
    }

    #[test]
    fn parse_errors_name_the_path() {
        let err = Definition::from_json_str(r#"{"hash_schema": {"id": "integr"}}"#).unwrap_err();
        assert!(err.path.contains("id"), "path was {}", err.path);
    }
}
