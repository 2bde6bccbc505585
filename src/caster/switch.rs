//! Multi-way dispatch.
//!
//! `switch(base).on(cond, clause)...` projects the input through `base`,
//! tries each condition in insertion order against the projection, and runs
//! the winning clause on the *original* input.
use serde_json::{Map, Value};
use tracing::{debug, trace};

use super::{Caster, Node};
use crate::attributes::{Attributes, Remapping};
use crate::context::Context;
use crate::error::{ContractError, SchemaResult};
use crate::error_tree::ErrorKey;
use crate::leaf::{compare, pick, pick_all};
use crate::result::CastResult;
use crate::schema::SchemaFragment;

// -------------------------------- Inputs ---------------------------------- //

/// What a switch dispatches on.
#[derive(Debug, Clone)]
pub enum SwitchBase {
    /// The input itself.
    None,
    Caster(Caster),
    /// Sugar for `pick(key)`; the key is marked checked when a clause wins.
    Key(String),
    /// Sugar for `pick_all(keys)`.
    Keys(Vec<String>),
}

impl From<Caster> for SwitchBase {
    fn from(c: Caster) -> Self { SwitchBase::Caster(c) }
}

impl From<&str> for SwitchBase {
    fn from(key: &str) -> Self { SwitchBase::Key(key.to_string()) }
}

impl From<String> for SwitchBase {
    fn from(key: String) -> Self { SwitchBase::Key(key) }
}

impl From<Vec<String>> for SwitchBase {
    fn from(keys: Vec<String>) -> Self { SwitchBase::Keys(keys) }
}

impl<const N: usize> From<[&str; N]> for SwitchBase {
    fn from(keys: [&str; N]) -> Self { SwitchBase::Keys(keys.iter().map(|k| k.to_string()).collect()) }
}

/// A clause condition: either a caster or a literal to compare against.
#[derive(Debug, Clone)]
pub enum Matcher {
    Caster(Caster),
    Literal(Value),
}

impl From<Caster> for Matcher {
    fn from(c: Caster) -> Self { Matcher::Caster(c) }
}

impl From<Value> for Matcher {
    fn from(v: Value) -> Self { Matcher::Literal(v) }
}

impl From<&str> for Matcher {
    fn from(s: &str) -> Self { Matcher::Literal(Value::from(s)) }
}

impl From<String> for Matcher {
    fn from(s: String) -> Self { Matcher::Literal(Value::from(s)) }
}

impl From<i64> for Matcher {
    fn from(n: i64) -> Self { Matcher::Literal(Value::from(n)) }
}

impl From<bool> for Matcher {
    fn from(b: bool) -> Self { Matcher::Literal(Value::from(b)) }
}

impl Matcher {
    /// String literals match only JSON strings, so the rendered
    /// `{"type": "string"}` clause schema accepts exactly what the cast does.
    fn into_caster(self) -> Caster {
        match self {
            Matcher::Caster(c) => c,
            Matcher::Literal(Value::String(s)) => {
                let rendered = serde_json::json!({"type": "string", "enum": [s.clone()]});
                compare(Value::String(s)).with_schema(rendered)
            }
            Matcher::Literal(other) => compare(other),
        }
    }
}

// ------------------------------- Builder ---------------------------------- //

/// Switch under construction. Every step returns a new builder; nothing is
/// shared mutably with previously returned values.
#[derive(Debug, Clone)]
pub struct Switch {
    base: SwitchBase,
    ons: Vec<(Caster, Caster)>,
    otherwise: Option<Caster>,
}

impl Switch {
    pub fn new(base: impl Into<SwitchBase>) -> Self {
        Self { base: base.into(), ons: Vec::new(), otherwise: None }
    }

    pub fn on(&self, matcher: impl Into<Matcher>, clause: impl Into<Caster>) -> Self {
        self.push(matcher.into().into_caster(), clause.into())
    }

    /// Same as [`Switch::on`]. JSON has no symbol type, so a string literal
    /// already matches only the identical string.
    pub fn on_strict(&self, matcher: impl Into<Matcher>, clause: impl Into<Caster>) -> Self {
        self.on(matcher, clause)
    }

    fn push(&self, condition: Caster, clause: Caster) -> Self {
        let mut next = self.clone();
        next.ons.push((condition, clause));
        next
    }

    pub fn else_(&self, clause: impl Into<Caster>) -> Result<Self, ContractError> {
        if self.otherwise.is_some() {
            return Err(ContractError::DoubleElse);
        }
        let mut next = self.clone();
        next.otherwise = Some(clause.into());
        Ok(next)
    }

    pub fn build(&self) -> Result<Caster, ContractError> {
        if self.ons.is_empty() {
            return Err(ContractError::SwitchWithoutClauses);
        }
        let (base, pick_key) = match &self.base {
            SwitchBase::None => (None, None),
            SwitchBase::Caster(c) => (Some(c.clone()), None),
            SwitchBase::Key(k) => (Some(pick(k.as_str())), Some(k.clone())),
            SwitchBase::Keys(ks) if ks.is_empty() => return Err(ContractError::EmptySwitchKeys),
            SwitchBase::Keys(ks) => (Some(pick_all(ks.iter().cloned())), None),
        };
        Ok(Caster::from_node(Node::Switch(SwitchNode {
            base,
            pick_key,
            ons: self.ons.clone(),
            otherwise: self.otherwise.clone(),
        })))
    }
}

// --------------------------------- Node ----------------------------------- //

#[derive(Debug)]
pub(crate) struct SwitchNode {
    base: Option<Caster>,
    pick_key: Option<String>,
    ons: Vec<(Caster, Caster)>,
    otherwise: Option<Caster>,
}

impl SwitchNode {
    pub(crate) fn cast(&self, value: &Value, ctx: &mut Context) -> CastResult {
        let projected = match &self.base {
            None => value.clone(),
            Some(base) => match base.cast(value, ctx) {
                CastResult::Valid(v) => v,
                invalid @ CastResult::Invalid(_) => return invalid,
            },
        };

        for (index, (condition, clause)) in self.ons.iter().enumerate() {
            if !condition.cast(&projected, ctx).is_valid() {
                continue;
            }
            trace!(clause = index, "switch clause matched");
            if let Some(key) = &self.pick_key {
                ctx.mark_checked(key.as_str());
            }
            return clause.cast(value, ctx);
        }

        if let Some(otherwise) = &self.otherwise {
            return otherwise.cast(value, ctx);
        }
        debug!(clauses = self.ons.len(), "no switch clause matched");
        CastResult::error(ErrorKey::standard("switch", None, value.clone()))
    }

    pub(crate) fn to_json_schema(&self) -> SchemaResult<SchemaFragment> {
        let base = match &self.base {
            Some(base) => base.to_json_schema()?,
            None => SchemaFragment::empty(),
        };

        let mut branches = Vec::with_capacity(self.ons.len() + 1);
        for (condition, clause) in &self.ons {
            let branch = base
                .apply(&condition.to_json_schema()?)?
                .without_focus()
                .apply(&clause.to_json_schema()?)?;
            branches.push(branch.into_value());
        }
        if let Some(otherwise) = &self.otherwise {
            branches.push(otherwise.to_json_schema()?.into_value());
        }

        let mut schema = Map::new();
        schema.insert("oneOf".into(), Value::Array(branches));
        Ok(SchemaFragment::new(schema))
    }

    pub(crate) fn attributes(&self) -> Attributes {
        let mut remapped = Remapping::new();
        let clauses = self.ons.iter().map(|(_, clause)| clause);
        for caster in self.base.iter().chain(self.otherwise.iter()).chain(clauses) {
            remapped.extend(&caster.to_json_schema_attributes().remapped);
        }
        Attributes { remapped, extendable: true, ..Attributes::default() }
    }
}
