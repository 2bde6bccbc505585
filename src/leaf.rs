//! Leaf casters: type checks, literal comparison, key projection and value
//! transforms. Composite nodes only ever talk to these through `Caster`.
pub mod hash;

use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value, json};

use crate::attributes::Attributes;
use crate::caster::{Caster, Node};
use crate::context::Context;
use crate::error::SchemaResult;
use crate::error_tree::ErrorKey;
use crate::result::CastResult;
use crate::schema::SchemaFragment;

pub use hash::{hash_schema, transform_to_hash};

static UUID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
        .expect("static uuid regex")
});

pub(crate) type TransformFn = Arc<dyn Fn(&Value) -> Value + Send + Sync>;

pub(crate) enum Leaf {
    Integer,
    Integer32,
    Number,
    String,
    Boolean,
    Array,
    Hash,
    Uuid,
    Pattern(Regex),
    IncludedIn(Vec<Value>),
    Compare(Value),
    Pick(Vec<String>),
    PickOne(String),
    Transform(TransformFn),
    Pass,
    Default(Value),
    Optional(Caster),
    HashSchema(hash::HashSchema),
    TransformToHash(hash::TransformToHash),
}

fn fail(kind: &str, value: &Value) -> CastResult {
    CastResult::error(ErrorKey::standard(kind, None, value.clone()))
}

fn is_integer(value: &Value) -> bool {
    value.as_i64().is_some() || value.as_u64().is_some()
}

fn fragment(schema: Value) -> SchemaFragment { SchemaFragment::from_value(schema) }

impl Leaf {
    pub(crate) fn cast(&self, value: &Value, ctx: &mut Context) -> CastResult {
        match self {
            Leaf::Integer if is_integer(value) => CastResult::valid(value.clone()),
            Leaf::Integer => fail("integer", value),
            Leaf::Integer32 => match value.as_i64() {
                Some(n) if i32::try_from(n).is_ok() => CastResult::valid(value.clone()),
                _ if is_integer(value) => fail("integer32", value),
                _ => fail("integer", value),
            },
            Leaf::Number if value.is_number() => CastResult::valid(value.clone()),
            Leaf::Number => fail("number", value),
            Leaf::String if value.is_string() => CastResult::valid(value.clone()),
            Leaf::String => fail("string", value),
            Leaf::Boolean if value.is_boolean() => CastResult::valid(value.clone()),
            Leaf::Boolean => fail("boolean", value),
            Leaf::Array if value.is_array() => CastResult::valid(value.clone()),
            Leaf::Array => fail("array", value),
            Leaf::Hash if value.is_object() => CastResult::valid(value.clone()),
            Leaf::Hash => fail("hash_value", value),
            Leaf::Uuid => match value.as_str() {
                Some(s) if UUID.is_match(s) => CastResult::valid(value.clone()),
                Some(_) => fail("uuid", value),
                None => fail("string", value),
            },
            Leaf::Pattern(re) => match value.as_str() {
                Some(s) if re.is_match(s) => CastResult::valid(value.clone()),
                Some(_) => fail("pattern", value),
                None => fail("string", value),
            },
            Leaf::IncludedIn(values) if values.contains(value) => CastResult::valid(value.clone()),
            Leaf::IncludedIn(_) => fail("included_in", value),
            Leaf::Compare(expected) if expected == value => CastResult::valid(value.clone()),
            Leaf::Compare(_) => fail("compare", value),
            Leaf::PickOne(key) => match value.as_object() {
                Some(object) => CastResult::valid(object.get(key).cloned().unwrap_or(Value::Null)),
                None => fail("must_be_hash", value),
            },
            Leaf::Pick(keys) => match value.as_object() {
                Some(object) => CastResult::valid(Value::Array(
                    keys.iter()
                        .map(|k| object.get(k).cloned().unwrap_or(Value::Null))
                        .collect(),
                )),
                None => fail("must_be_hash", value),
            },
            Leaf::Transform(f) => CastResult::valid(f(value)),
            Leaf::Pass => CastResult::valid(value.clone()),
            Leaf::Default(fallback) if value.is_null() => CastResult::valid(fallback.clone()),
            Leaf::Default(_) => CastResult::valid(value.clone()),
            Leaf::Optional(_) if value.is_null() => CastResult::valid(Value::Null),
            Leaf::Optional(inner) => inner.cast(value, ctx),
            Leaf::HashSchema(h) => h.cast(value, ctx),
            Leaf::TransformToHash(h) => h.cast(value, ctx),
        }
    }

    pub(crate) fn to_json_schema(&self) -> SchemaResult<SchemaFragment> {
        let schema = match self {
            Leaf::Integer => json!({"type": "integer"}),
            Leaf::Integer32 => json!({"type": "integer", "format": "int32"}),
            Leaf::Number => json!({"type": "number"}),
            Leaf::String => json!({"type": "string"}),
            Leaf::Boolean => json!({"type": "boolean"}),
            Leaf::Array => json!({"type": "array"}),
            Leaf::Hash => json!({"type": "object"}),
            Leaf::Uuid => json!({"type": "string", "pattern": UUID.as_str()}),
            Leaf::Pattern(re) => json!({"type": "string", "pattern": re.as_str()}),
            Leaf::IncludedIn(values) => json!({"enum": values}),
            Leaf::Compare(Value::Null) => json!({"type": "null"}),
            Leaf::Compare(expected) => json!({"enum": [expected]}),
            Leaf::PickOne(key) => return SchemaFragment::empty().with_focus_key(key),
            Leaf::Pick(keys) => {
                let properties: Map<String, Value> =
                    keys.iter().map(|k| (k.clone(), json!({}))).collect();
                json!({"type": "object", "properties": properties})
            }
            Leaf::Transform(_) | Leaf::Pass | Leaf::Default(_) => json!({}),
            Leaf::Optional(inner) => return inner.to_json_schema(),
            Leaf::HashSchema(h) => return h.to_json_schema(),
            Leaf::TransformToHash(h) => return h.to_json_schema(),
        };
        Ok(fragment(schema))
    }

    pub(crate) fn attributes(&self) -> Attributes {
        match self {
            Leaf::PickOne(key) => Attributes { picked: vec![key.clone()], ..Attributes::default() },
            Leaf::Pick(keys) => Attributes { picked: keys.clone(), ..Attributes::default() },
            Leaf::Transform(_) | Leaf::Pass | Leaf::Default(_) => Attributes::optional(),
            Leaf::Optional(inner) => inner.to_json_schema_attributes().with_required(false),
            Leaf::TransformToHash(h) => h.attributes(),
            _ => Attributes::default(),
        }
    }
}

impl fmt::Debug for Leaf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Leaf::Integer => f.write_str("integer"),
            Leaf::Integer32 => f.write_str("integer32"),
            Leaf::Number => f.write_str("number"),
            Leaf::String => f.write_str("string"),
            Leaf::Boolean => f.write_str("boolean"),
            Leaf::Array => f.write_str("array"),
            Leaf::Hash => f.write_str("hash"),
            Leaf::Uuid => f.write_str("uuid"),
            Leaf::Pattern(re) => write!(f, "pattern({})", re.as_str()),
            Leaf::IncludedIn(values) => write!(f, "included_in({})", Value::from(values.clone())),
            Leaf::Compare(v) => write!(f, "compare({v})"),
            Leaf::PickOne(key) => write!(f, "pick({key:?})"),
            Leaf::Pick(keys) => write!(f, "pick({keys:?})"),
            Leaf::Transform(_) => f.write_str("transform(..)"),
            Leaf::Pass => f.write_str("pass"),
            Leaf::Default(v) => write!(f, "default({v})"),
            Leaf::Optional(inner) => write!(f, "optional({inner:?})"),
            Leaf::HashSchema(h) => fmt::Debug::fmt(h, f),
            Leaf::TransformToHash(h) => fmt::Debug::fmt(h, f),
        }
    }
}

// ---------------------------- Constructors -------------------------------- //

fn leaf(leaf: Leaf) -> Caster { Caster::from_node(Node::Leaf(leaf)) }

pub fn integer() -> Caster { leaf(Leaf::Integer) }

/// Integer within the signed 32-bit range.
pub fn integer32() -> Caster { leaf(Leaf::Integer32) }

pub fn number() -> Caster { leaf(Leaf::Number) }

pub fn string() -> Caster { leaf(Leaf::String) }

pub fn boolean() -> Caster { leaf(Leaf::Boolean) }

pub fn array() -> Caster { leaf(Leaf::Array) }

pub fn hash() -> Caster { leaf(Leaf::Hash) }

pub fn uuid() -> Caster { leaf(Leaf::Uuid) }

pub fn pattern(re: Regex) -> Caster { leaf(Leaf::Pattern(re)) }

pub fn included_in(values: impl IntoIterator<Item = Value>) -> Caster {
    leaf(Leaf::IncludedIn(values.into_iter().collect()))
}

pub fn compare(expected: Value) -> Caster { leaf(Leaf::Compare(expected)) }

/// Projects one key; absent keys project to `null`.
pub fn pick(key: impl Into<String>) -> Caster { leaf(Leaf::PickOne(key.into())) }

/// Projects several keys into an array of their values.
pub fn pick_all<I, S>(keys: I) -> Caster
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    leaf(Leaf::Pick(keys.into_iter().map(Into::into).collect()))
}

pub fn transform<F>(f: F) -> Caster
where
    F: Fn(&Value) -> Value + Send + Sync + 'static,
{
    leaf(Leaf::Transform(Arc::new(f)))
}

pub fn pass() -> Caster { leaf(Leaf::Pass) }

/// Replaces `null` with `fallback`.
pub fn default(fallback: Value) -> Caster { leaf(Leaf::Default(fallback)) }

/// Lets `null` through untouched; otherwise defers to `inner`.
pub fn optional(inner: impl Into<Caster>) -> Caster { leaf(Leaf::Optional(inner.into())) }
