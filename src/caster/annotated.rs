use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use super::{Caster, Node};
use crate::attributes::Attributes;
use crate::context::Context;
use crate::error::SchemaResult;
use crate::result::CastResult;
use crate::schema::SchemaFragment;

type AttributesFn = Arc<dyn Fn(Attributes) -> Attributes + Send + Sync>;

/// Schema-side decoration of a caster; casting is delegated untouched.
pub(crate) struct AnnotatedNode {
    inner: Caster,
    annotation: Annotation,
}

enum Annotation {
    Description(String),
    Schema(Value),
    Attributes(AttributesFn),
}

impl AnnotatedNode {
    pub(crate) fn cast(&self, value: &Value, ctx: &mut Context) -> CastResult {
        self.inner.cast(value, ctx)
    }

    pub(crate) fn to_json_schema(&self) -> SchemaResult<SchemaFragment> {
        match &self.annotation {
            Annotation::Description(text) => Ok(self.inner.to_json_schema()?.with_description(text)),
            Annotation::Schema(schema) => Ok(SchemaFragment::from_value(schema.clone())),
            Annotation::Attributes(_) => self.inner.to_json_schema(),
        }
    }

    pub(crate) fn attributes(&self) -> Attributes {
        let inner = self.inner.to_json_schema_attributes();
        match &self.annotation {
            Annotation::Attributes(rewrite) => rewrite(inner),
            _ => inner,
        }
    }
}

impl fmt::Debug for AnnotatedNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.annotation {
            Annotation::Description(text) => format!("description({text:?})"),
            Annotation::Schema(schema) => format!("schema({schema})"),
            Annotation::Attributes(_) => "attributes(..)".to_string(),
        };
        f.debug_struct("Annotated").field("annotation", &kind).field("inner", &self.inner).finish()
    }
}

fn wrap(inner: Caster, annotation: Annotation) -> Caster {
    Caster::from_node(Node::Annotated(AnnotatedNode { inner, annotation }))
}

pub(crate) fn describe(inner: Caster, text: String) -> Caster {
    wrap(inner, Annotation::Description(text))
}

pub(crate) fn with_schema(inner: Caster, schema: Value) -> Caster {
    wrap(inner, Annotation::Schema(schema))
}

pub(crate) fn with_attributes<F>(inner: Caster, rewrite: F) -> Caster
where
    F: Fn(Attributes) -> Attributes + Send + Sync + 'static,
{
    wrap(inner, Annotation::Attributes(Arc::new(rewrite)))
}
