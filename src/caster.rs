//! Caster trees.
//!
//! One immutable tree, two interpretations: `cast` runs a value through the
//! nodes and returns `Valid`/`Invalid`, `to_json_schema` folds fragments up
//! from the leaves without looking at any value. Nodes are shared through
//! `Arc`, so combining casters never copies or mutates a published subtree,
//! and a finished tree can be used from any number of threads at once.
pub mod aggregate;
pub mod and;
pub mod annotated;
pub mod array;
pub mod or;
pub mod switch;
pub mod then;

use std::fmt;
use std::ops::{BitAnd, BitOr};
use std::sync::Arc;

use serde_json::Value;

use crate::attributes::Attributes;
use crate::context::Context;
use crate::error::SchemaResult;
use crate::leaf::Leaf;
use crate::result::CastResult;
use crate::schema::SchemaFragment;

pub use array::ArrayOptions;
pub use switch::{Matcher, Switch, SwitchBase};
pub use then::PendingThen;

#[derive(Clone)]
pub struct Caster(Arc<Node>);

#[derive(Debug)]
pub(crate) enum Node {
    And(and::AndNode),
    AndAggregating(aggregate::AggregateNode),
    Or(or::OrNode),
    Then(then::ThenNode),
    Switch(switch::SwitchNode),
    Array(array::ArrayNode),
    Annotated(annotated::AnnotatedNode),
    Leaf(Leaf),
}

impl Caster {
    pub(crate) fn from_node(node: Node) -> Self { Caster(Arc::new(node)) }

    pub(crate) fn node(&self) -> &Node { &self.0 }

    pub fn cast(&self, value: &Value, ctx: &mut Context) -> CastResult {
        match self.node() {
            Node::And(n) => n.cast(value, ctx),
            Node::AndAggregating(n) => n.cast(value, ctx),
            Node::Or(n) => n.cast(value, ctx),
            Node::Then(n) => n.cast(value, ctx),
            Node::Switch(n) => n.cast(value, ctx),
            Node::Array(n) => n.cast(value, ctx),
            Node::Annotated(n) => n.cast(value, ctx),
            Node::Leaf(n) => n.cast(value, ctx),
        }
    }

    pub fn to_json_schema(&self) -> SchemaResult<SchemaFragment> {
        match self.node() {
            Node::And(n) => n.to_json_schema(),
            Node::AndAggregating(n) => n.to_json_schema(),
            Node::Or(n) => n.to_json_schema(),
            Node::Then(n) => n.to_json_schema(),
            Node::Switch(n) => n.to_json_schema(),
            Node::Array(n) => n.to_json_schema(),
            Node::Annotated(n) => n.to_json_schema(),
            Node::Leaf(n) => n.to_json_schema(),
        }
    }

    pub fn to_json_schema_attributes(&self) -> Attributes {
        match self.node() {
            Node::And(n) => n.attributes(),
            Node::AndAggregating(n) => n.attributes(),
            Node::Or(n) => n.attributes(),
            Node::Then(n) => n.attributes(),
            Node::Switch(n) => n.attributes(),
            Node::Array(_) => Attributes::default(),
            Node::Annotated(n) => n.attributes(),
            Node::Leaf(n) => n.attributes(),
        }
    }

    /// Binds `ctx` so the caster becomes a unary function of the value.
    pub fn with_context<'a>(&'a self, ctx: &'a mut Context) -> Bound<'a> {
        Bound { caster: self, ctx }
    }

    /// Casts with a fresh context.
    pub fn call(&self, value: &Value) -> CastResult {
        self.cast(value, &mut Context::new())
    }

    // ---------------------------- Combinators ---------------------------- //

    pub fn and(&self, other: impl Into<Caster>) -> Caster { and(self.clone(), other) }

    pub fn and_aggregating(&self, other: impl Into<Caster>) -> Caster {
        and_aggregating(self.clone(), other)
    }

    pub fn or(&self, other: impl Into<Caster>) -> Caster { or(self.clone(), other) }

    pub fn then(&self, then_caster: impl Into<Caster>) -> PendingThen { then(self.clone(), then_caster) }

    pub fn describe(&self, description: impl Into<String>) -> Caster {
        annotated::describe(self.clone(), description.into())
    }

    pub fn with_schema(&self, schema: Value) -> Caster { annotated::with_schema(self.clone(), schema) }

    pub fn with_attributes<F>(&self, rewrite: F) -> Caster
    where
        F: Fn(Attributes) -> Attributes + Send + Sync + 'static,
    {
        annotated::with_attributes(self.clone(), rewrite)
    }
}

impl fmt::Debug for Caster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { fmt::Debug::fmt(&self.0, f) }
}

impl BitAnd for Caster {
    type Output = Caster;
    fn bitand(self, rhs: Caster) -> Caster { and(self, rhs) }
}

impl BitOr for Caster {
    type Output = Caster;
    fn bitor(self, rhs: Caster) -> Caster { or(self, rhs) }
}

/// A caster with its execution context bound.
pub struct Bound<'a> {
    caster: &'a Caster,
    ctx: &'a mut Context,
}

impl Bound<'_> {
    pub fn call(&mut self, value: &Value) -> CastResult { self.caster.cast(value, self.ctx) }

    pub fn context(&self) -> &Context { self.ctx }
}

// ---------------------------- Constructors -------------------------------- //

/// Sequential composition; nested sequences are flattened.
pub fn and(left: impl Into<Caster>, right: impl Into<Caster>) -> Caster {
    let mut casters = Vec::new();
    for caster in [left.into(), right.into()] {
        match caster.node() {
            Node::And(inner) => casters.extend(inner.casters.iter().cloned()),
            _ => casters.push(caster),
        }
    }
    Caster::from_node(Node::And(and::AndNode::new(casters)))
}

/// Sequential composition that keeps discovering errors after a failure.
pub fn and_aggregating(left: impl Into<Caster>, right: impl Into<Caster>) -> Caster {
    Caster::from_node(Node::AndAggregating(aggregate::AggregateNode::new(left.into(), right.into())))
}

pub fn or(left: impl Into<Caster>, right: impl Into<Caster>) -> Caster {
    Caster::from_node(Node::Or(or::OrNode::new(left.into(), right.into())))
}

/// `if left then then_caster`; becomes a caster once given an else-clause.
pub fn then(left: impl Into<Caster>, then_caster: impl Into<Caster>) -> PendingThen {
    PendingThen::new(left.into(), then_caster.into())
}

pub fn switch(base: impl Into<SwitchBase>) -> Switch { Switch::new(base) }

pub fn array_of(element: impl Into<Caster>, options: ArrayOptions) -> Caster {
    Caster::from_node(Node::Array(array::ArrayNode::new(element.into(), options)))
}
