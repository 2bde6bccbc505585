//! Composable casters over `serde_json::Value`.
//!
//! A caster tree is built once from leaves and combinators and then read two
//! ways: `cast` validates and transforms a value into a [`CastResult`], and
//! `to_json_schema` derives a JSON-Schema fragment describing the same tree.
pub mod attributes;
pub mod caster;
pub mod context;
pub mod definition;
pub mod error;
pub mod error_tree;
pub mod leaf;
pub mod path_de;
pub mod result;
pub mod schema;

pub use attributes::{Attributes, Remapping};
pub use caster::{
    ArrayOptions, Bound, Caster, Matcher, PendingThen, Switch, SwitchBase, and, and_aggregating,
    array_of, or, switch, then,
};
pub use context::Context;
pub use definition::Definition;
pub use error::{ContractError, SchemaError, SchemaResult};
pub use error_tree::{ErrorKey, ErrorTree, PathKey};
pub use result::CastResult;
pub use schema::SchemaFragment;
