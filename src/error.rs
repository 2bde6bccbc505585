use serde_json::Value;
use thiserror::Error;

/// Assembly mistakes in a caster tree. These are programmer errors: they
/// surface when a builder is finalized and are never part of a cast result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractError {
    #[error("switch caster requires at least one 'on' statement: switch(...).on(condition, cast)")]
    SwitchWithoutClauses,

    #[error("double else clause is not permitted")]
    DoubleElse,

    #[error("switch base must be a caster, a hash key, or a non-empty list of keys")]
    EmptySwitchKeys,

    #[error("`{0}` requires at least one caster")]
    EmptyComposition(&'static str),

    #[error("switch takes either a base caster or a key shape, not both")]
    AmbiguousSwitchBase,

    #[error("invalid pattern `{pattern}`: {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

/// Irreconcilable schema fragments. Both sides are kept so the message
/// points at the two fragments that could not be merged.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    #[error("can't merge json schemas due to wrong items/properties combination for {left} and {right}")]
    NestingConflict { left: Value, right: Value },

    #[error("can't merge json schemas due to conflicting field `{field}` for {left} and {right}")]
    FieldConflict {
        field: String,
        left: Value,
        right: Value,
    },
}

pub type SchemaResult<T> = Result<T, SchemaError>;
