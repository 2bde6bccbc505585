use serde_json::Value;

use crate::error_tree::{ErrorKey, ErrorTree};

/// Outcome of a single cast. Built once, never mutated; an `Invalid` result
/// has no value.
#[derive(Debug, Clone, PartialEq)]
pub enum CastResult {
    Valid(Value),
    Invalid(ErrorTree),
}

impl CastResult {
    pub fn valid(value: Value) -> Self { CastResult::Valid(value) }

    pub fn invalid(errors: ErrorTree) -> Self { CastResult::Invalid(errors.normalized()) }

    /// Failure carrying one message.
    pub fn error(key: ErrorKey) -> Self { CastResult::Invalid(ErrorTree::message(key)) }

    pub fn is_valid(&self) -> bool { matches!(self, CastResult::Valid(_)) }

    pub fn value(&self) -> Option<&Value> {
        match self {
            CastResult::Valid(v) => Some(v),
            CastResult::Invalid(_) => None,
        }
    }

    pub fn errors(&self) -> Option<&ErrorTree> {
        match self {
            CastResult::Valid(_) => None,
            CastResult::Invalid(e) => Some(e),
        }
    }

    pub fn into_result(self) -> Result<Value, ErrorTree> {
        match self {
            CastResult::Valid(v) => Ok(v),
            CastResult::Invalid(e) => Err(e),
        }
    }
}

impl From<Result<Value, ErrorTree>> for CastResult {
    fn from(r: Result<Value, ErrorTree>) -> Self {
        match r {
            Ok(v) => CastResult::valid(v),
            Err(e) => CastResult::invalid(e),
        }
    }
}
