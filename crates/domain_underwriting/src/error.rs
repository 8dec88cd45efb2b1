//! Underwriting domain errors
//!
//! Two kinds of failure live here. [`DataError`] describes a rule whose
//! predicate cannot be evaluated (bad operator, wrong value type, unsupported
//! predicate version); it is scoped to a single rule and is downgraded by the
//! evaluator into a `refer` verdict. [`UnderwritingError`] is raised only when
//! a caller asks for a rule set to be rejected outright.

use core_kernel::RuleSetId;
use thiserror::Error;

/// A malformed or ill-typed predicate, scoped to one rule
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataError {
    /// The operator name is not part of the supported predicate language
    #[error("Unknown operator '{operator}' on field '{field}'")]
    UnknownOperator {
        field: String,
        operator: String,
    },

    /// The stored fact or the rule's comparison value has the wrong type
    #[error("Type mismatch on field '{field}': operator '{operator}' expects {expected}, found {found}")]
    TypeMismatch {
        field: String,
        operator: String,
        expected: String,
        found: String,
    },

    /// The predicate was authored against a DSL version this engine does not speak
    #[error("Unsupported predicate version {version} (supported: {supported})")]
    UnsupportedPredicateVersion {
        version: u32,
        supported: u32,
    },

    /// The predicate JSON does not describe a valid node
    #[error("Malformed predicate: {0}")]
    MalformedPredicate(String),
}

impl DataError {
    /// Creates a type mismatch error
    pub fn type_mismatch(
        field: impl Into<String>,
        operator: impl Into<String>,
        expected: impl Into<String>,
        found: &serde_json::Value,
    ) -> Self {
        DataError::TypeMismatch {
            field: field.into(),
            operator: operator.into(),
            expected: expected.into(),
            found: json_type_name(found).to_string(),
        }
    }

    /// Creates a malformed predicate error
    pub fn malformed(message: impl Into<String>) -> Self {
        DataError::MalformedPredicate(message.into())
    }
}

/// Errors surfaced by the underwriting API
#[derive(Debug, Error)]
pub enum UnderwritingError {
    /// A rule set failed static validation
    #[error("Rule set {rule_set_id} is invalid: {}", .issues.join("; "))]
    InvalidRuleSet {
        rule_set_id: RuleSetId,
        issues: Vec<String>,
    },
}

/// Human-readable JSON type name for error messages
pub(crate) fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
