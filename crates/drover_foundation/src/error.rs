//! Error types for the Drover rule engine.
//!
//! Uses `thiserror` for ergonomic error definition. Errors carry the
//! name of the rule being compiled or fired where one applies.

use std::fmt;

use thiserror::Error;

use crate::fact_id::FactId;
use crate::types::Type;

/// The main error type for engine operations.
///
/// Display is implemented by hand so that the rule context renders as
/// a suffix; the kinds themselves use `thiserror`.
#[derive(Debug)]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Name of the rule involved, when one applies.
    pub rule: Option<String>,
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        std::error::Error::source(&self.kind)
    }
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, rule: None }
    }

    /// Attaches the name of the rule this error occurred in.
    #[must_use]
    pub fn in_rule(mut self, rule: impl Into<String>) -> Self {
        self.rule = Some(rule.into());
        self
    }

    /// Creates an unknown fact-type error.
    #[must_use]
    pub fn unknown_fact_type(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnknownFactType(name.into()))
    }

    /// Creates a duplicate fact-type registration error.
    #[must_use]
    pub fn duplicate_fact_type(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::DuplicateFactType(name.into()))
    }

    /// Creates an unknown field error.
    #[must_use]
    pub fn unknown_field(fact_type: impl Into<String>, field: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnknownField {
            fact_type: fact_type.into(),
            field: field.into(),
        })
    }

    /// Creates a missing required field error.
    #[must_use]
    pub fn missing_field(fact_type: impl Into<String>, field: impl Into<String>) -> Self {
        Self::new(ErrorKind::MissingField {
            fact_type: fact_type.into(),
            field: field.into(),
        })
    }

    /// Creates a type mismatch error.
    #[must_use]
    pub fn type_mismatch(expected: Type, actual: Type) -> Self {
        Self::new(ErrorKind::TypeMismatch { expected, actual })
    }

    /// Creates an error for an ordering operator applied to an
    /// unordered field type.
    #[must_use]
    pub fn unordered_type(op: impl Into<String>, ty: Type) -> Self {
        Self::new(ErrorKind::UnorderedType { op: op.into(), ty })
    }

    /// Creates an unbound variable error.
    #[must_use]
    pub fn unbound_variable(variable: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnboundVariable(variable.into()))
    }

    /// Creates an error for a rule declared without patterns.
    #[must_use]
    pub fn empty_rule(rule: impl Into<String>) -> Self {
        Self::new(ErrorKind::EmptyRule(rule.into()))
    }

    /// Creates a duplicate binding error.
    #[must_use]
    pub fn duplicate_binding(variable: impl Into<String>) -> Self {
        Self::new(ErrorKind::DuplicateBinding(variable.into()))
    }

    /// Creates an unknown fact error.
    #[must_use]
    pub fn unknown_fact(id: FactId) -> Self {
        Self::new(ErrorKind::UnknownFact(id))
    }

    /// Creates a reentrancy error for the named operation.
    #[must_use]
    pub fn reentrancy(operation: impl Into<String>) -> Self {
        Self::new(ErrorKind::Reentrancy(operation.into()))
    }

    /// Wraps an error raised by a rule action.
    #[must_use]
    pub fn action_failed(rule: impl Into<String>, source: Error) -> Self {
        let rule = rule.into();
        Self {
            kind: ErrorKind::ActionFailed {
                rule: rule.clone(),
                source: Box::new(source),
            },
            rule: Some(rule),
        }
    }

    /// Creates an internal error (should not happen).
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal(message.into()))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        // ActionFailed already names its rule
        if !matches!(self.kind, ErrorKind::ActionFailed { .. }) {
            if let Some(rule) = &self.rule {
                write!(f, " (in rule {rule})")?;
            }
        }
        Ok(())
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// Fact type is not registered.
    #[error("unknown fact type: {0}")]
    UnknownFactType(String),

    /// Fact type registered twice.
    #[error("fact type already registered: {0}")]
    DuplicateFactType(String),

    /// Pattern or fact references a field the schema does not declare.
    #[error("unknown field: {field} on {fact_type}")]
    UnknownField {
        /// The fact type that was queried.
        fact_type: String,
        /// The field name that was not found.
        field: String,
    },

    /// Required field absent when building a fact.
    #[error("missing field: {field} on {fact_type}")]
    MissingField {
        /// The fact type being built.
        fact_type: String,
        /// The absent field.
        field: String,
    },

    /// Value type does not match the declared field type.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        /// The declared type.
        expected: Type,
        /// The actual type encountered.
        actual: Type,
    },

    /// Ordering operator applied to a type without a total order.
    #[error("operator {op} requires an ordered type, got {ty}")]
    UnorderedType {
        /// The offending operator.
        op: String,
        /// The unordered field type.
        ty: Type,
    },

    /// Pattern test references a variable no earlier pattern binds.
    #[error("unbound variable: ?{0}")]
    UnboundVariable(String),

    /// Variable bound twice within a single pattern.
    #[error("variable ?{0} bound twice in one pattern")]
    DuplicateBinding(String),

    /// Rule declared with no patterns.
    #[error("rule {0} has no patterns")]
    EmptyRule(String),

    /// Retraction of an id not present in working memory.
    #[error("unknown fact: {0}")]
    UnknownFact(FactId),

    /// Operation invoked while the engine is running.
    #[error("{0} is not allowed while the engine is running")]
    Reentrancy(String),

    /// A rule action returned an error; the run was aborted.
    #[error("action of rule {rule} failed: {source}")]
    ActionFailed {
        /// The rule whose action failed.
        rule: String,
        /// The error the action returned.
        #[source]
        source: Box<Error>,
    },

    /// Internal error (should not happen).
    #[error("internal error: {0}")]
    Internal(String),
}
