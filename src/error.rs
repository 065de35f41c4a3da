//! Error types for parsing and evaluating JMESPath expressions.
//!
//! The taxonomy mirrors the error model of the JMESPath specification: a
//! [`JmespathError`] always carries the original expression text and a byte
//! column so callers can render a caret under the offending token, wrapping
//! an [`ErrorReason`] that distinguishes syntax errors (never suppressible)
//! from runtime errors (suppressible via `Runtime`'s `disable_visit_errors`
//! option).

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

/// Top-level error produced by lexing, parsing, or evaluating an expression.
#[derive(Debug, Clone, Error)]
pub struct JmespathError {
    /// The full source expression being processed when the error occurred.
    pub expression: Arc<str>,
    /// 0-based byte column into `expression` where the error was detected.
    pub column: usize,
    /// The specific kind of failure.
    pub reason: ErrorReason,
}

impl JmespathError {
    pub fn new(expression: impl Into<Arc<str>>, column: usize, reason: ErrorReason) -> Self {
        JmespathError {
            expression: expression.into(),
            column,
            reason,
        }
    }
}

impl fmt::Display for JmespathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (column {} in expression: {:?})",
            self.reason, self.column, self.expression
        )
    }
}

/// The specific kind of failure behind a [`JmespathError`].
#[derive(Debug, Clone, Error)]
pub enum ErrorReason {
    /// The lexer or parser could not consume the input. Never suppressible.
    #[error("syntax error: {0}")]
    Syntax(String),
    /// A runtime (evaluation-time) failure. Suppressible under
    /// `disable_visit_errors`.
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

/// Evaluation-time error kinds. All are suppressible to `Value::Null` when
/// the owning `Runtime` is configured with `disable_visit_errors: true`.
#[derive(Debug, Clone, Error)]
pub enum RuntimeError {
    #[error(
        "invalid arity calling {function}: expected {expected}, got {actual}"
    )]
    InvalidArity {
        function: String,
        expected: String,
        actual: usize,
    },
    #[error(
        "invalid type for argument {position} of {function}: expected {expected}, got {actual}"
    )]
    InvalidType {
        function: String,
        position: usize,
        expected: String,
        actual: String,
    },
    #[error("invalid value: {0}")]
    InvalidValue(String),
    #[error("unknown function: {0}")]
    UnknownFunction(String),
    /// Catch-all raised by the interpreter when it encounters an AST shape
    /// it does not know how to visit (should not occur for ASTs produced by
    /// this crate's own parser, but guards against future node kinds).
    #[error("invalid visit: {0}")]
    InvalidVisit(String),
}

impl RuntimeError {
    /// Whether this runtime error is suppressible under
    /// `disable_visit_errors`. All runtime kinds currently are; this exists
    /// so the policy decision lives in one place rather than being
    /// re-derived at each call site.
    pub fn is_suppressible(&self) -> bool {
        true
    }
}

pub type JmespathResult<T> = Result<T, JmespathError>;
