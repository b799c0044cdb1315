use crate::lang::Stack;
use crate::lang::stack::PREVIEW_LIMIT;
use thiserror::Error;

/// What went wrong, independent of where.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeErrorKind {
    /// A primitive found its operands but they had the wrong kind, or an
    /// index was out of range.
    #[error("shape mismatch in `{op}`: {message}")]
    ShapeMismatch { op: &'static str, message: String },

    /// `=` reached a native or a definition.
    #[error("cannot compare {left} with {right}")]
    IncomparableValues { left: String, right: String },

    #[error("arithmetic failure in `{op}`: {message}")]
    ArithmeticFailure { op: &'static str, message: String },

    /// Raised on purpose by `croak`.
    #[error("croak: {0}")]
    Croak(String),

    #[error("execution step limit exceeded ({0})")]
    StepLimit(usize),

    /// A quotation would nest deeper than the configured limit.
    #[error("nesting limit exceeded in `{op}` ({limit} levels)")]
    NestingLimit { op: &'static str, limit: usize },

    #[error("{what} size limit exceeded ({limit})")]
    StackLimit { what: &'static str, limit: usize },
}

/// A fatal evaluation failure together with a preview of the value stack at
/// the point it happened.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("runtime error: {kind}\n  stack: {stack}")]
pub struct RuntimeError {
    pub kind: RuntimeErrorKind,
    pub stack: String,
}

impl RuntimeError {
    pub fn new(kind: RuntimeErrorKind, stack: &Stack) -> Self {
        RuntimeError {
            kind,
            stack: stack.preview(PREVIEW_LIMIT),
        }
    }
}

pub fn type_error(op: &'static str, expected: &str, got: &crate::lang::Expr) -> RuntimeErrorKind {
    RuntimeErrorKind::ShapeMismatch {
        op,
        message: format!("expected {}, got {} {}", expected, got.kind(), got),
    }
}

pub fn index_out_of_bounds(op: &'static str, index: i64, len: usize) -> RuntimeErrorKind {
    RuntimeErrorKind::ShapeMismatch {
        op,
        message: format!("index {} out of range for length {}", index, len),
    }
}

pub fn division_by_zero(op: &'static str) -> RuntimeErrorKind {
    RuntimeErrorKind::ArithmeticFailure {
        op,
        message: "division by zero".to_string(),
    }
}

pub fn overflow(op: &'static str, a: i64, b: i64) -> RuntimeErrorKind {
    RuntimeErrorKind::ArithmeticFailure {
        op,
        message: format!("integer overflow on {} {} {}", a, b, op),
    }
}
