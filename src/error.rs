//! Contains the single error type that can occur anywhere in the interpreter.

use thiserror::Error;

/// Every error the interpreter can raise. There is no recoverable-vs-fatal
/// distinction: the first error aborts evaluation and is surfaced to the
/// caller with its message; any output produced before it is discarded.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LispError {
    /// A symbol had no binding in any enclosing environment frame.
    #[error("Unknown symbol: {0}")]
    UnknownSymbol(String),

    /// A `"..."` literal ran off the end of the source without a closing quote.
    #[error("Unterminated string literal")]
    UnterminatedString,

    /// A list form was never closed before the token stream ran out.
    #[error("Missing closing parenthesis")]
    MissingCloseParen,

    /// A `)` appeared with no matching open paren in scope.
    #[error("Unexpected closing parenthesis")]
    UnexpectedCloseParen,

    /// The reader expected another form but the token stream was empty.
    #[error("Unexpected EOF")]
    UnexpectedEof,

    /// The operator position of a call evaluated to something uncallable.
    #[error("Not a procedure: {0}")]
    NotAProcedure(String),

    /// A special form or builtin was given the wrong shape of arguments.
    #[error("{op}: Expected {expected}")]
    Arity { op: String, expected: String },

    /// A builtin received an argument of the wrong kind, or an out-of-range index.
    #[error("{0}")]
    Type(String),

    /// An error raised while a builtin's own `call` was running, attributed
    /// to the procedure that raised it.
    #[error("Error in procedure {op}: {source}")]
    InProcedure { op: String, source: Box<LispError> },

    /// `read-line` was called without a host-supplied input provider.
    #[error("read-line: no input provider configured")]
    NoInputProvider,
}

impl LispError {
    /// Build an [`LispError::Arity`] for a special form or builtin named `op`.
    pub fn arity(op: impl Into<String>, expected: impl Into<String>) -> Self {
        LispError::Arity {
            op: op.into(),
            expected: expected.into(),
        }
    }

    /// Build a plain [`LispError::Type`] message, without an operator prefix
    /// (the caller attributes it to a procedure via [`LispError::in_procedure`]).
    pub fn type_error(message: impl Into<String>) -> Self {
        LispError::Type(message.into())
    }

    /// Attribute `source` to the procedure named `op`, unless it is already
    /// attributed to one (avoids re-wrapping errors that bubble up through
    /// nested builtin calls such as `funcall`/`mapcar`/`eval`).
    pub fn in_procedure(op: impl Into<String>, source: LispError) -> Self {
        match source {
            already @ LispError::InProcedure { .. } => already,
            other => LispError::InProcedure {
                op: op.into(),
                source: Box::new(other),
            },
        }
    }
}
