//! # error.rs
//!
//! Error types returned by literal parsing, expression evaluation and
//! variable collection.
//!
//! Every error aborts only the call that produced it; nothing here is fatal
//! to the host process and nothing is retried.

use crate::functions::FunctionKind;

/// Error raised when a text cannot be read as a complex literal.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    /// The literal is empty after removing whitespace.
    #[error("empty complex literal")]
    Empty,

    /// A real or imaginary component is not a decimal number.
    #[error("invalid numeric component `{0}`")]
    InvalidComponent(String),

    /// The literal mixes a real and an imaginary part without a usable sign
    /// between them.
    #[error("no real/imaginary split point in `{0}`")]
    MissingSplit(String),
}

/// Error raised by [`ExpressionParser::evaluate`](crate::ExpressionParser::evaluate).
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid complex literal: {0}")]
    InvalidFormat(#[from] FormatError),

    #[error("division by zero")]
    DivisionByZero,

    #[error("unclosed parenthesis opened at {position}")]
    UnclosedParenthesis { position: usize },

    #[error("unknown variable `{name}`")]
    UnknownVariable { name: String },

    #[error("function `{function}` requires a real argument, got {argument}")]
    ComplexArgumentUnsupported { function: FunctionKind, argument: String },

    #[error("exponent must be a real number, got {exponent}")]
    ComplexExponentUnsupported { exponent: String },

    #[error("`{function}` is undefined for {argument}")]
    DomainError { function: FunctionKind, argument: String },

    /// An operand was expected at `position` but `text` is not a numeral.
    #[error("expected a number at {position}, found `{text}`")]
    NumberFormatError { position: usize, text: String },

    #[error("unexpected input `{rest}` at {position}")]
    TrailingInputError { position: usize, rest: String },

    #[error("expression nested deeper than {limit} levels")]
    NestingTooDeep { limit: usize },
}

/// Error raised while collecting variable values from a prompt.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum BindingError {
    /// The prompt for `name` was cancelled or left blank.
    #[error("no value supplied for `{name}`")]
    Cancelled { name: String },

    #[error("invalid value for `{name}`: {source}")]
    InvalidValue {
        name: String,
        #[source]
        source: FormatError,
    },
}
