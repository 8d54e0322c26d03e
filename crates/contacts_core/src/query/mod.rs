//! Filter expression compiler.
//!
//! # Responsibility
//! - Turn an untrusted filter string into a typed, bounded [`Predicate`].
//! - Reject malformed input, unknown fields and type-mismatched comparisons.
//!
//! # Invariants
//! - Input is interpreted by a fixed grammar only; nothing is evaluated as
//!   host code or forwarded verbatim to storage.
//! - Input length, nesting depth and term count are bounded.
//!
//! # Grammar
//! ```text
//! expr    := and ( ("OR" | "||") and )*
//! and     := unary ( ("AND" | "&&") unary )*
//! unary   := ("NOT" | "!") unary | primary
//! primary := "(" expr ")"
//!          | field op literal
//!          | field "." ("Contains" | "StartsWith" | "EndsWith") "(" string ")"
//! op      := "==" | "=" | "!=" | "<>" | "<" | "<=" | ">" | ">="
//! ```

mod lexer;
mod parser;
pub mod predicate;

use std::error::Error;
use std::fmt::{Display, Formatter};

pub use predicate::{Comparison, Expr, Predicate, SqlFilter, SqlParam, TextField, TextMethod};

/// Maximum accepted expression size in bytes.
pub const MAX_EXPRESSION_LEN: usize = 4096;
/// Maximum nesting of parentheses and `NOT`.
pub const MAX_NESTING_DEPTH: usize = 64;
/// Maximum number of field comparisons in one expression.
pub const MAX_TERMS: usize = 256;

/// Rejected filter expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    Empty,
    TooLong {
        len: usize,
        max: usize,
    },
    TooDeep {
        max: usize,
    },
    TooManyTerms {
        max: usize,
    },
    UnexpectedChar {
        ch: char,
        offset: usize,
    },
    UnterminatedString {
        offset: usize,
    },
    InvalidEscape {
        ch: char,
        offset: usize,
    },
    InvalidNumber {
        text: String,
        offset: usize,
    },
    UnexpectedToken {
        expected: &'static str,
        found: String,
        offset: usize,
    },
    UnknownField {
        name: String,
        offset: usize,
    },
    UnknownMethod {
        name: String,
        offset: usize,
    },
    TypeMismatch {
        field: &'static str,
        reason: String,
        offset: usize,
    },
}

impl Display for CompileError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "filter expression is empty"),
            Self::TooLong { len, max } => {
                write!(f, "filter expression is {len} bytes; max is {max}")
            }
            Self::TooDeep { max } => write!(f, "filter expression nests deeper than {max}"),
            Self::TooManyTerms { max } => {
                write!(f, "filter expression has more than {max} comparisons")
            }
            Self::UnexpectedChar { ch, offset } => {
                write!(f, "unexpected character `{ch}` at {offset}")
            }
            Self::UnterminatedString { offset } => {
                write!(f, "unterminated string starting at {offset}")
            }
            Self::InvalidEscape { ch, offset } => {
                write!(f, "invalid escape `\\{ch}` at {offset}")
            }
            Self::InvalidNumber { text, offset } => {
                write!(f, "invalid integer literal `{text}` at {offset}")
            }
            Self::UnexpectedToken {
                expected,
                found,
                offset,
            } => write!(f, "expected {expected} at {offset}, found {found}"),
            Self::UnknownField { name, offset } => {
                write!(f, "unknown field `{name}` at {offset}")
            }
            Self::UnknownMethod { name, offset } => {
                write!(f, "unknown method `{name}` at {offset}")
            }
            Self::TypeMismatch {
                field,
                reason,
                offset,
            } => write!(f, "type mismatch on `{field}` at {offset}: {reason}"),
        }
    }
}

impl Error for CompileError {}

/// Compiles a filter expression into a [`Predicate`].
///
/// # Errors
/// - Blank or oversized input.
/// - Lexical or syntax errors, including trailing input.
/// - Unknown fields or methods.
/// - Relational comparison on a string field, string/integer mismatches.
pub fn compile(expression: &str) -> Result<Predicate, CompileError> {
    if expression.len() > MAX_EXPRESSION_LEN {
        return Err(CompileError::TooLong {
            len: expression.len(),
            max: MAX_EXPRESSION_LEN,
        });
    }
    if expression.trim().is_empty() {
        return Err(CompileError::Empty);
    }

    let tokens = lexer::tokenize(expression)?;
    let root = parser::Parser::new(tokens).parse()?;
    Ok(Predicate::new(expression, root))
}
