//! Parser error type.
//!
//! The grammar aborts at the first syntax error (§5/§7), so there is
//! only ever one to report: a single typed result, not an
//! accumulator like the lexer's.

use thiserror::Error;
use vsopc_util::Span;

#[derive(Debug, Error)]
#[error("syntax error: element \"{token}\"")]
pub struct ParseError {
    pub token: String,
    pub span: Span,
}

pub type Result<T> = std::result::Result<T, ParseError>;
