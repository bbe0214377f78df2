//! Internal error type for the lexer.
//!
//! Lexical errors don't abort the scan (§5: the lexer accumulates and
//! keeps going), so most of the time a bad token is reported straight
//! to the [`vsopc_util::Handler`] and scanning resumes. This type
//! exists for the few helpers (number parsing) that need a typed
//! `Result` internally before that happens.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LexError {
    #[error("invalid integer literal '{0}'")]
    InvalidInteger(String),
}
