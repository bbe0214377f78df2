//! Semantic error catalog (spec §7).
//!
//! Each variant renders to the single-sentence message the
//! diagnostic line carries; the analyzer stops at the first one
//! (§5: "parser and semantic analyzer fail fast").

use thiserror::Error;
use vsopc_util::Span;

#[derive(Debug, Error)]
pub enum SemError {
    #[error("class {0} redefines Object")]
    RedefinesObject(String),

    #[error("class {0} is already defined")]
    DuplicateClass(String),

    #[error("class {0} extends undeclared class {1}")]
    MissingParent(String, String),

    #[error("class {0} cannot extend itself")]
    SelfParent(String),

    #[error("cannot extend in a cycle")]
    InheritanceCycle,

    #[error("no class named Main")]
    MissingMain,

    #[error("Main must declare main() : int32 with no formals")]
    MissingMainMethod,

    #[error("field named self is not allowed")]
    SelfField,

    #[error("field {0} is already defined")]
    DuplicateField(String),

    #[error("field {0} shadows a field declared in an ancestor class")]
    ShadowedField(String),

    #[error("method {0} is already defined")]
    DuplicateMethod(String),

    #[error("duplicate formal name {0}")]
    DuplicateFormal(String),

    #[error("type {0} is not declared")]
    UndeclaredType(String),

    #[error("method {0} does not match the signature of its ancestor")]
    OverrideMismatch(String),

    #[error("cannot assign to self")]
    SelfAssignment,

    #[error("unbound name {0}")]
    UnboundName(String),

    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    #[error("{0} is not a class type")]
    NotAClass(String),

    #[error("{0} has no method named {1}")]
    UnknownMethod(String, String),

    #[error("method {method} expects {expected} argument(s), found {found}")]
    WrongArity { method: String, expected: usize, found: usize },

    #[error("isnull applied to non-class type {0}")]
    IsnullOnPrimitive(String),
}

#[derive(Debug)]
pub struct Diagnosed {
    pub error: SemError,
    pub span: Span,
}

pub type Result<T> = std::result::Result<T, Diagnosed>;
