//! vsopc-par — AST data model and recursive-descent parser (spec §4.2).

pub mod ast;
pub mod dump;
pub mod error;
mod parser;

pub use dump::{dump_expr, dump_program};
pub use error::ParseError;
pub use parser::parse;
