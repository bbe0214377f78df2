//! vsopc-util — foundation types shared by every compiler phase.
//!
//! Nothing in this crate knows about VSOP syntax or semantics; it
//! only provides the plumbing every phase needs: source locations
//! ([`span`]), string interning ([`symbol`]), diagnostic reporting
//! ([`diagnostic`]), and typed index vectors ([`index_vec`]).

pub mod diagnostic;
pub mod error;
pub mod index_vec;
pub mod span;
pub mod symbol;

pub use diagnostic::{Diagnostic, Handler, Phase};
pub use index_vec::{Idx, IndexVec};
pub use span::{FileId, SourceMap, Span};
pub use symbol::Symbol;

pub use rustc_hash::FxHashMap;
pub use rustc_hash::FxHashSet;
