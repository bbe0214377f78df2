//! Error types for the plumbing this crate provides.
//!
//! Phase crates each define their own error enum; this one only
//! covers failures that can occur inside `vsopc-util` itself.

use thiserror::Error;

use crate::span::FileId;

#[derive(Debug, Error)]
pub enum SourceMapError {
    #[error("no such file id: {0:?}")]
    UnknownFile(FileId),

    #[error("failed to read source file {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, SourceMapError>;
