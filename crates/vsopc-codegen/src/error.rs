//! Code generation and toolchain errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodeGenError {
    #[error("LLVM verification failed: {0}")]
    VerificationFailed(String),

    #[error("failed to write object file {path}: {source}")]
    ObjectWrite { path: String, source: std::io::Error },

    #[error("external assembler/linker `{command}` exited with status {status}")]
    ToolchainFailed { command: String, status: i32 },

    #[error("failed to invoke external toolchain `{command}`: {source}")]
    ToolchainSpawn { command: String, source: std::io::Error },

    #[error("no target machine available for the host triple")]
    NoTargetMachine,
}

pub type Result<T> = std::result::Result<T, CodeGenError>;
