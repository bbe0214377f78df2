//! Invokes the host's C compiler driver as the assembler/linker,
//! turning one compiled object file plus the runtime archive into a
//! native executable.

use std::path::Path;
use std::process::Command;

use crate::error::{CodeGenError, Result};

pub struct Linker {
    command: String,
}

impl Linker {
    pub fn new() -> Self {
        Self { command: std::env::var("VSOPC_CC").unwrap_or_else(|_| "cc".to_string()) }
    }

    pub fn link(&self, object_path: &Path, runtime_archive: &Path, output_path: &Path) -> Result<()> {
        let status = Command::new(&self.command)
            .arg(object_path)
            .arg(runtime_archive)
            .arg("-lm")
            .arg("-o")
            .arg(output_path)
            .status()
            .map_err(|source| CodeGenError::ToolchainSpawn { command: self.command.clone(), source })?;

        if status.success() {
            Ok(())
        } else {
            Err(CodeGenError::ToolchainFailed { command: self.command.clone(), status: status.code().unwrap_or(-1) })
        }
    }
}

impl Default for Linker {
    fn default() -> Self {
        Self::new()
    }
}
