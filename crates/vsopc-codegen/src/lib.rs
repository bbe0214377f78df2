//! Lowered IR to LLVM IR (spec §4.4/§6), plus the two ways the driver
//! consumes it: a textual `-llvm` dump, or a native object file handed
//! to [`Linker`] to produce an executable.

mod backend;
pub mod error;
mod linker;
mod types;

pub use backend::Backend;
pub use error::{CodeGenError, Result};
pub use linker::Linker;

use std::path::Path;

use inkwell::context::Context;

/// Renders the module's LLVM IR as text, runtime declarations first.
pub fn dump_llvm_ir(ir: &vsopc_ir::Module, module_name: &str) -> Result<String> {
    let context = Context::create();
    let backend = Backend::compile(&context, module_name, ir);
    backend.verify()?;
    Ok(backend.print_to_string())
}

/// Compiles the module straight to a native object file at `path`.
pub fn emit_object_file(ir: &vsopc_ir::Module, module_name: &str, path: &Path) -> Result<()> {
    let context = Context::create();
    let backend = Backend::compile(&context, module_name, ir);
    backend.verify()?;
    backend.write_object_file(path)
}
