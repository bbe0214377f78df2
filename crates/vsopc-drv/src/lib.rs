//! Pipeline orchestration for the `vsopc` driver (spec §5/§6): read one
//! source file, run it lex → parse → check → lower → codegen in strict
//! sequence, and stop wherever `-lex`/`-parse`/`-check`/`-llvm` asks —
//! or hand a native object file to the linker when no stop flag is given.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use thiserror::Error;
use vsopc_util::{Diagnostic, Handler, Phase, SourceMap};

/// `vsopc [-ext] [-lex|-parse|-check|-llvm] [-o <file>] [--verbose] <source-file>`
#[derive(Parser, Debug)]
#[command(name = "vsopc", version, about = "VSOP compiler driver")]
pub struct Cli {
    /// Accept the `.vsopext` extended-syntax dialect instead of `.vsop`.
    #[arg(long = "ext")]
    pub ext: bool,

    #[arg(long = "lex", conflicts_with_all = ["parse", "check", "llvm"])]
    pub lex: bool,

    #[arg(long = "parse", conflicts_with_all = ["lex", "check", "llvm"])]
    pub parse: bool,

    #[arg(long = "check", conflicts_with_all = ["lex", "parse", "llvm"])]
    pub check: bool,

    #[arg(long = "llvm", conflicts_with_all = ["lex", "parse", "check"])]
    pub llvm: bool,

    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    #[arg(long)]
    pub verbose: bool,

    pub source: PathBuf,
}

impl Cli {
    fn stop_at(&self) -> StopAt {
        if self.lex {
            StopAt::Lex
        } else if self.parse {
            StopAt::Parse
        } else if self.check {
            StopAt::Check
        } else if self.llvm {
            StopAt::Llvm
        } else {
            StopAt::None
        }
    }

    fn output_path(&self) -> PathBuf {
        self.output.clone().unwrap_or_else(|| PathBuf::from("a.out"))
    }
}

/// Parses `argv`, wires up logging, and runs the pipeline. Returns the
/// process exit code the caller should use.
pub fn run() -> Result<(), DriverError> {
    let cli = Cli::parse();
    if cli.verbose {
        let _ = tracing_subscriber::fmt().with_env_filter(tracing_subscriber::EnvFilter::from_default_env()).try_init();
    }
    let session = Session::new(cli.ext, cli.stop_at(), cli.output_path(), cli.verbose);
    session.run(&cli.source)
}

/// Which phase to stop after and dump, mirroring the CLI's mutually
/// exclusive `{-lex,-parse,-check,-llvm}` group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopAt {
    Lex,
    Parse,
    Check,
    Llvm,
    None,
}

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("invalid source file: expected a `.{expected}` extension")]
    BadExtension { expected: &'static str },

    #[error("source file not found: {path}")]
    MissingFile { path: PathBuf },

    #[error("failed to read {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },

    #[error("{0}")]
    Diagnostics(String),

    #[error(transparent)]
    CodeGen(#[from] vsopc_codegen::CodeGenError),

    #[error("could not locate the vsopc runtime archive next to the driver binary")]
    MissingRuntime,
}

pub struct Session {
    pub ext: bool,
    pub stop_at: StopAt,
    pub output: PathBuf,
    pub verbose: bool,
}

impl Session {
    pub fn new(ext: bool, stop_at: StopAt, output: PathBuf, verbose: bool) -> Self {
        Self { ext, stop_at, output, verbose }
    }

    pub fn run(&self, source_path: &Path) -> Result<(), DriverError> {
        self.check_extension(source_path)?;
        if !source_path.is_file() {
            return Err(DriverError::MissingFile { path: source_path.to_path_buf() });
        }
        let content = fs::read_to_string(source_path)
            .map_err(|source| DriverError::Io { path: source_path.to_path_buf(), source })?;

        let mut sources = SourceMap::new();
        let file = sources.add_file(source_path, content.clone());

        if self.verbose {
            tracing::info!(file = %source_path.display(), "lexing");
        }
        let mut handler = Handler::new();
        let mut lexer = vsopc_lex::Lexer::new(file, &content, self.ext);
        let tokens = lexer.tokenize(&mut handler);
        if handler.has_errors() {
            return Err(self.render_all(handler.diagnostics(), source_path));
        }
        if self.stop_at == StopAt::Lex {
            print!("{}", vsopc_lex::dump(&tokens));
            return Ok(());
        }

        if self.verbose {
            tracing::info!("parsing");
        }
        let mut program = vsopc_par::parse(&tokens, file, self.ext).map_err(|e| {
            let diag = Diagnostic::new(Phase::Syntax, format!("unexpected token \"{}\"", e.token), e.span);
            self.render_all(std::slice::from_ref(&diag), source_path)
        })?;
        if self.stop_at == StopAt::Parse {
            println!("{}", vsopc_par::dump_program(&program, false));
            return Ok(());
        }

        if self.verbose {
            tracing::info!("semantic analysis");
        }
        let table = vsopc_sem::check(&mut program, file)
            .map_err(|diag| self.render_all(std::slice::from_ref(&diag), source_path))?;
        if self.stop_at == StopAt::Check {
            println!("{}", vsopc_par::dump_program(&program, true));
            return Ok(());
        }

        if self.verbose {
            tracing::info!("lowering to IR");
        }
        let ir = vsopc_ir::lower(&program, &table);
        let module_name = source_path.file_stem().and_then(|s| s.to_str()).unwrap_or("vsop_module").to_string();

        if self.stop_at == StopAt::Llvm {
            let text = vsopc_codegen::dump_llvm_ir(&ir, &module_name)?;
            print!("{text}");
            return Ok(());
        }

        if self.verbose {
            tracing::info!("code generation");
        }
        let object_path = self.output.with_extension("o");
        vsopc_codegen::emit_object_file(&ir, &module_name, &object_path)?;

        if self.verbose {
            tracing::info!("linking");
        }
        let runtime_archive = locate_runtime_archive()?;
        let linker = vsopc_codegen::Linker::new();
        let link_result = linker.link(&object_path, &runtime_archive, &self.output);
        let _ = fs::remove_file(&object_path);
        link_result.map_err(DriverError::from)
    }

    fn check_extension(&self, path: &Path) -> Result<(), DriverError> {
        let expected = if self.ext { "vsopext" } else { "vsop" };
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext == expected => Ok(()),
            _ => Err(DriverError::BadExtension { expected }),
        }
    }

    fn render_all(&self, diagnostics: &[Diagnostic], path: &Path) -> DriverError {
        let lines: Vec<String> = diagnostics.iter().map(|d| d.render(path)).collect();
        DriverError::Diagnostics(lines.join("\n"))
    }
}

/// The runtime archive is built as a workspace sibling and lands in
/// the same target directory as this binary; look for it there
/// rather than assuming a fixed install layout.
fn locate_runtime_archive() -> Result<PathBuf, DriverError> {
    let exe = std::env::current_exe().map_err(|source| DriverError::Io { path: PathBuf::from("<current exe>"), source })?;
    let dir = exe.parent().ok_or(DriverError::MissingRuntime)?;
    for candidate in ["libvsopc_runtime.a", "libvsopc_runtime.lib"] {
        let path = dir.join(candidate);
        if path.is_file() {
            return Ok(path);
        }
    }
    Err(DriverError::MissingRuntime)
}
