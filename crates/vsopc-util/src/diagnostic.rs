//! Diagnostic reporting.
//!
//! Every phase reports errors the same way: `file:line:col: <phase>
//! error: message`. There is only one severity — VSOP has no warnings
//! — so [`Diagnostic`] carries just enough to render that one line.

use std::fmt;
use std::path::Path;

use crate::span::Span;

/// Which compiler phase raised a diagnostic. Formats exactly as the
/// word the message line needs (`lexical`, `syntax`, `semantic`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Lexical,
    Syntax,
    Semantic,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::Lexical => "lexical",
            Phase::Syntax => "syntax",
            Phase::Semantic => "semantic",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub phase: Phase,
    pub message: String,
    pub span: Span,
}

impl Diagnostic {
    pub fn new(phase: Phase, message: impl Into<String>, span: Span) -> Self {
        Self { phase, message: message.into(), span }
    }

    /// Renders the full `file:line:col: phase error: message` line
    /// given the path of the file the span belongs to.
    pub fn render(&self, file: &Path) -> String {
        format!(
            "{}:{}:{}: {} error: {}",
            file.display(),
            self.span.line,
            self.span.column,
            self.phase,
            self.message
        )
    }
}

/// Accumulates diagnostics for a compilation run.
///
/// The lexer keeps scanning after an error (so a single run can
/// report several lexical errors); the parser and semantic analyzer
/// stop at the first one. Both styles go through the same `Handler`.
#[derive(Default)]
pub struct Handler {
    diagnostics: Vec<Diagnostic>,
}

impl Handler {
    pub fn new() -> Self {
        Self { diagnostics: Vec::new() }
    }

    pub fn emit(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn first(&self) -> Option<&Diagnostic> {
        self.diagnostics.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::FileId;
    use std::path::Path;

    #[test]
    fn renders_expected_format() {
        let span = Span::new(FileId(0), 0, 1, 3, 7);
        let diag = Diagnostic::new(Phase::Lexical, "unknown character 'é'", span);
        assert_eq!(
            diag.render(Path::new("foo.vsop")),
            "foo.vsop:3:7: lexical error: unknown character 'é'"
        );
    }

    #[test]
    fn handler_accumulates() {
        let mut handler = Handler::new();
        assert!(!handler.has_errors());
        handler.emit(Diagnostic::new(Phase::Syntax, "unexpected token", Span::DUMMY));
        assert!(handler.has_errors());
        assert_eq!(handler.diagnostics().len(), 1);
    }
}
