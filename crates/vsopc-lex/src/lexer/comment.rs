//! Comment state machine.
//!
//! `(* ... *)` nests (tracked by a stack of opening locations, so an
//! unclosed comment is reported at the *outermost* opening); `//`
//! comments don't nest, so they collapse to a single flag.

#[derive(Default)]
pub struct CommentState {
    /// `(line, column)` of each currently-open `(*`.
    multi_line: Vec<(u32, u32)>,
    in_single_line: bool,
}

impl CommentState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_comment(&self) -> bool {
        !self.multi_line.is_empty() || self.in_single_line
    }

    pub fn enter_single_line(&mut self) {
        self.in_single_line = true;
    }

    pub fn exit_single_line(&mut self) {
        self.in_single_line = false;
    }

    pub fn in_single_line(&self) -> bool {
        self.in_single_line
    }

    pub fn push_multi_line(&mut self, line: u32, column: u32) {
        self.multi_line.push((line, column));
    }

    /// Pops the innermost open `(*`. Returns `None` if none was open.
    pub fn pop_multi_line(&mut self) -> Option<(u32, u32)> {
        self.multi_line.pop()
    }

    pub fn in_multi_line(&self) -> bool {
        !self.multi_line.is_empty()
    }

    /// The location of the outermost still-open `(*`, used to report
    /// "unclosed comment" if EOF is reached inside one.
    pub fn outermost_open(&self) -> Option<(u32, u32)> {
        self.multi_line.first().copied()
    }
}
