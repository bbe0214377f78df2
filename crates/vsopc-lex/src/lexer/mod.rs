mod comment;
pub mod identifier;
mod number;
mod operator;
mod string;

use vsopc_util::diagnostic::{Diagnostic, Phase};
use vsopc_util::span::{FileId, Span};
use vsopc_util::{Handler, Symbol};

use crate::cursor::Cursor;
use crate::token::{Token, TokenKind};
use comment::CommentState;

/// Scans a whole source file into a token stream.
///
/// Comments are handled as an exclusive sub-state (§4.1): while one
/// is open, every other production is suppressed except the tokens
/// that can close it. The lexer never aborts on an error — it records
/// a diagnostic and keeps scanning, so a single run can surface every
/// lexical problem in the file instead of just the first.
pub struct Lexer<'a> {
    cursor: Cursor<'a>,
    file: FileId,
    ext: bool,
    comments: CommentState,
}

impl<'a> Lexer<'a> {
    pub fn new(file: FileId, source: &'a str, ext: bool) -> Self {
        Self { cursor: Cursor::new(source), file, ext, comments: CommentState::new() }
    }

    /// Scans the entire file, reporting every lexical error to
    /// `handler`, and returns the resulting token stream (terminated
    /// by a single `Eof` token).
    pub fn tokenize(&mut self, handler: &mut Handler) -> Vec<Token> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token(handler) {
            tokens.push(token);
        }
        let eof_span = self.point_span();
        tokens.push(Token::new(TokenKind::Eof, eof_span));
        tokens
    }

    fn point_span(&self) -> Span {
        Span::point(self.file, self.cursor.offset() as u32, self.cursor.line(), self.cursor.column())
    }

    fn emit(&self, handler: &mut Handler, message: impl Into<String>, span: Span) {
        handler.emit(Diagnostic::new(Phase::Lexical, message, span));
    }

    fn next_token(&mut self, handler: &mut Handler) -> Option<Token> {
        loop {
            if self.cursor.is_eof() {
                if let Some((line, column)) = self.comments.outermost_open() {
                    let span = Span::new(self.file, 0, 0, line, column);
                    self.emit(handler, "comment not terminated before end of file", span);
                }
                return None;
            }

            if self.comments.in_multi_line() {
                self.advance_multi_line_comment();
                continue;
            }
            if self.comments.in_single_line() {
                self.advance_single_line_comment();
                continue;
            }

            if self.cursor.starts_with("//") {
                self.cursor.bump();
                self.cursor.bump();
                self.comments.enter_single_line();
                continue;
            }
            if self.cursor.starts_with("(*") {
                let line = self.cursor.line();
                let column = self.cursor.column();
                self.cursor.bump();
                self.cursor.bump();
                self.comments.push_multi_line(line, column);
                continue;
            }
            if self.cursor.starts_with("*)") {
                let span = self.point_span();
                self.cursor.bump();
                self.cursor.bump();
                self.emit(handler, "no corresponding opened comment", span);
                continue;
            }

            let byte = self.cursor.peek().unwrap();
            match byte {
                b' ' | b'\r' | b'\t' | 0x0c | b'\n' => {
                    self.cursor.bump();
                    continue;
                }
                b'0'..=b'9' => return Some(self.lex_number(handler)),
                b'a'..=b'z' => return Some(self.lex_lower_identifier()),
                b'A'..=b'Z' => return Some(self.lex_upper_identifier()),
                b'"' => {
                    if let Some(tok) = self.lex_string(handler) {
                        return Some(tok);
                    }
                    continue;
                }
                _ => {
                    let line = self.cursor.line();
                    let column = self.cursor.column();
                    let start = self.cursor.offset();
                    if let Some(kind) = operator::scan(&mut self.cursor, self.ext) {
                        let span =
                            Span::new(self.file, start as u32, self.cursor.offset() as u32, line, column);
                        return Some(Token::new(kind, span));
                    }
                    let span = self.point_span();
                    let ch = byte as char;
                    self.cursor.bump();
                    self.emit(handler, format!("invalid character '{}'", ch), span);
                    continue;
                }
            }
        }
    }

    fn advance_multi_line_comment(&mut self) {
        if self.cursor.starts_with("(*") {
            let line = self.cursor.line();
            let column = self.cursor.column();
            self.cursor.bump();
            self.cursor.bump();
            self.comments.push_multi_line(line, column);
        } else if self.cursor.starts_with("*)") {
            self.cursor.bump();
            self.cursor.bump();
            self.comments.pop_multi_line();
        } else {
            self.cursor.bump();
        }
    }

    fn advance_single_line_comment(&mut self) {
        if self.cursor.peek() == Some(b'\n') {
            self.cursor.bump();
            self.comments.exit_single_line();
        } else {
            self.cursor.bump();
        }
    }

    fn lex_number(&mut self, handler: &mut Handler) -> Token {
        let line = self.cursor.line();
        let column = self.cursor.column();
        let start = self.cursor.offset();
        let (text, result) = number::scan(&mut self.cursor);
        let span = Span::new(self.file, start as u32, self.cursor.offset() as u32, line, column);
        match result {
            Ok(value) => Token::new(TokenKind::IntegerLiteral(value), span),
            Err(_) => {
                self.emit(handler, format!("invalid integer literal '{}'", text), span);
                Token::new(TokenKind::IntegerLiteral(0), span)
            }
        }
    }

    fn lex_lower_identifier(&mut self) -> Token {
        let line = self.cursor.line();
        let column = self.cursor.column();
        let start = self.cursor.offset();
        while let Some(b) = self.cursor.peek() {
            if identifier::is_ident_continue(b) {
                self.cursor.bump();
            } else {
                break;
            }
        }
        let end = self.cursor.offset();
        let text = std::str::from_utf8(self.cursor.slice(start, end)).unwrap();
        let span = Span::new(self.file, start as u32, end as u32, line, column);
        let kind = identifier::keyword(text, self.ext)
            .unwrap_or_else(|| TokenKind::ObjectIdentifier(Symbol::intern(text)));
        Token::new(kind, span)
    }

    fn lex_upper_identifier(&mut self) -> Token {
        let line = self.cursor.line();
        let column = self.cursor.column();
        let start = self.cursor.offset();
        while let Some(b) = self.cursor.peek() {
            if identifier::is_ident_continue(b) {
                self.cursor.bump();
            } else {
                break;
            }
        }
        let end = self.cursor.offset();
        let text = std::str::from_utf8(self.cursor.slice(start, end)).unwrap();
        let span = Span::new(self.file, start as u32, end as u32, line, column);
        Token::new(TokenKind::TypeIdentifier(Symbol::intern(text)), span)
    }

    fn lex_string(&mut self, handler: &mut Handler) -> Option<Token> {
        let line = self.cursor.line();
        let column = self.cursor.column();
        let start = self.cursor.offset();
        let raw = string::scan_raw(&mut self.cursor);
        let span = Span::new(self.file, start as u32, self.cursor.offset() as u32, line, column);

        if !raw.terminated {
            self.emit(handler, "string non terminated before end of file", span);
            return None;
        }

        match string::process(&raw.text) {
            Ok(value) => Some(Token::new(TokenKind::StringLiteral(value), span)),
            Err(string::StringError::LineFeed(_)) => {
                self.emit(handler, "string contains a line feed", span);
                None
            }
            Err(string::StringError::NulByte(_)) => {
                self.emit(handler, "string contains a null character", span);
                None
            }
            Err(string::StringError::UnknownEscape(_)) => {
                self.emit(handler, "unknown escaped sequence in string", span);
                None
            }
        }
    }
}
