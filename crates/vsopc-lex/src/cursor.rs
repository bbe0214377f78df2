//! Byte-at-a-time cursor over the source buffer.
//!
//! The lexer works on raw ASCII bytes rather than `char`s (VSOP
//! source is specified as ASCII text), tracking line/column
//! incrementally as it advances rather than recomputing them from
//! offsets on every token.

pub struct Cursor<'a> {
    bytes: &'a [u8],
    offset: usize,
    line: u32,
    column: u32,
}

impl<'a> Cursor<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { bytes: source.as_bytes(), offset: 0, line: 1, column: 1 }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn column(&self) -> u32 {
        self.column
    }

    pub fn is_eof(&self) -> bool {
        self.offset >= self.bytes.len()
    }

    pub fn peek(&self) -> Option<u8> {
        self.bytes.get(self.offset).copied()
    }

    pub fn peek_at(&self, ahead: usize) -> Option<u8> {
        self.bytes.get(self.offset + ahead).copied()
    }

    pub fn starts_with(&self, s: &str) -> bool {
        self.bytes[self.offset..].starts_with(s.as_bytes())
    }

    /// Advances one byte, updating line/column bookkeeping.
    pub fn bump(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.offset += 1;
        if byte == b'\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(byte)
    }

    pub fn slice(&self, start: usize, end: usize) -> &'a [u8] {
        &self.bytes[start..end]
    }
}
