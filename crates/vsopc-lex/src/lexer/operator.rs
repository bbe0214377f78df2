//! Punctuation matching.
//!
//! Two-character operators are tried before their one-character
//! prefixes (`<=` and `<-` before `<`), matching the priority order
//! the lexical grammar specifies.

use crate::cursor::Cursor;
use crate::token::TokenKind;

/// Tries to match a punctuation token at the cursor's current
/// position. Consumes the matched bytes and returns the kind, or
/// leaves the cursor untouched and returns `None`.
pub fn scan(cursor: &mut Cursor, ext: bool) -> Option<TokenKind> {
    use TokenKind::*;

    if ext && cursor.starts_with(">=") {
        cursor.bump();
        cursor.bump();
        return Some(GreaterEqual);
    }
    if ext && cursor.peek() == Some(b'>') {
        cursor.bump();
        return Some(Greater);
    }
    if cursor.starts_with("<=") {
        cursor.bump();
        cursor.bump();
        return Some(LowerEqual);
    }
    if cursor.starts_with("<-") {
        cursor.bump();
        cursor.bump();
        return Some(Assign);
    }

    let kind = match cursor.peek()? {
        b'{' => LBrace,
        b'}' => RBrace,
        b'(' => LPar,
        b')' => RPar,
        b':' => Colon,
        b';' => Semicolon,
        b',' => Comma,
        b'+' => Plus,
        b'-' => Minus,
        b'*' => Times,
        b'/' => Div,
        b'^' => Pow,
        b'.' => Dot,
        b'=' => Equal,
        b'<' => Lower,
        _ => return None,
    };
    cursor.bump();
    Some(kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_char_forms_win() {
        let mut cursor = Cursor::new("<=x");
        assert_eq!(scan(&mut cursor, false), Some(TokenKind::LowerEqual));
        assert_eq!(cursor.offset(), 2);
    }

    #[test]
    fn arrow_vs_lower() {
        let mut cursor = Cursor::new("<-x");
        assert_eq!(scan(&mut cursor, false), Some(TokenKind::Assign));
    }

    #[test]
    fn ext_gates_greater() {
        let mut cursor = Cursor::new(">x");
        assert_eq!(scan(&mut cursor, false), None);
        let mut cursor2 = Cursor::new(">x");
        assert_eq!(scan(&mut cursor2, true), Some(TokenKind::Greater));
    }
}
