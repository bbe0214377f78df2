//! Hex/decimal integer literal scanning.
//!
//! The lexical grammar is deliberately permissive about what counts
//! as the *lexeme* — `(0x|[0-9])[0-9a-zA-Z]*` swallows malformed
//! literals like `0xGG` or `123abc` whole, so they can be reported as
//! one "invalid integer literal" error rather than splitting into a
//! number token followed by a stray identifier.

use crate::cursor::Cursor;
use crate::error::LexError;

/// Scans one integer lexeme starting at the cursor's current
/// position (which must be on `0x` or an ASCII digit) and attempts to
/// parse it. Returns the raw lexeme text (for diagnostics) alongside
/// the parse result. Literals that don't fit in 32 bits are rejected
/// here, at lex time, rather than silently wrapping.
pub fn scan(cursor: &mut Cursor) -> (String, Result<i32, LexError>) {
    let start = cursor.offset();
    let is_hex = cursor.starts_with("0x");
    if is_hex {
        cursor.bump();
        cursor.bump();
    }
    while let Some(b) = cursor.peek() {
        if b.is_ascii_alphanumeric() {
            cursor.bump();
        } else {
            break;
        }
    }
    let end = cursor.offset();
    let text = String::from_utf8_lossy(cursor.slice(start, end)).into_owned();

    let result = if is_hex {
        let body = &text[2..];
        if body.is_empty() {
            Err(LexError::InvalidInteger(text.clone()))
        } else {
            match i64::from_str_radix(body, 16) {
                Ok(v) if (0..=i32::MAX as i64).contains(&v) => Ok(v as i32),
                _ => Err(LexError::InvalidInteger(text.clone())),
            }
        }
    } else if text.bytes().all(|b| b.is_ascii_digit()) {
        match text.parse::<i64>() {
            Ok(v) if v <= i32::MAX as i64 => Ok(v as i32),
            _ => Err(LexError::InvalidInteger(text.clone())),
        }
    } else {
        Err(LexError::InvalidInteger(text.clone()))
    };

    (text, result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan_str(s: &str) -> (String, Result<i32, LexError>) {
        let mut cursor = Cursor::new(s);
        scan(&mut cursor)
    }

    #[test]
    fn decimal() {
        assert_eq!(scan_str("42").1, Ok(42));
    }

    #[test]
    fn hex() {
        assert_eq!(scan_str("0xABCDEF").1, Ok(0xABCDEF));
    }

    #[test]
    fn bad_hex() {
        assert!(scan_str("0xGG").1.is_err());
    }

    #[test]
    fn trailing_letters() {
        assert!(scan_str("123abc").1.is_err());
    }
}
