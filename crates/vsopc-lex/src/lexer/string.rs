//! String literal scanning and bit-exact escape processing.
//!
//! Two steps: [`scan_raw`] finds the extent of the literal (honoring
//! `\"` so an escaped quote doesn't terminate it early), then
//! [`process`] runs the seven-step normalization over the matched
//! text, quotes included, in the exact order the reference lexer
//! applies them — continuation removal has to happen before the raw
//! newline check, and the two-character escapes have to be expanded
//! to `\xHH` form before the final byte-range sweep, or `"a\<newline>
//! b"` would be rejected instead of collapsing to `"ab"`.

use crate::cursor::Cursor;

pub struct RawString {
    /// The matched text, quotes included.
    pub text: String,
    pub terminated: bool,
}

/// Consumes from just after the opening `"` (which the caller has
/// already bumped past is NOT assumed — this scans from the quote
/// itself) to the closing `"`, or EOF.
pub fn scan_raw(cursor: &mut Cursor) -> RawString {
    let mut text = String::new();
    text.push(cursor.bump().expect("caller positioned on opening quote") as char);
    loop {
        match cursor.peek() {
            None => return RawString { text, terminated: false },
            Some(b'"') => {
                text.push(cursor.bump().unwrap() as char);
                return RawString { text, terminated: true };
            }
            Some(b'\\') => {
                text.push(cursor.bump().unwrap() as char);
                if let Some(_escaped) = cursor.peek() {
                    text.push(cursor.bump().unwrap() as char);
                }
            }
            Some(_) => {
                text.push(cursor.bump().unwrap() as char);
            }
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum StringError {
    /// A raw line feed survived continuation removal, at this byte
    /// offset into the (continuation-stripped) text.
    LineFeed(usize),
    /// A raw or escaped NUL byte, at this offset.
    NulByte(usize),
    /// `\` followed by something other than a recognized escape or
    /// `x` + two hex digits, at this offset.
    UnknownEscape(usize),
}

/// Runs the seven-step normalization over `text` (quotes included).
pub fn process(text: &str) -> Result<String, StringError> {
    let step2 = remove_continuations(text);

    if let Some(pos) = step2.find('\n') {
        return Err(StringError::LineFeed(pos));
    }
    if let Some(pos) = step2.find('\0') {
        return Err(StringError::NulByte(pos));
    }

    let step5 = expand_named_escapes(&step2);
    let step6 = escape_non_printable(&step5);
    resolve_hex_escapes(&step6)
}

/// Step 2: `\<newline>[\t\x08\r ]*` and bare `\<newline>` collapse to
/// nothing.
fn remove_continuations(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' && bytes.get(i + 1) == Some(&b'\n') {
            i += 2;
            while matches!(bytes.get(i), Some(b'\t') | Some(0x08) | Some(b'\r') | Some(b' ')) {
                i += 1;
            }
        } else {
            out.push(bytes[i] as char);
            i += 1;
        }
    }
    out
}

/// Step 5: the six named two-character escapes become four-character
/// `\xHH` text, so the rest of the pipeline only has to deal with one
/// escape shape.
fn expand_named_escapes(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' {
            if let Some(&next) = bytes.get(i + 1) {
                let hex = match next {
                    b'"' => Some("\\x22"),
                    b'\\' => Some("\\x5c"),
                    b'b' => Some("\\x08"),
                    b't' => Some("\\x09"),
                    b'n' => Some("\\x0a"),
                    b'r' => Some("\\x0d"),
                    _ => None,
                };
                if let Some(hex) = hex {
                    out.push_str(hex);
                    i += 2;
                    continue;
                }
            }
        }
        out.push(bytes[i] as char);
        i += 1;
    }
    out
}

/// Step 6: any remaining byte outside `[32, 126]` becomes `\xHH`.
fn escape_non_printable(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for &b in text.as_bytes() {
        if (32..=126).contains(&b) {
            out.push(b as char);
        } else {
            out.push_str(&format!("\\x{:02x}", b));
        }
    }
    out
}

/// Step 7: walk `\x` escapes; printable results other than the quote
/// and backslash sentinels collapse back to the literal character.
/// Anything else (a bad hex pair, `\x00`, or `\` not followed by `x`)
/// is an error.
fn resolve_hex_escapes(text: &str) -> Result<String, StringError> {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' {
            if bytes.get(i + 1) == Some(&b'x') {
                let hex = bytes
                    .get(i + 2..i + 4)
                    .and_then(|h| std::str::from_utf8(h).ok())
                    .and_then(|h| u8::from_str_radix(h, 16).ok());
                match hex {
                    Some(0) => return Err(StringError::NulByte(i)),
                    Some(byte) if (32..=126).contains(&byte) && byte != 0x22 && byte != 0x5c => {
                        out.push(byte as char);
                        i += 4;
                    }
                    Some(_) => {
                        out.push_str(&text[i..i + 4]);
                        i += 4;
                    }
                    None => return Err(StringError::UnknownEscape(i)),
                }
            } else {
                return Err(StringError::UnknownEscape(i));
            }
        } else {
            out.push(bytes[i] as char);
            i += 1;
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_string_unchanged() {
        assert_eq!(process("\"hi\"").unwrap(), "\"hi\"");
    }

    #[test]
    fn escaped_quote_round_trips_length() {
        let result = process("\"a\\\"b\"").unwrap();
        assert_eq!(result, "\"a\\x22b\"");
    }

    #[test]
    fn continuation_collapses() {
        let result = process("\"a\\\n  b\"").unwrap();
        assert_eq!(result, "\"ab\"");
    }

    #[test]
    fn raw_newline_is_error() {
        assert!(matches!(process("\"a\nb\""), Err(StringError::LineFeed(_))));
    }

    #[test]
    fn unknown_escape_is_error() {
        assert!(matches!(process("\"\\q\""), Err(StringError::UnknownEscape(_))));
    }

    #[test]
    fn null_escape_is_error() {
        assert!(matches!(process("\"\\x00\""), Err(StringError::NulByte(_))));
    }
}
