//! vsopc-lex — the scoped, context-sensitive VSOP lexer.
//!
//! Turns a source buffer into a token stream, handling nested
//! comments and escape-and-byte-range-aware string literals
//! internally. Diagnostics accumulate rather than aborting the scan,
//! so a single invocation can surface every lexical error in a file.

pub mod cursor;
pub mod error;
pub mod lexer;
pub mod token;

pub use lexer::Lexer;
pub use token::{Token, TokenKind};

/// Renders a token stream in the `-lex` dump format (spec §6): one
/// `<line>,<col>,<kind>[,<value>]` line per token, omitting the
/// trailing `Eof` marker which has no on-screen representation.
pub fn dump(tokens: &[Token]) -> String {
    let mut out = String::new();
    for token in tokens {
        if token.kind == TokenKind::Eof {
            continue;
        }
        out.push_str(&token.span.line.to_string());
        out.push(',');
        out.push_str(&token.span.column.to_string());
        out.push(',');
        out.push_str(token.kind.dump_name());
        if let Some(value) = token.kind.dump_value() {
            out.push(',');
            out.push_str(&value);
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use vsopc_util::{FileId, Handler};

    fn lex(source: &str) -> (Vec<Token>, Handler) {
        let mut handler = Handler::new();
        let mut lexer = Lexer::new(FileId(0), source, false);
        let tokens = lexer.tokenize(&mut handler);
        (tokens, handler)
    }

    #[test]
    fn lexes_keywords_and_identifiers() {
        let (tokens, handler) = lex("class Main extends Object {}");
        assert!(!handler.has_errors());
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind.dump_name()).collect();
        assert_eq!(
            kinds,
            vec!["class", "type-identifier", "extends", "type-identifier", "lbrace", "rbrace", "eof"]
        );
    }

    #[test]
    fn integer_literal_dump() {
        let (tokens, _) = lex("42");
        assert_eq!(tokens[0].kind, TokenKind::IntegerLiteral(42));
        assert_eq!(tokens[0].span.line, 1);
        assert_eq!(tokens[0].span.column, 1);
    }

    #[test]
    fn nested_comments_are_skipped() {
        let (tokens, handler) = lex("(* outer (* inner *) still *) 1");
        assert!(!handler.has_errors());
        assert_eq!(tokens[0].kind, TokenKind::IntegerLiteral(1));
    }

    #[test]
    fn unclosed_comment_reports_opening_location() {
        let (_, handler) = lex("(* never closed");
        assert!(handler.has_errors());
        assert_eq!(handler.diagnostics()[0].span.column, 1);
    }

    #[test]
    fn unmatched_close_is_an_error() {
        let (_, handler) = lex("*)");
        assert!(handler.has_errors());
    }

    #[test]
    fn single_line_comment_ends_at_newline() {
        let (tokens, handler) = lex("// comment\n1");
        assert!(!handler.has_errors());
        assert_eq!(tokens[0].kind, TokenKind::IntegerLiteral(1));
        assert_eq!(tokens[0].span.line, 2);
    }

    #[test]
    fn string_literal_is_processed() {
        let (tokens, handler) = lex("\"a\\\"b\"");
        assert!(!handler.has_errors());
        assert_eq!(tokens[0].kind, TokenKind::StringLiteral("\"a\\x22b\"".to_string()));
    }

    #[test]
    fn unterminated_string_reports_error() {
        let (tokens, handler) = lex("\"abc");
        assert!(handler.has_errors());
        assert_eq!(tokens[0].kind, TokenKind::Eof);
    }

    #[test]
    fn invalid_character_reports_and_continues() {
        let (tokens, handler) = lex("1 # 2");
        assert!(handler.has_errors());
        assert_eq!(tokens[0].kind, TokenKind::IntegerLiteral(1));
        assert_eq!(tokens[1].kind, TokenKind::IntegerLiteral(2));
    }

    #[test]
    fn ext_recognizes_or_and_comparison() {
        let mut handler = Handler::new();
        let mut lexer = Lexer::new(FileId(0), "a or b >= c", true);
        let tokens = lexer.tokenize(&mut handler);
        assert!(!handler.has_errors());
        assert_eq!(tokens[1].kind, TokenKind::Or);
        assert_eq!(tokens[3].kind, TokenKind::GreaterEqual);
    }
}
