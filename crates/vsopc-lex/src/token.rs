//! Token data model (spec §3).

use vsopc_util::{Span, Symbol};

/// The closed tag set of lexical tokens. Punctuation and keyword
/// variants carry no payload; the three value-bearing kinds do.
#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    // Keywords
    And,
    Bool,
    Class,
    Do,
    Else,
    Extends,
    False,
    If,
    In,
    Int32,
    Isnull,
    Let,
    New,
    Not,
    StringKw,
    Then,
    True,
    Unit,
    While,
    // `-ext` keyword
    Or,

    // Punctuation
    LBrace,
    RBrace,
    LPar,
    RPar,
    Colon,
    Semicolon,
    Comma,
    Plus,
    Minus,
    Times,
    Div,
    Pow,
    Dot,
    Equal,
    Lower,
    LowerEqual,
    Assign,
    // `-ext` punctuation
    Greater,
    GreaterEqual,

    // Value-bearing
    IntegerLiteral(i32),
    StringLiteral(String),
    TypeIdentifier(Symbol),
    ObjectIdentifier(Symbol),

    Eof,
}

impl TokenKind {
    /// The dash-cased name used by the `-lex` dump (spec §6), e.g.
    /// `integer-literal`, `lower-equal`, `and`.
    pub fn dump_name(&self) -> &'static str {
        use TokenKind::*;
        match self {
            And => "and",
            Bool => "bool",
            Class => "class",
            Do => "do",
            Else => "else",
            Extends => "extends",
            False => "false",
            If => "if",
            In => "in",
            Int32 => "int32",
            Isnull => "isnull",
            Let => "let",
            New => "new",
            Not => "not",
            StringKw => "string",
            Then => "then",
            True => "true",
            Unit => "unit",
            While => "while",
            Or => "or",
            LBrace => "lbrace",
            RBrace => "rbrace",
            LPar => "lpar",
            RPar => "rpar",
            Colon => "colon",
            Semicolon => "semicolon",
            Comma => "comma",
            Plus => "plus",
            Minus => "minus",
            Times => "times",
            Div => "div",
            Pow => "pow",
            Dot => "dot",
            Equal => "equal",
            Lower => "lower",
            LowerEqual => "lower-equal",
            Assign => "assign",
            Greater => "greater",
            GreaterEqual => "greater-equal",
            IntegerLiteral(_) => "integer-literal",
            StringLiteral(_) => "string-literal",
            TypeIdentifier(_) => "type-identifier",
            ObjectIdentifier(_) => "object-identifier",
            Eof => "eof",
        }
    }

    /// The value rendered after the kind in a `-lex` dump line, if any.
    pub fn dump_value(&self) -> Option<String> {
        match self {
            TokenKind::IntegerLiteral(v) => Some(v.to_string()),
            TokenKind::StringLiteral(s) => Some(s.clone()),
            TokenKind::TypeIdentifier(s) | TokenKind::ObjectIdentifier(s) => Some(s.to_string()),
            _ => None,
        }
    }

    /// The literal surface form, used to name the offending token in
    /// a `syntax error: element "V"` message.
    pub fn lexeme(&self) -> String {
        use TokenKind::*;
        match self {
            And => "and".into(),
            Bool => "bool".into(),
            Class => "class".into(),
            Do => "do".into(),
            Else => "else".into(),
            Extends => "extends".into(),
            False => "false".into(),
            If => "if".into(),
            In => "in".into(),
            Int32 => "int32".into(),
            Isnull => "isnull".into(),
            Let => "let".into(),
            New => "new".into(),
            Not => "not".into(),
            StringKw => "string".into(),
            Then => "then".into(),
            True => "true".into(),
            Unit => "unit".into(),
            While => "while".into(),
            Or => "or".into(),
            LBrace => "{".into(),
            RBrace => "}".into(),
            LPar => "(".into(),
            RPar => ")".into(),
            Colon => ":".into(),
            Semicolon => ";".into(),
            Comma => ",".into(),
            Plus => "+".into(),
            Minus => "-".into(),
            Times => "*".into(),
            Div => "/".into(),
            Pow => "^".into(),
            Dot => ".".into(),
            Equal => "=".into(),
            Lower => "<".into(),
            LowerEqual => "<=".into(),
            Assign => "<-".into(),
            Greater => ">".into(),
            GreaterEqual => ">=".into(),
            IntegerLiteral(v) => v.to_string(),
            StringLiteral(s) => s.clone(),
            TypeIdentifier(s) | ObjectIdentifier(s) => s.to_string(),
            Eof => "eof".into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }
}
