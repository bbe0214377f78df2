//! Recursive-descent parser with a precedence-climbing core for the
//! expression grammar (spec §4.2).
//!
//! `if`/`while`/`let` each start with a unique keyword, so they're
//! dispatched directly from the entry point rather than threaded
//! through the binary-operator ladder; everything else cascades
//! through one function per precedence level, lowest first:
//! assignment, `and`/`or`, `not`, the nonassoc comparisons, `+ -`,
//! `* /`, the unary `isnull`/`-` pair, `^`, then `.`-chained calls.
//! Unary minus has no declared precedence in the grammar table; it's
//! placed alongside `isnull`, binding tighter than the arithmetic
//! operators, which is the reading that makes `-a * b` parse as
//! `(-a) * b` rather than `-(a * b)`.

use vsopc_util::span::{FileId, Span};
use vsopc_util::Symbol;

use crate::ast::*;
use crate::error::{ParseError, Result};
use vsopc_lex::{Token, TokenKind};

pub struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    file: FileId,
    ext: bool,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token], file: FileId, ext: bool) -> Self {
        Self { tokens, pos: 0, file, ext }
    }

    fn current(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn peek_kind(&self, ahead: usize) -> &TokenKind {
        self.tokens.get(self.pos + ahead).map(|t| &t.kind).unwrap_or(&TokenKind::Eof)
    }

    fn bump(&mut self) -> Token {
        let tok = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn error_here(&self) -> ParseError {
        ParseError { token: self.current().kind.lexeme(), span: self.current().span }
    }

    fn expect(&mut self, kind: &TokenKind) -> Result<Token> {
        if std::mem::discriminant(&self.current().kind) == std::mem::discriminant(kind) {
            Ok(self.bump())
        } else {
            Err(self.error_here())
        }
    }

    fn is(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(&self.current().kind) == std::mem::discriminant(kind)
    }

    fn expect_object_id(&mut self) -> Result<(Symbol, Span)> {
        match self.current().kind.clone() {
            TokenKind::ObjectIdentifier(sym) => {
                let span = self.current().span;
                self.bump();
                Ok((sym, span))
            }
            _ => Err(self.error_here()),
        }
    }

    fn expect_type_id(&mut self) -> Result<(Symbol, Span)> {
        match self.current().kind.clone() {
            TokenKind::TypeIdentifier(sym) => {
                let span = self.current().span;
                self.bump();
                Ok((sym, span))
            }
            _ => Err(self.error_here()),
        }
    }

    pub fn parse_program(&mut self) -> Result<Program> {
        let mut classes = Vec::new();
        while !self.is(&TokenKind::Eof) {
            classes.push(self.parse_class()?);
        }
        Ok(Program { classes })
    }

    fn parse_class(&mut self) -> Result<Class> {
        let start = self.expect(&TokenKind::Class)?.span;
        let (name, _) = self.expect_type_id()?;
        let parent = if self.is(&TokenKind::Extends) {
            self.bump();
            self.expect_type_id()?.0
        } else {
            Symbol::intern("Object")
        };
        self.expect(&TokenKind::LBrace)?;
        let mut fields = Vec::new();
        let mut methods = Vec::new();
        while !self.is(&TokenKind::RBrace) {
            if matches!(self.peek_kind(1), TokenKind::LPar) {
                methods.push(self.parse_method()?);
            } else {
                fields.push(self.parse_field()?);
            }
        }
        self.expect(&TokenKind::RBrace)?;
        Ok(Class { name, parent, fields, methods, span: start })
    }

    fn parse_field(&mut self) -> Result<Field> {
        let (name, span) = self.expect_object_id()?;
        self.expect(&TokenKind::Colon)?;
        let ty = self.parse_type()?;
        let init = if self.is(&TokenKind::Assign) {
            self.bump();
            Some(self.parse_expr()?)
        } else {
            None
        };
        self.expect(&TokenKind::Semicolon)?;
        Ok(Field { name, ty, init, span })
    }

    fn parse_method(&mut self) -> Result<Method> {
        let (name, span) = self.expect_object_id()?;
        self.expect(&TokenKind::LPar)?;
        let mut formals = Vec::new();
        if !self.is(&TokenKind::RPar) {
            formals.push(self.parse_formal()?);
            while self.is(&TokenKind::Comma) {
                self.bump();
                formals.push(self.parse_formal()?);
            }
        }
        self.expect(&TokenKind::RPar)?;
        self.expect(&TokenKind::Colon)?;
        let ret_type = self.parse_type()?;
        let body = self.parse_block()?;
        Ok(Method { name, formals, ret_type, body, span })
    }

    fn parse_formal(&mut self) -> Result<Formal> {
        let (name, span) = self.expect_object_id()?;
        self.expect(&TokenKind::Colon)?;
        let ty = self.parse_type()?;
        Ok(Formal { name, ty, span })
    }

    fn parse_type(&mut self) -> Result<TypeName> {
        let ty = match &self.current().kind {
            TokenKind::Int32 => TypeName::Int32,
            TokenKind::Bool => TypeName::Bool,
            TokenKind::StringKw => TypeName::String,
            TokenKind::Unit => TypeName::Unit,
            TokenKind::TypeIdentifier(sym) => TypeName::Class(*sym),
            _ => return Err(self.error_here()),
        };
        self.bump();
        Ok(ty)
    }

    fn parse_block(&mut self) -> Result<Expr> {
        let start = self.expect(&TokenKind::LBrace)?.span;
        let mut exprs = vec![self.parse_expr()?];
        while self.is(&TokenKind::Semicolon) {
            self.bump();
            exprs.push(self.parse_expr()?);
        }
        self.expect(&TokenKind::RBrace)?;
        Ok(Expr::new(ExprKind::Block(exprs), start))
    }

    fn parse_expr(&mut self) -> Result<Expr> {
        match self.current().kind {
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::Let => self.parse_let(),
            _ => self.parse_assign(),
        }
    }

    fn parse_if(&mut self) -> Result<Expr> {
        let start = self.expect(&TokenKind::If)?.span;
        let cond = Box::new(self.parse_expr()?);
        self.expect(&TokenKind::Then)?;
        let then_branch = Box::new(self.parse_expr()?);
        let else_branch = if self.is(&TokenKind::Else) {
            self.bump();
            Some(Box::new(self.parse_expr()?))
        } else {
            None
        };
        Ok(Expr::new(ExprKind::If { cond, then_branch, else_branch }, start))
    }

    fn parse_while(&mut self) -> Result<Expr> {
        let start = self.expect(&TokenKind::While)?.span;
        let cond = Box::new(self.parse_expr()?);
        self.expect(&TokenKind::Do)?;
        let body = Box::new(self.parse_expr()?);
        Ok(Expr::new(ExprKind::While { cond, body }, start))
    }

    fn parse_let(&mut self) -> Result<Expr> {
        let start = self.expect(&TokenKind::Let)?.span;
        let (name, _) = self.expect_object_id()?;
        self.expect(&TokenKind::Colon)?;
        let ty = self.parse_type()?;
        let init = if self.is(&TokenKind::Assign) {
            self.bump();
            Some(Box::new(self.parse_expr()?))
        } else {
            None
        };
        self.expect(&TokenKind::In)?;
        let scope = Box::new(self.parse_expr()?);
        Ok(Expr::new(ExprKind::Let { name, ty, init, scope }, start))
    }

    fn parse_assign(&mut self) -> Result<Expr> {
        if let TokenKind::ObjectIdentifier(sym) = self.current().kind.clone() {
            if matches!(self.peek_kind(1), TokenKind::Assign) {
                let start = self.current().span;
                self.bump();
                self.bump();
                let value = Box::new(self.parse_expr()?);
                return Ok(Expr::new(ExprKind::Assign { name: sym, value }, start));
            }
        }
        self.parse_and_or()
    }

    fn parse_and_or(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_not()?;
        loop {
            let op = match self.current().kind {
                TokenKind::And => BinOpKind::And,
                TokenKind::Or if self.ext => BinOpKind::Or,
                _ => break,
            };
            let span = lhs.span;
            self.bump();
            let rhs = self.parse_not()?;
            lhs = Expr::new(
                ExprKind::BinOp { op, lhs: Box::new(lhs), rhs: Box::new(rhs) },
                span,
            );
        }
        Ok(lhs)
    }

    fn parse_not(&mut self) -> Result<Expr> {
        if self.is(&TokenKind::Not) {
            let start = self.bump().span;
            let operand = Box::new(self.parse_not()?);
            return Ok(Expr::new(ExprKind::UnOp { op: UnOp::Not, operand }, start));
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<Expr> {
        let lhs = self.parse_additive()?;
        let op = match self.current().kind {
            TokenKind::Lower => BinOpKind::Lt,
            TokenKind::LowerEqual => BinOpKind::Le,
            TokenKind::Equal => BinOpKind::Eq,
            TokenKind::Greater if self.ext => BinOpKind::Gt,
            TokenKind::GreaterEqual if self.ext => BinOpKind::Ge,
            _ => return Ok(lhs),
        };
        let span = lhs.span;
        self.bump();
        let rhs = self.parse_additive()?;
        Ok(Expr::new(ExprKind::BinOp { op, lhs: Box::new(lhs), rhs: Box::new(rhs) }, span))
    }

    fn parse_additive(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_multiplicative()?;
        loop {
            let op = match self.current().kind {
                TokenKind::Plus => BinOpKind::Add,
                TokenKind::Minus => BinOpKind::Sub,
                _ => break,
            };
            let span = lhs.span;
            self.bump();
            let rhs = self.parse_multiplicative()?;
            lhs = Expr::new(ExprKind::BinOp { op, lhs: Box::new(lhs), rhs: Box::new(rhs) }, span);
        }
        Ok(lhs)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = match self.current().kind {
                TokenKind::Times => BinOpKind::Mul,
                TokenKind::Div => BinOpKind::Div,
                _ => break,
            };
            let span = lhs.span;
            self.bump();
            let rhs = self.parse_unary()?;
            lhs = Expr::new(ExprKind::BinOp { op, lhs: Box::new(lhs), rhs: Box::new(rhs) }, span);
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Expr> {
        if self.is(&TokenKind::Isnull) {
            let start = self.bump().span;
            let operand = Box::new(self.parse_unary()?);
            return Ok(Expr::new(ExprKind::UnOp { op: UnOp::IsNull, operand }, start));
        }
        if self.is(&TokenKind::Minus) {
            let start = self.bump().span;
            let operand = Box::new(self.parse_unary()?);
            return Ok(Expr::new(ExprKind::UnOp { op: UnOp::Neg, operand }, start));
        }
        self.parse_pow()
    }

    fn parse_pow(&mut self) -> Result<Expr> {
        let lhs = self.parse_call()?;
        if self.is(&TokenKind::Pow) {
            let span = lhs.span;
            self.bump();
            let rhs = self.parse_pow()?;
            return Ok(Expr::new(ExprKind::BinOp { op: BinOpKind::Pow, lhs: Box::new(lhs), rhs: Box::new(rhs) }, span));
        }
        Ok(lhs)
    }

    fn parse_call(&mut self) -> Result<Expr> {
        let mut expr = self.parse_primary()?;
        while self.is(&TokenKind::Dot) {
            let span = expr.span;
            self.bump();
            let (method, _) = self.expect_object_id()?;
            self.expect(&TokenKind::LPar)?;
            let args = self.parse_args()?;
            self.expect(&TokenKind::RPar)?;
            expr = Expr::new(ExprKind::Call { receiver: Box::new(expr), method, args }, span);
        }
        Ok(expr)
    }

    fn parse_args(&mut self) -> Result<Vec<Expr>> {
        let mut args = Vec::new();
        if !self.is(&TokenKind::RPar) {
            args.push(self.parse_expr()?);
            while self.is(&TokenKind::Comma) {
                self.bump();
                args.push(self.parse_expr()?);
            }
        }
        Ok(args)
    }

    fn parse_primary(&mut self) -> Result<Expr> {
        let span = self.current().span;
        match self.current().kind.clone() {
            TokenKind::IntegerLiteral(v) => {
                self.bump();
                Ok(Expr::new(ExprKind::IntLit(v), span))
            }
            TokenKind::StringLiteral(s) => {
                self.bump();
                Ok(Expr::new(ExprKind::StrLit(s), span))
            }
            TokenKind::True => {
                self.bump();
                Ok(Expr::new(ExprKind::BoolLit(true), span))
            }
            TokenKind::False => {
                self.bump();
                Ok(Expr::new(ExprKind::BoolLit(false), span))
            }
            TokenKind::New => {
                self.bump();
                let (ty, _) = self.expect_type_id()?;
                Ok(Expr::new(ExprKind::New { ty }, span))
            }
            TokenKind::LBrace => self.parse_block(),
            TokenKind::LPar => {
                self.bump();
                if self.is(&TokenKind::RPar) {
                    self.bump();
                    return Ok(Expr::new(ExprKind::UnitLit, span));
                }
                let inner = self.parse_expr()?;
                self.expect(&TokenKind::RPar)?;
                Ok(inner)
            }
            TokenKind::ObjectIdentifier(sym) => {
                self.bump();
                if sym.as_str() == "self" {
                    return Ok(Expr::new(ExprKind::SelfRef, span));
                }
                if self.is(&TokenKind::LPar) {
                    self.bump();
                    let args = self.parse_args()?;
                    self.expect(&TokenKind::RPar)?;
                    let receiver = Box::new(Expr::new(ExprKind::SelfRef, span));
                    return Ok(Expr::new(ExprKind::Call { receiver, method: sym, args }, span));
                }
                Ok(Expr::new(ExprKind::ObjectId(sym), span))
            }
            _ => Err(self.error_here()),
        }
    }
}

pub fn parse(tokens: &[Token], file: FileId, ext: bool) -> Result<Program> {
    Parser::new(tokens, file, ext).parse_program()
}

#[cfg(test)]
mod tests {
    use super::*;
    use vsopc_util::Handler;

    fn parse_source(src: &str) -> Result<Program> {
        let mut handler = Handler::new();
        let mut lexer = vsopc_lex::Lexer::new(FileId(0), src, false);
        let tokens = lexer.tokenize(&mut handler);
        assert!(!handler.has_errors());
        parse(&tokens, FileId(0), false)
    }

    #[test]
    fn parses_hello_class() {
        let program = parse_source(r#"class Main { main() : int32 { print("hi"); 0 } }"#).unwrap();
        assert_eq!(program.classes.len(), 1);
        let main = &program.classes[0];
        assert_eq!(main.name.as_str(), "Main");
        assert_eq!(main.parent.as_str(), "Object");
        assert_eq!(main.methods.len(), 1);
    }

    #[test]
    fn bare_call_rewrites_to_self() {
        let program = parse_source("class Main { f() : int32 { 0 } main() : int32 { f() } }").unwrap();
        let main = &program.classes[0];
        let body = &main.methods[1].body;
        if let ExprKind::Block(exprs) = &body.kind {
            if let ExprKind::Call { receiver, method, .. } = &exprs[0].kind {
                assert!(matches!(receiver.kind, ExprKind::SelfRef));
                assert_eq!(method.as_str(), "f");
            } else {
                panic!("expected call");
            }
        } else {
            panic!("expected block");
        }
    }

    #[test]
    fn if_then_else_nests_right() {
        let program =
            parse_source("class Main { main() : int32 { if true then 1 else if false then 2 else 3 } }")
                .unwrap();
        let body = &program.classes[0].methods[0].body;
        if let ExprKind::Block(exprs) = &body.kind {
            assert!(matches!(exprs[0].kind, ExprKind::If { .. }));
        }
    }

    #[test]
    fn syntax_error_reports_offending_token() {
        let mut handler = Handler::new();
        let mut lexer = vsopc_lex::Lexer::new(FileId(0), "class Main { main() : int32 { 1 2 } }", false);
        let tokens = lexer.tokenize(&mut handler);
        let err = parse(&tokens, FileId(0), false).unwrap_err();
        assert_eq!(err.token, "2");
    }

    #[test]
    fn ext_or_and_comparison_parse() {
        let program = parse_source_ext(
            "class Main { main() : int32 { if (true or false) and not (1 > 2) then 1 else 0 } }",
        );
        assert_eq!(program.classes[0].methods[0].name.as_str(), "main");
    }

    fn parse_source_ext(src: &str) -> Program {
        let mut handler = Handler::new();
        let mut lexer = vsopc_lex::Lexer::new(FileId(0), src, true);
        let tokens = lexer.tokenize(&mut handler);
        assert!(!handler.has_errors());
        parse(&tokens, FileId(0), true).unwrap()
    }
}
