//! AST data model (spec §3).
//!
//! Every node records the `(line, column)` of the token that started
//! it. `Expr::resolved_type` starts `None` and is filled in by
//! semantic analysis; nothing downstream of the parser is supposed to
//! read it before then.

use vsopc_util::{Span, Symbol};

/// A type reference as written in source, or as resolved onto an
/// expression. Class types are carried by name (`Symbol`) rather than
/// `ClassId` — resolving a name to a class is the semantic analyzer's
/// job, not the parser's.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypeName {
    Unit,
    Bool,
    Int32,
    String,
    Class(Symbol),
}

impl std::fmt::Display for TypeName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TypeName::Unit => write!(f, "unit"),
            TypeName::Bool => write!(f, "bool"),
            TypeName::Int32 => write!(f, "int32"),
            TypeName::String => write!(f, "string"),
            TypeName::Class(name) => write!(f, "{name}"),
        }
    }
}

#[derive(Debug)]
pub struct Program {
    pub classes: Vec<Class>,
}

#[derive(Debug)]
pub struct Class {
    pub name: Symbol,
    pub parent: Symbol,
    pub fields: Vec<Field>,
    pub methods: Vec<Method>,
    pub span: Span,
}

#[derive(Debug)]
pub struct Field {
    pub name: Symbol,
    pub ty: TypeName,
    pub init: Option<Expr>,
    pub span: Span,
}

#[derive(Debug)]
pub struct Method {
    pub name: Symbol,
    pub formals: Vec<Formal>,
    pub ret_type: TypeName,
    pub body: Expr,
    pub span: Span,
}

#[derive(Debug)]
pub struct Formal {
    pub name: Symbol,
    pub ty: TypeName,
    pub span: Span,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnOp {
    Not,
    Neg,
    IsNull,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinOpKind {
    And,
    Or,
    Eq,
    Lt,
    Le,
    Gt,
    Ge,
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl BinOpKind {
    pub fn lexeme(self) -> &'static str {
        match self {
            BinOpKind::And => "and",
            BinOpKind::Or => "or",
            BinOpKind::Eq => "=",
            BinOpKind::Lt => "<",
            BinOpKind::Le => "<=",
            BinOpKind::Gt => ">",
            BinOpKind::Ge => ">=",
            BinOpKind::Add => "+",
            BinOpKind::Sub => "-",
            BinOpKind::Mul => "*",
            BinOpKind::Div => "/",
            BinOpKind::Pow => "^",
        }
    }
}

#[derive(Debug)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
    pub resolved_type: Option<TypeName>,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span, resolved_type: None }
    }
}

#[derive(Debug)]
pub enum ExprKind {
    If { cond: Box<Expr>, then_branch: Box<Expr>, else_branch: Option<Box<Expr>> },
    While { cond: Box<Expr>, body: Box<Expr> },
    Let { name: Symbol, ty: TypeName, init: Option<Box<Expr>>, scope: Box<Expr> },
    Assign { name: Symbol, value: Box<Expr> },
    UnOp { op: UnOp, operand: Box<Expr> },
    BinOp { op: BinOpKind, lhs: Box<Expr>, rhs: Box<Expr> },
    Call { receiver: Box<Expr>, method: Symbol, args: Vec<Expr> },
    New { ty: Symbol },
    SelfRef,
    ObjectId(Symbol),
    IntLit(i32),
    StrLit(String),
    BoolLit(bool),
    UnitLit,
    Block(Vec<Expr>),
}
