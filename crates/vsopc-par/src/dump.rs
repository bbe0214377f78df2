//! Bracket-notation AST dump (spec §6: `-parse` and, with types
//! printed, `-check`).

use crate::ast::*;

pub fn dump_program(program: &Program, show_types: bool) -> String {
    let classes: Vec<String> = program.classes.iter().map(|c| dump_class(c, show_types)).collect();
    format!("[{}]", classes.join(", "))
}

fn dump_class(class: &Class, show_types: bool) -> String {
    let fields: Vec<String> = class.fields.iter().map(|f| dump_field(f, show_types)).collect();
    let methods: Vec<String> = class.methods.iter().map(|m| dump_method(m, show_types)).collect();
    format!(
        "Class({}, {}, [{}], [{}])",
        class.name,
        class.parent,
        fields.join(", "),
        methods.join(", ")
    )
}

fn dump_field(field: &Field, show_types: bool) -> String {
    match &field.init {
        Some(init) => format!("Field({}, {}, {})", field.name, field.ty, dump_expr(init, show_types)),
        None => format!("Field({}, {})", field.name, field.ty),
    }
}

fn dump_method(method: &Method, show_types: bool) -> String {
    let formals: Vec<String> = method.formals.iter().map(|f| format!("{}: {}", f.name, f.ty)).collect();
    format!(
        "Method({}, [{}], {}, {})",
        method.name,
        formals.join(", "),
        method.ret_type,
        dump_expr(&method.body, show_types)
    )
}

pub fn dump_expr(expr: &Expr, show_types: bool) -> String {
    let base = match &expr.kind {
        ExprKind::If { cond, then_branch, else_branch } => match else_branch {
            Some(e) => format!(
                "If({}, {}, {})",
                dump_expr(cond, show_types),
                dump_expr(then_branch, show_types),
                dump_expr(e, show_types)
            ),
            None => format!("If({}, {})", dump_expr(cond, show_types), dump_expr(then_branch, show_types)),
        },
        ExprKind::While { cond, body } => {
            format!("While({}, {})", dump_expr(cond, show_types), dump_expr(body, show_types))
        }
        ExprKind::Let { name, ty, init, scope } => match init {
            Some(i) => format!(
                "Let({}, {}, {}, {})",
                name,
                ty,
                dump_expr(i, show_types),
                dump_expr(scope, show_types)
            ),
            None => format!("Let({}, {}, {})", name, ty, dump_expr(scope, show_types)),
        },
        ExprKind::Assign { name, value } => format!("Assign({}, {})", name, dump_expr(value, show_types)),
        ExprKind::UnOp { op, operand } => {
            let op_name = match op {
                UnOp::Not => "not",
                UnOp::Neg => "-",
                UnOp::IsNull => "isnull",
            };
            format!("UnOp({}, {})", op_name, dump_expr(operand, show_types))
        }
        ExprKind::BinOp { op, lhs, rhs } => {
            format!("BinOp({}, {}, {})", op.lexeme(), dump_expr(lhs, show_types), dump_expr(rhs, show_types))
        }
        ExprKind::Call { receiver, method, args } => {
            let args: Vec<String> = args.iter().map(|a| dump_expr(a, show_types)).collect();
            format!("Call({}, {}, [{}])", dump_expr(receiver, show_types), method, args.join(", "))
        }
        ExprKind::New { ty } => format!("New({})", ty),
        ExprKind::SelfRef => "self".to_string(),
        ExprKind::ObjectId(name) => name.to_string(),
        ExprKind::IntLit(v) => v.to_string(),
        ExprKind::StrLit(s) => s.clone(),
        ExprKind::BoolLit(b) => b.to_string(),
        ExprKind::UnitLit => "()".to_string(),
        ExprKind::Block(exprs) => {
            let parts: Vec<String> = exprs.iter().map(|e| dump_expr(e, show_types)).collect();
            format!("[{}]", parts.join(", "))
        }
    };
    if show_types {
        match &expr.resolved_type {
            Some(ty) => format!("{base}: {ty}"),
            None => format!("{base}: ?"),
        }
    } else {
        base
    }
}
