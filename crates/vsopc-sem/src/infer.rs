//! Type synthesis (spec §4.3): one rule per [`ExprKind`] variant,
//! each annotating its node's `resolved_type` as a side effect.

use vsopc_par::ast::{BinOpKind, Expr, ExprKind, TypeName, UnOp};
use vsopc_util::Symbol;

use crate::class_table::{ClassId, ClassTable};
use crate::error::{Diagnosed, Result, SemError};
use crate::scope::{Frame, ScopeStack};

fn class_id(table: &ClassTable, ty: TypeName) -> Option<ClassId> {
    match ty {
        TypeName::Class(name) => table.lookup(name),
        _ => None,
    }
}

/// `value <: target`, where class types compare via the inheritance
/// chain and every other type must match exactly.
pub fn conforms(table: &ClassTable, value: TypeName, target: TypeName) -> bool {
    if value == target {
        return true;
    }
    match (class_id(table, value), class_id(table, target)) {
        (Some(a), Some(b)) => table.is_subtype(a, b),
        _ => false,
    }
}

fn mismatch(expected: TypeName, found: TypeName, span: vsopc_util::Span) -> Diagnosed {
    Diagnosed {
        error: SemError::TypeMismatch { expected: expected.to_string(), found: found.to_string() },
        span,
    }
}

fn fields_lookup<'a>(table: &'a ClassTable) -> impl Fn(ClassId, Symbol) -> Option<TypeName> + 'a {
    move |class_id, name| table.get(class_id).find_field(name).map(|f| f.ty)
}

/// Synthesizes `e`'s type, recording it on `e.resolved_type`.
pub fn infer(table: &ClassTable, stack: &mut ScopeStack, e: &mut Expr) -> Result<TypeName> {
    let ty = infer_kind(table, stack, &mut e.kind, e.span)?;
    e.resolved_type = Some(ty);
    Ok(ty)
}

fn infer_kind(table: &ClassTable, stack: &mut ScopeStack, kind: &mut ExprKind, span: vsopc_util::Span) -> Result<TypeName> {
    match kind {
        ExprKind::UnitLit => Ok(TypeName::Unit),
        ExprKind::BoolLit(_) => Ok(TypeName::Bool),
        ExprKind::IntLit(_) => Ok(TypeName::Int32),
        ExprKind::StrLit(_) => Ok(TypeName::String),

        ExprKind::SelfRef => stack
            .enclosing_class()
            .map(|id| TypeName::Class(table.get(id).name))
            .ok_or_else(|| Diagnosed { error: SemError::UnboundName("self".to_string()), span }),

        ExprKind::ObjectId(name) => stack
            .resolve(*name, fields_lookup(table))
            .ok_or_else(|| Diagnosed { error: SemError::UnboundName(name.to_string()), span }),

        ExprKind::New { ty } => match table.lookup(*ty) {
            Some(_) => Ok(TypeName::Class(*ty)),
            None => Err(Diagnosed { error: SemError::UndeclaredType(ty.to_string()), span }),
        },

        ExprKind::Block(exprs) => {
            let mut last = TypeName::Unit;
            for e in exprs {
                last = infer(table, stack, e)?;
            }
            Ok(last)
        }

        ExprKind::If { cond, then_branch, else_branch } => {
            let cond_ty = infer(table, stack, cond)?;
            if cond_ty != TypeName::Bool {
                return Err(mismatch(TypeName::Bool, cond_ty, cond.span));
            }
            let then_ty = infer(table, stack, then_branch)?;
            match else_branch {
                None => Ok(TypeName::Unit),
                Some(else_expr) => {
                    let else_ty = infer(table, stack, else_expr)?;
                    join(table, then_ty, else_ty, span)
                }
            }
        }

        ExprKind::While { cond, body } => {
            let cond_ty = infer(table, stack, cond)?;
            if cond_ty != TypeName::Bool {
                return Err(mismatch(TypeName::Bool, cond_ty, cond.span));
            }
            infer(table, stack, body)?;
            Ok(TypeName::Unit)
        }

        ExprKind::Let { name, ty, init, scope } => {
            if let Some(init_expr) = init {
                let init_ty = infer(table, stack, init_expr)?;
                if !conforms(table, init_ty, *ty) {
                    return Err(mismatch(*ty, init_ty, init_expr.span));
                }
            }
            if let TypeName::Class(class_name) = ty {
                if table.lookup(*class_name).is_none() {
                    return Err(Diagnosed { error: SemError::UndeclaredType(class_name.to_string()), span });
                }
            }
            stack.push(Frame::Let { name: *name, ty: *ty });
            let result = infer(table, stack, scope);
            stack.pop();
            result
        }

        ExprKind::Assign { name, value } => {
            if name.as_str() == "self" {
                return Err(Diagnosed { error: SemError::SelfAssignment, span });
            }
            let declared = stack
                .resolve(*name, fields_lookup(table))
                .ok_or_else(|| Diagnosed { error: SemError::UnboundName(name.to_string()), span })?;
            let value_ty = infer(table, stack, value)?;
            if !conforms(table, value_ty, declared) {
                return Err(mismatch(declared, value_ty, value.span));
            }
            Ok(declared)
        }

        ExprKind::UnOp { op, operand } => {
            let operand_ty = infer(table, stack, operand)?;
            match op {
                UnOp::Not => {
                    if operand_ty != TypeName::Bool {
                        return Err(mismatch(TypeName::Bool, operand_ty, operand.span));
                    }
                    Ok(TypeName::Bool)
                }
                UnOp::Neg => {
                    if operand_ty != TypeName::Int32 {
                        return Err(mismatch(TypeName::Int32, operand_ty, operand.span));
                    }
                    Ok(TypeName::Int32)
                }
                UnOp::IsNull => {
                    if class_id(table, operand_ty).is_none() {
                        return Err(Diagnosed { error: SemError::IsnullOnPrimitive(operand_ty.to_string()), span });
                    }
                    Ok(TypeName::Bool)
                }
            }
        }

        ExprKind::BinOp { op, lhs, rhs } => infer_binop(table, stack, *op, lhs, rhs, span),

        ExprKind::Call { receiver, method, args } => {
            let receiver_ty = infer(table, stack, receiver)?;
            let class_id = class_id(table, receiver_ty)
                .ok_or_else(|| Diagnosed { error: SemError::NotAClass(receiver_ty.to_string()), span })?;
            let method_info = table
                .get(class_id)
                .find_method(*method)
                .cloned()
                .ok_or_else(|| Diagnosed {
                    error: SemError::UnknownMethod(receiver_ty.to_string(), method.to_string()),
                    span,
                })?;
            if args.len() != method_info.formals.len() {
                return Err(Diagnosed {
                    error: SemError::WrongArity {
                        method: method.to_string(),
                        expected: method_info.formals.len(),
                        found: args.len(),
                    },
                    span,
                });
            }
            for (arg, (_, formal_ty)) in args.iter_mut().zip(&method_info.formals) {
                let arg_ty = infer(table, stack, arg)?;
                if !conforms(table, arg_ty, *formal_ty) {
                    return Err(mismatch(*formal_ty, arg_ty, arg.span));
                }
            }
            Ok(method_info.ret_type)
        }
    }
}

/// Join used by `if`/`else` with mismatched branch types: the LUB when
/// both sides are class types, a hard type error otherwise.
fn join(table: &ClassTable, a: TypeName, b: TypeName, span: vsopc_util::Span) -> Result<TypeName> {
    if a == b {
        return Ok(a);
    }
    match (class_id(table, a), class_id(table, b)) {
        (Some(ca), Some(cb)) => Ok(TypeName::Class(table.get(table.lub(ca, cb)).name)),
        _ => Err(mismatch(a, b, span)),
    }
}

fn infer_binop(
    table: &ClassTable,
    stack: &mut ScopeStack,
    op: BinOpKind,
    lhs: &mut Expr,
    rhs: &mut Expr,
    span: vsopc_util::Span,
) -> Result<TypeName> {
    match op {
        BinOpKind::And | BinOpKind::Or => {
            let lhs_ty = infer(table, stack, lhs)?;
            if lhs_ty != TypeName::Bool {
                return Err(mismatch(TypeName::Bool, lhs_ty, lhs.span));
            }
            let rhs_ty = infer(table, stack, rhs)?;
            if rhs_ty != TypeName::Bool {
                return Err(mismatch(TypeName::Bool, rhs_ty, rhs.span));
            }
            Ok(TypeName::Bool)
        }
        BinOpKind::Eq => {
            let lhs_ty = infer(table, stack, lhs)?;
            let rhs_ty = infer(table, stack, rhs)?;
            let both_classes = class_id(table, lhs_ty).is_some() && class_id(table, rhs_ty).is_some();
            if lhs_ty != rhs_ty && !both_classes {
                return Err(mismatch(lhs_ty, rhs_ty, span));
            }
            Ok(TypeName::Bool)
        }
        BinOpKind::Lt | BinOpKind::Le | BinOpKind::Gt | BinOpKind::Ge => {
            let lhs_ty = infer(table, stack, lhs)?;
            if lhs_ty != TypeName::Int32 {
                return Err(mismatch(TypeName::Int32, lhs_ty, lhs.span));
            }
            let rhs_ty = infer(table, stack, rhs)?;
            if rhs_ty != TypeName::Int32 {
                return Err(mismatch(TypeName::Int32, rhs_ty, rhs.span));
            }
            Ok(TypeName::Bool)
        }
        BinOpKind::Add | BinOpKind::Sub | BinOpKind::Mul | BinOpKind::Div | BinOpKind::Pow => {
            let lhs_ty = infer(table, stack, lhs)?;
            if lhs_ty != TypeName::Int32 {
                return Err(mismatch(TypeName::Int32, lhs_ty, lhs.span));
            }
            let rhs_ty = infer(table, stack, rhs)?;
            if rhs_ty != TypeName::Int32 {
                return Err(mismatch(TypeName::Int32, rhs_ty, rhs.span));
            }
            Ok(TypeName::Int32)
        }
    }
}
