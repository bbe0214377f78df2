//! Pass B: member and body validation (spec §4.3 steps 5-8), walked
//! in the topological order [`crate::pass_a::topological_order`]
//! produces so every class sees its parent's finished member list.

use vsopc_par::ast::{Class, Program, TypeName};
use vsopc_util::Symbol;

use crate::class_table::{ClassId, ClassTable, FieldInfo, MethodInfo};
use crate::error::{Diagnosed, Result, SemError};
use crate::infer::{conforms, infer};
use crate::scope::{Frame, ScopeStack};

fn check_declared(table: &ClassTable, ty: TypeName, span: vsopc_util::Span) -> Result<()> {
    if let TypeName::Class(name) = ty {
        if table.lookup(name).is_none() {
            return Err(Diagnosed { error: SemError::UndeclaredType(name.to_string()), span });
        }
    }
    Ok(())
}

fn signatures_match(a: &MethodInfo, b: &[(Symbol, TypeName)], ret: TypeName) -> bool {
    a.ret_type == ret
        && a.formals.len() == b.len()
        && a.formals.iter().zip(b).all(|((_, at), (_, bt))| at == bt)
}

/// Builds `id`'s combined field/method lists from its AST declaration
/// plus its (already finished) parent, validating every rule along
/// the way, then type-checks field initializers and method bodies.
fn process_class(table: &mut ClassTable, ast_class: &mut Class, id: ClassId) -> Result<()> {
    let self_symbol = Symbol::intern("self");
    let parent_id = table.get(id).parent.expect("non-Object class always has a resolved parent");
    let parent_fields = table.get(parent_id).fields.clone();
    let parent_methods = table.get(parent_id).methods.clone();

    let mut fields = parent_fields.clone();
    let mut own_names: Vec<Symbol> = Vec::new();
    for field in &ast_class.fields {
        if field.name == self_symbol {
            return Err(Diagnosed { error: SemError::SelfField, span: field.span });
        }
        if own_names.contains(&field.name) {
            return Err(Diagnosed { error: SemError::DuplicateField(field.name.to_string()), span: field.span });
        }
        if parent_fields.iter().any(|f| f.name == field.name) {
            return Err(Diagnosed { error: SemError::ShadowedField(field.name.to_string()), span: field.span });
        }
        check_declared(table, field.ty, field.span)?;
        own_names.push(field.name);
        fields.push(FieldInfo { name: field.name, ty: field.ty, span: field.span, owner: id });
    }

    let mut methods = parent_methods;
    for method in &ast_class.methods {
        if methods.iter().any(|m| m.owner == id && m.name == method.name) {
            return Err(Diagnosed { error: SemError::DuplicateMethod(method.name.to_string()), span: method.span });
        }
        let mut formal_names: Vec<Symbol> = Vec::new();
        let mut formals = Vec::with_capacity(method.formals.len());
        for formal in &method.formals {
            if formal_names.contains(&formal.name) {
                return Err(Diagnosed { error: SemError::DuplicateFormal(formal.name.to_string()), span: formal.span });
            }
            check_declared(table, formal.ty, formal.span)?;
            formal_names.push(formal.name);
            formals.push((formal.name, formal.ty));
        }
        check_declared(table, method.ret_type, method.span)?;

        let info = MethodInfo { name: method.name, formals, ret_type: method.ret_type, span: method.span, owner: id };
        match methods.iter().position(|m| m.name == method.name) {
            Some(slot) => {
                if !signatures_match(&methods[slot], &info.formals, info.ret_type) {
                    return Err(Diagnosed { error: SemError::OverrideMismatch(method.name.to_string()), span: method.span });
                }
                methods[slot] = info;
            }
            None => methods.push(info),
        }
    }

    table.get_mut(id).fields = fields;
    table.get_mut(id).methods = methods;

    for field in &mut ast_class.fields {
        if let Some(init) = &mut field.init {
            let mut stack = ScopeStack::new();
            let init_ty = infer(table, &mut stack, init)?;
            if !conforms(table, init_ty, field.ty) {
                return Err(Diagnosed {
                    error: SemError::TypeMismatch { expected: field.ty.to_string(), found: init_ty.to_string() },
                    span: init.span,
                });
            }
        }
    }

    for method in &mut ast_class.methods {
        let mut stack = ScopeStack::new();
        let formals = method.formals.iter().map(|f| (f.name, f.ty)).collect();
        stack.push(Frame::Method { formals, self_class: id });
        let body_ty = infer(table, &mut stack, &mut method.body)?;
        stack.pop();
        if !conforms(table, body_ty, method.ret_type) {
            return Err(Diagnosed {
                error: SemError::TypeMismatch { expected: method.ret_type.to_string(), found: body_ty.to_string() },
                span: method.body.span,
            });
        }
    }

    Ok(())
}

/// Runs Pass B over every declared class in topological order, then
/// checks the fixed shape of `Main::main`.
pub fn run(table: &mut ClassTable, program: &mut Program, ids: &[ClassId], object_id: ClassId, order: &[ClassId]) -> Result<()> {
    for &id in order {
        if id == object_id {
            continue;
        }
        let ast_idx = ids.iter().position(|&x| x == id).expect("every non-Object ClassId has an AST class");
        process_class(table, &mut program.classes[ast_idx], id)?;
    }

    let main_id = table.lookup(Symbol::intern("Main")).expect("checked by pass_a::check_main_exists");
    let main_method = table.get(main_id).find_method(Symbol::intern("main"));
    match main_method {
        Some(m) if m.formals.is_empty() && m.ret_type == TypeName::Int32 && m.owner == main_id => Ok(()),
        _ => Err(Diagnosed { error: SemError::MissingMainMethod, span: table.get(main_id).span }),
    }
}
