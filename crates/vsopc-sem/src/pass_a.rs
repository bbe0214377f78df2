//! Pass A: inheritance graph construction (spec §4.3).

use vsopc_util::Span;
use vsopc_util::Symbol;

use crate::class_table::{ClassId, ClassInfo, ClassTable, MethodInfo};
use crate::error::{Diagnosed, Result, SemError};
use vsopc_par::ast::{Program, TypeName};

/// Registers the synthetic `Object` class with its six fixed
/// I/O methods (spec §4.3 step 1).
pub fn inject_object(table: &mut ClassTable) -> ClassId {
    let object_id = table.insert(ClassInfo {
        name: Symbol::intern("Object"),
        parent: None,
        span: Span::DUMMY,
        fields: Vec::new(),
        methods: Vec::new(),
    });

    let methods = vec![
        ("print", vec![(Symbol::intern("s"), TypeName::String)], TypeName::Class(Symbol::intern("Object"))),
        ("printBool", vec![(Symbol::intern("b"), TypeName::Bool)], TypeName::Class(Symbol::intern("Object"))),
        ("printInt32", vec![(Symbol::intern("i"), TypeName::Int32)], TypeName::Class(Symbol::intern("Object"))),
        ("inputLine", vec![], TypeName::String),
        ("inputBool", vec![], TypeName::Bool),
        ("inputInt32", vec![], TypeName::Int32),
    ];
    let method_infos: Vec<MethodInfo> = methods
        .into_iter()
        .map(|(name, formals, ret_type)| MethodInfo {
            name: Symbol::intern(name),
            formals,
            ret_type,
            span: Span::DUMMY,
            owner: object_id,
        })
        .collect();
    table.get_mut(object_id).methods = method_infos;
    object_id
}

/// Registers each declared class (spec §4.3 step 2), catching
/// redefinitions of `Object` and duplicate names. Returns the
/// `ClassId` assigned to each `program.classes[i]`, in order.
pub fn register_classes(table: &mut ClassTable, program: &Program) -> Result<Vec<ClassId>> {
    let object_name = Symbol::intern("Object");
    let mut ids = Vec::with_capacity(program.classes.len());
    for class in &program.classes {
        if class.name == object_name {
            return Err(Diagnosed { error: SemError::RedefinesObject(class.name.to_string()), span: class.span });
        }
        if table.lookup(class.name).is_some() {
            return Err(Diagnosed { error: SemError::DuplicateClass(class.name.to_string()), span: class.span });
        }
        let id = table.insert(ClassInfo {
            name: class.name,
            parent: None,
            span: class.span,
            fields: Vec::new(),
            methods: Vec::new(),
        });
        ids.push(id);
    }
    Ok(ids)
}

/// Resolves each class's declared parent (spec §4.3 step 3): missing
/// parent, self-parent, or a parent cycle is an error.
pub fn resolve_parents(table: &mut ClassTable, program: &Program, ids: &[ClassId]) -> Result<()> {
    for (class, &id) in program.classes.iter().zip(ids) {
        if class.parent == class.name {
            return Err(Diagnosed { error: SemError::SelfParent(class.name.to_string()), span: class.span });
        }
        let parent_id = table.lookup(class.parent).ok_or_else(|| Diagnosed {
            error: SemError::MissingParent(class.name.to_string(), class.parent.to_string()),
            span: class.span,
        })?;
        table.get_mut(id).parent = Some(parent_id);
    }

    for &id in ids {
        check_acyclic(table, id)?;
    }
    Ok(())
}

fn check_acyclic(table: &ClassTable, start: ClassId) -> Result<()> {
    let mut seen = vec![start];
    let mut cur = table.get(start).parent;
    while let Some(id) = cur {
        if seen.contains(&id) {
            return Err(Diagnosed { error: SemError::InheritanceCycle, span: table.get(start).span });
        }
        seen.push(id);
        cur = table.get(id).parent;
    }
    Ok(())
}

/// Spec §4.3 step 4: a class named `Main` must exist.
pub fn check_main_exists(table: &ClassTable) -> Result<()> {
    if table.lookup(Symbol::intern("Main")).is_none() {
        return Err(Diagnosed { error: SemError::MissingMain, span: Span::DUMMY });
    }
    Ok(())
}

/// Topological (parent-before-child) order over every registered
/// class, `Object` first. Pass B walks classes in this order so a
/// child's combined field/method list can always see its ancestor's
/// already-finished one, regardless of source declaration order.
pub fn topological_order(table: &ClassTable, object_id: ClassId) -> Vec<ClassId> {
    let mut children: std::collections::HashMap<ClassId, Vec<ClassId>> = std::collections::HashMap::new();
    for id in table.classes.indices() {
        if let Some(parent) = table.get(id).parent {
            children.entry(parent).or_default().push(id);
        }
    }

    let mut order = Vec::new();
    let mut queue = std::collections::VecDeque::new();
    queue.push_back(object_id);
    while let Some(id) = queue.pop_front() {
        order.push(id);
        if let Some(kids) = children.get(&id) {
            for &kid in kids {
                queue.push_back(kid);
            }
        }
    }
    order
}
