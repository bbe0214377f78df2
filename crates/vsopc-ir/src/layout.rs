//! Class and vtable layout construction (spec §4.4 Record layouts).

use vsopc_par::ast::TypeName;
use vsopc_sem::class_table::ClassTable;
use vsopc_util::Symbol;

use crate::ir::{ClassLayout, IrType, VTableLayout, VTableSlot};

pub fn ir_type(ty: TypeName) -> IrType {
    match ty {
        TypeName::Unit => IrType::Unit,
        TypeName::Bool => IrType::Bool,
        TypeName::Int32 => IrType::Int32,
        TypeName::String => IrType::StringPtr,
        TypeName::Class(name) => IrType::Class(name),
    }
}

pub fn mangle_new(class: Symbol) -> String {
    format!("{class}_new")
}

pub fn mangle_init(class: Symbol) -> String {
    format!("{class}_init")
}

/// `Object`'s six fixed methods keep their runtime-provided name
/// (`Object_print`, ...); every other method is `C_method_m`, owned
/// by whichever class declares (or overrides) it.
pub fn mangle_method(owner: Symbol, method: Symbol) -> String {
    if owner.as_str() == "Object" {
        format!("Object_{method}")
    } else {
        format!("{owner}_method_{method}")
    }
}

pub fn build_layouts(table: &ClassTable) -> (Vec<ClassLayout>, Vec<VTableLayout>) {
    let mut classes = Vec::new();
    let mut vtables = Vec::new();
    for id in table.classes.indices() {
        let info = table.get(id);
        let parent = info.parent.map(|p| table.get(p).name);
        let fields = info.fields.iter().map(|f| (f.name, ir_type(f.ty))).collect();
        classes.push(ClassLayout { name: info.name, parent, fields });

        let slots = info
            .methods
            .iter()
            .map(|m| {
                let owner = table.get(m.owner).name;
                VTableSlot {
                    method: m.name,
                    fn_name: mangle_method(owner, m.name),
                    param_types: m.formals.iter().map(|(_, t)| ir_type(*t)).collect(),
                    ret_type: ir_type(m.ret_type),
                }
            })
            .collect();
        vtables.push(VTableLayout { class: info.name, slots });
    }
    (classes, vtables)
}
