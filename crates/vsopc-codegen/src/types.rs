//! Type mapping from the typed IR to LLVM IR types.
//!
//! LLVM's opaque-pointer model means every pointer-shaped [`IrType`]
//! (`StringPtr`, `Ptr`, every `Class`) maps to the same
//! [`PointerType`] — there is no pointee to distinguish them by, so a
//! "bitcast" between them is a type-system fiction the IR keeps for
//! documentation but costs nothing at this level.

use std::collections::HashMap;

use inkwell::context::Context;
use inkwell::types::{BasicTypeEnum, PointerType, StructType};
use inkwell::AddressSpace;

use vsopc_ir::{IrType, Module as IrModule};
use vsopc_util::Symbol;

pub struct TypeMapper<'ctx> {
    context: &'ctx Context,
    pub class_types: HashMap<Symbol, StructType<'ctx>>,
    pub vtable_types: HashMap<Symbol, StructType<'ctx>>,
}

impl<'ctx> TypeMapper<'ctx> {
    pub fn new(context: &'ctx Context, module: &IrModule) -> Self {
        let mut class_types = HashMap::new();
        let mut vtable_types = HashMap::new();
        for class in &module.classes {
            class_types.insert(class.name, context.opaque_struct_type(&format!("struct.{}", class.name)));
        }
        for vtable in &module.vtables {
            vtable_types.insert(vtable.class, context.opaque_struct_type(&format!("struct.{}VTable", vtable.class)));
        }

        let mapper = Self { context, class_types, vtable_types };
        let ptr: BasicTypeEnum = mapper.ptr_type().into();
        for class in &module.classes {
            let mut fields = vec![ptr];
            fields.extend(class.fields.iter().map(|(_, ty)| mapper.basic(*ty)));
            mapper.class_types[&class.name].set_body(&fields, false);
        }
        for vtable in &module.vtables {
            let slots = vec![ptr; vtable.slots.len()];
            mapper.vtable_types[&vtable.class].set_body(&slots, false);
        }
        mapper
    }

    pub fn ptr_type(&self) -> PointerType<'ctx> {
        self.context.ptr_type(AddressSpace::default())
    }

    /// The declared slot type for a field or a `Let`/formal binding.
    /// `Unit` has no runtime representation of its own; it is stored
    /// as a single dummy byte purely so it has a concrete LLVM type.
    pub fn basic(&self, ty: IrType) -> BasicTypeEnum<'ctx> {
        match ty {
            IrType::Int32 => self.context.i32_type().into(),
            IrType::Bool => self.context.bool_type().into(),
            IrType::Unit => self.context.i8_type().into(),
            IrType::StringPtr | IrType::Ptr | IrType::Class(_) => self.ptr_type().into(),
        }
    }
}
