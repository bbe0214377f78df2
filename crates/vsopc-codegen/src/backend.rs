//! Walks a [`vsopc_ir::Module`] and emits the equivalent LLVM IR
//! through inkwell: one global per string/vtable constant, one
//! declared function per runtime import plus one per lowered
//! [`vsopc_ir::Function`], bodies built block by block.

use std::collections::HashMap;

use inkwell::basic_block::BasicBlock;
use inkwell::builder::Builder;
use inkwell::context::Context;
use inkwell::module::{Linkage, Module as InkwellModule};
use inkwell::targets::{CodeModel, FileType, InitializationConfig, RelocMode, Target, TargetMachine};
use inkwell::types::{BasicMetadataTypeEnum, BasicType};
use inkwell::values::{BasicMetadataValueEnum, BasicValue, BasicValueEnum, FunctionValue, PointerValue};
use inkwell::{AddressSpace, IntPredicate, OptimizationLevel};

use vsopc_ir::{Block as IrBlock, Function as IrFunction, Inst, InstId, InstKind, IrType, Module as IrModule, Terminator};
use vsopc_util::Symbol;

use crate::error::{CodeGenError, Result};
use crate::types::TypeMapper;

/// The six `Object_*` I/O methods, named and typed as the runtime
/// library fixes them.
const OBJECT_METHODS: &[(&str, &[IrType], IrType)] = &[
    ("Object_print", &[IrType::StringPtr], IrType::Ptr),
    ("Object_printBool", &[IrType::Bool], IrType::Ptr),
    ("Object_printInt32", &[IrType::Int32], IrType::Ptr),
    ("Object_inputLine", &[], IrType::StringPtr),
    ("Object_inputBool", &[], IrType::Bool),
    ("Object_inputInt32", &[], IrType::Int32),
];

pub struct Backend<'ctx> {
    context: &'ctx Context,
    pub module: InkwellModule<'ctx>,
    builder: Builder<'ctx>,
    types: TypeMapper<'ctx>,
    functions: HashMap<String, FunctionValue<'ctx>>,
    strings: HashMap<String, PointerValue<'ctx>>,
}

impl<'ctx> Backend<'ctx> {
    pub fn compile(context: &'ctx Context, module_name: &str, ir: &IrModule) -> Self {
        let module = context.create_module(module_name);
        let builder = context.create_builder();
        let types = TypeMapper::new(context, ir);
        let mut backend = Backend { context, module, builder, types, functions: HashMap::new(), strings: HashMap::new() };

        backend.declare_runtime();
        backend.declare_functions(ir);
        backend.build_string_globals(ir);
        backend.build_vtable_globals(ir);
        for function in &ir.functions {
            backend.emit_function_body(function);
        }
        backend
    }

    /// `malloc`, `pow`, `strcmp`, and the `Object_*` symbols the
    /// linker resolves against the runtime library. Declared before
    /// anything else so they sit first in the textual dump.
    fn declare_runtime(&mut self) {
        let ptr = self.types.ptr_type();
        let i32_ty = self.context.i32_type();
        let i64_ty = self.context.i64_type();
        let f64_ty = self.context.f64_type();

        let malloc_ty = ptr.fn_type(&[i64_ty.into()], false);
        self.declare_extern("malloc", malloc_ty);

        let pow_ty = f64_ty.fn_type(&[f64_ty.into(), f64_ty.into()], false);
        self.declare_extern("pow", pow_ty);

        let strcmp_ty = i32_ty.fn_type(&[ptr.into(), ptr.into()], false);
        self.declare_extern("strcmp", strcmp_ty);

        let object_new_ty = ptr.fn_type(&[], false);
        self.declare_extern("Object_new", object_new_ty);

        let object_init_ty = ptr.fn_type(&[ptr.into()], false);
        self.declare_extern("Object_init", object_init_ty);

        for (name, params, ret) in OBJECT_METHODS {
            let mut param_tys: Vec<BasicMetadataTypeEnum> = vec![ptr.into()];
            param_tys.extend(params.iter().map(|t| self.metadata_type(*t)));
            let fn_ty = self.basic_return_type(*ret).fn_type(&param_tys, false);
            self.declare_extern(name, fn_ty);
        }
    }

    fn declare_extern(&mut self, name: &str, ty: inkwell::types::FunctionType<'ctx>) {
        let f = self.module.add_function(name, ty, Some(Linkage::External));
        self.functions.insert(name.to_string(), f);
    }

    fn declare_functions(&mut self, ir: &IrModule) {
        for function in &ir.functions {
            let param_tys: Vec<BasicMetadataTypeEnum> = function.params.iter().map(|(_, ty)| self.metadata_type(*ty)).collect();
            let fn_ty = if function.ret == IrType::Unit {
                self.context.void_type().fn_type(&param_tys, false)
            } else {
                self.basic_return_type(function.ret).fn_type(&param_tys, false)
            };
            let f = self.module.add_function(&function.name, fn_ty, None);
            self.functions.insert(function.name.clone(), f);
        }
    }

    fn build_string_globals(&mut self, ir: &IrModule) {
        for s in &ir.strings {
            let bytes = self.context.const_string(&s.bytes, false);
            let global = self.module.add_global(bytes.get_type(), None, &s.name);
            global.set_initializer(&bytes);
            global.set_constant(true);
            global.set_linkage(Linkage::Private);
            self.strings.insert(s.name.clone(), global.as_pointer_value());
        }
    }

    fn build_vtable_globals(&mut self, ir: &IrModule) {
        for vtable in &ir.vtables {
            let slots: Vec<BasicValueEnum> = vtable
                .slots
                .iter()
                .map(|slot| {
                    let f = *self
                        .functions
                        .get(&slot.fn_name)
                        .unwrap_or_else(|| panic!("vtable slot references undeclared function {}", slot.fn_name));
                    f.as_global_value().as_pointer_value().as_basic_value_enum()
                })
                .collect();
            let vtable_ty = self.types.vtable_types[&vtable.class];
            let const_vtable = vtable_ty.const_named_struct(&slots);
            let global_name = format!("vtable.{}", vtable.class);
            let global = self.module.add_global(vtable_ty, None, &global_name);
            global.set_initializer(&const_vtable);
            global.set_constant(true);
        }
    }

    fn vtable_global_ptr(&self, class: Symbol) -> PointerValue<'ctx> {
        let name = format!("vtable.{class}");
        self.module.get_global(&name).expect("every class has a vtable global").as_pointer_value()
    }

    fn metadata_type(&self, ty: IrType) -> BasicMetadataTypeEnum<'ctx> {
        self.types.basic(ty).into()
    }

    fn basic_return_type(&self, ty: IrType) -> inkwell::types::BasicTypeEnum<'ctx> {
        self.types.basic(ty)
    }

    fn emit_function_body(&mut self, function: &IrFunction) {
        let fn_value = self.functions[&function.name];
        let blocks: Vec<BasicBlock> =
            function.blocks.iter().map(|b| self.context.append_basic_block(fn_value, &format!("bb{}", b.id))).collect();

        let mut values: HashMap<InstId, BasicValueEnum<'ctx>> = HashMap::new();
        let mut value_types: HashMap<InstId, IrType> = HashMap::new();
        let mut vtable_class_of: HashMap<InstId, Symbol> = HashMap::new();

        for (i, block) in function.blocks.iter().enumerate() {
            self.builder.position_at_end(blocks[i]);
            self.emit_block(function, fn_value, block, &blocks, &mut values, &mut value_types, &mut vtable_class_of);
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn emit_block(
        &mut self,
        function: &IrFunction,
        fn_value: FunctionValue<'ctx>,
        block: &IrBlock,
        blocks: &[BasicBlock<'ctx>],
        values: &mut HashMap<InstId, BasicValueEnum<'ctx>>,
        value_types: &mut HashMap<InstId, IrType>,
        vtable_class_of: &mut HashMap<InstId, Symbol>,
    ) {
        for inst in &block.insts {
            let value = self.emit_inst(function, fn_value, inst, values, value_types, vtable_class_of);
            values.insert(inst.id, value);
            value_types.insert(inst.id, inst.ty);
        }

        match &block.term {
            Terminator::Br(target) => {
                self.builder.build_unconditional_branch(blocks[*target as usize]).expect("well-formed IR");
            }
            Terminator::CondBr { cond, then_block, else_block } => {
                let cond_val = values[cond].into_int_value();
                self.builder
                    .build_conditional_branch(cond_val, blocks[*then_block as usize], blocks[*else_block as usize])
                    .expect("well-formed IR");
            }
            Terminator::Ret(value) => match value {
                Some(id) => {
                    let v = values[id];
                    self.builder.build_return(Some(&v as &dyn BasicValue)).expect("well-formed IR");
                }
                None => {
                    self.builder.build_return(None).expect("well-formed IR");
                }
            },
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn emit_inst(
        &mut self,
        function: &IrFunction,
        fn_value: FunctionValue<'ctx>,
        inst: &Inst,
        values: &HashMap<InstId, BasicValueEnum<'ctx>>,
        value_types: &HashMap<InstId, IrType>,
        vtable_class_of: &mut HashMap<InstId, Symbol>,
    ) -> BasicValueEnum<'ctx> {
        let i32_ty = self.context.i32_type();
        let bool_ty = self.context.bool_type();

        match &inst.kind {
            InstKind::ConstInt(v) => i32_ty.const_int(*v as u64, true).into(),
            InstKind::ConstBool(v) => bool_ty.const_int(*v as u64, false).into(),
            InstKind::ConstUnit => self.context.i8_type().const_zero().into(),
            InstKind::GlobalStringPtr(name) => self.strings[name].into(),
            InstKind::VTableGlobalPtr(class) => self.vtable_global_ptr(*class).into(),
            InstKind::Param(idx) => fn_value.get_nth_param(*idx as u32).expect("well-formed IR"),

            InstKind::Alloca(ty) => {
                self.builder.build_alloca(self.types.basic(*ty), "slot").expect("well-formed IR").into()
            }
            InstKind::Load(ptr) => {
                let ptr_val = values[ptr].into_pointer_value();
                self.builder.build_load(self.types.basic(inst.ty), ptr_val, "load").expect("well-formed IR")
            }
            InstKind::Store { ptr, value } => {
                let ptr_val = values[ptr].into_pointer_value();
                self.builder.build_store(ptr_val, values[value]).expect("well-formed IR");
                self.context.i8_type().const_zero().into()
            }

            InstKind::Add(l, r) => self.builder.build_int_add(values[l].into_int_value(), values[r].into_int_value(), "add").expect("well-formed IR").into(),
            InstKind::Sub(l, r) => self.builder.build_int_sub(values[l].into_int_value(), values[r].into_int_value(), "sub").expect("well-formed IR").into(),
            InstKind::Mul(l, r) => self.builder.build_int_mul(values[l].into_int_value(), values[r].into_int_value(), "mul").expect("well-formed IR").into(),
            InstKind::Div(l, r) => self.builder.build_int_signed_div(values[l].into_int_value(), values[r].into_int_value(), "div").expect("well-formed IR").into(),
            InstKind::Lt(l, r) => self
                .builder
                .build_int_compare(IntPredicate::SLT, values[l].into_int_value(), values[r].into_int_value(), "lt")
                .expect("well-formed IR")
                .into(),
            InstKind::Le(l, r) => self
                .builder
                .build_int_compare(IntPredicate::SLE, values[l].into_int_value(), values[r].into_int_value(), "le")
                .expect("well-formed IR")
                .into(),
            InstKind::Pow(l, r) => self.emit_pow(values[l].into_int_value(), values[r].into_int_value()),
            InstKind::StrEq(l, r) => self.emit_strcmp_eq(values[l].into_pointer_value(), values[r].into_pointer_value()),
            InstKind::PtrEq(l, r) => self.emit_ptr_eq(values[l].into_pointer_value(), values[r].into_pointer_value()),
            InstKind::IntEq(l, r) => self
                .builder
                .build_int_compare(IntPredicate::EQ, values[l].into_int_value(), values[r].into_int_value(), "eq")
                .expect("well-formed IR")
                .into(),

            InstKind::Neg(v) => self.builder.build_int_neg(values[v].into_int_value(), "neg").expect("well-formed IR").into(),
            InstKind::Not(v) => self.builder.build_not(values[v].into_int_value(), "not").expect("well-formed IR").into(),
            InstKind::IsNull(v) => self.builder.build_is_null(values[v].into_pointer_value(), "isnull").expect("well-formed IR").into(),

            InstKind::Bitcast { value, .. } => values[value],

            InstKind::FieldGep { object, class, slot } => {
                let struct_ty = self.types.class_types[class];
                let object_ptr = values[object].into_pointer_value();
                unsafe {
                    self.builder.build_struct_gep(struct_ty, object_ptr, *slot as u32, "field").expect("well-formed IR").into()
                }
            }
            InstKind::VTableLoad(object) => {
                let class = match value_types[object] {
                    IrType::Class(name) => name,
                    other => panic!("vtable load on non-class receiver {other:?}"),
                };
                let struct_ty = self.types.class_types[&class];
                let object_ptr = values[object].into_pointer_value();
                let slot_ptr = unsafe { self.builder.build_struct_gep(struct_ty, object_ptr, 0, "vtable_slot").expect("well-formed IR") };
                let loaded = self.builder.build_load(self.types.ptr_type(), slot_ptr, "vtable").expect("well-formed IR");
                vtable_class_of.insert(inst.id, class);
                loaded
            }
            InstKind::VTableGep { vtable, slot } => {
                let class = *vtable_class_of.get(vtable).expect("vtable pointer traced back to its owning class");
                let vtable_ty = self.types.vtable_types[&class];
                let vtable_ptr = values[vtable].into_pointer_value();
                unsafe {
                    self.builder.build_struct_gep(vtable_ty, vtable_ptr, *slot as u32, "slot").expect("well-formed IR").into()
                }
            }

            InstKind::CallDirect { callee, args } => self.emit_call_direct(callee, args, values, function),
            InstKind::CallIndirect { fn_ptr, args, ret } => self.emit_call_indirect(values[fn_ptr].into_pointer_value(), args, *ret, values),
            InstKind::SizeOf(class) => self.emit_sizeof(*class),
            InstKind::NullPtr(_) => self.types.ptr_type().const_null().into(),
        }
    }

    fn emit_pow(&self, l: inkwell::values::IntValue<'ctx>, r: inkwell::values::IntValue<'ctx>) -> BasicValueEnum<'ctx> {
        let f64_ty = self.context.f64_type();
        let lf = self.builder.build_signed_int_to_float(l, f64_ty, "lf").expect("well-formed IR");
        let rf = self.builder.build_signed_int_to_float(r, f64_ty, "rf").expect("well-formed IR");
        let pow_fn = self.functions["pow"];
        let args: Vec<BasicMetadataValueEnum> = vec![lf.into(), rf.into()];
        let result = self.builder.build_call(pow_fn, &args, "powcall").expect("well-formed IR");
        let result_f = result.try_as_basic_value().left().expect("pow returns a value").into_float_value();
        self.builder.build_float_to_signed_int(result_f, self.context.i32_type(), "powi").expect("well-formed IR").into()
    }

    fn emit_strcmp_eq(&self, l: PointerValue<'ctx>, r: PointerValue<'ctx>) -> BasicValueEnum<'ctx> {
        let strcmp_fn = self.functions["strcmp"];
        let args: Vec<BasicMetadataValueEnum> = vec![l.into(), r.into()];
        let result = self.builder.build_call(strcmp_fn, &args, "strcmp").expect("well-formed IR");
        let cmp = result.try_as_basic_value().left().expect("strcmp returns a value").into_int_value();
        let zero = self.context.i32_type().const_zero();
        self.builder.build_int_compare(IntPredicate::EQ, cmp, zero, "streq").expect("well-formed IR").into()
    }

    fn emit_ptr_eq(&self, l: PointerValue<'ctx>, r: PointerValue<'ctx>) -> BasicValueEnum<'ctx> {
        let i64_ty = self.context.i64_type();
        let li = self.builder.build_ptr_to_int(l, i64_ty, "lpi").expect("well-formed IR");
        let ri = self.builder.build_ptr_to_int(r, i64_ty, "rpi").expect("well-formed IR");
        self.builder.build_int_compare(IntPredicate::EQ, li, ri, "ptreq").expect("well-formed IR").into()
    }

    fn emit_sizeof(&self, class: Symbol) -> BasicValueEnum<'ctx> {
        let struct_ty = self.types.class_types[&class];
        let ptr_ty = struct_ty.ptr_type(AddressSpace::default());
        let null = ptr_ty.const_null();
        let one = self.context.i32_type().const_int(1, false);
        let one_past = unsafe { self.builder.build_gep(struct_ty, null, &[one], "sizeof_gep").expect("well-formed IR") };
        let as_int = self.builder.build_ptr_to_int(one_past, self.context.i64_type(), "sizeof_i64").expect("well-formed IR");
        self.builder.build_int_truncate(as_int, self.context.i32_type(), "sizeof_i32").expect("well-formed IR").into()
    }

    fn emit_call_direct(
        &self,
        callee: &str,
        args: &[InstId],
        values: &HashMap<InstId, BasicValueEnum<'ctx>>,
        _function: &IrFunction,
    ) -> BasicValueEnum<'ctx> {
        let callee_fn = self.functions[callee];
        let mut call_args: Vec<BasicMetadataValueEnum> = args.iter().map(|id| values[id].into()).collect();

        // `malloc` takes a 64-bit size; `SizeOf` produces a 32-bit word.
        if callee == "malloc" {
            let size = values[&args[0]].into_int_value();
            let widened = self.builder.build_int_z_extend(size, self.context.i64_type(), "size64").expect("well-formed IR");
            call_args = vec![widened.into()];
        }

        let call = self.builder.build_call(callee_fn, &call_args, "calldirect").expect("well-formed IR");
        call.try_as_basic_value().left().unwrap_or_else(|| self.context.i8_type().const_zero().into())
    }

    fn emit_call_indirect(
        &self,
        fn_ptr: PointerValue<'ctx>,
        args: &[InstId],
        ret: IrType,
        values: &HashMap<InstId, BasicValueEnum<'ctx>>,
    ) -> BasicValueEnum<'ctx> {
        let call_args: Vec<BasicMetadataValueEnum> = args.iter().map(|id| values[id].into()).collect();
        let param_tys: Vec<BasicMetadataTypeEnum> = call_args.iter().map(|v| v.get_type().into()).collect();
        let fn_ty = if ret == IrType::Unit {
            self.context.void_type().fn_type(&param_tys, false)
        } else {
            self.types.basic(ret).fn_type(&param_tys, false)
        };
        let call = self.builder.build_indirect_call(fn_ty, fn_ptr, &call_args, "callindirect").expect("well-formed IR");
        call.try_as_basic_value().left().unwrap_or_else(|| self.context.i8_type().const_zero().into())
    }

    pub fn verify(&self) -> Result<()> {
        self.module.verify().map_err(|e| CodeGenError::VerificationFailed(e.to_string()))
    }

    pub fn print_to_string(&self) -> String {
        self.module.print_to_string().to_string()
    }

    pub fn write_object_file(&self, path: &std::path::Path) -> Result<()> {
        Target::initialize_all(&InitializationConfig::default());
        let triple = TargetMachine::get_default_triple();
        let target = Target::from_triple(&triple).map_err(|_| CodeGenError::NoTargetMachine)?;
        let cpu = TargetMachine::get_host_cpu_name();
        let features = TargetMachine::get_host_cpu_features();
        let machine = target
            .create_target_machine(&triple, cpu.to_str().unwrap_or("generic"), features.to_str().unwrap_or(""), OptimizationLevel::Default, RelocMode::Default, CodeModel::Default)
            .ok_or(CodeGenError::NoTargetMachine)?;
        self.module.set_triple(&triple);
        self.module.set_data_layout(&machine.get_target_data().get_data_layout());
        machine
            .write_to_file(&self.module, FileType::Object, path)
            .map_err(|e| CodeGenError::ObjectWrite {
                path: path.display().to_string(),
                source: std::io::Error::new(std::io::ErrorKind::Other, e.to_string()),
            })
    }
}
