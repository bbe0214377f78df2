//! Expression and per-class function lowering (spec §4.4).

use vsopc_par::ast::{BinOpKind, Class, Expr, ExprKind, Program, TypeName, UnOp};
use vsopc_sem::class_table::{ClassId, ClassTable};
use vsopc_util::Symbol;

use crate::ir::{Block, BlockId, Function, Inst, InstId, InstKind, IrType, Module, StringConst, Terminator};
use crate::layout::{build_layouts, ir_type, mangle_init, mangle_method, mangle_new};

/// Decodes a string literal's surface text (quotes plus any remaining
/// `\xHH` escapes) into the raw bytes the global constant holds.
fn decode_string_bytes(literal: &str) -> Vec<u8> {
    let inner = literal.strip_prefix('"').and_then(|s| s.strip_suffix('"')).unwrap_or(literal);
    let mut bytes = Vec::with_capacity(inner.len());
    let chars: Vec<char> = inner.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == '\\' && i + 3 < chars.len() && chars[i + 1] == 'x' {
            let hex: String = chars[i + 2..i + 4].iter().collect();
            if let Ok(byte) = u8::from_str_radix(&hex, 16) {
                bytes.push(byte);
                i += 4;
                continue;
            }
        }
        let mut buf = [0u8; 4];
        bytes.extend_from_slice(chars[i].encode_utf8(&mut buf).as_bytes());
        i += 1;
    }
    bytes
}

struct Local {
    name: Symbol,
    slot: InstId,
    ty: IrType,
}

struct FnBuilder<'a> {
    table: &'a ClassTable,
    classes: &'a [crate::ir::ClassLayout],
    vtables: &'a [crate::ir::VTableLayout],
    strings: &'a mut Vec<StringConst>,
    string_counter: &'a mut u32,
    next_inst: InstId,
    next_block: BlockId,
    blocks: Vec<Block>,
    cur_block: BlockId,
    cur_insts: Vec<Inst>,
    locals: Vec<Local>,
    self_value: Option<InstId>,
    self_class: Option<Symbol>,
}

impl<'a> FnBuilder<'a> {
    fn new(
        table: &'a ClassTable,
        classes: &'a [crate::ir::ClassLayout],
        vtables: &'a [crate::ir::VTableLayout],
        strings: &'a mut Vec<StringConst>,
        string_counter: &'a mut u32,
    ) -> Self {
        Self {
            table,
            classes,
            vtables,
            strings,
            string_counter,
            next_inst: 0,
            next_block: 0,
            blocks: Vec::new(),
            cur_block: 0,
            cur_insts: Vec::new(),
            locals: Vec::new(),
            self_value: None,
            self_class: None,
        }
    }

    fn new_block(&mut self) -> BlockId {
        let id = self.next_block;
        self.next_block += 1;
        id
    }

    fn switch_to(&mut self, block: BlockId) {
        self.cur_block = block;
        self.cur_insts = Vec::new();
    }

    fn emit(&mut self, kind: InstKind, ty: IrType) -> InstId {
        let id = self.next_inst;
        self.next_inst += 1;
        self.cur_insts.push(Inst { id, ty, kind });
        id
    }

    fn terminate(&mut self, term: Terminator) {
        let insts = std::mem::take(&mut self.cur_insts);
        self.blocks.push(Block { id: self.cur_block, insts, term });
    }

    /// Returns a reference borrowed from the module-lifetime slice
    /// rather than from `&self`, so callers can still mutate other
    /// fields of the builder (e.g. to lower sub-expressions) while
    /// holding the result.
    fn class_layout(&self, name: Symbol) -> &'a crate::ir::ClassLayout {
        self.classes.iter().find(|c| c.name == name).expect("class layout exists for every declared class")
    }

    fn vtable_layout(&self, name: Symbol) -> &'a crate::ir::VTableLayout {
        self.vtables.iter().find(|v| v.class == name).expect("vtable layout exists for every declared class")
    }

    fn push_local(&mut self, name: Symbol, slot: InstId, ty: IrType) {
        self.locals.push(Local { name, slot, ty });
    }

    fn find_local(&self, name: Symbol) -> Option<(InstId, IrType)> {
        self.locals.iter().rev().find(|l| l.name == name).map(|l| (l.slot, l.ty))
    }

    fn fresh_string(&mut self, bytes: Vec<u8>) -> String {
        let name = format!("str.{}", *self.string_counter);
        *self.string_counter += 1;
        let mut owned = bytes;
        owned.push(0);
        self.strings.push(StringConst { name: name.clone(), bytes: owned });
        name
    }

    fn default_value(&mut self, ty: IrType) -> InstId {
        match ty {
            IrType::Int32 => self.emit(InstKind::ConstInt(0), ty),
            IrType::Bool => self.emit(InstKind::ConstBool(false), ty),
            IrType::Unit => self.emit(InstKind::ConstUnit, ty),
            IrType::StringPtr => {
                let name = self.fresh_string(Vec::new());
                self.emit(InstKind::GlobalStringPtr(name), ty)
            }
            IrType::Class(name) => self.emit(InstKind::NullPtr(name), ty),
            IrType::Ptr => self.emit(InstKind::NullPtr(Symbol::intern("Object")), ty),
        }
    }

    /// Bitcasts are only meaningful between pointer-shaped values
    /// (class types and the opaque `Ptr` kind); every other type
    /// already matches exactly by the time lowering sees it.
    fn bitcast(&mut self, value: InstId, target: IrType) -> InstId {
        match target {
            IrType::Class(_) | IrType::Ptr => self.emit(InstKind::Bitcast { value, to: target }, target),
            _ => value,
        }
    }

    fn lower_block(&mut self, exprs: &[Expr]) -> (InstId, IrType) {
        if exprs.is_empty() {
            let id = self.emit(InstKind::ConstUnit, IrType::Unit);
            return (id, IrType::Unit);
        }
        let mut last = (0, IrType::Unit);
        for e in exprs {
            last = self.lower_expr(e);
        }
        last
    }

    fn lower_expr(&mut self, e: &Expr) -> (InstId, IrType) {
        let ty = ir_type(e.resolved_type.expect("semantic analysis annotates every expression"));
        match &e.kind {
            ExprKind::IntLit(v) => (self.emit(InstKind::ConstInt(*v), ty), ty),
            ExprKind::BoolLit(v) => (self.emit(InstKind::ConstBool(*v), ty), ty),
            ExprKind::UnitLit => (self.emit(InstKind::ConstUnit, ty), ty),
            ExprKind::StrLit(s) => {
                let bytes = decode_string_bytes(s);
                let name = self.fresh_string(bytes);
                (self.emit(InstKind::GlobalStringPtr(name), ty), ty)
            }

            ExprKind::SelfRef => {
                let v = self.self_value.expect("SelfRef only occurs inside a method body");
                (v, ty)
            }

            ExprKind::ObjectId(name) => {
                if let Some((slot, slot_ty)) = self.find_local(*name) {
                    (self.emit(InstKind::Load(slot), slot_ty), slot_ty)
                } else {
                    let class = self.self_class.expect("field access requires an enclosing class");
                    let layout = self.class_layout(class);
                    let slot = layout.field_slot(*name).expect("semantic analysis resolved this field");
                    let field_ty = layout.fields[slot - 1].1;
                    let object = self.self_value.expect("field access requires self");
                    let ptr = self.emit(InstKind::FieldGep { object, class, slot }, IrType::Ptr);
                    (self.emit(InstKind::Load(ptr), field_ty), field_ty)
                }
            }

            ExprKind::New { ty: class_name } => {
                let callee = mangle_new(*class_name);
                (self.emit(InstKind::CallDirect { callee, args: vec![] }, ty), ty)
            }

            ExprKind::Block(exprs) => self.lower_block(exprs),

            ExprKind::If { cond, then_branch, else_branch } => self.lower_if(cond, then_branch, else_branch.as_deref(), ty),
            ExprKind::While { cond, body } => self.lower_while(cond, body),
            ExprKind::Let { name, ty: decl_ty, init, scope } => self.lower_let(*name, *decl_ty, init.as_deref(), scope),
            ExprKind::Assign { name, value } => self.lower_assign(*name, value),
            ExprKind::UnOp { op, operand } => self.lower_unop(*op, operand),
            ExprKind::BinOp { op, lhs, rhs } => self.lower_binop(*op, lhs, rhs, ty),
            ExprKind::Call { receiver, method, args } => self.lower_call(receiver, *method, args),
        }
    }

    fn lower_if(&mut self, cond: &Expr, then_branch: &Expr, else_branch: Option<&Expr>, result_ty: IrType) -> (InstId, IrType) {
        let (cond_id, _) = self.lower_expr(cond);
        let then_block = self.new_block();
        let else_block = self.new_block();
        let merge_block = self.new_block();

        let result_slot = (result_ty != IrType::Unit).then(|| self.emit(InstKind::Alloca(result_ty), IrType::Ptr));
        self.terminate(Terminator::CondBr { cond: cond_id, then_block, else_block });

        self.switch_to(then_block);
        let (then_val, _) = self.lower_expr(then_branch);
        if let Some(slot) = result_slot {
            let cast = self.bitcast(then_val, result_ty);
            self.emit(InstKind::Store { ptr: slot, value: cast }, IrType::Unit);
        }
        self.terminate(Terminator::Br(merge_block));

        self.switch_to(else_block);
        if let Some(else_expr) = else_branch {
            let (else_val, _) = self.lower_expr(else_expr);
            if let Some(slot) = result_slot {
                let cast = self.bitcast(else_val, result_ty);
                self.emit(InstKind::Store { ptr: slot, value: cast }, IrType::Unit);
            }
        }
        self.terminate(Terminator::Br(merge_block));

        self.switch_to(merge_block);
        let result = match result_slot {
            Some(slot) => self.emit(InstKind::Load(slot), result_ty),
            None => self.emit(InstKind::ConstUnit, IrType::Unit),
        };
        (result, result_ty)
    }

    fn lower_while(&mut self, cond: &Expr, body: &Expr) -> (InstId, IrType) {
        let cond_block = self.new_block();
        let loop_block = self.new_block();
        let end_block = self.new_block();

        self.terminate(Terminator::Br(cond_block));
        self.switch_to(cond_block);
        let (cond_id, _) = self.lower_expr(cond);
        self.terminate(Terminator::CondBr { cond: cond_id, then_block: loop_block, else_block: end_block });

        self.switch_to(loop_block);
        self.lower_expr(body);
        self.terminate(Terminator::Br(cond_block));

        self.switch_to(end_block);
        (self.emit(InstKind::ConstUnit, IrType::Unit), IrType::Unit)
    }

    fn lower_let(&mut self, name: Symbol, decl_ty: TypeName, init: Option<&Expr>, scope: &Expr) -> (InstId, IrType) {
        let slot_ty = ir_type(decl_ty);
        let slot = self.emit(InstKind::Alloca(slot_ty), IrType::Ptr);
        let initial = match init {
            Some(init_expr) => {
                let (v, _) = self.lower_expr(init_expr);
                self.bitcast(v, slot_ty)
            }
            None => self.default_value(slot_ty),
        };
        self.emit(InstKind::Store { ptr: slot, value: initial }, IrType::Unit);
        self.push_local(name, slot, slot_ty);
        let result = self.lower_expr(scope);
        self.locals.pop();
        result
    }

    fn lower_assign(&mut self, name: Symbol, value: &Expr) -> (InstId, IrType) {
        let (raw, _) = self.lower_expr(value);
        if let Some((slot, slot_ty)) = self.find_local(name) {
            let cast = self.bitcast(raw, slot_ty);
            self.emit(InstKind::Store { ptr: slot, value: cast }, IrType::Unit);
            (cast, slot_ty)
        } else {
            let class = self.self_class.expect("assignment to a field requires an enclosing class");
            let layout = self.class_layout(class);
            let slot_idx = layout.field_slot(name).expect("semantic analysis resolved this field");
            let field_ty = layout.fields[slot_idx - 1].1;
            let object = self.self_value.expect("assignment to a field requires self");
            let ptr = self.emit(InstKind::FieldGep { object, class, slot: slot_idx }, IrType::Ptr);
            let cast = self.bitcast(raw, field_ty);
            self.emit(InstKind::Store { ptr, value: cast }, IrType::Unit);
            (cast, field_ty)
        }
    }

    fn lower_unop(&mut self, op: UnOp, operand: &Expr) -> (InstId, IrType) {
        let (v, _) = self.lower_expr(operand);
        match op {
            UnOp::Not => (self.emit(InstKind::Not(v), IrType::Bool), IrType::Bool),
            UnOp::Neg => (self.emit(InstKind::Neg(v), IrType::Int32), IrType::Int32),
            UnOp::IsNull => (self.emit(InstKind::IsNull(v), IrType::Bool), IrType::Bool),
        }
    }

    fn lower_binop(&mut self, op: BinOpKind, lhs: &Expr, rhs: &Expr, _result_ty: IrType) -> (InstId, IrType) {
        match op {
            BinOpKind::And => self.lower_short_circuit(lhs, rhs, true),
            BinOpKind::Or => self.lower_short_circuit(lhs, rhs, false),
            BinOpKind::Eq => self.lower_eq(lhs, rhs),
            BinOpKind::Lt => {
                let (l, r) = self.lower_int_pair(lhs, rhs);
                (self.emit(InstKind::Lt(l, r), IrType::Bool), IrType::Bool)
            }
            BinOpKind::Le => {
                let (l, r) = self.lower_int_pair(lhs, rhs);
                (self.emit(InstKind::Le(l, r), IrType::Bool), IrType::Bool)
            }
            BinOpKind::Gt => {
                let (l, r) = self.lower_int_pair(lhs, rhs);
                (self.emit(InstKind::Lt(r, l), IrType::Bool), IrType::Bool)
            }
            BinOpKind::Ge => {
                let (l, r) = self.lower_int_pair(lhs, rhs);
                (self.emit(InstKind::Le(r, l), IrType::Bool), IrType::Bool)
            }
            BinOpKind::Add => {
                let (l, r) = self.lower_int_pair(lhs, rhs);
                (self.emit(InstKind::Add(l, r), IrType::Int32), IrType::Int32)
            }
            BinOpKind::Sub => {
                let (l, r) = self.lower_int_pair(lhs, rhs);
                (self.emit(InstKind::Sub(l, r), IrType::Int32), IrType::Int32)
            }
            BinOpKind::Mul => {
                let (l, r) = self.lower_int_pair(lhs, rhs);
                (self.emit(InstKind::Mul(l, r), IrType::Int32), IrType::Int32)
            }
            BinOpKind::Div => {
                let (l, r) = self.lower_int_pair(lhs, rhs);
                (self.emit(InstKind::Div(l, r), IrType::Int32), IrType::Int32)
            }
            BinOpKind::Pow => {
                let (l, r) = self.lower_int_pair(lhs, rhs);
                (self.emit(InstKind::Pow(l, r), IrType::Int32), IrType::Int32)
            }
        }
    }

    fn lower_int_pair(&mut self, lhs: &Expr, rhs: &Expr) -> (InstId, InstId) {
        let (l, _) = self.lower_expr(lhs);
        let (r, _) = self.lower_expr(rhs);
        (l, r)
    }

    /// `and`/`or` short-circuit: `for_and` selects which side yields
    /// without evaluating the other (`false` for `and`, `true` for `or`).
    fn lower_short_circuit(&mut self, lhs: &Expr, rhs: &Expr, for_and: bool) -> (InstId, IrType) {
        let (lhs_id, _) = self.lower_expr(lhs);
        let slot = self.emit(InstKind::Alloca(IrType::Bool), IrType::Ptr);
        let rhs_block = self.new_block();
        let short_block = self.new_block();
        let merge_block = self.new_block();

        if for_and {
            self.terminate(Terminator::CondBr { cond: lhs_id, then_block: rhs_block, else_block: short_block });
        } else {
            self.terminate(Terminator::CondBr { cond: lhs_id, then_block: short_block, else_block: rhs_block });
        }

        self.switch_to(rhs_block);
        let (rhs_id, _) = self.lower_expr(rhs);
        self.emit(InstKind::Store { ptr: slot, value: rhs_id }, IrType::Unit);
        self.terminate(Terminator::Br(merge_block));

        self.switch_to(short_block);
        let short_value = self.emit(InstKind::ConstBool(!for_and), IrType::Bool);
        self.emit(InstKind::Store { ptr: slot, value: short_value }, IrType::Unit);
        self.terminate(Terminator::Br(merge_block));

        self.switch_to(merge_block);
        (self.emit(InstKind::Load(slot), IrType::Bool), IrType::Bool)
    }

    fn lower_eq(&mut self, lhs: &Expr, rhs: &Expr) -> (InstId, IrType) {
        let operand_ty = ir_type(lhs.resolved_type.expect("semantic analysis annotates every expression"));
        let (l, _) = self.lower_expr(lhs);
        let (r, _) = self.lower_expr(rhs);
        let result = match operand_ty {
            IrType::Unit => self.emit(InstKind::ConstBool(true), IrType::Bool),
            IrType::StringPtr => self.emit(InstKind::StrEq(l, r), IrType::Bool),
            IrType::Class(_) | IrType::Ptr => {
                let lo = self.bitcast(l, IrType::Ptr);
                let ro = self.bitcast(r, IrType::Ptr);
                self.emit(InstKind::PtrEq(lo, ro), IrType::Bool)
            }
            IrType::Int32 | IrType::Bool => self.emit(InstKind::IntEq(l, r), IrType::Bool),
        };
        (result, IrType::Bool)
    }

    fn lower_call(&mut self, receiver: &Expr, method: Symbol, args: &[Expr]) -> (InstId, IrType) {
        let recv_ty = receiver.resolved_type.expect("semantic analysis annotates every expression");
        let recv_class = match recv_ty {
            TypeName::Class(name) => name,
            _ => unreachable!("semantic analysis rejects calls on non-class receivers"),
        };
        let (recv_id, _) = self.lower_expr(receiver);
        let slot = self.vtable_layout(recv_class).slot_of(method).expect("semantic analysis resolved this method");
        let (param_types, ret_type) = {
            let vt = self.vtable_layout(recv_class);
            (vt.slots[slot].param_types.clone(), vt.slots[slot].ret_type)
        };

        let vtable_ptr = self.emit(InstKind::VTableLoad(recv_id), IrType::Ptr);
        let fn_ptr = self.emit(InstKind::VTableGep { vtable: vtable_ptr, slot }, IrType::Ptr);

        let recv_arg = self.bitcast(recv_id, IrType::Ptr);
        let mut call_args = vec![recv_arg];
        for (arg, param_ty) in args.iter().zip(&param_types) {
            let (v, _) = self.lower_expr(arg);
            call_args.push(self.bitcast(v, *param_ty));
        }

        (self.emit(InstKind::CallIndirect { fn_ptr, args: call_args, ret: ret_type }, ret_type), ret_type)
    }
}

/// `<C>_init(self: C*) : C*` (spec §4.4 Per-class synthesized functions).
fn lower_init(
    table: &ClassTable,
    classes: &[crate::ir::ClassLayout],
    vtables: &[crate::ir::VTableLayout],
    strings: &mut Vec<StringConst>,
    string_counter: &mut u32,
    class_id: ClassId,
    ast_class: Option<&Class>,
) -> Function {
    let name = table.get(class_id).name;
    let self_ty = IrType::Class(name);
    let mut b = FnBuilder::new(table, classes, vtables, strings, string_counter);
    let entry = b.new_block();
    b.switch_to(entry);

    let self_param = b.emit(InstKind::Param(0), self_ty);
    b.self_value = Some(self_param);
    b.self_class = Some(name);

    let null_block = b.new_block();
    let init_block = b.new_block();
    let is_null = b.emit(InstKind::IsNull(self_param), IrType::Bool);
    b.terminate(Terminator::CondBr { cond: is_null, then_block: null_block, else_block: init_block });

    b.switch_to(null_block);
    b.terminate(Terminator::Ret(Some(self_param)));

    b.switch_to(init_block);
    if let Some(parent) = table.get(class_id).parent {
        let parent_name = table.get(parent).name;
        let parent_self = b.bitcast(self_param, IrType::Class(parent_name));
        b.emit(InstKind::CallDirect { callee: mangle_init(parent_name), args: vec![parent_self] }, IrType::Class(parent_name));
    }

    let vtable_ptr = b.emit(InstKind::VTableGlobalPtr(name), IrType::Ptr);
    let vtable_slot = b.emit(InstKind::FieldGep { object: self_param, class: name, slot: 0 }, IrType::Ptr);
    b.emit(InstKind::Store { ptr: vtable_slot, value: vtable_ptr }, IrType::Unit);

    if let Some(ast_class) = ast_class {
        let layout = b.class_layout(name);
        let own_start = layout.fields.len() - ast_class.fields.len();
        for (i, field) in ast_class.fields.iter().enumerate() {
            let slot_idx = own_start + i + 1;
            let field_ty = ir_type(field.ty);
            let value = match &field.init {
                Some(init_expr) => {
                    let (v, _) = b.lower_expr(init_expr);
                    b.bitcast(v, field_ty)
                }
                None => b.default_value(field_ty),
            };
            let ptr = b.emit(InstKind::FieldGep { object: self_param, class: name, slot: slot_idx }, IrType::Ptr);
            b.emit(InstKind::Store { ptr, value }, IrType::Unit);
        }
    }

    b.terminate(Terminator::Ret(Some(self_param)));

    Function { name: mangle_init(name), params: vec![(Symbol::intern("self"), self_ty)], ret: self_ty, blocks: b.blocks }
}

/// `<C>_new() : C*`.
fn lower_new(
    table: &ClassTable,
    classes: &[crate::ir::ClassLayout],
    vtables: &[crate::ir::VTableLayout],
    strings: &mut Vec<StringConst>,
    string_counter: &mut u32,
    class_id: ClassId,
) -> Function {
    let name = table.get(class_id).name;
    let self_ty = IrType::Class(name);
    let mut b = FnBuilder::new(table, classes, vtables, strings, string_counter);
    let entry = b.new_block();
    b.switch_to(entry);

    let size = b.emit(InstKind::SizeOf(name), IrType::Int32);
    let raw = b.emit(InstKind::CallDirect { callee: "malloc".to_string(), args: vec![size] }, IrType::Ptr);
    let typed = b.bitcast(raw, self_ty);
    let initialized = b.emit(InstKind::CallDirect { callee: mangle_init(name), args: vec![typed] }, self_ty);
    b.terminate(Terminator::Ret(Some(initialized)));

    Function { name: mangle_new(name), params: vec![], ret: self_ty, blocks: b.blocks }
}

/// A user-declared method, or `Main.main` lowered under the external
/// symbol `main` with an implicit `self` allocated inside.
fn lower_method(
    table: &ClassTable,
    classes: &[crate::ir::ClassLayout],
    vtables: &[crate::ir::VTableLayout],
    strings: &mut Vec<StringConst>,
    string_counter: &mut u32,
    class_id: ClassId,
    ast_class: &Class,
    method_idx: usize,
) -> Function {
    let class_name = table.get(class_id).name;
    let method = &ast_class.methods[method_idx];
    let is_entry_point = class_name.as_str() == "Main" && method.name.as_str() == "main";

    let mut b = FnBuilder::new(table, classes, vtables, strings, string_counter);
    let entry = b.new_block();
    b.switch_to(entry);

    let ret_ty = ir_type(method.ret_type);
    let params: Vec<(Symbol, IrType)> = if is_entry_point {
        Vec::new()
    } else {
        let mut p = vec![(Symbol::intern("self"), IrType::Class(class_name))];
        p.extend(method.formals.iter().map(|f| (f.name, ir_type(f.ty))));
        p
    };

    if is_entry_point {
        let self_value = b.emit(InstKind::CallDirect { callee: mangle_new(class_name), args: vec![] }, IrType::Class(class_name));
        b.self_value = Some(self_value);
        b.self_class = Some(class_name);
    } else {
        let self_param = b.emit(InstKind::Param(0), IrType::Class(class_name));
        b.self_value = Some(self_param);
        b.self_class = Some(class_name);
        for (i, formal) in method.formals.iter().enumerate() {
            let formal_ty = ir_type(formal.ty);
            let param = b.emit(InstKind::Param(i + 1), formal_ty);
            let slot = b.emit(InstKind::Alloca(formal_ty), IrType::Ptr);
            b.emit(InstKind::Store { ptr: slot, value: param }, IrType::Unit);
            b.push_local(formal.name, slot, formal_ty);
        }
    }

    let (result, _) = b.lower_expr(&method.body);
    let ret_value = if ret_ty == IrType::Unit { None } else { Some(result) };
    b.terminate(Terminator::Ret(ret_value));

    let fn_name = if is_entry_point { "main".to_string() } else { mangle_method(class_name, method.name) };
    Function { name: fn_name, params, ret: ret_ty, blocks: b.blocks }
}

/// Lowers the whole annotated program into one [`Module`].
pub fn lower(program: &Program, table: &ClassTable) -> Module {
    let (classes, vtables) = build_layouts(table);
    let mut strings = Vec::new();
    let mut string_counter = 0u32;
    let mut functions = Vec::new();

    let mut ast_by_name = std::collections::HashMap::new();
    for class in &program.classes {
        ast_by_name.insert(class.name, class);
    }

    for id in table.classes.indices() {
        let name = table.get(id).name;
        if name.as_str() == "Object" {
            continue;
        }
        let ast_class = ast_by_name.get(&name).copied();
        functions.push(lower_init(table, &classes, &vtables, &mut strings, &mut string_counter, id, ast_class));
        functions.push(lower_new(table, &classes, &vtables, &mut strings, &mut string_counter, id));
        if let Some(ast_class) = ast_class {
            for method_idx in 0..ast_class.methods.len() {
                functions.push(lower_method(table, &classes, &vtables, &mut strings, &mut string_counter, id, ast_class, method_idx));
            }
        }
    }

    Module { classes, vtables, strings, functions }
}
