//! The typed SSA-ish module (spec §4.4): class/vtable record layouts
//! plus one [`Function`] per synthesized `<C>_new`/`<C>_init` and per
//! user method, each a list of [`Block`]s ending in a [`Terminator`].
//!
//! Values are produced by [`Inst`]s and referenced by their [`InstId`]
//! within the owning function — not a true phi-node SSA, but the same
//! alloca/load/store discipline an unoptimized LLVM front end emits.

use vsopc_util::Symbol;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IrType {
    Int32,
    Bool,
    Unit,
    StringPtr,
    /// An opaque pointer, used for vtable slots and bitcast targets
    /// where the pointee doesn't matter to the IR itself.
    Ptr,
    Class(Symbol),
}

pub struct Module {
    pub classes: Vec<ClassLayout>,
    pub vtables: Vec<VTableLayout>,
    pub strings: Vec<StringConst>,
    pub functions: Vec<Function>,
}

/// `%struct.C` body, vtable slot implicit at offset 0. `fields[i]`
/// occupies slot `i + 1`.
pub struct ClassLayout {
    pub name: Symbol,
    pub parent: Option<Symbol>,
    pub fields: Vec<(Symbol, IrType)>,
}

impl ClassLayout {
    pub fn field_slot(&self, name: Symbol) -> Option<usize> {
        self.fields.iter().position(|(n, _)| *n == name).map(|i| i + 1)
    }
}

/// `%struct.CVTable` body: one function pointer per combined method
/// in insertion order.
pub struct VTableLayout {
    pub class: Symbol,
    pub slots: Vec<VTableSlot>,
}

impl VTableLayout {
    pub fn slot_of(&self, method: Symbol) -> Option<usize> {
        self.slots.iter().position(|s| s.method == method)
    }
}

pub struct VTableSlot {
    pub method: Symbol,
    /// The mangled name of the function actually installed in this
    /// slot — the overriding class's function if overridden, the
    /// ancestor's otherwise.
    pub fn_name: String,
    pub param_types: Vec<IrType>,
    pub ret_type: IrType,
}

pub struct StringConst {
    pub name: String,
    /// Raw bytes, NUL-terminated, as materialized in the global array.
    pub bytes: Vec<u8>,
}

pub type InstId = u32;
pub type BlockId = u32;

pub struct Function {
    pub name: String,
    pub params: Vec<(Symbol, IrType)>,
    pub ret: IrType,
    pub blocks: Vec<Block>,
}

pub struct Block {
    pub id: BlockId,
    pub insts: Vec<Inst>,
    pub term: Terminator,
}

pub struct Inst {
    pub id: InstId,
    pub ty: IrType,
    pub kind: InstKind,
}

pub enum InstKind {
    ConstInt(i32),
    ConstBool(bool),
    ConstUnit,
    /// Pointer to the first byte of a materialized string global.
    GlobalStringPtr(String),
    /// Pointer to a class's global constant vtable record.
    VTableGlobalPtr(Symbol),
    /// Reads an incoming parameter by its position in `Function::params`.
    Param(usize),

    Alloca(IrType),
    Load(InstId),
    /// A store yields the unit value, so it can sit inline in an
    /// instruction stream the same way every other expression does.
    Store { ptr: InstId, value: InstId },

    Add(InstId, InstId),
    Sub(InstId, InstId),
    Mul(InstId, InstId),
    Div(InstId, InstId),
    Lt(InstId, InstId),
    Le(InstId, InstId),
    /// `^`: both operands promoted to `double`, `pow` called, result
    /// truncated back to `int32`.
    Pow(InstId, InstId),
    /// `strcmp(a, b) == 0`.
    StrEq(InstId, InstId),
    /// Pointer-identity compare after bitcasting both sides to `Object*`.
    PtrEq(InstId, InstId),
    /// Primitive `=`/`<>` and `unit = unit` (always true) compares.
    IntEq(InstId, InstId),

    Neg(InstId),
    Not(InstId),
    IsNull(InstId),

    Bitcast { value: InstId, to: IrType },

    /// GEP to a class's own field slot, `object` already of type `class`.
    FieldGep { object: InstId, class: Symbol, slot: usize },
    /// Load the vtable pointer out of slot 0.
    VTableLoad(InstId),
    /// GEP into a vtable record to a method's function-pointer slot.
    VTableGep { vtable: InstId, slot: usize },

    /// Statically resolved call: `<C>_new`, `<C>_init`, `malloc`, `pow`.
    CallDirect { callee: String, args: Vec<InstId> },
    /// Virtual dispatch: load the slot's function pointer and call it.
    CallIndirect { fn_ptr: InstId, args: Vec<InstId>, ret: IrType },
    /// `sizeof(%struct.C)` via the GEP-of-null-pointer idiom.
    SizeOf(Symbol),
    /// A typed null pointer, used as a class field's default value.
    NullPtr(Symbol),
}

pub enum Terminator {
    Br(BlockId),
    CondBr { cond: InstId, then_block: BlockId, else_block: BlockId },
    Ret(Option<InstId>),
}
