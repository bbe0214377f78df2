//! The class symbol table (spec §3/§9 Design Notes).
//!
//! Classes live in an arena indexed by [`ClassId`] rather than behind
//! `Rc`/`RefCell` — `parent` is just another `ClassId`, and cycle
//! detection is a DFS over indices instead of pointer-chasing.

use vsopc_util::span::Span;
use vsopc_util::{define_idx, FxHashMap, Symbol};
use vsopc_par::ast::TypeName;

define_idx! {
    pub struct ClassId;
}

#[derive(Clone, Debug)]
pub struct FieldInfo {
    pub name: Symbol,
    pub ty: TypeName,
    pub span: Span,
    /// The class that declares this field, for shadowing checks.
    pub owner: ClassId,
}

#[derive(Clone, Debug)]
pub struct MethodInfo {
    pub name: Symbol,
    pub formals: Vec<(Symbol, TypeName)>,
    pub ret_type: TypeName,
    pub span: Span,
    pub owner: ClassId,
}

#[derive(Debug)]
pub struct ClassInfo {
    pub name: Symbol,
    pub parent: Option<ClassId>,
    pub span: Span,
    /// `[inherited in ancestor declaration order, then own in source order]`.
    pub fields: Vec<FieldInfo>,
    pub methods: Vec<MethodInfo>,
}

impl ClassInfo {
    pub fn find_field(&self, name: Symbol) -> Option<&FieldInfo> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn find_method(&self, name: Symbol) -> Option<&MethodInfo> {
        self.methods.iter().find(|m| m.name == name)
    }

    /// Slot index of a method within this class's vtable, i.e. its
    /// position in the combined insertion order.
    pub fn method_slot(&self, name: Symbol) -> Option<usize> {
        self.methods.iter().position(|m| m.name == name)
    }

    pub fn field_slot(&self, name: Symbol) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }
}

#[derive(Debug)]
pub struct ClassTable {
    pub classes: vsopc_util::IndexVec<ClassId, ClassInfo>,
    by_name: FxHashMap<Symbol, ClassId>,
}

impl ClassTable {
    pub fn new() -> Self {
        Self { classes: vsopc_util::IndexVec::new(), by_name: FxHashMap::default() }
    }

    pub fn insert(&mut self, info: ClassInfo) -> ClassId {
        let name = info.name;
        let id = self.classes.push(info);
        self.by_name.insert(name, id);
        id
    }

    pub fn lookup(&self, name: Symbol) -> Option<ClassId> {
        self.by_name.get(&name).copied()
    }

    pub fn get(&self, id: ClassId) -> &ClassInfo {
        &self.classes[id]
    }

    pub fn get_mut(&mut self, id: ClassId) -> &mut ClassInfo {
        &mut self.classes[id]
    }

    /// `A <: B` iff `A == B` or `B` is reachable from `A` via
    /// iterated `parent`.
    pub fn is_subtype(&self, a: ClassId, b: ClassId) -> bool {
        let mut cur = Some(a);
        while let Some(id) = cur {
            if id == b {
                return true;
            }
            cur = self.get(id).parent;
        }
        false
    }

    /// The first common ancestor of `a` and `b`. Always terminates at
    /// `Object` since every chain does.
    pub fn lub(&self, a: ClassId, b: ClassId) -> ClassId {
        let mut a_chain = Vec::new();
        let mut cur = Some(a);
        while let Some(id) = cur {
            a_chain.push(id);
            cur = self.get(id).parent;
        }
        let mut cur = Some(b);
        while let Some(id) = cur {
            if a_chain.contains(&id) {
                return id;
            }
            cur = self.get(id).parent;
        }
        unreachable!("every class chain terminates at Object")
    }
}

impl Default for ClassTable {
    fn default() -> Self {
        Self::new()
    }
}
