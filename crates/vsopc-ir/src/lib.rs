//! Lowering from the annotated AST to a typed, explicit-basic-block
//! IR (spec §4.4): one record type per class and vtable, synthesized
//! `<C>_new`/`<C>_init`, and one function per user method.

pub mod ir;
mod layout;
mod lower;

pub use ir::{Block, Function, Inst, InstId, InstKind, IrType, Module, Terminator};
pub use layout::{ir_type, mangle_init, mangle_method, mangle_new};
pub use lower::lower;

#[cfg(test)]
mod tests {
    use super::*;
    use vsopc_util::FileId;

    fn build_module(src: &str, ext: bool) -> Module {
        let file = FileId(0);
        let tokens = vsopc_lex::Lexer::new(file, src, ext).tokenize(&mut vsopc_util::Handler::new());
        let mut program = vsopc_par::parse(&tokens, file, ext).expect("test program should parse");
        let table = vsopc_sem::analyze(&mut program).expect("test program should type-check");
        lower(&program, &table)
    }

    #[test]
    fn lowers_hello_world_without_panicking() {
        let module = build_module(
            "class Main {\n\
             main(): int32 {\n\
             self.print(\"Hello, world!\\x0a\");\n\
             0\n\
             }\n\
             }",
            false,
        );
        assert!(module.functions.iter().any(|f| f.name == "main"));
        assert!(module.functions.iter().any(|f| f.name == "Main_new"));
        assert!(module.functions.iter().any(|f| f.name == "Main_init"));
    }

    #[test]
    fn overriding_method_keeps_ancestors_vtable_slot() {
        let module = build_module(
            "class Shape {\n\
             area(): int32 { 0 }\n\
             }\n\
             class Square extends Shape {\n\
             side: int32;\n\
             area(): int32 { self.side * self.side }\n\
             }\n\
             class Main { main(): int32 { 0 } }",
            false,
        );
        let shape_vt = module.vtables.iter().find(|v| v.class.as_str() == "Shape").unwrap();
        let square_vt = module.vtables.iter().find(|v| v.class.as_str() == "Square").unwrap();
        assert_eq!(shape_vt.slot_of(vsopc_util::Symbol::intern("area")), square_vt.slot_of(vsopc_util::Symbol::intern("area")));
        assert!(module.functions.iter().any(|f| f.name == "Square_method_area"));
    }

    #[test]
    fn while_loop_has_three_blocks() {
        let module = build_module(
            "class Main {\n\
             main(): int32 {\n\
             let i: int32 <- 0 in\n\
             while i < 10 do i <- i + 1;\n\
             0\n\
             }\n\
             }",
            false,
        );
        let main_fn = module.functions.iter().find(|f| f.name == "main").unwrap();
        assert!(main_fn.blocks.len() >= 4);
    }
}
