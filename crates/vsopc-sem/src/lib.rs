//! Semantic analysis (spec §4.3/§7): class graph construction,
//! member/body validation, and type synthesis over a parsed program.
//!
//! Analysis fails fast: the first error found is returned, matching
//! the lexer's "accumulate everything" behavior being the one
//! exception rather than the rule.

pub mod class_table;
pub mod error;
pub mod infer;
mod pass_a;
mod pass_b;
pub mod scope;

use vsopc_par::ast::Program;
use vsopc_util::{Diagnostic, Phase};

pub use class_table::{ClassId, ClassInfo, ClassTable};
pub use error::{Diagnosed, SemError};

/// Runs every semantic analysis pass over `program`, annotating each
/// expression's `resolved_type` in place. On success, the returned
/// [`ClassTable`] is what `vsopc-ir` lowers against.
pub fn analyze(program: &mut Program) -> Result<ClassTable, Diagnosed> {
    let mut table = ClassTable::new();
    let object_id = pass_a::inject_object(&mut table);
    let ids = pass_a::register_classes(&mut table, program)?;
    pass_a::resolve_parents(&mut table, program, &ids)?;
    pass_a::check_main_exists(&table)?;
    let order = pass_a::topological_order(&table, object_id);
    pass_b::run(&mut table, program, &ids, object_id, &order)?;
    Ok(table)
}

/// Runs [`analyze`], converting any error into the diagnostic line
/// format shared with the lexical and syntax phases.
pub fn check(program: &mut Program, file: vsopc_util::FileId) -> Result<ClassTable, Diagnostic> {
    analyze(program).map_err(|diagnosed| {
        let mut span = diagnosed.span;
        span.file = file;
        Diagnostic::new(Phase::Semantic, diagnosed.error.to_string(), span)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str, ext: bool) -> Program {
        let file = vsopc_util::FileId(0);
        let tokens = vsopc_lex::Lexer::new(file, src, ext).tokenize(&mut vsopc_util::Handler::new());
        vsopc_par::parse(&tokens, file, ext).expect("test program should parse")
    }

    #[test]
    fn accepts_minimal_hello_program() {
        let mut program = parse(
            "class Main {\n\
             main(): int32 {\n\
             self.print(\"Hello\");\n\
             0\n\
             }\n\
             }",
            false,
        );
        analyze(&mut program).expect("minimal program should type-check");
    }

    #[test]
    fn rejects_program_without_main_class() {
        let mut program = parse("class Other { x: int32 }", false);
        let err = analyze(&mut program).unwrap_err();
        assert!(matches!(err.error, SemError::MissingMain));
    }

    #[test]
    fn rejects_inheritance_cycle() {
        let mut program = parse(
            "class A extends B { }\n\
             class B extends A { }\n\
             class Main { main(): int32 { 0 } }",
            false,
        );
        let err = analyze(&mut program).unwrap_err();
        assert!(matches!(err.error, SemError::InheritanceCycle));
    }

    #[test]
    fn rejects_shadowed_field() {
        let mut program = parse(
            "class A { x: int32 }\n\
             class B extends A { x: int32 }\n\
             class Main { main(): int32 { 0 } }",
            false,
        );
        let err = analyze(&mut program).unwrap_err();
        assert!(matches!(err.error, SemError::ShadowedField(_)));
    }

    #[test]
    fn if_branches_join_to_common_ancestor() {
        let mut program = parse(
            "class Animal { }\n\
             class Dog extends Animal { }\n\
             class Cat extends Animal { }\n\
             class Main {\n\
             main(): int32 {\n\
             let a: Animal <- if true then new Dog else new Cat in 0\n\
             }\n\
             }",
            false,
        );
        analyze(&mut program).expect("branches should join at Animal");
    }

    #[test]
    fn rejects_assign_to_self() {
        let mut program = parse(
            "class Main {\n\
             main(): int32 { self <- self; 0 }\n\
             }",
            false,
        );
        let err = analyze(&mut program).unwrap_err();
        assert!(matches!(err.error, SemError::SelfAssignment));
    }

    #[test]
    fn rejects_wrong_argument_count() {
        let mut program = parse(
            "class Main {\n\
             main(): int32 { self.print(); 0 }\n\
             }",
            false,
        );
        let err = analyze(&mut program).unwrap_err();
        assert!(matches!(err.error, SemError::WrongArity { .. }));
    }
}
