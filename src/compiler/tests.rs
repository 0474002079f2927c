use inkwell::context::Context;

use super::{compiler::Compiler, jit::run_entry};
use crate::{
    interpreter::interpreter::evaluate_program_entry,
    program::ProgramState,
    type_checker::type_checker::{verify_all, VerifyMode},
};

const PROGRAM: &str = "
    valdef limit: int = 10;
    valdef debug: bool = false;
    funcdef fact(n: int) -> int = if n <= 1 then 1 else n * fact(n - 1);
    funcdef pick(x: int, flag: bool) -> int = if flag && !debug then x else -x;
    funcdef main(input: int) -> int = pick(fact(input) % limit, input > 2);
";

fn verified(source: &str) -> ProgramState {
    let program = ProgramState::from_source(source, "test.kari").unwrap();
    assert!(verify_all(&program, VerifyMode::Batch).ok);
    program
}

#[test]
fn test_lowered_module_verifies() {
    let program = verified(PROGRAM);
    let context = Context::create();
    let mut compiler = Compiler::new(&context, "test");

    compiler.compile_program(&program).unwrap();
    compiler.verify().unwrap();

    for symbol in [
        "kari.const.limit",
        "kari.const.debug",
        "kari.fn.fact",
        "kari.fn.pick",
        "kari.fn.main",
        "kari.fault",
    ] {
        assert!(compiler.module.get_function(symbol).is_some(), "{} missing", symbol);
    }
    assert!(compiler.module.get_function("main").is_none());
}

#[test]
fn test_executable_has_c_main() {
    let program = verified(PROGRAM);
    let context = Context::create();
    let mut compiler = Compiler::new(&context, "test");

    compiler.compile_executable(&program, "main").unwrap();
    compiler.verify().unwrap();

    let main = compiler.module.get_function("main").unwrap();
    assert_eq!(main.count_params(), 2);

    let ir = compiler.module.print_to_string().to_string();
    assert!(ir.contains("@atoi"));
    assert!(ir.contains("Input: %d"));
}

#[test]
fn test_division_is_guarded() {
    let program = verified("funcdef main(n: int) -> int = 100 / n + 100 % n;");
    let context = Context::create();
    let mut compiler = Compiler::new(&context, "test");

    compiler.compile_program(&program).unwrap();
    compiler.verify().unwrap();

    let ir = compiler.module.print_to_string().to_string();
    assert!(ir.contains("call void @kari.fault"));
    assert!(ir.contains("sdiv"));
    assert!(ir.contains("srem"));
}

#[test]
fn test_unverified_program_is_rejected() {
    let program = ProgramState::from_source("valdef x: int = 1;", "test.kari").unwrap();
    let context = Context::create();
    let mut compiler = Compiler::new(&context, "test");

    let error = compiler.compile_program(&program).unwrap_err();
    assert_eq!(error.get_error_name(), "NotVerified");
}

#[test]
fn test_executable_requires_entry_shape() {
    let program = verified("funcdef main(a: bool) -> int = 1;");
    let context = Context::create();
    let mut compiler = Compiler::new(&context, "test");

    let error = compiler.compile_executable(&program, "main").unwrap_err();
    assert_eq!(error.get_error_name(), "InvalidEntryFunction");
}

#[test]
fn test_jit_agrees_with_interpreter() {
    let program = verified(PROGRAM);

    for input in [0, 1, 2, 3, 5, 7] {
        assert_eq!(
            run_entry(&program, "main", input).unwrap(),
            evaluate_program_entry(&program, "main", input).unwrap(),
            "input {}",
            input
        );
    }
}

#[test]
fn test_jit_parameters_shadow_constants() {
    let program = verified(
        "
        valdef x: int = 5;
        funcdef f(x: int) -> int = x * 2;
        funcdef main(input: int) -> int = f(input) + x;
        ",
    );

    assert_eq!(run_entry(&program, "main", 4).unwrap(), 13);
}
