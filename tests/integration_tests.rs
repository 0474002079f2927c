//! Integration tests for the end-to-end pipeline.
//!
//! These tests drive source text through tokenization, parsing, loading,
//! verification, evaluation and LLVM IR generation.

use std::rc::Rc;

use inkwell::context::Context;
use kari::{
    compiler::{compiler::Compiler, jit::run_entry},
    interpreter::{
        interpreter::{evaluate_program_entry, DEFAULT_ENTRY},
        value::Value,
    },
    lexer::lexer::tokenize,
    parser::parser::parse,
    program::ProgramState,
    render_error,
    session::{ExecutionMode, Outcome, Session},
    type_checker::type_checker::{verify_all, VerifyMode},
};
use pretty_assertions::assert_eq;

const COLLATZ: &str = "
// number of collatz steps needed to reach 1
valdef limit: int = 1000;

funcdef even(n: int) -> bool = n % 2 == 0;
funcdef next(n: int) -> int = if even(n) then n / 2 else 3 * n + 1;
funcdef steps(n: int, count: int) -> int =
    if n <= 1 || count >= limit then count else steps(next(n), count + 1);
funcdef main(input: int) -> int = steps(input, 0);
";

fn load(source: &str) -> ProgramState {
    let tokens = tokenize(source.to_string(), Some("test.kari".to_string())).unwrap();
    let statements = parse(tokens, Rc::new("test.kari".to_string())).unwrap();

    let mut program = ProgramState::new();
    program.load(statements).unwrap();
    program
}

#[test]
fn test_interpret_program() {
    let program = load(COLLATZ);
    let report = verify_all(&program, VerifyMode::Batch);
    assert!(report.ok, "{:?}", report.message);

    assert_eq!(evaluate_program_entry(&program, DEFAULT_ENTRY, 1).unwrap(), 0);
    assert_eq!(evaluate_program_entry(&program, DEFAULT_ENTRY, 6).unwrap(), 8);
    assert_eq!(evaluate_program_entry(&program, DEFAULT_ENTRY, 27).unwrap(), 111);
}

#[test]
fn test_jit_matches_interpreter() {
    let program = load(COLLATZ);
    assert!(verify_all(&program, VerifyMode::Batch).ok);

    for input in [1, 6, 7, 27, 97] {
        assert_eq!(
            run_entry(&program, DEFAULT_ENTRY, input).unwrap(),
            evaluate_program_entry(&program, DEFAULT_ENTRY, input).unwrap()
        );
    }
}

#[test]
fn test_write_ir() {
    let program = load(COLLATZ);
    assert!(verify_all(&program, VerifyMode::Batch).ok);

    let context = Context::create();
    let mut compiler = Compiler::new(&context, "collatz");
    compiler.compile_executable(&program, DEFAULT_ENTRY).unwrap();
    compiler.verify().unwrap();

    let path = std::env::temp_dir().join(format!("kari_collatz_{}.ll", std::process::id()));
    compiler.write_ir(&path).unwrap();

    let ir = std::fs::read_to_string(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert!(ir.contains("define i32 @main(i32"));
    assert!(ir.contains("@kari.fn.steps"));
    assert!(ir.contains("@kari.const.limit"));
}

#[test]
fn test_exhaustive_check_reports_in_order() {
    let program = load(
        "
        funcdef a() -> int = b(1);
        funcdef b(x: int, y: int) -> int = x + y;
        valdef c: bool = 1 < true;
        funcdef d(n: int, n: int) -> int = n;
        ",
    );

    let report = verify_all(&program, VerifyMode::Exhaustive);
    let failures = report
        .failures
        .iter()
        .map(|(name, error)| (name.as_str(), error.get_error_name()))
        .collect::<Vec<(&str, &str)>>();

    assert_eq!(
        failures,
        vec![
            ("a", "MissingArguments"),
            ("c", "TypeMatchError"),
            ("d", "DuplicateParameter"),
        ]
    );
    assert_eq!(report.first_failing.as_deref(), Some("a"));
}

#[test]
fn test_duplicate_definitions_in_batch() {
    let tokens = tokenize(
        "valdef x: int = 1; valdef x: int = 2;".to_string(),
        Some("test.kari".to_string()),
    )
    .unwrap();
    let statements = parse(tokens, Rc::new("test.kari".to_string())).unwrap();

    let mut program = ProgramState::new();
    let error = program.load(statements).unwrap_err();

    assert_eq!(error.get_error_name(), "VariableAlreadyDeclared");
}

#[test]
fn test_error_report_points_at_subexpression() {
    let source = "valdef ok: int = 1;\nvaldef bad: int = ok + false;";
    let program = load(source);

    let report = verify_all(&program, VerifyMode::Batch);
    let (_, error) = &report.failures[0];
    let rendered = render_error(error, source, "test.kari");

    assert!(rendered.starts_with("Error: TypeMatchError"));
    assert!(rendered.contains("2 | valdef bad: int = ok + false;"));
}

#[test]
fn test_repl_session() {
    let mut session = Session::default();

    session.execute("funcdef double(n: int) -> int = n * 2;").unwrap();
    session.execute("valdef base: int = double(21);").unwrap();

    assert_eq!(
        session.execute("base == 42").unwrap(),
        vec![Outcome::Evaluated(Value::Bool(true))]
    );

    // A failing redefinition keeps the old function
    assert!(session.execute("funcdef double(n: int) -> bool = n;").is_err());
    assert_eq!(
        session.execute("double(5)").unwrap(),
        vec![Outcome::Evaluated(Value::Int(10))]
    );
}

#[test]
fn test_session_runs_entry_in_both_modes() {
    let mut session = Session::new("test.kari");
    session.load(COLLATZ).unwrap();

    let interpreted = session
        .run_entry(DEFAULT_ENTRY, 27, ExecutionMode::Interpret)
        .unwrap();
    let compiled = session.run_entry(DEFAULT_ENTRY, 27, ExecutionMode::Jit).unwrap();

    assert_eq!(interpreted, compiled);
}
