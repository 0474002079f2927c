use pretty_assertions::assert_eq;

use super::{
    interpreter::{evaluate, evaluate_program_entry, Context},
    value::Value,
};
use crate::{
    ast::{
        ast::{Expr, Stmt},
        expressions::{BinaryOperator, UnaryOperator},
        types::Type,
    },
    parser::parser::parse_source,
    program::ProgramState,
    type_checker::{
        environment::Environment,
        type_checker::{verify, verify_all, VerifyMode},
    },
};

fn program(source: &str) -> ProgramState {
    let program = ProgramState::from_source(source, "test.kari").unwrap();
    let report = verify_all(&program, VerifyMode::Batch);
    assert!(report.ok, "{:?}", report.message);
    program
}

fn eval(source: &str, program: &ProgramState) -> Value {
    let expr = match parse_source(source, "test.kari").unwrap().remove(0) {
        Stmt::Expression(expr) => expr,
        other => panic!("expected an expression, found {:?}", other),
    };

    evaluate(&expr, program, &Context::new()).unwrap()
}

const FACT: &str = "funcdef fact(n: int) -> int = if n <= 1 then 1 else n * fact(n - 1);";

#[test]
fn test_arithmetic_precedence() {
    assert_eq!(eval("3 + 4 * 2", &ProgramState::new()), Value::Int(11));
    assert_eq!(eval("(3 + 4) * 2", &ProgramState::new()), Value::Int(14));
    assert_eq!(eval("10 - 3 - 2", &ProgramState::new()), Value::Int(5));
}

#[test]
fn test_division_truncates_toward_zero() {
    let program = ProgramState::new();

    assert_eq!(eval("7 / 2", &program), Value::Int(3));
    assert_eq!(eval("-7 / 2", &program), Value::Int(-3));
    assert_eq!(eval("-7 % 2", &program), Value::Int(-1));
    assert_eq!(eval("7 % -2", &program), Value::Int(1));
}

#[test]
fn test_comparisons_and_logic() {
    let program = ProgramState::new();

    assert_eq!(eval("1 < 2 && 2 <= 2", &program), Value::Bool(true));
    assert_eq!(eval("1 == 2 || 3 != 3", &program), Value::Bool(false));
    assert_eq!(eval("!(5 > 4) || 5 >= 6", &program), Value::Bool(false));
}

#[test]
fn test_recursion() {
    let program = program(FACT);

    assert_eq!(eval("fact(5)", &program), Value::Int(120));
    assert_eq!(eval("fact(0)", &program), Value::Int(1));
}

#[test]
fn test_conditional_evaluates_only_taken_branch() {
    let program = ProgramState::new();

    assert_eq!(eval("if true then 1 else undefined_func()", &program), Value::Int(1));
    assert_eq!(eval("if false then 1 / 0 else 2", &program), Value::Int(2));
}

#[test]
fn test_parameters_shadow_constants_in_calls() {
    let program = program("valdef x: int = 5; funcdef f(x: bool) -> bool = x;");

    assert_eq!(eval("f(true)", &program), Value::Bool(true));
    assert_eq!(eval("x", &program), Value::Int(5));
}

#[test]
fn test_callee_does_not_see_caller_locals() {
    let program = program(
        "
        valdef n: int = 100;
        funcdef outer(n: int) -> int = inner();
        funcdef inner() -> int = n;
        ",
    );

    assert_eq!(eval("outer(1)", &program), Value::Int(100));
}

#[test]
fn test_constants_are_reevaluated() {
    let program = program("valdef base: int = 6; valdef answer: int = base * 7;");

    assert_eq!(eval("answer", &program), Value::Int(42));
    assert_eq!(eval("answer + answer", &program), Value::Int(84));
}

#[test]
fn test_logical_operators_are_eager() {
    let program = ProgramState::new();
    let expr = parse_source("false && 1 / 0 == 0", "test.kari").unwrap().remove(0);

    let Stmt::Expression(expr) = expr else {
        panic!("expected an expression");
    };

    let error = evaluate(&expr, &program, &Context::new()).unwrap_err();
    assert_eq!(error.get_error_name(), "DivisionByZero");
}

#[test]
fn test_division_by_zero() {
    let program = program("funcdef main(n: int) -> int = 10 / n;");

    let error = evaluate_program_entry(&program, "main", 0).unwrap_err();
    assert_eq!(error.get_error_name(), "DivisionByZero");
    assert_eq!(evaluate_program_entry(&program, "main", 3).unwrap(), 3);
}

#[test]
fn test_division_overflow() {
    let program = program("funcdef main(n: int) -> int = -2147483648 / n;");

    let error = evaluate_program_entry(&program, "main", -1).unwrap_err();
    assert_eq!(error.get_error_name(), "ArithmeticOverflow");
}

#[test]
fn test_addition_and_negation_wrap() {
    let program = ProgramState::new();

    assert_eq!(eval("2147483647 + 1", &program), Value::Int(i32::MIN));
    assert_eq!(eval("-(-2147483648)", &program), Value::Int(i32::MIN));
    assert_eq!(eval("65536 * 65536", &program), Value::Int(0));
}

#[test]
fn test_program_entry() {
    let program = program(&format!(
        "{} valdef limit: int = 7; funcdef main(input: int) -> int = fact(input) % limit;",
        FACT
    ));

    assert_eq!(evaluate_program_entry(&program, "main", 5).unwrap(), 1);
    assert_eq!(evaluate_program_entry(&program, "main", 3).unwrap(), 6);
}

#[test]
fn test_missing_entry_function() {
    let program = program(FACT);

    let error = evaluate_program_entry(&program, "main", 1).unwrap_err();
    assert_eq!(error.get_error_name(), "EntryFunctionNotFound");
}

#[test]
fn test_invalid_entry_signatures() {
    let program = program(
        "
        funcdef two(a: int, b: int) -> int = a + b;
        funcdef flag(a: int) -> bool = a > 0;
        funcdef takes_bool(a: bool) -> int = 1;
        ",
    );

    for entry in ["two", "flag", "takes_bool"] {
        let error = evaluate_program_entry(&program, entry, 1).unwrap_err();
        assert_eq!(error.get_error_name(), "InvalidEntryFunction", "{}", entry);
    }
}

#[test]
fn test_unresolved_name_is_an_error() {
    let error = evaluate(&Expr::variable("ghost"), &ProgramState::new(), &Context::new()).unwrap_err();
    assert_eq!(error.get_error_name(), "UnresolvedName");
}

/// Small deterministic generator for well-typed expressions.
struct Generator {
    state: u64,
}

impl Generator {
    fn next(&mut self, bound: u64) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (self.state >> 33) % bound
    }

    fn expr(&mut self, ty: Type, depth: u32) -> Expr {
        let leaf = depth == 0 || self.next(4) == 0;

        match (ty, leaf) {
            (Type::Int, true) => match self.next(3) {
                0 => Expr::variable("base"),
                _ => Expr::int(self.next(200) as i32 - 100),
            },
            (Type::Bool, true) => match self.next(3) {
                0 => Expr::variable("enabled"),
                _ => Expr::boolean(self.next(2) == 0),
            },
            (Type::Int, false) => match self.next(6) {
                0 => Expr::unary(UnaryOperator::Neg, self.expr(Type::Int, depth - 1)),
                1 => Expr::conditional(
                    self.expr(Type::Bool, depth - 1),
                    self.expr(Type::Int, depth - 1),
                    self.expr(Type::Int, depth - 1),
                ),
                2 => Expr::call("scale", vec![self.expr(Type::Int, depth - 1)]),
                3 => Expr::binary(
                    [BinaryOperator::Div, BinaryOperator::Mod][self.next(2) as usize],
                    self.expr(Type::Int, depth - 1),
                    Expr::int(self.next(9) as i32 + 1),
                ),
                _ => Expr::binary(
                    [BinaryOperator::Add, BinaryOperator::Mul][self.next(2) as usize],
                    self.expr(Type::Int, depth - 1),
                    self.expr(Type::Int, depth - 1),
                ),
            },
            (Type::Bool, false) => match self.next(5) {
                0 => Expr::unary(UnaryOperator::Not, self.expr(Type::Bool, depth - 1)),
                1 => Expr::binary(
                    [BinaryOperator::And, BinaryOperator::Or][self.next(2) as usize],
                    self.expr(Type::Bool, depth - 1),
                    self.expr(Type::Bool, depth - 1),
                ),
                2 => Expr::call("positive", vec![self.expr(Type::Int, depth - 1)]),
                _ => Expr::binary(
                    [
                        BinaryOperator::Eq,
                        BinaryOperator::Ne,
                        BinaryOperator::Lt,
                        BinaryOperator::Le,
                        BinaryOperator::Gt,
                        BinaryOperator::Ge,
                    ][self.next(6) as usize],
                    self.expr(Type::Int, depth - 1),
                    self.expr(Type::Int, depth - 1),
                ),
            },
        }
    }
}

#[test]
fn test_well_typed_expressions_evaluate_to_their_type() {
    let program = program(
        "
        valdef base: int = 3;
        valdef enabled: bool = base > 2;
        funcdef scale(n: int) -> int = n * base;
        funcdef positive(n: int) -> bool = n > 0;
        ",
    );
    let mut generator = Generator { state: 0x5eed };

    for round in 0..300 {
        let ty = if round % 2 == 0 { Type::Int } else { Type::Bool };
        let expr = generator.expr(ty, 5);

        assert!(
            verify(&expr, ty, &program, &Environment::new()),
            "generated `{}` does not verify as {}",
            expr,
            ty
        );

        let value = evaluate(&expr, &program, &Context::new()).unwrap();
        assert_eq!(value.get_type(), ty, "`{}` evaluated to {}", expr, value);
    }
}
