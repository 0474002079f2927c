use tracing::debug;

use crate::{
    ast::{
        ast::{Expr, ExprKind, Verification},
        statements::{ConstantDef, FunctionDef},
        types::Type,
    },
    errors::errors::{Error, ErrorImpl},
    program::{Definition, ProgramState},
};

use super::environment::Environment;

/// How `verify_all` reacts to a failing definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyMode {
    /// Stop at the first failing definition.
    Batch,
    /// Check every definition and collect all failures.
    Exhaustive,
}

/// Outcome of a whole-program verification.
#[derive(Debug)]
pub struct VerificationReport {
    pub ok: bool,
    pub first_failing: Option<String>,
    pub message: Option<String>,
    pub failures: Vec<(String, Error)>,
}

impl VerificationReport {
    /// The first failure as an error, for callers that propagate with `?`.
    pub fn into_result(self) -> Result<(), Error> {
        match self.failures.into_iter().next() {
            Some((_, error)) => Err(error),
            None => Ok(()),
        }
    }
}

/// Verifies expressions and definitions against the global tables.
///
/// Names resolve to function parameters first and global constants second.
/// The evaluator and the code generator use the same order.
pub struct TypeChecker<'a> {
    program: &'a ProgramState,
}

impl<'a> TypeChecker<'a> {
    pub fn new(program: &'a ProgramState) -> Self {
        TypeChecker { program }
    }

    /// Computes the type an expression would have, without checking it.
    ///
    /// Variables and calls resolve through the global tables only and
    /// default to `int` when the name is unknown.
    pub fn deduce_type(&self, expr: &Expr) -> Type {
        let ty = match &expr.kind {
            ExprKind::IntLiteral(_) => Type::Int,
            ExprKind::BoolLiteral(_) => Type::Bool,
            ExprKind::VariableRef(name) => self
                .program
                .constant(name)
                .map(|constant| constant.declared_type)
                .unwrap_or(Type::Int),
            ExprKind::UnaryOp { operator, .. } => operator.operand_type(),
            ExprKind::BinaryOp { operator, .. } => operator.result_type(),
            ExprKind::Conditional { then_branch, .. } => self.deduce_type(then_branch),
            ExprKind::Call { function, .. } => self
                .program
                .function(function)
                .map(|function| function.return_type)
                .unwrap_or(Type::Int),
        };

        expr.cache_type(ty);
        ty
    }

    /// Silent verification: whether `expr` checks as `expected`.
    pub fn verify(&self, expr: &Expr, expected: Type, environment: &Environment) -> bool {
        self.verify_expr(expr, expected, environment).is_ok()
    }

    /// Diagnostic verification. The error names the offending subexpression.
    ///
    /// Every visited node records its outcome in its memo cells.
    pub fn verify_expr(
        &self,
        expr: &Expr,
        expected: Type,
        environment: &Environment,
    ) -> Result<(), Error> {
        let result = self.check_expr(expr, expected, environment);

        match result {
            Ok(()) => {
                expr.cache_type(expected);
                expr.set_verification(Verification::Correct);
            }
            Err(_) => expr.set_verification(Verification::Incorrect),
        }

        result
    }

    fn check_expr(&self, expr: &Expr, expected: Type, environment: &Environment) -> Result<(), Error> {
        match &expr.kind {
            ExprKind::IntLiteral(_) => expect_type(expr, expected, Type::Int),
            ExprKind::BoolLiteral(_) => expect_type(expr, expected, Type::Bool),
            ExprKind::VariableRef(name) => {
                let received = if let Some(ty) = environment.get_variable(name) {
                    ty
                } else if let Some(constant) = self.program.constant(name) {
                    constant.declared_type
                } else {
                    return Err(Error::new(
                        ErrorImpl::VariableNotDeclared {
                            variable: name.clone(),
                        },
                        expr.get_span().start.clone(),
                    ));
                };

                expect_type(expr, expected, received)
            }
            ExprKind::UnaryOp { operator, operand } => {
                expect_type(expr, expected, operator.operand_type())?;
                self.verify_expr(operand, operator.operand_type(), environment)
            }
            ExprKind::BinaryOp {
                operator,
                left,
                right,
            } => {
                expect_type(expr, expected, operator.result_type())?;
                self.verify_expr(left, operator.operand_type(), environment)?;
                self.verify_expr(right, operator.operand_type(), environment)
            }
            ExprKind::Conditional {
                condition,
                then_branch,
                else_branch,
            } => {
                self.verify_expr(condition, Type::Bool, environment)?;
                self.verify_expr(then_branch, expected, environment)?;
                self.verify_expr(else_branch, expected, environment)
            }
            ExprKind::Call {
                function,
                arguments,
            } => {
                let position = expr.get_span().start.clone();
                let Some(callee) = self.program.function(function) else {
                    return Err(Error::new(
                        ErrorImpl::FunctionNotDeclared {
                            function: function.clone(),
                        },
                        position,
                    ));
                };

                let expected_count = callee.parameters.len();
                if arguments.len() > expected_count {
                    return Err(Error::new(
                        ErrorImpl::UnexpectedArguments {
                            function: function.clone(),
                            expected: expected_count,
                            received: arguments.len(),
                        },
                        position,
                    ));
                } else if arguments.len() < expected_count {
                    return Err(Error::new(
                        ErrorImpl::MissingArguments {
                            function: function.clone(),
                            expected: expected_count,
                            received: arguments.len(),
                        },
                        position,
                    ));
                }

                if callee.return_type != expected {
                    return Err(Error::new(
                        ErrorImpl::ReturnTypeMatchError {
                            function: function.clone(),
                            expected: expected.to_string(),
                            received: callee.return_type.to_string(),
                        },
                        position,
                    ));
                }

                for (argument, parameter) in arguments.iter().zip(&callee.parameters) {
                    self.verify_expr(argument, parameter.ty, environment)?;
                }

                Ok(())
            }
        }
    }

    /// Checks a constant's body against its declared type.
    ///
    /// A constant that already verified correctly is not checked again.
    pub fn verify_constant(&self, constant: &ConstantDef) -> Result<(), Error> {
        if constant.verification().is_correct() {
            return Ok(());
        }

        let result = self.verify_expr(&constant.body, constant.declared_type, &Environment::new());
        constant.set_verification(outcome(&result));
        debug!(
            "verified constant `{}`: {:?}",
            constant.name,
            constant.verification()
        );

        result
    }

    /// Checks a function's body against its return type, with its
    /// parameters in scope.
    ///
    /// A function that already verified correctly is not checked again.
    pub fn verify_function(&self, function: &FunctionDef) -> Result<(), Error> {
        if function.verification().is_correct() {
            return Ok(());
        }

        let result = Environment::from_parameters(function).and_then(|environment| {
            self.verify_expr(&function.body, function.return_type, &environment)
        });
        function.set_verification(outcome(&result));
        debug!(
            "verified function `{}`: {:?}",
            function.name,
            function.verification()
        );

        result
    }

    pub fn verify_definition(&self, definition: Definition<'_>) -> Result<(), Error> {
        match definition {
            Definition::Constant(constant) => self.verify_constant(constant),
            Definition::Function(function) => self.verify_function(function),
        }
    }
}

fn outcome(result: &Result<(), Error>) -> Verification {
    if result.is_ok() {
        Verification::Correct
    } else {
        Verification::Incorrect
    }
}

fn expect_type(expr: &Expr, expected: Type, received: Type) -> Result<(), Error> {
    if expected == received {
        Ok(())
    } else {
        Err(Error::new(
            ErrorImpl::TypeMatchError {
                expression: expr.to_string(),
                expected: expected.to_string(),
                received: received.to_string(),
            },
            expr.get_span().start.clone(),
        ))
    }
}

/// Deduces the type of `expr` against the global tables.
pub fn deduce_type(expr: &Expr, program: &ProgramState) -> Type {
    TypeChecker::new(program).deduce_type(expr)
}

/// Silent verification of `expr` against `expected`.
pub fn verify(expr: &Expr, expected: Type, program: &ProgramState, environment: &Environment) -> bool {
    TypeChecker::new(program).verify(expr, expected, environment)
}

/// Diagnostic verification of `expr` against `expected`.
pub fn verify_expr(
    expr: &Expr,
    expected: Type,
    program: &ProgramState,
    environment: &Environment,
) -> Result<(), Error> {
    TypeChecker::new(program).verify_expr(expr, expected, environment)
}

/// Verifies every definition in insertion order, each at most once.
///
/// # Arguments
///
/// * `program` - The definitions to check; memo cells are updated in place
/// * `mode` - `Batch` stops at the first failure, `Exhaustive` checks all
///
/// # Returns
///
/// A report naming the first failing definition and every collected error.
pub fn verify_all(program: &ProgramState, mode: VerifyMode) -> VerificationReport {
    let type_checker = TypeChecker::new(program);
    let mut failures = Vec::new();

    for definition in program.definitions() {
        if let Err(error) = type_checker.verify_definition(definition) {
            failures.push((definition.name().to_string(), error));

            if mode == VerifyMode::Batch {
                break;
            }
        }
    }

    VerificationReport {
        ok: failures.is_empty(),
        first_failing: failures.first().map(|(name, _)| name.clone()),
        message: failures.first().map(|(_, error)| error.to_string()),
        failures,
    }
}
