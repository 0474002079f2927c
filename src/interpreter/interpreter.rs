use std::collections::HashMap;

use tracing::trace;

use crate::{
    ast::{
        ast::{Expr, ExprKind},
        expressions::{BinaryOperator, UnaryOperator},
        statements::{ConstantDef, FunctionDef},
        types::Type,
    },
    errors::errors::{Error, ErrorImpl},
    program::ProgramState,
    Position,
};

use super::value::Value;

/// Name of the entry function used when none is given.
pub const DEFAULT_ENTRY: &str = "main";

/// The local bindings of one function activation.
#[derive(Debug, Default, Clone)]
pub struct Context {
    variables: HashMap<String, Value>,
}

impl Context {
    pub fn new() -> Self {
        Context::default()
    }

    pub fn bind(&mut self, name: &str, value: Value) {
        self.variables.insert(name.to_string(), value);
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.variables.get(name).copied()
    }
}

/// Evaluates `expr` under `context`, resolving globals through `program`.
///
/// Parameters bound in `context` shadow global constants of the same name.
///
/// # Arguments
///
/// * `expr` - A verified expression
/// * `program` - Global constants and functions
/// * `context` - Parameter bindings of the enclosing call
///
/// # Returns
///
/// The value of `expr`, or a runtime error such as `DivisionByZero`.
pub fn evaluate(expr: &Expr, program: &ProgramState, context: &Context) -> Result<Value, Error> {
    match &expr.kind {
        ExprKind::IntLiteral(value) => Ok(Value::Int(*value)),
        ExprKind::BoolLiteral(value) => Ok(Value::Bool(*value)),
        ExprKind::VariableRef(name) => {
            if let Some(value) = context.get(name) {
                return Ok(value);
            }

            match program.constant(name) {
                Some(constant) => evaluate_constant(constant, program),
                None => Err(unresolved(name, expr)),
            }
        }
        ExprKind::UnaryOp { operator, operand } => {
            let value = evaluate(operand, program, context)?;

            match operator {
                UnaryOperator::Not => Ok(Value::Bool(!expect_bool(value, operand)?)),
                UnaryOperator::Neg => Ok(Value::Int(expect_int(value, operand)?.wrapping_neg())),
            }
        }
        ExprKind::BinaryOp {
            operator,
            left,
            right,
        } => {
            let lhs = evaluate(left, program, context)?;
            let rhs = evaluate(right, program, context)?;

            eval_binary(*operator, lhs, rhs, left, right, expr.get_span().start.clone())
        }
        ExprKind::Conditional {
            condition,
            then_branch,
            else_branch,
        } => {
            if expect_bool(evaluate(condition, program, context)?, condition)? {
                evaluate(then_branch, program, context)
            } else {
                evaluate(else_branch, program, context)
            }
        }
        ExprKind::Call {
            function,
            arguments,
        } => {
            let Some(callee) = program.function(function) else {
                return Err(unresolved(function, expr));
            };

            let values = arguments
                .iter()
                .map(|argument| evaluate(argument, program, context))
                .collect::<Result<Vec<Value>, Error>>()?;

            call_function(callee, &values, program, expr.get_span().start.clone())
        }
    }
}

/// Evaluates a constant's body afresh. Constants are not cached.
pub fn evaluate_constant(constant: &ConstantDef, program: &ProgramState) -> Result<Value, Error> {
    evaluate(&constant.body, program, &Context::new())
}

/// Binds `arguments` positionally into a fresh context and evaluates the
/// function body there.
///
/// # Arguments
///
/// * `function` - The callee
/// * `arguments` - Already evaluated argument values
/// * `program` - Global constants and functions
/// * `position` - Call site, used for arity errors
pub fn call_function(
    function: &FunctionDef,
    arguments: &[Value],
    program: &ProgramState,
    position: Position,
) -> Result<Value, Error> {
    let expected = function.parameters.len();
    if arguments.len() > expected {
        return Err(Error::new(
            ErrorImpl::UnexpectedArguments {
                function: function.name.clone(),
                expected,
                received: arguments.len(),
            },
            position,
        ));
    } else if arguments.len() < expected {
        return Err(Error::new(
            ErrorImpl::MissingArguments {
                function: function.name.clone(),
                expected,
                received: arguments.len(),
            },
            position,
        ));
    }

    trace!("calling `{}` with {:?}", function.name, arguments);

    let mut context = Context::new();
    for (parameter, value) in function.parameters.iter().zip(arguments) {
        context.bind(&parameter.name, *value);
    }

    evaluate(&function.body, program, &context)
}

/// Runs the `(int) -> int` entry function `entry` on `input`.
///
/// # Returns
///
/// The entry's result, `EntryFunctionNotFound` if no such function exists,
/// or `InvalidEntryFunction` if its signature is not `(int) -> int`.
pub fn evaluate_program_entry(program: &ProgramState, entry: &str, input: i32) -> Result<i32, Error> {
    let function = entry_function(program, entry)?;

    let result = call_function(function, &[Value::Int(input)], program, function.span.start.clone())?;

    result.as_int().ok_or_else(|| {
        Error::new(
            ErrorImpl::InvalidEntryFunction {
                function: entry.to_string(),
                signature: function.signature(),
            },
            function.span.start.clone(),
        )
    })
}

/// Looks up `entry` and checks it has the `(int) -> int` shape.
pub fn entry_function<'a>(program: &'a ProgramState, entry: &str) -> Result<&'a FunctionDef, Error> {
    let Some(function) = program.function(entry) else {
        return Err(Error::new(
            ErrorImpl::EntryFunctionNotFound {
                function: entry.to_string(),
            },
            Position::null(),
        ));
    };

    let shape_ok = function.parameters.len() == 1
        && function.parameters[0].ty == Type::Int
        && function.return_type == Type::Int;

    if !shape_ok {
        return Err(Error::new(
            ErrorImpl::InvalidEntryFunction {
                function: entry.to_string(),
                signature: function.signature(),
            },
            function.span.start.clone(),
        ));
    }

    Ok(function)
}

/// `+` and `*` wrap on overflow. `/` and `%` truncate toward zero.
fn eval_binary(
    operator: BinaryOperator,
    lhs: Value,
    rhs: Value,
    left: &Expr,
    right: &Expr,
    position: Position,
) -> Result<Value, Error> {
    let ints = || -> Result<(i32, i32), Error> { Ok((expect_int(lhs, left)?, expect_int(rhs, right)?)) };

    let value = match operator {
        BinaryOperator::And => Value::Bool(expect_bool(lhs, left)? && expect_bool(rhs, right)?),
        BinaryOperator::Or => Value::Bool(expect_bool(lhs, left)? || expect_bool(rhs, right)?),
        BinaryOperator::Add => {
            let (lhs, rhs) = ints()?;
            Value::Int(lhs.wrapping_add(rhs))
        }
        BinaryOperator::Mul => {
            let (lhs, rhs) = ints()?;
            Value::Int(lhs.wrapping_mul(rhs))
        }
        BinaryOperator::Div => {
            let (lhs, rhs) = ints()?;
            Value::Int(checked_division(operator, lhs, rhs, i32::checked_div, position)?)
        }
        BinaryOperator::Mod => {
            let (lhs, rhs) = ints()?;
            Value::Int(checked_division(operator, lhs, rhs, i32::checked_rem, position)?)
        }
        BinaryOperator::Eq => {
            let (lhs, rhs) = ints()?;
            Value::Bool(lhs == rhs)
        }
        BinaryOperator::Ne => {
            let (lhs, rhs) = ints()?;
            Value::Bool(lhs != rhs)
        }
        BinaryOperator::Gt => {
            let (lhs, rhs) = ints()?;
            Value::Bool(lhs > rhs)
        }
        BinaryOperator::Ge => {
            let (lhs, rhs) = ints()?;
            Value::Bool(lhs >= rhs)
        }
        BinaryOperator::Lt => {
            let (lhs, rhs) = ints()?;
            Value::Bool(lhs < rhs)
        }
        BinaryOperator::Le => {
            let (lhs, rhs) = ints()?;
            Value::Bool(lhs <= rhs)
        }
    };

    Ok(value)
}

fn checked_division(
    operator: BinaryOperator,
    lhs: i32,
    rhs: i32,
    divide: fn(i32, i32) -> Option<i32>,
    position: Position,
) -> Result<i32, Error> {
    if rhs == 0 {
        return Err(Error::new(ErrorImpl::DivisionByZero, position));
    }

    // checked_div and checked_rem only fail here for i32::MIN by -1
    divide(lhs, rhs).ok_or_else(|| {
        Error::new(
            ErrorImpl::ArithmeticOverflow {
                operation: format!("{} {} {}", lhs, operator.symbol(), rhs),
            },
            position,
        )
    })
}

fn expect_int(value: Value, expr: &Expr) -> Result<i32, Error> {
    value.as_int().ok_or_else(|| mismatch(value, Type::Int, expr))
}

fn expect_bool(value: Value, expr: &Expr) -> Result<bool, Error> {
    value.as_bool().ok_or_else(|| mismatch(value, Type::Bool, expr))
}

// Only reachable when an unverified expression is evaluated.
fn mismatch(value: Value, expected: Type, expr: &Expr) -> Error {
    Error::new(
        ErrorImpl::TypeMatchError {
            expression: expr.to_string(),
            expected: expected.to_string(),
            received: value.get_type().to_string(),
        },
        expr.get_span().start.clone(),
    )
}

fn unresolved(name: &str, expr: &Expr) -> Error {
    Error::new(
        ErrorImpl::UnresolvedName {
            name: name.to_string(),
        },
        expr.get_span().start.clone(),
    )
}
