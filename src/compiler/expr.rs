use inkwell::{
    values::{BasicMetadataValueEnum, FunctionValue, IntValue},
    IntPredicate,
};

use crate::{
    ast::{
        ast::{Expr, ExprKind},
        expressions::{BinaryOperator, UnaryOperator},
    },
    errors::errors::Error,
};

use super::{
    compiler::{codegen_error, constant_symbol, function_symbol, Compiler},
    runtime::FAULT_HANDLER,
};

/// Generates LLVM IR for the given expression.
///
/// Names resolve to the current function's parameters first, then to
/// global constants.
pub fn gen_expression<'a>(compiler: &Compiler<'a>, expression: &Expr) -> Result<IntValue<'a>, Error> {
    match &expression.kind {
        ExprKind::IntLiteral(value) => Ok(compiler.context.i32_type().const_int(*value as u64, true)),
        ExprKind::BoolLiteral(value) => Ok(compiler.context.bool_type().const_int(*value as u64, false)),
        ExprKind::VariableRef(name) => {
            if let Some(value) = compiler.named_values.get(name) {
                return Ok(*value);
            }

            let constant = compiler.get_function(&constant_symbol(name))?;
            call_value(compiler, constant, &[])
        }
        ExprKind::UnaryOp { operator, operand } => {
            let operand = gen_expression(compiler, operand)?;

            let value = match operator {
                UnaryOperator::Not => compiler.builder.build_not(operand, "not")?,
                UnaryOperator::Neg => compiler.builder.build_int_neg(operand, "neg")?,
            };

            Ok(value)
        }
        ExprKind::BinaryOp {
            operator,
            left,
            right,
        } => {
            let left = gen_expression(compiler, left)?;
            let right = gen_expression(compiler, right)?;

            gen_binary(compiler, *operator, left, right)
        }
        ExprKind::Conditional {
            condition,
            then_branch,
            else_branch,
        } => {
            let condition = gen_expression(compiler, condition)?;
            let parent_function = compiler.current_function()?;

            let then_block = compiler.create_basic_block("then", parent_function);
            let else_block = compiler.create_basic_block("else", parent_function);
            let end_block = compiler.create_basic_block("end", parent_function);

            compiler
                .builder
                .build_conditional_branch(condition, then_block, else_block)?;

            compiler.builder.position_at_end(then_block);
            let then_value = gen_expression(compiler, then_branch)?;
            // Nested conditionals move the builder, so take the block it ended in
            let then_end = compiler
                .builder
                .get_insert_block()
                .ok_or_else(|| codegen_error("lost insertion block in then branch"))?;
            compiler.builder.build_unconditional_branch(end_block)?;

            compiler.builder.position_at_end(else_block);
            let else_value = gen_expression(compiler, else_branch)?;
            let else_end = compiler
                .builder
                .get_insert_block()
                .ok_or_else(|| codegen_error("lost insertion block in else branch"))?;
            compiler.builder.build_unconditional_branch(end_block)?;

            compiler.builder.position_at_end(end_block);
            let phi = compiler.builder.build_phi(then_value.get_type(), "if")?;
            phi.add_incoming(&[(&then_value, then_end), (&else_value, else_end)]);

            Ok(phi.as_basic_value().into_int_value())
        }
        ExprKind::Call {
            function,
            arguments,
        } => {
            let callee = compiler.get_function(&function_symbol(function))?;

            let arguments = arguments
                .iter()
                .map(|argument| gen_expression(compiler, argument).map(BasicMetadataValueEnum::from))
                .collect::<Result<Vec<BasicMetadataValueEnum<'a>>, Error>>()?;

            call_value(compiler, callee, &arguments)
        }
    }
}

fn call_value<'a>(
    compiler: &Compiler<'a>,
    function: FunctionValue<'a>,
    arguments: &[BasicMetadataValueEnum<'a>],
) -> Result<IntValue<'a>, Error> {
    compiler
        .builder
        .build_call(function, arguments, "call")?
        .try_as_basic_value()
        .left()
        .map(|value| value.into_int_value())
        .ok_or_else(|| codegen_error("call to a function without a return value"))
}

fn gen_binary<'a>(
    compiler: &Compiler<'a>,
    operator: BinaryOperator,
    left: IntValue<'a>,
    right: IntValue<'a>,
) -> Result<IntValue<'a>, Error> {
    let builder = &compiler.builder;

    let value = match operator {
        BinaryOperator::Add => builder.build_int_add(left, right, "add")?,
        BinaryOperator::Mul => builder.build_int_mul(left, right, "mul")?,
        BinaryOperator::Div => {
            guard_division(compiler, left, right)?;
            builder.build_int_signed_div(left, right, "div")?
        }
        BinaryOperator::Mod => {
            guard_division(compiler, left, right)?;
            builder.build_int_signed_rem(left, right, "rem")?
        }
        BinaryOperator::And => builder.build_and(left, right, "and")?,
        BinaryOperator::Or => builder.build_or(left, right, "or")?,
        BinaryOperator::Eq => builder.build_int_compare(IntPredicate::EQ, left, right, "eq")?,
        BinaryOperator::Ne => builder.build_int_compare(IntPredicate::NE, left, right, "ne")?,
        BinaryOperator::Gt => builder.build_int_compare(IntPredicate::SGT, left, right, "gt")?,
        BinaryOperator::Ge => builder.build_int_compare(IntPredicate::SGE, left, right, "ge")?,
        BinaryOperator::Lt => builder.build_int_compare(IntPredicate::SLT, left, right, "lt")?,
        BinaryOperator::Le => builder.build_int_compare(IntPredicate::SLE, left, right, "le")?,
    };

    Ok(value)
}

/// `sdiv` and `srem` are undefined for a zero divisor and for
/// `i32::MIN / -1`. Both branch to the fault handler instead.
fn guard_division<'a>(compiler: &Compiler<'a>, left: IntValue<'a>, right: IntValue<'a>) -> Result<(), Error> {
    let i32_type = compiler.context.i32_type();

    let is_zero = compiler
        .builder
        .build_int_compare(IntPredicate::EQ, right, i32_type.const_zero(), "is_zero")?;
    build_fault_check(compiler, is_zero, "division by zero")?;

    let is_min = compiler.builder.build_int_compare(
        IntPredicate::EQ,
        left,
        i32_type.const_int(i32::MIN as u64, true),
        "is_min",
    )?;
    let is_minus_one = compiler.builder.build_int_compare(
        IntPredicate::EQ,
        right,
        i32_type.const_int(-1i32 as u64, true),
        "is_minus_one",
    )?;
    let overflows = compiler.builder.build_and(is_min, is_minus_one, "overflows")?;
    build_fault_check(compiler, overflows, "arithmetic overflow in division")?;

    Ok(())
}

/// Branches to a block that reports `message` and aborts when `failed`
/// holds. Leaves the builder in the continuation block.
fn build_fault_check<'a>(compiler: &Compiler<'a>, failed: IntValue<'a>, message: &str) -> Result<(), Error> {
    let parent_function = compiler.current_function()?;
    let fault_block = compiler.create_basic_block("fault", parent_function);
    let ok_block = compiler.create_basic_block("ok", parent_function);

    compiler
        .builder
        .build_conditional_branch(failed, fault_block, ok_block)?;

    compiler.builder.position_at_end(fault_block);
    let message = compiler
        .builder
        .build_global_string_ptr(&format!("kari: {}\n", message), "fault_message")?;
    compiler.builder.build_call(
        compiler.get_function(FAULT_HANDLER)?,
        &[message.as_pointer_value().into()],
        "",
    )?;
    compiler.builder.build_unreachable()?;

    compiler.builder.position_at_end(ok_block);

    Ok(())
}
