//! C runtime declarations, the fault handler and the executable entry point.

use inkwell::{module::Linkage, values::FunctionValue, AddressSpace, IntPredicate};

use crate::errors::errors::Error;

use super::compiler::{codegen_error, function_symbol, Compiler};

pub const FAULT_HANDLER: &str = "kari.fault";

/// Declares `printf`, `atoi` and `abort` and defines the fault handler.
pub fn declare_runtime(compiler: &Compiler<'_>) -> Result<(), Error> {
    let i8_ptr_type = compiler.context.i8_type().ptr_type(AddressSpace::default());

    let printf_type = compiler
        .context
        .i32_type()
        .fn_type(&[i8_ptr_type.into()], true);
    compiler
        .module
        .add_function("printf", printf_type, Some(Linkage::External));

    let atoi_type = compiler
        .context
        .i32_type()
        .fn_type(&[i8_ptr_type.into()], false);
    compiler
        .module
        .add_function("atoi", atoi_type, Some(Linkage::External));

    let abort_type = compiler.context.void_type().fn_type(&[], false);
    compiler
        .module
        .add_function("abort", abort_type, Some(Linkage::External));

    create_fault_handler(compiler)?;

    Ok(())
}

/// `void kari.fault(i8* message)`: prints the message and aborts.
fn create_fault_handler<'a>(compiler: &Compiler<'a>) -> Result<FunctionValue<'a>, Error> {
    let function = compiler.create_function(
        FAULT_HANDLER,
        compiler.context.void_type().fn_type(
            &[compiler
                .context
                .i8_type()
                .ptr_type(AddressSpace::default())
                .into()],
            false,
        ),
    );

    let message = function
        .get_first_param()
        .ok_or_else(|| codegen_error("fault handler has no message parameter"))?;

    compiler
        .builder
        .build_call(compiler.get_function("printf")?, &[message.into()], "")?;
    compiler
        .builder
        .build_call(compiler.get_function("abort")?, &[], "")?;
    compiler.builder.build_unreachable()?;

    Ok(function)
}

/// Emits `int main(int argc, char **argv)`, which parses `argv[1]` with
/// `atoi`, runs `entry` and prints both numbers.
pub fn emit_entry_wrapper<'a>(compiler: &Compiler<'a>, entry: &str) -> Result<FunctionValue<'a>, Error> {
    let i32_type = compiler.context.i32_type();
    let i8_ptr_type = compiler.context.i8_type().ptr_type(AddressSpace::default());
    let argv_type = i8_ptr_type.ptr_type(AddressSpace::default());

    let function = compiler.create_function(
        "main",
        i32_type.fn_type(&[i32_type.into(), argv_type.into()], false),
    );
    let argc = function
        .get_nth_param(0)
        .ok_or_else(|| codegen_error("main has no argc parameter"))?
        .into_int_value();
    let argv = function
        .get_nth_param(1)
        .ok_or_else(|| codegen_error("main has no argv parameter"))?
        .into_pointer_value();

    let usage_block = compiler.create_basic_block("usage", function);
    let run_block = compiler.create_basic_block("run", function);

    let has_input = compiler.builder.build_int_compare(
        IntPredicate::EQ,
        argc,
        i32_type.const_int(2, false),
        "has_input",
    )?;
    compiler
        .builder
        .build_conditional_branch(has_input, run_block, usage_block)?;

    compiler.builder.position_at_end(usage_block);
    let usage = compiler
        .builder
        .build_global_string_ptr("usage: <program> <input>\n", "usage")?;
    compiler.builder.build_call(
        compiler.get_function("printf")?,
        &[usage.as_pointer_value().into()],
        "",
    )?;
    compiler
        .builder
        .build_return(Some(&i32_type.const_int(1, false)))?;

    compiler.builder.position_at_end(run_block);
    let input_ptr = unsafe {
        compiler.builder.build_gep(
            argv,
            &[compiler.context.i64_type().const_int(1, false)],
            "input_ptr",
        )?
    };
    let input_text = compiler
        .builder
        .build_load(input_ptr, "input_text")?
        .into_pointer_value();
    let input = compiler
        .builder
        .build_call(compiler.get_function("atoi")?, &[input_text.into()], "input")?
        .try_as_basic_value()
        .left()
        .ok_or_else(|| codegen_error("atoi returned no value"))?;

    let output = compiler
        .builder
        .build_call(
            compiler.get_function(&function_symbol(entry))?,
            &[input.into()],
            "output",
        )?
        .try_as_basic_value()
        .left()
        .ok_or_else(|| codegen_error(format!("{} returned no value", entry)))?;

    let format = compiler
        .builder
        .build_global_string_ptr("Input: %d\nOutput: %d\n", "report")?;
    compiler.builder.build_call(
        compiler.get_function("printf")?,
        &[format.as_pointer_value().into(), input.into(), output.into()],
        "",
    )?;
    compiler
        .builder
        .build_return(Some(&i32_type.const_zero()))?;

    Ok(function)
}
