use inkwell::{
    context::Context,
    execution_engine::JitFunction,
    targets::{InitializationConfig, Target},
    OptimizationLevel,
};
use tracing::debug;

use crate::{
    errors::errors::Error,
    interpreter::interpreter::entry_function,
    program::ProgramState,
};

use super::compiler::{codegen_error, function_symbol, Compiler};

type EntryFunction = unsafe extern "C" fn(i32) -> i32;

/// Lowers `program` and runs `entry` on `input` through LLVM's JIT.
///
/// A runtime fault (division by zero) aborts the process, as a compiled
/// executable would.
pub fn run_entry(program: &ProgramState, entry: &str, input: i32) -> Result<i32, Error> {
    entry_function(program, entry)?;

    Target::initialize_native(&InitializationConfig::default()).map_err(codegen_error)?;

    let context = Context::create();
    let mut compiler = Compiler::new(&context, "kari_jit");
    compiler.compile_program(program)?;
    compiler.verify()?;

    let engine = compiler
        .module
        .create_jit_execution_engine(OptimizationLevel::None)
        .map_err(|message| codegen_error(message.to_string()))?;

    let symbol = function_symbol(entry);
    debug!("jit calling `{}` with {}", symbol, input);

    unsafe {
        let function: JitFunction<EntryFunction> = engine
            .get_function(&symbol)
            .map_err(|error| codegen_error(format!("{:?}", error)))?;

        Ok(function.call(input))
    }
}
