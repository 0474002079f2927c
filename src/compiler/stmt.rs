use std::collections::HashMap;

use tracing::debug;

use crate::{errors::errors::Error, program::Definition};

use super::{
    compiler::{codegen_error, constant_symbol, function_symbol, Compiler},
    expr::gen_expression,
};

/// Emits the body of a definition whose prototype is already declared.
pub fn gen_definition(compiler: &mut Compiler<'_>, definition: Definition<'_>) -> Result<(), Error> {
    match definition {
        Definition::Constant(constant) => {
            let symbol = constant_symbol(&constant.name);
            let function_type = compiler
                .convert_type(constant.declared_type)
                .fn_type(&[], false);
            compiler.create_function(&symbol, function_type);

            compiler.named_values.clear();
            let value = gen_expression(compiler, &constant.body)?;
            compiler.builder.build_return(Some(&value))?;

            debug!("emitted `{}`", symbol);
        }
        Definition::Function(function) => {
            let symbol = function_symbol(&function.name);
            let llvm_function = compiler.get_function(&symbol)?;
            compiler.create_function(&symbol, llvm_function.get_type());

            let mut named_values = HashMap::new();
            for (index, parameter) in function.parameters.iter().enumerate() {
                let value = llvm_function
                    .get_nth_param(index as u32)
                    .ok_or_else(|| codegen_error(format!("{} has no parameter {}", symbol, index)))?
                    .into_int_value();
                value.set_name(&parameter.name);
                named_values.insert(parameter.name.clone(), value);
            }
            compiler.named_values = named_values;

            let value = gen_expression(compiler, &function.body)?;
            compiler.builder.build_return(Some(&value))?;
            compiler.named_values.clear();

            debug!("emitted `{}`", symbol);
        }
    }

    Ok(())
}
