//! Module-level code generation.
//!
//! `Compiler` owns the LLVM module and builder and lowers a verified
//! `ProgramState` into it. Every function becomes `kari.fn.<name>`, every
//! constant a zero-argument function `kari.const.<name>`.

use std::{collections::HashMap, path::Path};

use inkwell::{
    attributes::{Attribute, AttributeLoc},
    basic_block::BasicBlock,
    builder::{Builder, BuilderError},
    context::Context,
    module::{Linkage, Module},
    passes::PassManager,
    targets::{CodeModel, FileType, InitializationConfig, RelocMode, Target, TargetMachine},
    types::{BasicMetadataTypeEnum, FunctionType, IntType},
    values::{FunctionValue, IntValue},
    OptimizationLevel,
};
use tracing::debug;

use crate::{
    ast::types::Type,
    errors::errors::{Error, ErrorImpl},
    interpreter::interpreter::entry_function,
    program::{Definition, ProgramState},
    Position,
};

use super::{
    runtime::{declare_runtime, emit_entry_wrapper},
    stmt::gen_definition,
};

pub const FUNCTION_PREFIX: &str = "kari.fn.";
pub const CONSTANT_PREFIX: &str = "kari.const.";

pub fn function_symbol(name: &str) -> String {
    format!("{}{}", FUNCTION_PREFIX, name)
}

pub fn constant_symbol(name: &str) -> String {
    format!("{}{}", CONSTANT_PREFIX, name)
}

pub(crate) fn codegen_error(message: impl Into<String>) -> Error {
    Error::new(
        ErrorImpl::CodegenError {
            message: message.into(),
        },
        Position::null(),
    )
}

impl From<BuilderError> for Error {
    fn from(error: BuilderError) -> Self {
        codegen_error(format!("{:?}", error))
    }
}

pub struct Compiler<'a> {
    /// Parameters of the function currently being lowered
    pub named_values: HashMap<String, IntValue<'a>>,

    pub context: &'a Context,
    pub module: Module<'a>,
    pub builder: Builder<'a>,
}

impl<'a> Compiler<'a> {
    pub fn new(context: &'a Context, module_name: &str) -> Self {
        Compiler {
            named_values: HashMap::new(),
            module: context.create_module(module_name),
            builder: context.create_builder(),
            context,
        }
    }

    /// Lowers every definition of `program`.
    ///
    /// All definitions must have verified correctly. Prototypes are
    /// declared before any body so calls may refer forward or recurse.
    ///
    /// # Arguments
    ///
    /// * `program` - A fully verified program
    ///
    /// # Returns
    ///
    /// `NotVerified` for the first definition that is not `Correct`, or a
    /// `CodegenError` if LLVM rejects an instruction.
    pub fn compile_program(&mut self, program: &ProgramState) -> Result<(), Error> {
        for definition in program.definitions() {
            if !definition.verification().is_correct() {
                return Err(Error::new(
                    ErrorImpl::NotVerified {
                        name: definition.name().to_string(),
                    },
                    definition.get_span().start.clone(),
                ));
            }
        }

        declare_runtime(self)?;

        for definition in program.definitions() {
            self.declare_definition(definition);
        }

        for definition in program.definitions() {
            gen_definition(self, definition)?;
        }

        debug!("lowered {} definitions", program.len());

        Ok(())
    }

    /// Lowers `program` and adds a C `main` that runs `entry` on `argv[1]`.
    pub fn compile_executable(&mut self, program: &ProgramState, entry: &str) -> Result<(), Error> {
        let function = entry_function(program, entry)?;

        self.compile_program(program)?;
        emit_entry_wrapper(self, &function.name)?;

        Ok(())
    }

    fn declare_definition(&self, definition: Definition<'_>) -> FunctionValue<'a> {
        match definition {
            Definition::Constant(constant) => {
                let function_type = self.convert_type(constant.declared_type).fn_type(&[], false);
                self.create_function_proto(&constant_symbol(&constant.name), function_type)
            }
            Definition::Function(function) => {
                let parameters = function
                    .parameters
                    .iter()
                    .map(|parameter| self.convert_type(parameter.ty).into())
                    .collect::<Vec<BasicMetadataTypeEnum<'a>>>();
                let function_type = self
                    .convert_type(function.return_type)
                    .fn_type(&parameters, false);

                self.create_function_proto(&function_symbol(&function.name), function_type)
            }
        }
    }

    /// `int` is `i32`, `bool` is `i1`.
    pub fn convert_type(&self, ty: Type) -> IntType<'a> {
        match ty {
            Type::Int => self.context.i32_type(),
            Type::Bool => self.context.bool_type(),
        }
    }

    /// Runs LLVM's module verifier.
    pub fn verify(&self) -> Result<(), Error> {
        self.module
            .verify()
            .map_err(|message| codegen_error(message.to_string()))
    }

    /// Runs a small cleanup pipeline over a verified module.
    pub fn optimize(&self) {
        let pass_manager = PassManager::create(());

        pass_manager.add_instruction_combining_pass();
        pass_manager.add_reassociate_pass();
        pass_manager.add_gvn_pass();
        pass_manager.add_cfg_simplification_pass();
        pass_manager.add_tail_call_elimination_pass();

        pass_manager.run_on(&self.module);
    }

    pub fn write_ir(&self, path: &Path) -> Result<(), Error> {
        self.module
            .print_to_file(path)
            .map_err(|message| codegen_error(message.to_string()))
    }

    /// Writes a position-independent object file for the host.
    pub fn write_object(&self, path: &Path) -> Result<(), Error> {
        let target_machine = self.host_target_machine()?;

        self.module.set_triple(&target_machine.get_triple());
        self.module
            .set_data_layout(&target_machine.get_target_data().get_data_layout());

        target_machine
            .write_to_file(&self.module, FileType::Object, path)
            .map_err(|message| codegen_error(message.to_string()))
    }

    fn host_target_machine(&self) -> Result<TargetMachine, Error> {
        Target::initialize_all(&InitializationConfig::default());

        let target_triple = TargetMachine::get_default_triple();
        let target = Target::from_triple(&target_triple)
            .map_err(|message| codegen_error(message.to_string()))?;

        target
            .create_target_machine(
                &target_triple,
                "generic",
                "",
                OptimizationLevel::Default,
                RelocMode::PIC,
                CodeModel::Default,
            )
            .ok_or_else(|| codegen_error(format!("no target machine for {:?}", target_triple)))
    }

    /// Starts the body of an already declared function.
    pub fn create_function(&self, name: &str, function_type: FunctionType<'a>) -> FunctionValue<'a> {
        let function = self
            .module
            .get_function(name)
            .unwrap_or_else(|| self.create_function_proto(name, function_type));

        self.create_function_block(function);

        let attributes = [
            self.context
                .create_enum_attribute(Attribute::get_named_enum_kind_id("uwtable"), 0),
            self.context
                .create_enum_attribute(Attribute::get_named_enum_kind_id("nounwind"), 0),
        ];

        for attribute in attributes.iter() {
            function.add_attribute(AttributeLoc::Function, *attribute);
        }

        function
    }

    pub fn create_function_proto(&self, name: &str, function_type: FunctionType<'a>) -> FunctionValue<'a> {
        self.module
            .add_function(name, function_type, Some(Linkage::External))
    }

    fn create_function_block(&self, function: FunctionValue<'a>) {
        let entry = self.create_basic_block("entry", function);
        self.builder.position_at_end(entry);
    }

    pub fn create_basic_block(&self, name: &str, function: FunctionValue<'a>) -> BasicBlock<'a> {
        self.context.append_basic_block(function, name)
    }

    /// The function that owns the builder's current block.
    pub fn current_function(&self) -> Result<FunctionValue<'a>, Error> {
        self.builder
            .get_insert_block()
            .and_then(|block| block.get_parent())
            .ok_or_else(|| codegen_error("builder is not positioned inside a function"))
    }

    pub fn get_function(&self, name: &str) -> Result<FunctionValue<'a>, Error> {
        self.module
            .get_function(name)
            .ok_or_else(|| codegen_error(format!("function {} is not declared", name)))
    }
}
