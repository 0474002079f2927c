//! Statement handling for the interactive prompt and the batch front end.
//!
//! In interactive mode every definition replaces any previous one with the
//! same name and is verified immediately. A definition that fails
//! verification is rolled back, so the table stays consistent between
//! prompts.

use std::collections::HashSet;

use tracing::debug;

use crate::{
    ast::ast::{Expr, Stmt},
    errors::errors::{Error, ErrorImpl},
    interpreter::{
        interpreter::{evaluate, evaluate_program_entry, Context},
        value::Value,
    },
    parser::parser::parse_source,
    program::{Definition, DefinitionKey, ProgramState, RedefinitionPolicy},
    type_checker::{
        environment::Environment,
        type_checker::{deduce_type, verify_all, TypeChecker, VerifyMode},
    },
};

/// How an entry function is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionMode {
    #[default]
    Interpret,
    Jit,
}

/// Result of one interactive statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// A definition was accepted. `broken` lists definitions that referenced
    /// the old one and no longer verify.
    Defined { name: String, broken: Vec<String> },
    Evaluated(Value),
}

pub struct Session {
    program: ProgramState,
    file: String,
}

impl Default for Session {
    fn default() -> Self {
        Session::new("shell")
    }
}

impl Session {
    pub fn new(file: &str) -> Self {
        Session {
            program: ProgramState::new(),
            file: file.to_string(),
        }
    }

    /// Wraps an already loaded program.
    pub fn from_program(program: ProgramState, file: &str) -> Self {
        Session {
            program,
            file: file.to_string(),
        }
    }

    pub fn program(&self) -> &ProgramState {
        &self.program
    }

    /// Parses `source` and handles each statement in order. Stops at the
    /// first error; statements before it stay applied.
    pub fn execute(&mut self, source: &str) -> Result<Vec<Outcome>, Error> {
        let statements = parse_source(source, &self.file)?;
        let mut outcomes = Vec::with_capacity(statements.len());

        for statement in statements {
            outcomes.push(self.handle(statement)?);
        }

        Ok(outcomes)
    }

    pub fn handle(&mut self, statement: Stmt) -> Result<Outcome, Error> {
        match statement {
            Stmt::ValDef(constant) => {
                let name = constant.name.clone();
                let previous = self
                    .program
                    .define_constant(constant, RedefinitionPolicy::Replace)?;

                if let Err(error) = self.verify_key(&DefinitionKey::Constant(name.clone())) {
                    match previous {
                        Some(previous) => {
                            debug!("restoring previous definition of `{}`", name);
                            self.program
                                .define_constant(previous, RedefinitionPolicy::Replace)?;
                        }
                        None => {
                            self.program.remove_constant(&name);
                        }
                    }
                    self.refresh();
                    return Err(error);
                }

                Ok(Outcome::Defined {
                    name,
                    broken: self.refresh(),
                })
            }
            Stmt::FuncDef(function) => {
                let name = function.name.clone();
                let previous = self
                    .program
                    .define_function(function, RedefinitionPolicy::Replace)?;

                if let Err(error) = self.verify_key(&DefinitionKey::Function(name.clone())) {
                    match previous {
                        Some(previous) => {
                            debug!("restoring previous definition of `{}`", name);
                            self.program
                                .define_function(previous, RedefinitionPolicy::Replace)?;
                        }
                        None => {
                            self.program.remove_function(&name);
                        }
                    }
                    self.refresh();
                    return Err(error);
                }

                Ok(Outcome::Defined {
                    name,
                    broken: self.refresh(),
                })
            }
            Stmt::Expression(expr) => self.evaluate_expression(&expr).map(Outcome::Evaluated),
        }
    }

    /// Deduces, verifies and evaluates a top-level expression.
    pub fn evaluate_expression(&self, expr: &Expr) -> Result<Value, Error> {
        let expected = deduce_type(expr, &self.program);
        TypeChecker::new(&self.program).verify_expr(expr, expected, &Environment::new())?;
        self.ensure_verified(expr)?;

        evaluate(expr, &self.program, &Context::new())
    }

    /// Runs `entry` on `input` after verifying the whole program.
    pub fn run_entry(&self, entry: &str, input: i32, mode: ExecutionMode) -> Result<i32, Error> {
        verify_all(&self.program, VerifyMode::Batch).into_result()?;

        match mode {
            ExecutionMode::Interpret => evaluate_program_entry(&self.program, entry, input),
            ExecutionMode::Jit => crate::compiler::jit::run_entry(&self.program, entry, input),
        }
    }

    /// Loads a whole source file in batch mode.
    pub fn load(&mut self, source: &str) -> Result<(), Error> {
        let statements = parse_source(source, &self.file)?;
        self.program.load(statements)
    }

    /// One line per definition, in insertion order.
    pub fn listing(&self) -> Vec<String> {
        self.program
            .definitions()
            .map(|definition| match definition {
                Definition::Constant(constant) => constant.to_string(),
                Definition::Function(function) => function.to_string(),
            })
            .collect()
    }

    fn verify_key(&self, key: &DefinitionKey) -> Result<(), Error> {
        match self.program.get(key) {
            Some(definition) => TypeChecker::new(&self.program).verify_definition(definition),
            None => Ok(()),
        }
    }

    /// Re-verifies everything and returns the names that currently fail.
    fn refresh(&self) -> Vec<String> {
        verify_all(&self.program, VerifyMode::Exhaustive)
            .failures
            .into_iter()
            .map(|(name, _)| name)
            .collect()
    }

    /// Checks that every definition `expr` can reach has verified correctly.
    fn ensure_verified(&self, expr: &Expr) -> Result<(), Error> {
        let mut seen = HashSet::new();
        let mut pending = referenced_keys(expr);

        while let Some(key) = pending.pop() {
            if !seen.insert(key.clone()) {
                continue;
            }

            let Some(definition) = self.program.get(&key) else {
                continue;
            };

            if !definition.verification().is_correct() {
                return Err(Error::new(
                    ErrorImpl::NotVerified {
                        name: key.name().to_string(),
                    },
                    expr.get_span().start.clone(),
                ));
            }

            pending.extend(definition.dependencies());
        }

        Ok(())
    }
}

fn referenced_keys(expr: &Expr) -> Vec<DefinitionKey> {
    let (variables, functions) = expr.referenced_names();

    variables
        .into_iter()
        .map(DefinitionKey::Constant)
        .chain(functions.into_iter().map(DefinitionKey::Function))
        .collect()
}
