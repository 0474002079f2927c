//! Global definition tables.
//!
//! `ProgramState` owns every global constant and function of a program. It
//! is handed explicitly to the verifier, the evaluator and the code
//! generator; only insertion and removal need a mutable borrow.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::{
    ast::{
        ast::{Stmt, Verification},
        statements::{ConstantDef, FunctionDef},
    },
    errors::errors::{Error, ErrorImpl},
    parser::parser::parse_source,
    Span,
};

/// What happens when a definition reuses a name already in its table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedefinitionPolicy {
    /// Fail with an "already declared" error. The first definition stays.
    Reject,
    /// Erase the old definition and insert the new one unverified.
    Replace,
}

/// Identifies a definition across both tables. A constant and a function
/// may share a name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DefinitionKey {
    Constant(String),
    Function(String),
}

impl DefinitionKey {
    pub fn name(&self) -> &str {
        match self {
            DefinitionKey::Constant(name) | DefinitionKey::Function(name) => name,
        }
    }
}

/// A borrowed view of either kind of definition.
#[derive(Debug, Clone, Copy)]
pub enum Definition<'a> {
    Constant(&'a ConstantDef),
    Function(&'a FunctionDef),
}

impl<'a> Definition<'a> {
    pub fn name(&self) -> &'a str {
        match self {
            Definition::Constant(constant) => &constant.name,
            Definition::Function(function) => &function.name,
        }
    }

    pub fn key(&self) -> DefinitionKey {
        match self {
            Definition::Constant(constant) => DefinitionKey::Constant(constant.name.clone()),
            Definition::Function(function) => DefinitionKey::Function(function.name.clone()),
        }
    }

    pub fn get_span(&self) -> &'a Span {
        match self {
            Definition::Constant(constant) => &constant.span,
            Definition::Function(function) => &function.span,
        }
    }

    pub fn verification(&self) -> Verification {
        match self {
            Definition::Constant(constant) => constant.verification(),
            Definition::Function(function) => function.verification(),
        }
    }

    fn reset_verification(&self) {
        match self {
            Definition::Constant(constant) => constant.set_verification(Verification::Unverified),
            Definition::Function(function) => function.set_verification(Verification::Unverified),
        }
    }

    /// Globals the body refers to. A function's parameters shadow constants
    /// of the same name, so those names are not dependencies.
    pub fn dependencies(&self) -> Vec<DefinitionKey> {
        let (body, parameters) = match self {
            Definition::Constant(constant) => (&constant.body, &[][..]),
            Definition::Function(function) => (&function.body, &function.parameters[..]),
        };
        let (variables, functions) = body.referenced_names();

        variables
            .into_iter()
            .filter(|name| !parameters.iter().any(|parameter| parameter.name == *name))
            .map(DefinitionKey::Constant)
            .chain(functions.into_iter().map(DefinitionKey::Function))
            .collect()
    }

    fn references(&self, key: &DefinitionKey) -> bool {
        self.dependencies().contains(key)
    }
}

#[derive(Debug, Default)]
pub struct ProgramState {
    constants: HashMap<String, ConstantDef>,
    functions: HashMap<String, FunctionDef>,
    /// Insertion order, so whole-program passes report deterministically
    order: Vec<DefinitionKey>,
}

impl ProgramState {
    pub fn new() -> Self {
        ProgramState::default()
    }

    /// Parses `source` and inserts every definition with
    /// [`RedefinitionPolicy::Reject`]. Top-level expressions are rejected.
    pub fn from_source(source: &str, file: &str) -> Result<ProgramState, Error> {
        let mut program = ProgramState::new();
        program.load(parse_source(source, file)?)?;
        Ok(program)
    }

    /// Inserts parsed statements in batch mode.
    pub fn load(&mut self, statements: Vec<Stmt>) -> Result<(), Error> {
        for statement in statements {
            match statement {
                Stmt::ValDef(constant) => {
                    self.define_constant(constant, RedefinitionPolicy::Reject)?;
                }
                Stmt::FuncDef(function) => {
                    self.define_function(function, RedefinitionPolicy::Reject)?;
                }
                Stmt::Expression(expression) => {
                    return Err(Error::new(
                        ErrorImpl::TopLevelExpression,
                        expression.get_span().start.clone(),
                    ));
                }
            }
        }

        Ok(())
    }

    pub fn constant(&self, name: &str) -> Option<&ConstantDef> {
        self.constants.get(name)
    }

    pub fn function(&self, name: &str) -> Option<&FunctionDef> {
        self.functions.get(name)
    }

    pub fn get(&self, key: &DefinitionKey) -> Option<Definition<'_>> {
        match key {
            DefinitionKey::Constant(name) => self.constant(name).map(Definition::Constant),
            DefinitionKey::Function(name) => self.function(name).map(Definition::Function),
        }
    }

    /// Every definition in insertion order.
    pub fn definitions(&self) -> impl Iterator<Item = Definition<'_>> {
        self.order.iter().filter_map(move |key| self.get(key))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Inserts a constant, returning the definition it replaced. A replaced
    /// definition keeps its place in the insertion order.
    pub fn define_constant(
        &mut self,
        constant: ConstantDef,
        policy: RedefinitionPolicy,
    ) -> Result<Option<ConstantDef>, Error> {
        let key = DefinitionKey::Constant(constant.name.clone());
        let slot = self.order.iter().position(|existing| *existing == key);
        let previous = if self.constants.contains_key(&constant.name) {
            if policy == RedefinitionPolicy::Reject {
                return Err(Error::new(
                    ErrorImpl::VariableAlreadyDeclared {
                        variable: constant.name.clone(),
                    },
                    constant.span.start.clone(),
                ));
            }
            self.remove_constant(&constant.name)
        } else {
            None
        };

        debug!("defined constant `{}`", constant.name);
        constant.set_verification(Verification::Unverified);
        self.constants.insert(constant.name.clone(), constant);
        self.insert_key(key, slot);

        Ok(previous)
    }

    /// Inserts a function, returning the definition it replaced.
    pub fn define_function(
        &mut self,
        function: FunctionDef,
        policy: RedefinitionPolicy,
    ) -> Result<Option<FunctionDef>, Error> {
        let key = DefinitionKey::Function(function.name.clone());
        let slot = self.order.iter().position(|existing| *existing == key);
        let previous = if self.functions.contains_key(&function.name) {
            if policy == RedefinitionPolicy::Reject {
                return Err(Error::new(
                    ErrorImpl::FunctionAlreadyDeclared {
                        function: function.name.clone(),
                    },
                    function.span.start.clone(),
                ));
            }
            self.remove_function(&function.name)
        } else {
            None
        };

        debug!("defined function `{}`", function.name);
        function.set_verification(Verification::Unverified);
        self.functions.insert(function.name.clone(), function);
        self.insert_key(key, slot);

        Ok(previous)
    }

    fn insert_key(&mut self, key: DefinitionKey, slot: Option<usize>) {
        match slot {
            Some(index) => self.order.insert(index.min(self.order.len()), key),
            None => self.order.push(key),
        }
    }

    /// Removes a constant and resets everything that depends on it.
    pub fn remove_constant(&mut self, name: &str) -> Option<ConstantDef> {
        let key = DefinitionKey::Constant(name.to_string());
        let removed = self.constants.remove(name)?;
        self.order.retain(|existing| *existing != key);
        self.invalidate_dependents(&key);
        Some(removed)
    }

    /// Removes a function and resets everything that depends on it.
    pub fn remove_function(&mut self, name: &str) -> Option<FunctionDef> {
        let key = DefinitionKey::Function(name.to_string());
        let removed = self.functions.remove(name)?;
        self.order.retain(|existing| *existing != key);
        self.invalidate_dependents(&key);
        Some(removed)
    }

    /// Resets to `Unverified` every definition that references `changed`,
    /// directly or through other definitions.
    ///
    /// Returns the keys that were reset.
    pub fn invalidate_dependents(&self, changed: &DefinitionKey) -> Vec<DefinitionKey> {
        let mut invalidated = Vec::new();
        let mut seen = HashSet::new();
        let mut pending = vec![changed.clone()];
        seen.insert(changed.clone());

        while let Some(current) = pending.pop() {
            for definition in self.definitions() {
                let key = definition.key();
                if seen.contains(&key) || !definition.references(&current) {
                    continue;
                }

                debug!(
                    "`{}` depends on changed `{}`, resetting verification",
                    key.name(),
                    current.name()
                );
                definition.reset_verification();
                seen.insert(key.clone());
                invalidated.push(key.clone());
                pending.push(key);
            }
        }

        invalidated
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{DefinitionKey, ProgramState, RedefinitionPolicy};
    use crate::ast::{
        ast::{Expr, Verification},
        statements::{ConstantDef, FunctionDef, Parameter},
        types::Type,
    };
    use crate::Span;

    fn constant(name: &str, value: i32) -> ConstantDef {
        ConstantDef::new(name, Type::Int, Expr::int(value), Span::null())
    }

    #[test]
    fn test_reject_keeps_first_definition() {
        let mut program = ProgramState::new();
        program
            .define_constant(constant("x", 1), RedefinitionPolicy::Reject)
            .unwrap();

        let error = program
            .define_constant(constant("x", 2), RedefinitionPolicy::Reject)
            .unwrap_err();

        assert_eq!(error.get_error_name(), "VariableAlreadyDeclared");
        assert_eq!(program.constant("x").unwrap().body, Expr::int(1));
        assert_eq!(program.len(), 1);
    }

    #[test]
    fn test_replace_returns_previous_definition() {
        let mut program = ProgramState::new();
        program
            .define_constant(constant("x", 1), RedefinitionPolicy::Replace)
            .unwrap();

        let previous = program
            .define_constant(constant("x", 2), RedefinitionPolicy::Replace)
            .unwrap();

        assert_eq!(previous.unwrap().body, Expr::int(1));
        assert_eq!(program.constant("x").unwrap().body, Expr::int(2));
        assert_eq!(program.len(), 1);
    }

    #[test]
    fn test_replace_keeps_insertion_slot() {
        let mut program = ProgramState::new();
        for (name, value) in [("a", 1), ("b", 2), ("c", 3)] {
            program
                .define_constant(constant(name, value), RedefinitionPolicy::Replace)
                .unwrap();
        }

        program
            .define_constant(constant("a", 10), RedefinitionPolicy::Replace)
            .unwrap();

        let names = program
            .definitions()
            .map(|definition| definition.name().to_string())
            .collect::<Vec<String>>();

        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(program.constant("a").unwrap().body, Expr::int(10));
    }

    #[test]
    fn test_parameters_are_not_dependencies() {
        let program = ProgramState::from_source(
            "valdef x: int = 1; valdef y: int = 2; funcdef f(x: int) -> int = x + y + g(); funcdef g() -> int = 0;",
            "test.kari",
        )
        .unwrap();

        let function = program.get(&DefinitionKey::Function("f".to_string())).unwrap();

        assert_eq!(
            function.dependencies(),
            vec![
                DefinitionKey::Constant("y".to_string()),
                DefinitionKey::Function("g".to_string()),
            ]
        );
    }

    #[test]
    fn test_shadowed_constant_does_not_invalidate() {
        let program = ProgramState::from_source(
            "valdef x: int = 1; funcdef f(x: int) -> int = x;",
            "test.kari",
        )
        .unwrap();
        program
            .function("f")
            .unwrap()
            .set_verification(Verification::Correct);

        let invalidated = program.invalidate_dependents(&DefinitionKey::Constant("x".to_string()));

        assert!(invalidated.is_empty());
        assert_eq!(
            program.function("f").unwrap().verification(),
            Verification::Correct
        );
    }

    #[test]
    fn test_constant_and_function_may_share_a_name() {
        let mut program = ProgramState::new();
        program
            .define_constant(constant("f", 1), RedefinitionPolicy::Reject)
            .unwrap();
        program
            .define_function(
                FunctionDef::new("f", vec![], Type::Int, Expr::int(2), Span::null()),
                RedefinitionPolicy::Reject,
            )
            .unwrap();

        assert!(program.constant("f").is_some());
        assert!(program.function("f").is_some());
        assert_eq!(program.len(), 2);
    }

    #[test]
    fn test_definitions_keep_insertion_order() {
        let program = ProgramState::from_source(
            "valdef b: int = 1; funcdef a() -> int = b; valdef c: bool = true;",
            "test.kari",
        )
        .unwrap();

        let names = program
            .definitions()
            .map(|definition| definition.name().to_string())
            .collect::<Vec<String>>();

        assert_eq!(names, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_batch_load_rejects_top_level_expressions() {
        let error = ProgramState::from_source("valdef x: int = 1; x + 1;", "test.kari").unwrap_err();
        assert_eq!(error.get_error_name(), "TopLevelExpression");
        assert_eq!(error.get_position().0, 19);
    }

    #[test]
    fn test_invalidate_dependents_is_transitive() {
        let program = ProgramState::from_source(
            "
            valdef base: int = 2;
            funcdef twice(x: int) -> int = x * base;
            funcdef four() -> int = twice(2);
            funcdef unrelated(flag: bool) -> bool = !flag;
            ",
            "test.kari",
        )
        .unwrap();

        for definition in program.definitions() {
            match definition {
                super::Definition::Constant(constant) => {
                    constant.set_verification(Verification::Correct)
                }
                super::Definition::Function(function) => {
                    function.set_verification(Verification::Correct)
                }
            }
        }

        let invalidated = program.invalidate_dependents(&DefinitionKey::Constant("base".to_string()));

        assert_eq!(
            invalidated,
            vec![
                DefinitionKey::Function("twice".to_string()),
                DefinitionKey::Function("four".to_string()),
            ]
        );
        assert_eq!(
            program.function("four").unwrap().verification(),
            Verification::Unverified
        );
        assert_eq!(
            program.function("unrelated").unwrap().verification(),
            Verification::Correct
        );
        assert_eq!(
            program.constant("base").unwrap().verification(),
            Verification::Correct
        );
    }

    #[test]
    fn test_parameters_are_kept_in_order() {
        let program =
            ProgramState::from_source("funcdef f(a: int, b: bool) -> int = a;", "test.kari").unwrap();

        assert_eq!(
            program.function("f").unwrap().parameters,
            vec![
                Parameter {
                    name: "a".to_string(),
                    ty: Type::Int
                },
                Parameter {
                    name: "b".to_string(),
                    ty: Type::Bool
                },
            ]
        );
    }
}
