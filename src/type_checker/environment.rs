use std::collections::HashMap;

use crate::{
    ast::{statements::FunctionDef, types::Type},
    errors::errors::{Error, ErrorImpl},
    Position,
};

/// Local names visible while verifying a function body.
#[derive(Debug, Default, Clone)]
pub struct Environment {
    variable_lookup: HashMap<String, Type>,
}

impl Environment {
    pub fn new() -> Self {
        Environment::default()
    }

    /// Builds the environment of a function body from its parameters.
    pub fn from_parameters(function: &FunctionDef) -> Result<Self, Error> {
        let mut environment = Environment::new();

        for parameter in &function.parameters {
            environment
                .declare_variable(&parameter.name, parameter.ty, function.span.start.clone())
                .map_err(|_| {
                    Error::new(
                        ErrorImpl::DuplicateParameter {
                            function: function.name.clone(),
                            parameter: parameter.name.clone(),
                        },
                        function.span.start.clone(),
                    )
                })?;
        }

        Ok(environment)
    }

    pub fn declare_variable(
        &mut self,
        variable_name: &str,
        variable_type: Type,
        current_position: Position,
    ) -> Result<(), Error> {
        if self.variable_lookup.contains_key(variable_name) {
            Err(Error::new(
                ErrorImpl::VariableAlreadyDeclared {
                    variable: variable_name.to_string(),
                },
                current_position,
            ))
        } else {
            self.variable_lookup
                .insert(variable_name.to_string(), variable_type);
            Ok(())
        }
    }

    pub fn get_variable(&self, variable_name: &str) -> Option<Type> {
        self.variable_lookup.get(variable_name).copied()
    }
}
