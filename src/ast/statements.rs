use std::{cell::Cell, fmt::Display};

use crate::Span;

use super::{
    ast::{Expr, Verification},
    types::Type,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub ty: Type,
}

/// A global constant: `valdef name: type = body;`
#[derive(Debug, Clone)]
pub struct ConstantDef {
    pub name: String,
    pub declared_type: Type,
    pub body: Expr,
    pub span: Span,
    verification: Cell<Verification>,
}

impl ConstantDef {
    pub fn new(name: &str, declared_type: Type, body: Expr, span: Span) -> Self {
        ConstantDef {
            name: name.to_string(),
            declared_type,
            body,
            span,
            verification: Cell::new(Verification::Unverified),
        }
    }

    pub fn verification(&self) -> Verification {
        self.verification.get()
    }

    pub fn set_verification(&self, verification: Verification) {
        self.verification.set(verification);
    }
}

impl Display for ConstantDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "valdef {}: {} = {};",
            self.name, self.declared_type, self.body
        )
    }
}

/// A global function: `funcdef name(params) -> type = body;`
#[derive(Debug, Clone)]
pub struct FunctionDef {
    pub name: String,
    pub return_type: Type,
    pub parameters: Vec<Parameter>,
    pub body: Expr,
    pub span: Span,
    verification: Cell<Verification>,
}

impl FunctionDef {
    pub fn new(
        name: &str,
        parameters: Vec<Parameter>,
        return_type: Type,
        body: Expr,
        span: Span,
    ) -> Self {
        FunctionDef {
            name: name.to_string(),
            return_type,
            parameters,
            body,
            span,
            verification: Cell::new(Verification::Unverified),
        }
    }

    pub fn verification(&self) -> Verification {
        self.verification.get()
    }

    pub fn set_verification(&self, verification: Verification) {
        self.verification.set(verification);
    }

    /// Renders the signature as `(int, bool) -> int`.
    pub fn signature(&self) -> String {
        let parameters = self
            .parameters
            .iter()
            .map(|parameter| parameter.ty.to_string())
            .collect::<Vec<String>>()
            .join(", ");

        format!("({}) -> {}", parameters, self.return_type)
    }
}

impl Display for FunctionDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parameters = self
            .parameters
            .iter()
            .map(|parameter| format!("{}: {}", parameter.name, parameter.ty))
            .collect::<Vec<String>>()
            .join(", ");

        write!(
            f,
            "funcdef {}({}) -> {} = {};",
            self.name, parameters, self.return_type, self.body
        )
    }
}
