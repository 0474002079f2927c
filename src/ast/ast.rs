use std::cell::Cell;

use crate::Span;

use super::{
    expressions::{BinaryOperator, UnaryOperator},
    statements::{ConstantDef, FunctionDef},
    types::Type,
};

/// Verification state of a node or definition.
///
/// This is the (verified, correct) flag pair folded into one value:
/// `Unverified` means nothing has been checked yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verification {
    #[default]
    Unverified,
    Correct,
    Incorrect,
}

impl Verification {
    pub fn is_verified(self) -> bool {
        self != Verification::Unverified
    }

    pub fn is_correct(self) -> bool {
        self == Verification::Correct
    }
}

/// Expression Kinds
///
/// The closed set of expression forms. Children are exclusively owned.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    IntLiteral(i32),
    BoolLiteral(bool),
    /// Resolved by name at verification and evaluation time
    VariableRef(String),
    UnaryOp {
        operator: UnaryOperator,
        operand: Box<Expr>,
    },
    BinaryOp {
        operator: BinaryOperator,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Conditional {
        condition: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
    },
    /// Resolved by name at verification and evaluation time
    Call {
        function: String,
        arguments: Vec<Expr>,
    },
}

/// Expression
///
/// An expression node. Besides its kind and source span, each node memoises
/// the last type deduced for it and its last verification outcome. Neither
/// memo is part of the node's identity: equality compares kinds only.
#[derive(Debug, Clone)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
    result_type: Cell<Option<Type>>,
    verification: Cell<Verification>,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Expr {
            kind,
            span,
            result_type: Cell::new(None),
            verification: Cell::new(Verification::Unverified),
        }
    }

    pub fn get_span(&self) -> &Span {
        &self.span
    }

    /// Returns the type recorded by the last deduction or verification.
    pub fn cached_type(&self) -> Option<Type> {
        self.result_type.get()
    }

    pub fn cache_type(&self, ty: Type) {
        self.result_type.set(Some(ty));
    }

    pub fn verification(&self) -> Verification {
        self.verification.get()
    }

    pub fn set_verification(&self, verification: Verification) {
        self.verification.set(verification);
    }
}

impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

/// Statement
///
/// A top-level item produced by the parser.
#[derive(Debug, Clone)]
pub enum Stmt {
    ValDef(ConstantDef),
    FuncDef(FunctionDef),
    /// Only accepted in interactive sessions
    Expression(Expr),
}

impl Stmt {
    pub fn get_span(&self) -> &Span {
        match self {
            Stmt::ValDef(constant) => &constant.span,
            Stmt::FuncDef(function) => &function.span,
            Stmt::Expression(expression) => &expression.span,
        }
    }
}
