use std::{collections::BTreeSet, fmt::Display};

use crate::{lexer::tokens::TokenKind, Span};

use super::{
    ast::{Expr, ExprKind},
    types::Type,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOperator {
    Not,
    Neg,
}

impl UnaryOperator {
    pub fn from_token(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::Not => Some(UnaryOperator::Not),
            TokenKind::Dash => Some(UnaryOperator::Neg),
            _ => None,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOperator::Not => "!",
            UnaryOperator::Neg => "-",
        }
    }

    /// The type of both the operand and the result.
    pub fn operand_type(self) -> Type {
        match self {
            UnaryOperator::Not => Type::Bool,
            UnaryOperator::Neg => Type::Int,
        }
    }
}

/// Operator families, grouped by operand and result types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorClass {
    /// int x int -> int
    Arithmetic,
    /// bool x bool -> bool
    Logical,
    /// int x int -> bool
    Comparison,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    Add,
    Mul,
    Div,
    Mod,
    And,
    Or,
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

impl BinaryOperator {
    /// Maps an infix token to its operator. Subtraction has no operator of
    /// its own and is desugared by the parser.
    pub fn from_token(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::Plus => Some(BinaryOperator::Add),
            TokenKind::Star => Some(BinaryOperator::Mul),
            TokenKind::Slash => Some(BinaryOperator::Div),
            TokenKind::Percent => Some(BinaryOperator::Mod),
            TokenKind::And => Some(BinaryOperator::And),
            TokenKind::Or => Some(BinaryOperator::Or),
            TokenKind::Equals => Some(BinaryOperator::Eq),
            TokenKind::NotEquals => Some(BinaryOperator::Ne),
            TokenKind::Greater => Some(BinaryOperator::Gt),
            TokenKind::GreaterEquals => Some(BinaryOperator::Ge),
            TokenKind::Less => Some(BinaryOperator::Lt),
            TokenKind::LessEquals => Some(BinaryOperator::Le),
            _ => None,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Mul => "*",
            BinaryOperator::Div => "/",
            BinaryOperator::Mod => "%",
            BinaryOperator::And => "&&",
            BinaryOperator::Or => "||",
            BinaryOperator::Eq => "==",
            BinaryOperator::Ne => "!=",
            BinaryOperator::Gt => ">",
            BinaryOperator::Ge => ">=",
            BinaryOperator::Lt => "<",
            BinaryOperator::Le => "<=",
        }
    }

    pub fn class(self) -> OperatorClass {
        match self {
            BinaryOperator::Add | BinaryOperator::Mul | BinaryOperator::Div | BinaryOperator::Mod => {
                OperatorClass::Arithmetic
            }
            BinaryOperator::And | BinaryOperator::Or => OperatorClass::Logical,
            BinaryOperator::Eq
            | BinaryOperator::Ne
            | BinaryOperator::Gt
            | BinaryOperator::Ge
            | BinaryOperator::Lt
            | BinaryOperator::Le => OperatorClass::Comparison,
        }
    }

    pub fn operand_type(self) -> Type {
        match self.class() {
            OperatorClass::Arithmetic | OperatorClass::Comparison => Type::Int,
            OperatorClass::Logical => Type::Bool,
        }
    }

    pub fn result_type(self) -> Type {
        match self.class() {
            OperatorClass::Arithmetic => Type::Int,
            OperatorClass::Logical | OperatorClass::Comparison => Type::Bool,
        }
    }

    /// Printing precedence, mirroring the parser's binding powers.
    fn precedence(self) -> u8 {
        match self {
            BinaryOperator::Or => 1,
            BinaryOperator::And => 2,
            BinaryOperator::Eq
            | BinaryOperator::Ne
            | BinaryOperator::Gt
            | BinaryOperator::Ge
            | BinaryOperator::Lt
            | BinaryOperator::Le => 3,
            BinaryOperator::Add => 4,
            BinaryOperator::Mul | BinaryOperator::Div | BinaryOperator::Mod => 5,
        }
    }
}

const UNARY_PRECEDENCE: u8 = 6;
const ATOM_PRECEDENCE: u8 = 7;

// Constructors used by the parser and by hand-built trees. Hand-built nodes
// carry a null span.
impl Expr {
    pub fn int(value: i32) -> Self {
        Expr::new(ExprKind::IntLiteral(value), Span::null())
    }

    pub fn boolean(value: bool) -> Self {
        Expr::new(ExprKind::BoolLiteral(value), Span::null())
    }

    pub fn variable(name: &str) -> Self {
        Expr::new(ExprKind::VariableRef(name.to_string()), Span::null())
    }

    pub fn unary(operator: UnaryOperator, operand: Expr) -> Self {
        Expr::new(
            ExprKind::UnaryOp {
                operator,
                operand: Box::new(operand),
            },
            Span::null(),
        )
    }

    pub fn binary(operator: BinaryOperator, left: Expr, right: Expr) -> Self {
        Expr::new(
            ExprKind::BinaryOp {
                operator,
                left: Box::new(left),
                right: Box::new(right),
            },
            Span::null(),
        )
    }

    pub fn conditional(condition: Expr, then_branch: Expr, else_branch: Expr) -> Self {
        Expr::new(
            ExprKind::Conditional {
                condition: Box::new(condition),
                then_branch: Box::new(then_branch),
                else_branch: Box::new(else_branch),
            },
            Span::null(),
        )
    }

    pub fn call(function: &str, arguments: Vec<Expr>) -> Self {
        Expr::new(
            ExprKind::Call {
                function: function.to_string(),
                arguments,
            },
            Span::null(),
        )
    }

    /// Names this expression refers to, split into variables and functions.
    pub fn referenced_names(&self) -> (BTreeSet<String>, BTreeSet<String>) {
        let mut variables = BTreeSet::new();
        let mut functions = BTreeSet::new();
        self.collect_names(&mut variables, &mut functions);
        (variables, functions)
    }

    fn collect_names(&self, variables: &mut BTreeSet<String>, functions: &mut BTreeSet<String>) {
        match &self.kind {
            ExprKind::IntLiteral(_) | ExprKind::BoolLiteral(_) => {}
            ExprKind::VariableRef(name) => {
                variables.insert(name.clone());
            }
            ExprKind::UnaryOp { operand, .. } => operand.collect_names(variables, functions),
            ExprKind::BinaryOp { left, right, .. } => {
                left.collect_names(variables, functions);
                right.collect_names(variables, functions);
            }
            ExprKind::Conditional {
                condition,
                then_branch,
                else_branch,
            } => {
                condition.collect_names(variables, functions);
                then_branch.collect_names(variables, functions);
                else_branch.collect_names(variables, functions);
            }
            ExprKind::Call {
                function,
                arguments,
            } => {
                functions.insert(function.clone());
                for argument in arguments {
                    argument.collect_names(variables, functions);
                }
            }
        }
    }

    fn precedence(&self) -> u8 {
        match &self.kind {
            ExprKind::Conditional { .. } => 0,
            ExprKind::BinaryOp { operator, .. } => operator.precedence(),
            ExprKind::UnaryOp { .. } => UNARY_PRECEDENCE,
            _ => ATOM_PRECEDENCE,
        }
    }

    fn fmt_operand(&self, f: &mut std::fmt::Formatter<'_>, minimum: u8) -> std::fmt::Result {
        if self.precedence() < minimum {
            write!(f, "({})", self)
        } else {
            write!(f, "{}", self)
        }
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            ExprKind::IntLiteral(value) => write!(f, "{}", value),
            ExprKind::BoolLiteral(value) => write!(f, "{}", value),
            ExprKind::VariableRef(name) => write!(f, "{}", name),
            ExprKind::UnaryOp { operator, operand } => {
                write!(f, "{}", operator.symbol())?;
                operand.fmt_operand(f, UNARY_PRECEDENCE)
            }
            ExprKind::BinaryOp {
                operator,
                left,
                right,
            } => {
                let precedence = operator.precedence();
                left.fmt_operand(f, precedence)?;
                write!(f, " {} ", operator.symbol())?;
                right.fmt_operand(f, precedence + 1)
            }
            ExprKind::Conditional {
                condition,
                then_branch,
                else_branch,
            } => write!(
                f,
                "if {} then {} else {}",
                condition, then_branch, else_branch
            ),
            ExprKind::Call {
                function,
                arguments,
            } => {
                write!(f, "{}(", function)?;
                for (index, argument) in arguments.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", argument)?;
                }
                write!(f, ")")
            }
        }
    }
}
