use std::collections::HashMap;

use crate::{
    ast::ast::{Expr, Stmt},
    errors::errors::Error,
    lexer::tokens::TokenKind,
};

use super::{expr::*, parser::Parser, stmt::*};

/// Precedence levels, weakest first. `Primary` marks tokens that only
/// start expressions.
#[derive(PartialEq, PartialOrd, Clone, Copy, Debug)]
pub enum BindingPower {
    Default,
    LogicalOr,
    LogicalAnd,
    Relational,
    Additive,
    Multiplicative,
    Unary,
    Call,
    Primary,
}

pub type StmtHandler = fn(&mut Parser) -> Result<Stmt, Error>;
pub type NUDHandler = fn(&mut Parser) -> Result<Expr, Error>;
pub type LEDHandler = fn(&mut Parser, Expr, BindingPower) -> Result<Expr, Error>;

/// Infix operators and their precedence, loosest first.
const BINARY_OPERATORS: [(TokenKind, BindingPower); 13] = [
    (TokenKind::Or, BindingPower::LogicalOr),
    (TokenKind::And, BindingPower::LogicalAnd),
    (TokenKind::Equals, BindingPower::Relational),
    (TokenKind::NotEquals, BindingPower::Relational),
    (TokenKind::Less, BindingPower::Relational),
    (TokenKind::LessEquals, BindingPower::Relational),
    (TokenKind::Greater, BindingPower::Relational),
    (TokenKind::GreaterEquals, BindingPower::Relational),
    (TokenKind::Plus, BindingPower::Additive),
    (TokenKind::Dash, BindingPower::Additive),
    (TokenKind::Star, BindingPower::Multiplicative),
    (TokenKind::Slash, BindingPower::Multiplicative),
    (TokenKind::Percent, BindingPower::Multiplicative),
];

pub fn create_token_lookups(parser: &mut Parser) {
    for (kind, binding_power) in BINARY_OPERATORS {
        parser.led(kind, binding_power, parse_binary_expr);
    }
    parser.led(TokenKind::OpenParen, BindingPower::Call, parse_call_expr);

    for kind in [
        TokenKind::Number,
        TokenKind::True,
        TokenKind::False,
        TokenKind::Identifier,
    ] {
        parser.nud(kind, parse_primary_expr);
    }
    parser.nud(TokenKind::Dash, parse_prefix_expr);
    parser.nud(TokenKind::Not, parse_prefix_expr);
    parser.nud(TokenKind::OpenParen, parse_grouping_expr);
    parser.nud(TokenKind::If, parse_conditional_expr);

    parser.stmt(TokenKind::Valdef, parse_valdef_stmt);
    parser.stmt(TokenKind::Funcdef, parse_funcdef_stmt);
}

pub type StmtLookup = HashMap<TokenKind, StmtHandler>;
pub type NUDLookup = HashMap<TokenKind, NUDHandler>;
pub type LEDLookup = HashMap<TokenKind, LEDHandler>;
pub type BPLookup = HashMap<TokenKind, BindingPower>;
