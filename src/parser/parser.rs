//! Parser state and entry points.
//!
//! Expressions are parsed Pratt-style: every token kind may own a NUD
//! (prefix) handler, a LED (infix) handler and a binding power. Definitions
//! are dispatched through their own table keyed by the leading keyword.

use std::{collections::HashMap, rc::Rc};

use crate::{
    ast::ast::Stmt,
    errors::errors::{Error, ErrorImpl},
    lexer::{
        lexer::tokenize,
        tokens::{Token, TokenKind},
    },
    Position, Span,
};

use super::{
    lookups::{
        create_token_lookups, BPLookup, BindingPower, LEDHandler, LEDLookup, NUDHandler, NUDLookup,
        StmtHandler, StmtLookup,
    },
    stmt::parse_stmt,
    types::{create_token_type_lookups, TypeNUDHandler, TypeNUDLookup},
};

/// Cursor over a token stream plus the grammar tables.
///
/// The stream always ends in `EOF` and the cursor never moves past it, so
/// handlers can look at the current token without bounds checks.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    file: Rc<String>,

    stmt_lookup: StmtLookup,
    nud_lookup: NUDLookup,
    led_lookup: LEDLookup,
    binding_power_lookup: BPLookup,
    type_nud_lookup: TypeNUDLookup,
}

impl Parser {
    /// Creates a parser with empty grammar tables. An `EOF` token is
    /// appended when `tokens` does not already end with one.
    pub fn new(mut tokens: Vec<Token>, file: Rc<String>) -> Self {
        let terminated = matches!(tokens.last(), Some(token) if token.kind == TokenKind::EOF);

        if !terminated {
            let end = match tokens.last() {
                Some(token) => token.span.end.clone(),
                None => Position(0, Rc::clone(&file)),
            };
            tokens.push(Token {
                kind: TokenKind::EOF,
                value: String::from("EOF"),
                span: Span {
                    start: end.clone(),
                    end,
                },
            });
        }

        Parser {
            tokens,
            pos: 0,
            file,
            stmt_lookup: HashMap::new(),
            nud_lookup: HashMap::new(),
            led_lookup: HashMap::new(),
            binding_power_lookup: HashMap::new(),
            type_nud_lookup: HashMap::new(),
        }
    }

    pub fn current_token(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    pub fn current_token_kind(&self) -> TokenKind {
        self.current_token().kind
    }

    /// Consumes the current token. At `EOF` the cursor stays put.
    pub fn advance(&mut self) -> Token {
        let token = self.current_token().clone();
        self.pos = (self.pos + 1).min(self.tokens.len() - 1);
        token
    }

    /// Consumes a token of `expected_kind`, or fails with `error` (or a
    /// generic "expected ..." error when none is given).
    pub fn expect_error(&mut self, expected_kind: TokenKind, error: Option<Error>) -> Result<Token, Error> {
        if self.current_token_kind() == expected_kind {
            return Ok(self.advance());
        }

        let token = self.current_token();
        Err(error.unwrap_or_else(|| {
            Error::new(
                ErrorImpl::UnexpectedTokenDetailed {
                    token: token.value.clone(),
                    message: format!("expected {}", expected_kind),
                },
                token.span.start.clone(),
            )
        }))
    }

    pub fn expect(&mut self, expected_kind: TokenKind) -> Result<Token, Error> {
        self.expect_error(expected_kind, None)
    }

    pub fn has_tokens(&self) -> bool {
        self.current_token_kind() != TokenKind::EOF
    }

    pub fn get_stmt_lookup(&self) -> &StmtLookup {
        &self.stmt_lookup
    }

    pub fn get_nud_lookup(&self) -> &NUDLookup {
        &self.nud_lookup
    }

    pub fn get_led_lookup(&self) -> &LEDLookup {
        &self.led_lookup
    }

    pub fn get_bp_lookup(&self) -> &BPLookup {
        &self.binding_power_lookup
    }

    pub fn get_type_nud_lookup(&self) -> &TypeNUDLookup {
        &self.type_nud_lookup
    }

    /// Registers an infix handler and its binding power.
    pub fn led(&mut self, kind: TokenKind, binding_power: BindingPower, led_fn: LEDHandler) {
        self.binding_power_lookup.insert(kind, binding_power);
        self.led_lookup.insert(kind, led_fn);
    }

    /// Registers a prefix handler. A token that is also an infix operator
    /// keeps its infix binding power, so `-` stays additive between operands.
    pub fn nud(&mut self, kind: TokenKind, nud_fn: NUDHandler) {
        self.binding_power_lookup
            .entry(kind)
            .or_insert(BindingPower::Primary);
        self.nud_lookup.insert(kind, nud_fn);
    }

    pub fn stmt(&mut self, kind: TokenKind, stmt_fn: StmtHandler) {
        self.binding_power_lookup.insert(kind, BindingPower::Default);
        self.stmt_lookup.insert(kind, stmt_fn);
    }

    pub fn type_nud(&mut self, kind: TokenKind, nud_fn: TypeNUDHandler) {
        self.type_nud_lookup.insert(kind, nud_fn);
    }

    /// Start of the current token.
    pub fn get_position(&self) -> Position {
        self.current_token().span.start.clone()
    }

    /// End of the last consumed token.
    pub fn get_previous_end(&self) -> Position {
        match self.pos.checked_sub(1) {
            Some(previous) => self.tokens[previous].span.end.clone(),
            None => Position(0, Rc::clone(&self.file)),
        }
    }
}

/// Parses a token stream into top-level statements, stopping at the first
/// syntax error.
pub fn parse(tokens: Vec<Token>, file: Rc<String>) -> Result<Vec<Stmt>, Error> {
    let mut parser = Parser::new(tokens, file);
    create_token_lookups(&mut parser);
    create_token_type_lookups(&mut parser);

    let mut statements = vec![];
    while parser.has_tokens() {
        statements.push(parse_stmt(&mut parser)?);
    }

    Ok(statements)
}

/// Tokenizes and parses `source`. `file` names the source in positions.
pub fn parse_source(source: &str, file: &str) -> Result<Vec<Stmt>, Error> {
    let tokens = tokenize(source.to_string(), Some(file.to_string()))?;
    parse(tokens, Rc::new(file.to_string()))
}
