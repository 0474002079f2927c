//! Type annotations are a single keyword, `int` or `bool`. They go through
//! the same lookup-table dispatch as expressions so that a new type only
//! needs a handler registration.

use std::collections::HashMap;

use crate::{
    ast::types::Type,
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
};

use super::parser::Parser;

pub type TypeNUDHandler = fn(&mut Parser) -> Result<Type, Error>;

pub type TypeNUDLookup = HashMap<TokenKind, TypeNUDHandler>;

pub fn create_token_type_lookups(parser: &mut Parser) {
    parser.type_nud(TokenKind::Int, parse_primitive_type);
    parser.type_nud(TokenKind::Bool, parse_primitive_type);
}

pub fn parse_primitive_type(parser: &mut Parser) -> Result<Type, Error> {
    let token = parser.advance();

    Type::from_name(&token.value).ok_or_else(|| {
        Error::new(
            ErrorImpl::UnexpectedTokenDetailed {
                token: token.value.clone(),
                message: String::from("expected `int` or `bool`"),
            },
            token.span.start.clone(),
        )
    })
}

pub fn parse_type(parser: &mut Parser) -> Result<Type, Error> {
    let token_kind = parser.current_token_kind();
    let Some(handler) = parser.get_type_nud_lookup().get(&token_kind).copied() else {
        return Err(Error::new(
            ErrorImpl::UnexpectedTokenDetailed {
                token: parser.current_token().value.clone(),
                message: String::from("expected `int` or `bool`"),
            },
            parser.get_position(),
        ));
    };

    handler(parser)
}
