use crate::{
    ast::{
        ast::Stmt,
        statements::{ConstantDef, FunctionDef, Parameter},
    },
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
    parser::{expr::parse_expr, lookups::BindingPower},
    Span,
};

use super::{parser::Parser, types::parse_type};

pub fn parse_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    if let Some(handler) = parser
        .get_stmt_lookup()
        .get(&parser.current_token_kind())
        .copied()
    {
        return handler(parser);
    }

    let expr = parse_expr(parser, BindingPower::Default)?;

    // The trailing semicolon is optional for bare expressions
    if parser.current_token_kind() == TokenKind::Semicolon {
        parser.advance();
    } else if parser.has_tokens() {
        return Err(Error::new(
            ErrorImpl::UnexpectedToken {
                token: parser.current_token().value.clone(),
            },
            parser.get_position(),
        ));
    }

    Ok(Stmt::Expression(expr))
}

fn expect_identifier(parser: &mut Parser, context: &str) -> Result<String, Error> {
    let error = Error::new(
        ErrorImpl::UnexpectedTokenDetailed {
            token: parser.current_token().value.clone(),
            message: format!("expected identifier {}", context),
        },
        parser.get_position(),
    );

    Ok(parser.expect_error(TokenKind::Identifier, Some(error))?.value)
}

pub fn parse_valdef_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start;

    let name = expect_identifier(parser, "after `valdef`")?;
    parser.expect(TokenKind::Colon)?;
    let declared_type = parse_type(parser)?;
    parser.expect(TokenKind::Assignment)?;
    let body = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::Semicolon)?;

    Ok(Stmt::ValDef(ConstantDef::new(
        &name,
        declared_type,
        body,
        Span {
            start,
            end: parser.get_previous_end(),
        },
    )))
}

pub fn parse_funcdef_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start;

    let name = expect_identifier(parser, "after `funcdef`")?;

    parser.expect(TokenKind::OpenParen)?;

    let mut parameters = Vec::new();
    if parser.current_token_kind() != TokenKind::CloseParen {
        loop {
            let parameter = expect_identifier(parser, "in parameter list")?;
            parser.expect(TokenKind::Colon)?;
            let ty = parse_type(parser)?;
            parameters.push(Parameter {
                name: parameter,
                ty,
            });

            if parser.current_token_kind() == TokenKind::Comma {
                parser.advance();
            } else {
                break;
            }
        }
    }

    parser.expect(TokenKind::CloseParen)?;
    parser.expect(TokenKind::Arrow)?;
    let return_type = parse_type(parser)?;
    parser.expect(TokenKind::Assignment)?;
    let body = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::Semicolon)?;

    Ok(Stmt::FuncDef(FunctionDef::new(
        &name,
        parameters,
        return_type,
        body,
        Span {
            start,
            end: parser.get_previous_end(),
        },
    )))
}
