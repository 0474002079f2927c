use crate::{
    ast::{
        ast::{Expr, ExprKind},
        expressions::{BinaryOperator, UnaryOperator},
    },
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
    Span,
};

use super::{lookups::BindingPower, parser::Parser};

fn unexpected_token(parser: &Parser) -> Error {
    Error::new(
        ErrorImpl::UnexpectedToken {
            token: parser.current_token().value.clone(),
        },
        parser.get_position(),
    )
}

fn span_between(left: &Expr, right: &Expr) -> Span {
    Span {
        start: left.get_span().start.clone(),
        end: right.get_span().end.clone(),
    }
}

pub fn parse_expr(parser: &mut Parser, bp: BindingPower) -> Result<Expr, Error> {
    // First parse NUD
    let token_kind = parser.current_token_kind();
    let Some(nud) = parser.get_nud_lookup().get(&token_kind).copied() else {
        return Err(unexpected_token(parser));
    };

    let mut left = nud(parser)?;

    // While LED and current BP is less than BP of current token, continue parsing lhs
    loop {
        let token_kind = parser.current_token_kind();
        let operator_bp = *parser
            .get_bp_lookup()
            .get(&token_kind)
            .unwrap_or(&BindingPower::Default);

        if operator_bp <= bp {
            break;
        }

        let Some(led) = parser.get_led_lookup().get(&token_kind).copied() else {
            return Err(unexpected_token(parser));
        };

        left = led(parser, left, operator_bp)?;
    }

    Ok(left)
}

pub fn parse_primary_expr(parser: &mut Parser) -> Result<Expr, Error> {
    match parser.current_token_kind() {
        TokenKind::Number => parse_int_literal(parser, false),
        TokenKind::True | TokenKind::False => {
            let token = parser.advance();
            Ok(Expr::new(
                ExprKind::BoolLiteral(token.kind == TokenKind::True),
                token.span,
            ))
        }
        TokenKind::Identifier => {
            let token = parser.advance();
            Ok(Expr::new(ExprKind::VariableRef(token.value), token.span))
        }
        _ => Err(unexpected_token(parser)),
    }
}

/// Parses an integer literal, negating it when it directly follows a `-`
/// so that `-2147483648` is representable.
fn parse_int_literal(parser: &mut Parser, negative: bool) -> Result<Expr, Error> {
    let text = if negative {
        format!("-{}", parser.current_token().value)
    } else {
        parser.current_token().value.clone()
    };

    match text.parse::<i32>() {
        Ok(value) => {
            let token = parser.advance();
            Ok(Expr::new(ExprKind::IntLiteral(value), token.span))
        }
        Err(_) => Err(Error::new(
            ErrorImpl::NumberParseError { token: text },
            parser.get_position(),
        )),
    }
}

pub fn parse_binary_expr(parser: &mut Parser, left: Expr, bp: BindingPower) -> Result<Expr, Error> {
    let operator_token = parser.advance();

    let right = parse_expr(parser, bp)?;
    let span = span_between(&left, &right);

    // `a - b` is `a + (-b)`
    if operator_token.kind == TokenKind::Dash {
        let negated_span = right.get_span().clone();
        let negated = Expr::new(
            ExprKind::UnaryOp {
                operator: UnaryOperator::Neg,
                operand: Box::new(right),
            },
            negated_span,
        );

        return Ok(Expr::new(
            ExprKind::BinaryOp {
                operator: BinaryOperator::Add,
                left: Box::new(left),
                right: Box::new(negated),
            },
            span,
        ));
    }

    let Some(operator) = BinaryOperator::from_token(operator_token.kind) else {
        return Err(Error::new(
            ErrorImpl::UnexpectedToken {
                token: operator_token.value,
            },
            operator_token.span.start,
        ));
    };

    Ok(Expr::new(
        ExprKind::BinaryOp {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        },
        span,
    ))
}

pub fn parse_prefix_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let operator_token = parser.advance();

    let Some(operator) = UnaryOperator::from_token(operator_token.kind) else {
        return Err(Error::new(
            ErrorImpl::UnexpectedToken {
                token: operator_token.value,
            },
            operator_token.span.start,
        ));
    };

    if operator == UnaryOperator::Neg && parser.current_token_kind() == TokenKind::Number {
        let mut literal = parse_int_literal(parser, true)?;
        literal.span.start = operator_token.span.start;
        return Ok(literal);
    }

    let operand = parse_expr(parser, BindingPower::Unary)?;
    let end = operand.get_span().end.clone();

    Ok(Expr::new(
        ExprKind::UnaryOp {
            operator,
            operand: Box::new(operand),
        },
        Span {
            start: operator_token.span.start,
            end,
        },
    ))
}

pub fn parse_grouping_expr(parser: &mut Parser) -> Result<Expr, Error> {
    parser.advance();
    let expr = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::CloseParen)?;

    Ok(expr)
}

pub fn parse_conditional_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let start = parser.advance().span.start;

    let condition = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::Then)?;
    let then_branch = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::Else)?;
    let else_branch = parse_expr(parser, BindingPower::Default)?;

    let end = else_branch.get_span().end.clone();

    Ok(Expr::new(
        ExprKind::Conditional {
            condition: Box::new(condition),
            then_branch: Box::new(then_branch),
            else_branch: Box::new(else_branch),
        },
        Span { start, end },
    ))
}

pub fn parse_call_expr(parser: &mut Parser, left: Expr, _bp: BindingPower) -> Result<Expr, Error> {
    let ExprKind::VariableRef(function) = &left.kind else {
        return Err(Error::new(
            ErrorImpl::UnexpectedTokenDetailed {
                token: String::from("("),
                message: String::from("only named functions can be called"),
            },
            parser.get_position(),
        ));
    };
    let function = function.clone();

    parser.advance();

    let mut arguments = vec![];

    if parser.current_token_kind() != TokenKind::CloseParen {
        loop {
            arguments.push(parse_expr(parser, BindingPower::Default)?);

            if parser.current_token_kind() == TokenKind::Comma {
                parser.advance();
            } else {
                break;
            }
        }
    }

    parser.expect(TokenKind::CloseParen)?;

    Ok(Expr::new(
        ExprKind::Call {
            function,
            arguments,
        },
        Span {
            start: left.get_span().start.clone(),
            end: parser.get_previous_end(),
        },
    ))
}
