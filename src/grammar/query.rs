// SPDX-License-Identifier: SEE LICENSE IN LICENSE.md
// SPDX-FileCopyrightText: 2022 CYBERTEC PostgreSQL International GmbH
// <office@cybertec.at>

//! Implements parsing of SELECT statements from a token stream.

use super::{parse_expr, parse_ident};
use crate::expression::{Expression, ExprKind};
use crate::lexer::TokenKind;
use crate::parser::{ParseError, Parser};

pub(crate) fn parse_select(p: &mut Parser) -> Result<Expression, ParseError> {
    p.expect(TokenKind::SelectKw)?;

    let mut select = Expression::new(ExprKind::Select);

    let mut expressions = Vec::new();
    if !p.at(TokenKind::FromKw) {
        loop {
            expressions.push(parse_projection(p)?);
            if !p.eat(TokenKind::Comma) {
                break;
            }
        }
    }
    select = select.set("expressions", expressions);

    if p.eat(TokenKind::FromKw) {
        let mut tables = vec![parse_table_ref(p)?];
        while p.eat(TokenKind::Comma) {
            tables.push(parse_table_ref(p)?);
        }
        select = select.set(
            "from",
            Expression::new(ExprKind::From).set("expressions", tables),
        );
    }

    let mut joins = Vec::new();
    while p.current().is_join_start() {
        joins.push(parse_join(p)?);
    }
    if !joins.is_empty() {
        select = select.set("joins", joins);
    }

    if p.eat(TokenKind::WhereKw) {
        select = select.set(
            "where",
            Expression::new(ExprKind::Where).set("this", parse_expr(p)?),
        );
    }

    if p.eat(TokenKind::GroupKw) {
        p.expect(TokenKind::ByKw)?;
        select = select.set(
            "group",
            Expression::new(ExprKind::GroupBy).set("expressions", parse_expr_list(p)?),
        );
    }

    if p.eat(TokenKind::HavingKw) {
        select = select.set(
            "having",
            Expression::new(ExprKind::Having).set("this", parse_expr(p)?),
        );
    }

    if p.eat(TokenKind::OrderKw) {
        p.expect(TokenKind::ByKw)?;
        select = select.set(
            "order",
            Expression::new(ExprKind::OrderBy).set("expressions", parse_expr_list(p)?),
        );
    }

    if p.eat(TokenKind::LimitKw) {
        let number = p.expect(TokenKind::Number)?;
        select = select.set(
            "limit",
            Expression::new(ExprKind::Limit).set("this", Expression::literal_number(number.text)),
        );
    }

    // Percent-valued targets are accepted in any order; the renderer emits
    // them canonically.
    while p.current().is_percent_target() {
        let kind = p.current();
        p.expect(kind)?;
        let number = p.expect(TokenKind::Number)?;
        p.expect(TokenKind::Percentage)?;

        let (key, target_kind) = match kind {
            TokenKind::ErrorTargetKw => ("error_target", ExprKind::ErrorTarget),
            TokenKind::ConfidenceKw => ("confidence", ExprKind::Confidence),
            TokenKind::RecallTargetKw => ("recall_target", ExprKind::RecallTarget),
            _ => ("precision_target", ExprKind::PrecisionTarget),
        };
        select = select.set(
            key,
            Expression::new(target_kind).set("this", Expression::literal_number(number.text)),
        );
    }

    Ok(select)
}

fn parse_expr_list(p: &mut Parser) -> Result<Vec<Expression>, ParseError> {
    let mut expressions = vec![parse_expr(p)?];
    while p.eat(TokenKind::Comma) {
        expressions.push(parse_expr(p)?);
    }
    Ok(expressions)
}

/// Parses one projection: an expression with optional scalar or tuple alias,
/// optionally wrapped by a trailing `#` annotation.
pub(crate) fn parse_projection(p: &mut Parser) -> Result<Expression, ParseError> {
    let mut expression = parse_expr(p)?;
    expression = parse_alias(p, expression)?;

    if p.at(TokenKind::Annotation) {
        let token = p.expect(TokenKind::Annotation)?;
        expression = Expression::new(ExprKind::Annotation)
            .set("this", token.text[1..].trim())
            .set("expression", expression);
    }

    Ok(expression)
}

/// Wraps `expression` in an alias if one follows: `AS x`, `AS (a, b)` or a
/// bare identifier.
fn parse_alias(p: &mut Parser, expression: Expression) -> Result<Expression, ParseError> {
    let alias = if p.eat(TokenKind::AsKw) {
        if p.at(TokenKind::LParen) {
            p.expect(TokenKind::LParen)?;
            let mut names = vec![parse_ident(p)?];
            while p.eat(TokenKind::Comma) {
                names.push(parse_ident(p)?);
            }
            p.expect(TokenKind::RParen)?;
            Expression::new(ExprKind::Tuple).set("expressions", names)
        } else {
            parse_ident(p)?
        }
    } else if p.at(TokenKind::Ident) || p.at(TokenKind::DelimitedIdent) {
        parse_ident(p)?
    } else {
        return Ok(expression);
    };

    Ok(Expression::new(ExprKind::Alias)
        .set("this", expression)
        .set("alias", alias))
}

/// Parses one source in a FROM list: a table name or a parenthesized
/// subquery, optionally aliased.
fn parse_table_ref(p: &mut Parser) -> Result<Expression, ParseError> {
    let this = if p.at(TokenKind::LParen) {
        p.expect(TokenKind::LParen)?;
        let select = parse_select(p)?;
        p.expect(TokenKind::RParen)?;
        Expression::new(ExprKind::Paren).set("this", select)
    } else {
        parse_table_name(p)?
    };

    parse_alias(p, this)
}

/// Parses `name` or `db.name` into a table node.
pub(crate) fn parse_table_name(p: &mut Parser) -> Result<Expression, ParseError> {
    let first = parse_ident(p)?;

    if p.eat(TokenKind::Dot) {
        let name = parse_ident(p)?;
        return Ok(Expression::new(ExprKind::Table)
            .set("this", name)
            .set("db", first));
    }

    Ok(Expression::new(ExprKind::Table).set("this", first))
}

fn parse_join(p: &mut Parser) -> Result<Expression, ParseError> {
    let kind = match p.current() {
        TokenKind::LeftKw => {
            p.expect(TokenKind::LeftKw)?;
            p.expect(TokenKind::JoinKw)?;
            "LEFT"
        }
        TokenKind::RightKw => {
            p.expect(TokenKind::RightKw)?;
            p.expect(TokenKind::JoinKw)?;
            "RIGHT"
        }
        TokenKind::InnerKw => {
            p.expect(TokenKind::InnerKw)?;
            p.expect(TokenKind::JoinKw)?;
            "INNER"
        }
        TokenKind::CrossKw => {
            p.expect(TokenKind::CrossKw)?;
            p.expect(TokenKind::JoinKw)?;
            "CROSS"
        }
        TokenKind::FullKw => {
            p.expect(TokenKind::FullKw)?;
            p.expect(TokenKind::OuterKw)?;
            p.expect(TokenKind::JoinKw)?;
            "FULL OUTER"
        }
        _ => {
            p.expect(TokenKind::JoinKw)?;
            ""
        }
    };

    let this = parse_table_ref(p)?;
    p.expect(TokenKind::OnKw)?;
    let on = parse_expr(p)?;

    Ok(Expression::new(ExprKind::Join)
        .set("this", this)
        .set("kind", kind)
        .set("on", on))
}
