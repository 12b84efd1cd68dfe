// SPDX-License-Identifier: SEE LICENSE IN LICENSE.md
// SPDX-FileCopyrightText: 2022 CYBERTEC PostgreSQL International GmbH
// <office@cybertec.at>

//! Implements the logic/arithmetic SQL expression parser.

//  Heavily inspired by
//    https://matklad.github.io/2020/04/13/simple-but-powerful-pratt-parsing.html
//    https://arzg.github.io/lang/10/

use super::{ident_from_token, parse_ident, parse_select};
use crate::expression::{Expression, ExprKind};
use crate::lexer::{Token, TokenKind};
use crate::parser::{ParseError, Parser};
use crate::util::unquote_string;
use std::collections::HashSet;

lazy_static::lazy_static! {
    /// Function names rendered uppercase; anything else keeps source case.
    static ref BUILTIN_FUNCTIONS: HashSet<&'static str> = {
        let mut s = HashSet::new();
        s.extend(["SUM", "COUNT", "AVG", "MIN", "MAX", "IF", "COALESCE", "ROW"]);
        s
    };
}

const NOT_BP: u8 = 5;
const SPECIAL_BP: u8 = 9;
const SIGN_BP: u8 = 15;

pub(crate) fn parse_expr(p: &mut Parser) -> Result<Expression, ParseError> {
    expr_bp(p, 0)
}

fn expr_bp(p: &mut Parser, min_bp: u8) -> Result<Expression, ParseError> {
    let mut lhs = parse_prefix(p)?;

    loop {
        let op = p.current();

        // IN / LIKE / RLIKE / BETWEEN / IS share one binding power and
        // consume their own right-hand productions.
        if is_special(op) {
            if SPECIAL_BP < min_bp {
                break;
            }
            lhs = parse_special(p, lhs)?;
            continue;
        }

        if let Some((l_bp, r_bp)) = infix_bp(op) {
            if l_bp < min_bp {
                break;
            }

            let token = p.expect(op)?;
            let rhs = expr_bp(p, r_bp)?;
            lhs = match op {
                TokenKind::AndKw => Expression::new(ExprKind::And)
                    .set("this", lhs)
                    .set("expression", rhs),
                TokenKind::OrKw => Expression::new(ExprKind::Or)
                    .set("this", lhs)
                    .set("expression", rhs),
                _ => Expression::new(ExprKind::Binary)
                    .set("this", lhs)
                    .set("op", token.text)
                    .set("expression", rhs),
            };
            continue;
        }

        break;
    }

    Ok(lhs)
}

fn infix_bp(op: TokenKind) -> Option<(u8, u8)> {
    match op {
        TokenKind::OrKw => Some((1, 2)),
        TokenKind::AndKw => Some((3, 4)),
        TokenKind::ComparisonOp => Some((7, 8)),
        TokenKind::Plus | TokenKind::Minus => Some((11, 12)),
        TokenKind::Asterisk | TokenKind::Slash | TokenKind::Percentage => Some((13, 14)),
        _ => None,
    }
}

fn is_special(op: TokenKind) -> bool {
    matches!(
        op,
        TokenKind::InKw
            | TokenKind::LikeKw
            | TokenKind::RlikeKw
            | TokenKind::BetweenKw
            | TokenKind::IsKw
    )
}

fn parse_prefix(p: &mut Parser) -> Result<Expression, ParseError> {
    match p.current() {
        TokenKind::NotKw => {
            p.expect(TokenKind::NotKw)?;
            let this = expr_bp(p, NOT_BP)?;
            Ok(Expression::new(ExprKind::Not).set("this", this))
        }
        TokenKind::Minus | TokenKind::Plus => {
            let kind = p.current();
            let token = p.expect(kind)?;
            let this = expr_bp(p, SIGN_BP)?;
            Ok(Expression::new(ExprKind::Unary)
                .set("op", token.text)
                .set("this", this))
        }
        _ => parse_primary(p),
    }
}

fn parse_primary(p: &mut Parser) -> Result<Expression, ParseError> {
    match p.current() {
        TokenKind::Number => {
            let token = p.expect(TokenKind::Number)?;
            Ok(Expression::literal_number(token.text))
        }
        TokenKind::QuotedLiteral => {
            let token = p.expect(TokenKind::QuotedLiteral)?;
            Ok(Expression::literal_string(unquote_string(token.text)))
        }
        TokenKind::NullKw => {
            p.expect(TokenKind::NullKw)?;
            Ok(Expression::new(ExprKind::Null))
        }
        TokenKind::Asterisk => {
            p.expect(TokenKind::Asterisk)?;
            Ok(Expression::new(ExprKind::Star))
        }
        TokenKind::CaseKw => parse_case(p),
        TokenKind::LParen => parse_paren(p),
        TokenKind::Ident | TokenKind::RowKw => {
            let kind = p.current();
            let token = p.expect(kind)?;
            if p.at(TokenKind::LParen) {
                parse_function(p, token)
            } else {
                parse_column_path(p, token)
            }
        }
        TokenKind::DelimitedIdent => {
            let token = p.expect(TokenKind::DelimitedIdent)?;
            parse_column_path(p, token)
        }
        _ => Err(p.unexpected()),
    }
}

/// Parses `(…)` grouping, `(a, b, …)` tuples and `(SELECT …)` subqueries.
fn parse_paren(p: &mut Parser) -> Result<Expression, ParseError> {
    p.expect(TokenKind::LParen)?;

    if p.at(TokenKind::SelectKw) {
        let select = parse_select(p)?;
        p.expect(TokenKind::RParen)?;
        return Ok(Expression::new(ExprKind::Paren).set("this", select));
    }

    let first = parse_expr(p)?;
    if p.at(TokenKind::Comma) {
        let mut expressions = vec![first];
        while p.eat(TokenKind::Comma) {
            expressions.push(parse_expr(p)?);
        }
        p.expect(TokenKind::RParen)?;
        return Ok(Expression::new(ExprKind::Tuple).set("expressions", expressions));
    }

    p.expect(TokenKind::RParen)?;
    Ok(Expression::new(ExprKind::Paren).set("this", first))
}

fn parse_case(p: &mut Parser) -> Result<Expression, ParseError> {
    p.expect(TokenKind::CaseKw)?;

    let mut case = Expression::new(ExprKind::Case);
    if !p.at(TokenKind::WhenKw) {
        case = case.set("this", parse_expr(p)?);
    }

    let mut ifs = Vec::new();
    loop {
        p.expect(TokenKind::WhenKw)?;
        let condition = parse_expr(p)?;
        p.expect(TokenKind::ThenKw)?;
        let then = parse_expr(p)?;
        ifs.push(
            Expression::new(ExprKind::When)
                .set("this", condition)
                .set("then", then),
        );

        if !p.at(TokenKind::WhenKw) {
            break;
        }
    }
    case = case.set("ifs", ifs);

    if p.eat(TokenKind::ElseKw) {
        case = case.set("default", parse_expr(p)?);
    }
    p.expect(TokenKind::EndKw)?;

    Ok(case)
}

fn parse_function(p: &mut Parser, name: Token) -> Result<Expression, ParseError> {
    if name.text.eq_ignore_ascii_case("cast") {
        return parse_cast(p);
    }

    p.expect(TokenKind::LParen)?;
    let mut args = Vec::new();
    if !p.at(TokenKind::RParen) {
        loop {
            args.push(parse_expr(p)?);
            if !p.eat(TokenKind::Comma) {
                break;
            }
        }
    }
    p.expect(TokenKind::RParen)?;

    let upper = name.text.to_uppercase();
    let normalized = if BUILTIN_FUNCTIONS.contains(upper.as_str()) {
        upper
    } else {
        name.text.to_owned()
    };

    if normalized == "IF" && args.len() != 3 {
        return Err(ParseError::WrongArity {
            func: normalized,
            expected: 3,
            found: args.len(),
            offset: name.range.start().into(),
        });
    }

    let func = Expression::new(ExprKind::Func)
        .set("this", normalized)
        .set("expressions", args);

    if p.at(TokenKind::OverKw) {
        return parse_window(p, func);
    }
    Ok(func)
}

fn parse_cast(p: &mut Parser) -> Result<Expression, ParseError> {
    p.expect(TokenKind::LParen)?;
    let this = parse_expr(p)?;
    p.expect(TokenKind::AsKw)?;
    let to = parse_ident(p)?;
    p.expect(TokenKind::RParen)?;

    Ok(Expression::new(ExprKind::Cast)
        .set("this", this)
        .set("to", to))
}

/// Parses the windowing clause of `f(…) OVER (…)`.
fn parse_window(p: &mut Parser, func: Expression) -> Result<Expression, ParseError> {
    p.expect(TokenKind::OverKw)?;
    p.expect(TokenKind::LParen)?;

    let mut window = Expression::new(ExprKind::Window).set("this", func);

    if p.eat(TokenKind::PartitionKw) {
        p.expect(TokenKind::ByKw)?;
        let mut expressions = vec![parse_expr(p)?];
        while p.eat(TokenKind::Comma) {
            expressions.push(parse_expr(p)?);
        }
        window = window.set("partition_by", expressions);
    }

    if p.eat(TokenKind::OrderKw) {
        p.expect(TokenKind::ByKw)?;
        let mut expressions = vec![parse_expr(p)?];
        while p.eat(TokenKind::Comma) {
            expressions.push(parse_expr(p)?);
        }
        window = window.set(
            "order",
            Expression::new(ExprKind::OrderBy).set("expressions", expressions),
        );
    }

    p.expect(TokenKind::RParen)?;
    Ok(window)
}

/// Parses an optionally qualified column: `a`, `t.a` or `db.t.a`.
fn parse_column_path(p: &mut Parser, first: Token) -> Result<Expression, ParseError> {
    let mut parts = vec![ident_from_token(first)];
    while p.eat(TokenKind::Dot) {
        parts.push(parse_ident(p)?);
    }

    if parts.len() > 3 {
        return Err(p.unexpected());
    }

    let mut column = Expression::new(ExprKind::Column);
    let this = parts.pop();
    let table = parts.pop();
    let db = parts.pop();
    if let Some(this) = this {
        column = column.set("this", this);
    }
    if let Some(table) = table {
        column = column.set("table", table);
    }
    if let Some(db) = db {
        column = column.set("db", db);
    }

    Ok(column)
}

fn parse_special(p: &mut Parser, lhs: Expression) -> Result<Expression, ParseError> {
    match p.current() {
        TokenKind::InKw => {
            p.expect(TokenKind::InKw)?;
            p.expect(TokenKind::LParen)?;

            let mut within = Expression::new(ExprKind::In).set("this", lhs);
            if p.at(TokenKind::SelectKw) {
                within = within.set("query", parse_select(p)?);
            } else {
                let mut expressions = vec![parse_expr(p)?];
                while p.eat(TokenKind::Comma) {
                    expressions.push(parse_expr(p)?);
                }
                within = within.set("expressions", expressions);
            }
            p.expect(TokenKind::RParen)?;
            Ok(within)
        }
        TokenKind::LikeKw => {
            p.expect(TokenKind::LikeKw)?;
            let pattern = expr_bp(p, SPECIAL_BP + 1)?;
            Ok(Expression::new(ExprKind::Like)
                .set("this", lhs)
                .set("expression", pattern))
        }
        TokenKind::RlikeKw => {
            p.expect(TokenKind::RlikeKw)?;
            let pattern = expr_bp(p, SPECIAL_BP + 1)?;
            Ok(Expression::new(ExprKind::Rlike)
                .set("this", lhs)
                .set("expression", pattern))
        }
        TokenKind::BetweenKw => {
            // The AND here belongs to BETWEEN, so the bounds parse above
            // the boolean operators.
            p.expect(TokenKind::BetweenKw)?;
            let low = expr_bp(p, SPECIAL_BP + 1)?;
            p.expect(TokenKind::AndKw)?;
            let high = expr_bp(p, SPECIAL_BP + 1)?;
            Ok(Expression::new(ExprKind::Between)
                .set("this", lhs)
                .set("low", low)
                .set("high", high))
        }
        TokenKind::IsKw => {
            p.expect(TokenKind::IsKw)?;
            let negated = p.eat(TokenKind::NotKw);
            p.expect(TokenKind::NullKw)?;

            let is_null = Expression::new(ExprKind::IsNull).set("this", lhs);
            if negated {
                Ok(Expression::new(ExprKind::Not).set("this", is_null))
            } else {
                Ok(is_null)
            }
        }
        _ => Err(p.unexpected()),
    }
}
