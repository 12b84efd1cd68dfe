// SPDX-License-Identifier: SEE LICENSE IN LICENSE.md
// SPDX-FileCopyrightText: 2022 CYBERTEC PostgreSQL International GmbH
// <office@cybertec.at>

//! Implements grammar parsing of the token stream from the lexer.

mod expressions;
mod query;
mod table;

pub(crate) use expressions::*;
pub(crate) use query::*;
pub(crate) use table::*;

use crate::expression::{Expression, ExprKind};
use crate::lexer::{Token, TokenKind};
use crate::parser::{ParseError, Parser};
use crate::util::unquote_ident;

/// Parses all statements, split at top-level `;`. Empty statements are
/// skipped, so a trailing `;` is fine.
pub(crate) fn parse_statements(p: &mut Parser) -> Result<Vec<Expression>, ParseError> {
    let mut statements = Vec::new();

    loop {
        while p.eat(TokenKind::SemiColon) {}
        if p.at(TokenKind::Eof) {
            break;
        }

        statements.push(parse_statement(p)?);

        if !p.at(TokenKind::SemiColon) && !p.at(TokenKind::Eof) {
            return Err(p.unexpected());
        }
    }

    Ok(statements)
}

fn parse_statement(p: &mut Parser) -> Result<Expression, ParseError> {
    match p.current() {
        TokenKind::SelectKw => parse_select(p),
        TokenKind::CreateKw => parse_create(p),
        TokenKind::SetKw | TokenKind::AddKw => parse_command(p),
        // Bare expression fragments (rewriter snippets) with optional alias.
        _ => parse_projection(p),
    }
}

/// Commands keep their raw statement text verbatim.
fn parse_command(p: &mut Parser) -> Result<Expression, ParseError> {
    let start = p.offset();
    let mut end = start;

    while !p.at(TokenKind::SemiColon) && !p.at(TokenKind::Eof) {
        match p.bump_any() {
            Some(token) => end = token.range.end().into(),
            None => break,
        }
    }

    let text = p.source()[start..end].to_owned();
    Ok(Expression::new(ExprKind::Command).set("this", text))
}

/// Parses a SQL identifier, plain or delimited.
pub(crate) fn parse_ident(p: &mut Parser) -> Result<Expression, ParseError> {
    match p.current() {
        TokenKind::Ident => {
            let token = p.expect(TokenKind::Ident)?;
            Ok(ident_from_token(token))
        }
        TokenKind::DelimitedIdent => {
            let token = p.expect(TokenKind::DelimitedIdent)?;
            Ok(ident_from_token(token))
        }
        _ => Err(p.unexpected()),
    }
}

pub(crate) fn ident_from_token(token: Token) -> Expression {
    match token.kind {
        TokenKind::DelimitedIdent => Expression::identifier(unquote_ident(token.text), true),
        _ => Expression::identifier(token.text, false),
    }
}
