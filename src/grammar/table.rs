// SPDX-License-Identifier: SEE LICENSE IN LICENSE.md
// SPDX-FileCopyrightText: 2023 CYBERTEC PostgreSQL International GmbH
// <office@cybertec.at>

//! Implements parsing of CREATE TABLE … AS statements.

use super::{parse_select, parse_table_name};
use crate::expression::{Expression, ExprKind};
use crate::lexer::TokenKind;
use crate::parser::{ParseError, Parser};
use crate::util::unquote_string;

/// Parses `CREATE TABLE [db.]name [STORED AS fmt] [TBLPROPERTIES (…)] AS
/// select`. The storage format lands in the same `format` property the
/// rewriter writes, so rendering has a single properties path.
pub(crate) fn parse_create(p: &mut Parser) -> Result<Expression, ParseError> {
    p.expect(TokenKind::CreateKw)?;
    p.expect(TokenKind::TableKw)?;

    let table = parse_table_name(p)?;
    let mut properties = Vec::new();

    if p.eat(TokenKind::StoredKw) {
        p.expect(TokenKind::AsKw)?;
        let format = p.expect(TokenKind::Ident)?;
        properties.push(property("format", format.text));
    }

    if p.eat(TokenKind::TblpropertiesKw) {
        p.expect(TokenKind::LParen)?;
        loop {
            let key = p.expect(TokenKind::QuotedLiteral)?;
            let eq = p.expect(TokenKind::ComparisonOp)?;
            if eq.text != "=" {
                return Err(ParseError::UnexpectedInput {
                    found: eq.text.to_owned(),
                    offset: eq.range.start().into(),
                });
            }
            let value = p.expect(TokenKind::QuotedLiteral)?;
            properties.push(property(&unquote_string(key.text), &unquote_string(value.text)));

            if !p.eat(TokenKind::Comma) {
                break;
            }
        }
        p.expect(TokenKind::RParen)?;
    }

    p.expect(TokenKind::AsKw)?;
    let select = parse_select(p)?;

    let mut create = Expression::new(ExprKind::Create)
        .set("this", table)
        .set("kind", "table")
        .set("expression", select);
    if !properties.is_empty() {
        create = create.set(
            "properties",
            Expression::new(ExprKind::Properties).set("expressions", properties),
        );
    }

    Ok(create)
}

fn property(key: &str, value: &str) -> Expression {
    Expression::new(ExprKind::Property)
        .set("this", Expression::literal_string(key))
        .set("value", Expression::literal_string(value))
}
