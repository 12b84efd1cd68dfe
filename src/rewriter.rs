// SPDX-License-Identifier: SEE LICENSE IN LICENSE.md
// SPDX-FileCopyrightText: 2022 CYBERTEC PostgreSQL International GmbH
// <office@cybertec.at>

//! Implements a fluent façade for common tree rewrites.

use crate::expression::{Arg, Expression, ExprKind};
use crate::parser::{parse_one, ParseError};

#[derive(Debug, Clone, Eq, thiserror::Error, PartialEq)]
pub enum RewriteError {
    #[error("Expression is already a CREATE TABLE AS")]
    AlreadyCreate,
    #[error("Expression has no SELECT to rewrite")]
    MissingSelect,
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Builds transformed copies of an expression tree. Every operation returns
/// a new façade over an independent tree, so façades can be reused and
/// chained freely.
#[derive(Debug, Clone)]
pub struct Rewriter {
    pub expression: Expression,
}

impl Rewriter {
    /// Deep-copies the input; the original tree is never touched.
    pub fn new(expression: &Expression) -> Self {
        Self {
            expression: expression.clone(),
        }
    }

    /// Takes ownership of the input instead of copying it.
    pub fn from_expression(expression: Expression) -> Self {
        Self { expression }
    }

    /// Wraps the expression as the SELECT side of a `CREATE TABLE … AS`.
    /// `properties` are ordered key/value pairs; a `format` property turns
    /// into `STORED AS` under the hive dialect.
    pub fn ctas(
        &self,
        table: &str,
        db: Option<&str>,
        properties: &[(&str, &str)],
    ) -> Result<Self, RewriteError> {
        if self.expression.find(ExprKind::Create).is_some() {
            return Err(RewriteError::AlreadyCreate);
        }

        let mut target =
            Expression::new(ExprKind::Table).set("this", Expression::identifier(table, false));
        if let Some(db) = db {
            target = target.set("db", Expression::identifier(db, false));
        }

        let properties: Vec<_> = properties
            .iter()
            .map(|(key, value)| {
                Expression::new(ExprKind::Property)
                    .set("this", Expression::literal_string(*key))
                    .set("value", Expression::literal_string(*value))
            })
            .collect();

        let create = Expression::new(ExprKind::Create)
            .set("this", target)
            .set("kind", "table")
            .set("expression", self.expression.clone())
            .set(
                "properties",
                Expression::new(ExprKind::Properties).set("expressions", properties),
            );

        Ok(Self::from_expression(create))
    }

    /// Parses each snippet and appends it to the select's projection list.
    pub fn add_selects(&self, selects: &[&str]) -> Result<Self, RewriteError> {
        let mut expression = self.expression.clone();

        let select = expression
            .find_mut(ExprKind::Select)
            .ok_or(RewriteError::MissingSelect)?;
        for sql in selects {
            let parsed = parse_one(sql)?;
            match select.args.get_mut("expressions") {
                Some(Arg::Seq(expressions)) => expressions.push(parsed),
                _ => {
                    select
                        .args
                        .insert("expressions".to_owned(), Arg::Seq(vec![parsed]));
                }
            }
        }

        Ok(Self::from_expression(expression))
    }

    /// Combines the parsed condition with an existing WHERE via `AND`/`OR`
    /// (new condition on the left), or installs a fresh WHERE. Any other
    /// operator leaves an existing WHERE untouched.
    pub fn add_where(&self, operator: &str, condition: &str) -> Result<Self, RewriteError> {
        let new_condition = parse_one(condition)?;
        let mut expression = self.expression.clone();

        let select = expression
            .find_mut(ExprKind::Select)
            .ok_or(RewriteError::MissingSelect)?;

        match select.args.get_mut("where") {
            Some(Arg::Node(where_clause)) => {
                let kind = match operator.to_uppercase().as_str() {
                    "AND" => Some(ExprKind::And),
                    "OR" => Some(ExprKind::Or),
                    _ => None,
                };

                if let Some(kind) = kind {
                    if let Some(Arg::Node(old)) = where_clause.args.shift_remove("this") {
                        let combined = Expression::new(kind)
                            .set("this", new_condition)
                            .set("expression", *old);
                        where_clause.args.insert("this".to_owned(), combined.into());
                    }
                }
            }
            _ => {
                let where_clause = Expression::new(ExprKind::Where).set("this", new_condition);
                select.args.insert("where".to_owned(), where_clause.into());
            }
        }

        Ok(Self::from_expression(expression))
    }

    /// Parses the join text (by prefixing a dummy select) and appends the
    /// lifted joins to the select's join list.
    pub fn add_join(&self, join: &str) -> Result<Self, RewriteError> {
        let parsed = parse_one(&format!("select fake from fake {join}"))?;
        let new_joins = match parsed.arg("joins") {
            Some(Arg::Seq(joins)) => joins.clone(),
            _ => Vec::new(),
        };

        let mut expression = self.expression.clone();
        let select = expression
            .find_mut(ExprKind::Select)
            .ok_or(RewriteError::MissingSelect)?;
        match select.args.get_mut("joins") {
            Some(Arg::Seq(joins)) => joins.extend(new_joins),
            _ => {
                select.args.insert("joins".to_owned(), Arg::Seq(new_joins));
            }
        }

        Ok(Self::from_expression(expression))
    }
}
