// SPDX-License-Identifier: SEE LICENSE IN LICENSE.md
// SPDX-FileCopyrightText: 2022 CYBERTEC PostgreSQL International GmbH
// <office@cybertec.at>

//! Implements the uniform tagged expression tree produced by the parser.

use crate::render::{render, Dialect};
use indexmap::IndexMap;
use std::fmt;

/// Tags for every node kind the parser and renderer know about.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ExprKind {
    Alias,
    And,
    Annotation,
    Between,
    Binary,
    Case,
    Cast,
    Column,
    Command,
    Confidence,
    Create,
    ErrorTarget,
    From,
    Func,
    GroupBy,
    Having,
    Hint,
    Identifier,
    In,
    IsNull,
    Join,
    Like,
    Limit,
    Literal,
    Not,
    Null,
    Or,
    OrderBy,
    Paren,
    PrecisionTarget,
    Properties,
    Property,
    RecallTarget,
    Rlike,
    Select,
    Star,
    Table,
    Tuple,
    Unary,
    When,
    Where,
    Window,
}

impl fmt::Display for ExprKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// A single named argument of an [`Expression`]: a child node, an ordered
/// sequence of children, or a primitive payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arg {
    Node(Box<Expression>),
    Seq(Vec<Expression>),
    Str(String),
    Bool(bool),
}

impl From<Expression> for Arg {
    fn from(expression: Expression) -> Self {
        Self::Node(Box::new(expression))
    }
}

impl From<Vec<Expression>> for Arg {
    fn from(expressions: Vec<Expression>) -> Self {
        Self::Seq(expressions)
    }
}

impl From<String> for Arg {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<&str> for Arg {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

impl From<bool> for Arg {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// A node of the syntax tree: a kind tag plus a named argument map.
///
/// The permitted key set per kind is fixed by a schema table; the parser only
/// constructs well-shaped nodes, while [`Parser::expression`] validates
/// caller-supplied argument maps against the same table.
///
/// Equality is structural: kinds must match and the args must be equal
/// element-wise. There are no parent back-references; traversal only walks
/// downward.
///
/// [`Parser::expression`]: crate::Parser::expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expression {
    pub kind: ExprKind,
    pub args: IndexMap<String, Arg>,
}

impl Expression {
    pub fn new(kind: ExprKind) -> Self {
        Self {
            kind,
            args: IndexMap::new(),
        }
    }

    /// Builder-style argument insertion.
    pub fn set(mut self, key: &str, arg: impl Into<Arg>) -> Self {
        self.args.insert(key.to_owned(), arg.into());
        self
    }

    /// An unquoted or quoted identifier node.
    pub fn identifier(name: impl Into<String>, quoted: bool) -> Self {
        Self::new(ExprKind::Identifier)
            .set("this", name.into())
            .set("quoted", quoted)
    }

    /// A string literal node (`'…'`).
    pub fn literal_string(value: impl Into<String>) -> Self {
        Self::new(ExprKind::Literal)
            .set("this", value.into())
            .set("is_string", true)
    }

    /// A numeric literal node; the payload keeps the lexical form.
    pub fn literal_number(value: impl Into<String>) -> Self {
        Self::new(ExprKind::Literal)
            .set("this", value.into())
            .set("is_string", false)
    }

    pub fn arg(&self, key: &str) -> Option<&Arg> {
        self.args.get(key)
    }

    /// The child node stored under `key`, if any.
    pub fn node(&self, key: &str) -> Option<&Expression> {
        match self.args.get(key) {
            Some(Arg::Node(expression)) => Some(expression),
            _ => None,
        }
    }

    /// The child sequence stored under `key`; empty if absent.
    pub fn seq(&self, key: &str) -> &[Expression] {
        match self.args.get(key) {
            Some(Arg::Seq(expressions)) => expressions,
            _ => &[],
        }
    }

    /// The boolean payload stored under `key`, or `false` if absent.
    pub fn flag(&self, key: &str) -> bool {
        matches!(self.args.get(key), Some(Arg::Bool(true)))
    }

    /// The textual payload of a string argument or of a child node's `this`
    /// payload (identifiers, literals), or `""` if absent.
    pub fn text(&self, key: &str) -> &str {
        match self.args.get(key) {
            Some(Arg::Str(value)) => value,
            Some(Arg::Node(child)) => match child.args.get("this") {
                Some(Arg::Str(value)) => value,
                _ => "",
            },
            _ => "",
        }
    }

    /// All direct children, in argument insertion order.
    pub fn children(&self) -> impl Iterator<Item = &Expression> {
        self.args.values().flat_map(|arg| {
            let children: &[Expression] = match arg {
                Arg::Node(expression) => std::slice::from_ref(expression),
                Arg::Seq(expressions) => expressions,
                _ => &[],
            };
            children.iter()
        })
    }

    /// Depth-first search for the first node of the given kind, starting at
    /// (and including) `self`.
    pub fn find(&self, kind: ExprKind) -> Option<&Expression> {
        self.find_all(kind).next()
    }

    /// Lazy depth-first preorder iterator over all nodes of the given kind.
    pub fn find_all(&self, kind: ExprKind) -> FindAll<'_> {
        FindAll {
            kind,
            stack: vec![self],
        }
    }

    /// Mutable variant of [`find`](Self::find), used by the rewriter.
    pub fn find_mut(&mut self, kind: ExprKind) -> Option<&mut Expression> {
        if self.kind == kind {
            return Some(self);
        }

        for arg in self.args.values_mut() {
            match arg {
                Arg::Node(child) => {
                    if let Some(found) = child.find_mut(kind) {
                        return Some(found);
                    }
                }
                Arg::Seq(children) => {
                    for child in children {
                        if let Some(found) = child.find_mut(kind) {
                            return Some(found);
                        }
                    }
                }
                _ => {}
            }
        }

        None
    }

    /// Renders this tree as SQL text for the given dialect.
    pub fn sql(&self, dialect: Dialect) -> String {
        render(self, dialect)
    }
}

/// Iterator returned by [`Expression::find_all`].
pub struct FindAll<'a> {
    kind: ExprKind,
    stack: Vec<&'a Expression>,
}

impl<'a> Iterator for FindAll<'a> {
    type Item = &'a Expression;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(expression) = self.stack.pop() {
            let children: Vec<_> = expression.children().collect();
            self.stack.extend(children.into_iter().rev());

            if expression.kind == self.kind {
                return Some(expression);
            }
        }

        None
    }
}

/// Permitted argument keys for one [`ExprKind`].
pub(crate) struct ArgSpec {
    pub(crate) required: &'static [&'static str],
    pub(crate) optional: &'static [&'static str],
}

impl ArgSpec {
    pub(crate) fn allows(&self, key: &str) -> bool {
        self.required.contains(&key) || self.optional.contains(&key)
    }
}

/// The args schema per kind; drives [`Parser::expression`] validation.
///
/// [`Parser::expression`]: crate::Parser::expression
pub(crate) fn arg_spec(kind: ExprKind) -> ArgSpec {
    use ExprKind::*;

    let (required, optional): (&'static [&'static str], &'static [&'static str]) = match kind {
        Alias => (&["this", "alias"], &[]),
        And | Or => (&["this", "expression"], &[]),
        Annotation => (&["this"], &["expression"]),
        Between => (&["this", "low", "high"], &[]),
        Binary => (&["this", "op", "expression"], &[]),
        Case => (&["ifs"], &["this", "default"]),
        Cast => (&["this", "to"], &[]),
        Column => (&["this"], &["table", "db"]),
        Command | Having | IsNull | Limit | Not | Paren | Where => (&["this"], &[]),
        Confidence | ErrorTarget | PrecisionTarget | RecallTarget => (&["this"], &[]),
        Create => (&["this", "kind", "expression"], &["properties"]),
        From | GroupBy | Hint | OrderBy | Properties | Tuple => (&["expressions"], &[]),
        Func => (&["this", "expressions"], &[]),
        Identifier => (&["this", "quoted"], &[]),
        In => (&["this"], &["expressions", "query"]),
        Join => (&["this", "kind", "on"], &[]),
        Like | Rlike => (&["this", "expression"], &[]),
        Literal => (&["this", "is_string"], &[]),
        Null | Star => (&[], &[]),
        Property => (&["this", "value"], &[]),
        Select => (
            &["expressions"],
            &[
                "from",
                "joins",
                "where",
                "group",
                "having",
                "order",
                "limit",
                "error_target",
                "confidence",
                "recall_target",
                "precision_target",
            ],
        ),
        Table => (&["this"], &["db"]),
        Unary => (&["op", "this"], &[]),
        When => (&["this", "then"], &[]),
        Window => (&["this"], &["partition_by", "order"]),
    };

    ArgSpec { required, optional }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_one;

    #[test]
    fn find_all_is_preorder() {
        let expression = parse_one("SELECT a, b FROM t WHERE c > 1").unwrap();

        let names: Vec<_> = expression
            .find_all(ExprKind::Column)
            .map(|c| c.text("this").to_owned())
            .collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn find_includes_self() {
        let expression = parse_one("SELECT a FROM t").unwrap();
        assert_eq!(
            expression.find(ExprKind::Select).map(|e| e.kind),
            Some(ExprKind::Select)
        );
    }

    #[test]
    fn text_of_missing_key_is_empty() {
        let expression = parse_one("SELECT a FROM t").unwrap();
        assert_eq!(expression.text("nope"), "");
    }

    #[test]
    fn structural_equality_ignores_key_order() {
        let left = Expression::new(ExprKind::Identifier)
            .set("this", "x")
            .set("quoted", false);
        let right = Expression::new(ExprKind::Identifier)
            .set("quoted", false)
            .set("this", "x");
        assert_eq!(left, right);
    }
}
