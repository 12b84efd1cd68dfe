// SPDX-License-Identifier: SEE LICENSE IN LICENSE.md
// SPDX-FileCopyrightText: 2022 CYBERTEC PostgreSQL International GmbH
// <office@cybertec.at>

//! Implements the token cursor, error policy and validated node construction.

use crate::expression::{arg_spec, Arg, Expression, ExprKind};
use crate::grammar;
use crate::lexer::{tokenize, Token, TokenKind};

/// Policy for structural errors recorded while constructing nodes through
/// [`Parser::expression`]. Structural errors accumulate on
/// [`Parser::errors`] at every level; [`expression`](Parser::expression)
/// itself never fails. Grammar errors are unaffected and always fail.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum ErrorLevel {
    /// Record the error on [`Parser::errors`] and continue.
    Ignore,
    /// As [`Ignore`](Self::Ignore), but also log a warning.
    Warn,
    /// As [`Ignore`](Self::Ignore), but [`Parser::parse`] fails afterwards
    /// if any error was recorded.
    #[default]
    Raise,
}

#[derive(Debug, Clone, Eq, thiserror::Error, PartialEq)]
pub enum ParseError {
    #[error("Unterminated quote at offset {offset}")]
    Unterminated { offset: usize },
    #[error("Expected {expected}, found {found} at offset {offset}")]
    UnexpectedToken {
        expected: TokenKind,
        found: TokenKind,
        offset: usize,
    },
    #[error("Unexpected input '{found}' at offset {offset}")]
    UnexpectedInput { found: String, offset: usize },
    #[error("Unexpected end of input")]
    UnexpectedEof,
    #[error("{func} expects {expected} arguments, got {found} at offset {offset}")]
    WrongArity {
        func: String,
        expected: usize,
        found: usize,
        offset: usize,
    },
    #[error("Unexpected argument '{name}' for {kind}")]
    UnknownArg { kind: ExprKind, name: String },
    #[error("Missing required argument '{name}' for {kind}")]
    MissingArg { kind: ExprKind, name: String },
    #[error("Empty input")]
    EmptyInput,
}

/// Parses source text into [`Expression`] trees.
///
/// The only mutable state besides the cursor position is the [`errors`]
/// list fed by structural errors from [`expression`](Self::expression).
///
/// [`errors`]: Self::errors
#[derive(Debug)]
pub struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token<'a>>,
    pos: usize,
    error_level: ErrorLevel,
    pub errors: Vec<ParseError>,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            tokens: tokenize(source),
            pos: 0,
            error_level: ErrorLevel::default(),
            errors: Vec::new(),
        }
    }

    pub fn with_error_level(mut self, error_level: ErrorLevel) -> Self {
        self.error_level = error_level;
        self
    }

    /// Parses all statements in the source, split at top-level `;`. Under
    /// [`ErrorLevel::Raise`] the parse also fails if any structural error
    /// was recorded along the way.
    pub fn parse(&mut self) -> Result<Vec<Expression>, ParseError> {
        let statements = grammar::parse_statements(self)?;

        if self.error_level == ErrorLevel::Raise {
            if let Some(error) = self.errors.first() {
                return Err(error.clone());
            }
        }

        Ok(statements)
    }

    /// Constructs a node of the given kind from a named argument list,
    /// validating the key set against the kind's schema. Unknown keys and
    /// missing required keys are recorded on [`errors`](Self::errors); the
    /// node is returned either way.
    pub fn expression<I>(&mut self, kind: ExprKind, args: I) -> Expression
    where
        I: IntoIterator<Item = (&'static str, Arg)>,
    {
        let spec = arg_spec(kind);
        let mut expression = Expression::new(kind);

        for (key, arg) in args {
            if !spec.allows(key) {
                self.structural_error(ParseError::UnknownArg {
                    kind,
                    name: key.to_owned(),
                });
            }
            expression.args.insert(key.to_owned(), arg);
        }

        for required in spec.required {
            if !expression.args.contains_key(*required) {
                self.structural_error(ParseError::MissingArg {
                    kind,
                    name: (*required).to_owned(),
                });
            }
        }

        expression
    }

    fn structural_error(&mut self, error: ParseError) {
        if self.error_level == ErrorLevel::Warn {
            log::warn!("{error}");
        }
        self.errors.push(error);
    }

    pub(crate) fn source(&self) -> &'a str {
        self.source
    }

    pub(crate) fn current(&self) -> TokenKind {
        self.tokens
            .get(self.pos)
            .map_or(TokenKind::Eof, |token| token.kind)
    }

    pub(crate) fn at(&self, kind: TokenKind) -> bool {
        self.current() == kind
    }

    pub(crate) fn current_token(&self) -> Option<Token<'a>> {
        self.tokens.get(self.pos).copied()
    }

    /// Source offset of the current token, or end of input.
    pub(crate) fn offset(&self) -> usize {
        self.tokens
            .get(self.pos)
            .map_or(self.source.len(), |token| token.range.start().into())
    }

    /// Advances past the current token and returns it.
    pub(crate) fn bump_any(&mut self) -> Option<Token<'a>> {
        let token = self.current_token();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    /// Advances only if the current token matches.
    pub(crate) fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.pos += 1;
            return true;
        }
        false
    }

    /// Advances past the current token if it matches, fails otherwise.
    pub(crate) fn expect(&mut self, kind: TokenKind) -> Result<Token<'a>, ParseError> {
        match self.current_token() {
            Some(token) if token.kind == kind => {
                self.pos += 1;
                Ok(token)
            }
            Some(_) => Err(self
                .unterminated()
                .unwrap_or_else(|| ParseError::UnexpectedToken {
                    expected: kind,
                    found: self.current(),
                    offset: self.offset(),
                })),
            None => Err(ParseError::UnexpectedEof),
        }
    }

    /// The grammar error for the current token, e.g. at a bad primary.
    pub(crate) fn unexpected(&self) -> ParseError {
        if let Some(error) = self.unterminated() {
            return error;
        }

        match self.current_token() {
            Some(token) => ParseError::UnexpectedInput {
                found: token.text.to_owned(),
                offset: self.offset(),
            },
            None => ParseError::UnexpectedEof,
        }
    }

    fn unterminated(&self) -> Option<ParseError> {
        match self.current_token() {
            Some(token)
                if token.kind == TokenKind::Error
                    && (token.text.starts_with('\'') || token.text.starts_with('"')) =>
            {
                Some(ParseError::Unterminated {
                    offset: token.range.start().into(),
                })
            }
            _ => None,
        }
    }
}

/// Parses all statements in `sql`, split at top-level `;`.
pub fn parse(sql: &str) -> Result<Vec<Expression>, ParseError> {
    Parser::new(sql).parse()
}

/// Parses `sql` and returns its first statement.
pub fn parse_one(sql: &str) -> Result<Expression, ParseError> {
    let mut expressions = parse(sql)?;
    if expressions.is_empty() {
        return Err(ParseError::EmptyInput);
    }
    Ok(expressions.remove(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expression_validates_arg_names() {
        let mut ignore = Parser::new("").with_error_level(ErrorLevel::Ignore);
        let hint = ignore.expression(ExprKind::Hint, [("expressions", Arg::Seq(vec![]))]);
        assert_eq!(hint.kind, ExprKind::Hint);
        assert!(ignore.errors.is_empty());

        ignore.expression(ExprKind::Hint, [("y", Arg::from(""))]);
        ignore.expression(ExprKind::Hint, []);
        // unknown `y`, missing `expressions` (twice)
        assert_eq!(ignore.errors.len(), 3);
    }

    #[test]
    fn expression_records_errors_at_default_level() {
        let mut parser = Parser::new("");
        parser.expression(ExprKind::Hint, [("expressions", Arg::Seq(vec![]))]);
        assert!(parser.errors.is_empty());

        parser.expression(ExprKind::Hint, [("y", Arg::from(""))]);
        parser.expression(ExprKind::Hint, []);
        assert_eq!(
            parser.errors,
            vec![
                ParseError::UnknownArg {
                    kind: ExprKind::Hint,
                    name: "y".to_owned(),
                },
                ParseError::MissingArg {
                    kind: ExprKind::Hint,
                    name: "expressions".to_owned(),
                },
                ParseError::MissingArg {
                    kind: ExprKind::Hint,
                    name: "expressions".to_owned(),
                },
            ]
        );
    }

    #[test]
    fn expression_warn_records_parse_errors() {
        let mut warn = Parser::new("").with_error_level(ErrorLevel::Warn);
        warn.expression(ExprKind::Hint, [("y", Arg::from(""))]);
        assert!(matches!(warn.errors[0], ParseError::UnknownArg { .. }));
    }

    #[test]
    fn unterminated_quote() {
        assert_eq!(
            parse_one("SELECT 'oops FROM x"),
            Err(ParseError::Unterminated { offset: 7 }),
        );
    }
}
