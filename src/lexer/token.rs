// SPDX-License-Identifier: SEE LICENSE IN LICENSE.md
// SPDX-FileCopyrightText: 2022 CYBERTEC PostgreSQL International GmbH
// <office@cybertec.at>

//! Token definition for the [`logos`] lexer.

use std::fmt;

/// Use to tokenize the input text
#[derive(logos::Logos, Debug, Copy, Clone, PartialEq, Eq)]
pub enum TokenKind {
    #[regex("[ \t\n\r]+")]
    Whitespace,

    #[token("select", ignore(case))]
    SelectKw,

    #[token("from", ignore(case))]
    FromKw,

    #[token("where", ignore(case))]
    WhereKw,

    #[token("group", ignore(case))]
    GroupKw,

    #[token("by", ignore(case))]
    ByKw,

    #[token("order", ignore(case))]
    OrderKw,

    #[token("having", ignore(case))]
    HavingKw,

    #[token("limit", ignore(case))]
    LimitKw,

    #[token("join", ignore(case))]
    JoinKw,

    #[token("left", ignore(case))]
    LeftKw,

    #[token("right", ignore(case))]
    RightKw,

    #[token("inner", ignore(case))]
    InnerKw,

    #[token("full", ignore(case))]
    FullKw,

    #[token("outer", ignore(case))]
    OuterKw,

    #[token("cross", ignore(case))]
    CrossKw,

    #[token("on", ignore(case))]
    OnKw,

    #[token("as", ignore(case))]
    AsKw,

    #[token("and", ignore(case))]
    AndKw,

    #[token("or", priority = 100, ignore(case))]
    OrKw,

    #[token("not", ignore(case))]
    NotKw,

    #[token("in", ignore(case))]
    InKw,

    #[token("is", ignore(case))]
    IsKw,

    #[token("null", ignore(case))]
    NullKw,

    #[token("between", ignore(case))]
    BetweenKw,

    #[token("like", ignore(case))]
    LikeKw,

    #[token("rlike", ignore(case))]
    RlikeKw,

    #[token("case", ignore(case))]
    CaseKw,

    #[token("when", ignore(case))]
    WhenKw,

    #[token("then", ignore(case))]
    ThenKw,

    #[token("else", ignore(case))]
    ElseKw,

    #[token("end", ignore(case))]
    EndKw,

    #[token("create", ignore(case))]
    CreateKw,

    #[token("table", ignore(case))]
    TableKw,

    #[token("over", ignore(case))]
    OverKw,

    #[token("partition", ignore(case))]
    PartitionKw,

    #[token("row", ignore(case))]
    RowKw,

    #[token("stored", ignore(case))]
    StoredKw,

    #[token("tblproperties", ignore(case))]
    TblpropertiesKw,

    #[token("set", ignore(case))]
    SetKw,

    #[token("add", ignore(case))]
    AddKw,

    #[token("jar", ignore(case))]
    JarKw,

    #[token("error_target", ignore(case))]
    ErrorTargetKw,

    #[token("confidence", ignore(case))]
    ConfidenceKw,

    #[token("recall_target", ignore(case))]
    RecallTargetKw,

    #[token("precision_target", ignore(case))]
    PrecisionTargetKw,

    #[regex(r"\d+(\.\d+)?", priority = 2)]
    Number,

    // `#` and `$` continue an identifier; a token may only *start* with `#`
    // as an annotation.
    #[regex(r"(?i)[a-z_][a-z0-9_$#]*", priority = 1)]
    Ident,

    #[regex(r#""(?:[^"]|"")+""#)]
    DelimitedIdent,

    #[regex(r"'(?:[^']|'')*'")]
    QuotedLiteral,

    #[regex(r"#[^,\n]*")]
    Annotation,

    #[token(".")]
    Dot,

    #[token(",")]
    Comma,

    #[token(";")]
    SemiColon,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("%")]
    Percentage,

    #[token("+")]
    Plus,

    #[token("-")]
    Minus,

    #[token("*")]
    Asterisk,

    #[token("/")]
    Slash,

    #[regex("=|<>|<|>|<=|>=")]
    ComparisonOp,

    #[regex("--.*")]
    Comment,

    /// Produced for input no other rule matches, e.g. an unterminated quote.
    Error,

    /// Marker token to indicate end of input, not used by lexer directly.
    Eof,
}

impl TokenKind {
    pub fn is_trivia(self) -> bool {
        matches!(self, Self::Whitespace | Self::Comment)
    }

    pub(crate) fn is_join_start(self) -> bool {
        matches!(
            self,
            Self::JoinKw
                | Self::LeftKw
                | Self::RightKw
                | Self::InnerKw
                | Self::FullKw
                | Self::CrossKw
        )
    }

    pub(crate) fn is_percent_target(self) -> bool {
        matches!(
            self,
            Self::ErrorTargetKw
                | Self::ConfidenceKw
                | Self::RecallTargetKw
                | Self::PrecisionTargetKw
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    fn check(input: &str, kind: TokenKind) {
        let tokens = tokenize(input);
        assert_eq!(tokens[0].kind, kind);
        assert_eq!(tokens[0].text, input);
    }

    #[test]
    fn lex_drops_trivia() {
        assert!(tokenize("  \n").is_empty());
        assert!(tokenize("-- a comment").is_empty());
    }

    #[test]
    fn lex_keywords_case_insensitive() {
        check("SELECT", TokenKind::SelectKw);
        check("select", TokenKind::SelectKw);
        check("Partition", TokenKind::PartitionKw);
        check("error_target", TokenKind::ErrorTargetKw);
        check("TBLPROPERTIES", TokenKind::TblpropertiesKw);
    }

    #[test]
    fn lex_ident() {
        check("hello", TokenKind::Ident);
        check("objects00", TokenKind::Ident);
        check("selectx", TokenKind::Ident);
    }

    #[test]
    fn lex_ident_with_hash_continuation() {
        check("c#annotation3", TokenKind::Ident);
    }

    #[test]
    fn lex_quoted_ident() {
        check(r#""test#annotation""#, TokenKind::DelimitedIdent);
        check(r#""y|z'""#, TokenKind::DelimitedIdent);
    }

    #[test]
    fn lex_string_literal() {
        check("'cat'", TokenKind::QuotedLiteral);
        check("'it''s'", TokenKind::QuotedLiteral);
    }

    #[test]
    fn lex_number_and_percent() {
        check("95", TokenKind::Number);
        check("5.8", TokenKind::Number);

        let tokens: Vec<_> = tokenize("5.8%").iter().map(|t| t.kind).collect();
        assert_eq!(tokens, vec![TokenKind::Number, TokenKind::Percentage]);
    }

    #[test]
    fn lex_annotation() {
        check("#annotation2:testing ", TokenKind::Annotation);
        check("#", TokenKind::Annotation);

        let tokens: Vec<_> = tokenize("#foo, b").iter().map(|t| t.kind).collect();
        assert_eq!(
            tokens,
            vec![TokenKind::Annotation, TokenKind::Comma, TokenKind::Ident]
        );
    }

    #[test]
    fn lex_comparison_ops() {
        check("<=", TokenKind::ComparisonOp);
        check("<>", TokenKind::ComparisonOp);
    }

    #[test]
    fn lex_unterminated_string() {
        assert_eq!(tokenize("'oops")[0].kind, TokenKind::Error);
    }
}
