// SPDX-License-Identifier: SEE LICENSE IN LICENSE.md
// SPDX-FileCopyrightText: 2022 CYBERTEC PostgreSQL International GmbH
// <office@cybertec.at>

//! Implements tokenization of SQL source text.

mod token;

use logos::Logos;
use text_size::TextRange;
pub use token::TokenKind;

/// A single token: kind, raw source slice and position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub range: TextRange,
}

/// Tokenizes the input left to right with maximal munch.
///
/// Whitespace and comments never reach the parser: canonical spacing is the
/// renderer's concern, so trivia is dropped here instead of being carried
/// through the tree. Input no rule matches (an unterminated quote, a stray
/// byte inside a command statement) comes back as a [`TokenKind::Error`]
/// token, which the parser reports or, inside commands, skips over.
pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    let mut lexer = TokenKind::lexer(input);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        let kind = result.unwrap_or(TokenKind::Error);
        if kind.is_trivia() {
            continue;
        }

        let span = lexer.span();
        tokens.push(Token {
            kind,
            text: lexer.slice(),
            range: TextRange::new((span.start as u32).into(), (span.end as u32).into()),
        });
    }

    tokens
}
