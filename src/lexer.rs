//! Minimal Go tokenizer
//!
//! Only distinguishes what the rewrite needs: words, dots, ellipses,
//! parentheses, literals and comments. Anything else comes out as [`Token::Other`], so
//! lexing never fails; an unterminated literal degrades to `Other` spans
//! rather than an error.

use std::ops::Range;

use logos::Logos;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f]+")]
enum RawToken {
    #[regex(r"[\p{L}\p{N}_]+")]
    Word,

    #[token(".")]
    Dot,

    #[token("...")]
    Ellipsis,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[regex(r#""([^"\\\n]|\\[^\n])*""#)]
    Str,

    #[regex(r"`[^`]*`")]
    RawStr,

    #[regex(r"'([^'\\\n]|\\[^\n])*'")]
    Rune,

    #[regex(r"//[^\n]*")]
    LineComment,

    #[regex(r"/\*([^*]|\*+[^*/])*\*+/")]
    BlockComment,
}

/// Token kinds seen by the selector rewriter and import editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// Identifier, keyword or number: a maximal run of letters, digits and `_`.
    Word,
    Dot,
    /// `...` of variadic parameters and array literals.
    Ellipsis,
    LParen,
    RParen,
    /// Interpreted string literal, quotes included.
    Str,
    /// Raw string literal, backquotes included.
    RawStr,
    Rune,
    Comment,
    /// Operators, punctuation and unterminated literals.
    Other,
}

impl From<RawToken> for Token {
    fn from(raw: RawToken) -> Self {
        match raw {
            RawToken::Word => Token::Word,
            RawToken::Dot => Token::Dot,
            RawToken::Ellipsis => Token::Ellipsis,
            RawToken::LParen => Token::LParen,
            RawToken::RParen => Token::RParen,
            RawToken::Str => Token::Str,
            RawToken::RawStr => Token::RawStr,
            RawToken::Rune => Token::Rune,
            RawToken::LineComment | RawToken::BlockComment => Token::Comment,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spanned {
    pub token: Token,
    pub span: Range<usize>,
}

impl Spanned {
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.span.clone()]
    }

    pub fn is_word(&self, source: &str, word: &str) -> bool {
        self.token == Token::Word && self.text(source) == word
    }

    /// Contents of a string literal without its delimiters.
    pub fn string_value<'a>(&self, source: &'a str) -> Option<&'a str> {
        match self.token {
            Token::Str | Token::RawStr => {
                let text = self.text(source);
                Some(&text[1..text.len() - 1])
            }
            _ => None,
        }
    }
}

/// Tokenize Go source. Whitespace is dropped; comments are kept.
pub fn lex(source: &str) -> Vec<Spanned> {
    RawToken::lexer(source)
        .spanned()
        .map(|(result, span)| Spanned {
            token: result.map(Token::from).unwrap_or(Token::Other),
            span,
        })
        .collect()
}

/// Tokenize Go source, dropping comments as well.
pub fn lex_code(source: &str) -> Vec<Spanned> {
    let mut tokens = lex(source);
    tokens.retain(|t| t.token != Token::Comment);
    tokens
}

/// Byte range of the line holding `offset`, including its trailing newline.
pub fn line_bounds(source: &str, offset: usize) -> Range<usize> {
    let start = source[..offset].rfind('\n').map_or(0, |i| i + 1);
    let end = source[offset..]
        .find('\n')
        .map_or(source.len(), |i| offset + i + 1);
    start..end
}

/// Whether the line holding `offset` has only whitespace before it.
pub fn starts_line(source: &str, offset: usize) -> bool {
    let start = line_bounds(source, offset).start;
    source[start..offset].trim().is_empty()
}
