use std::iter::FusedIterator;

use crate::{
    lexer::{
        error::{Error, Result},
        token::{BOOLEANS, KEYWORDS, SYMBOLS, Token, TokenKind},
    },
    span::{Position, Span},
};

#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    buffer: &'a str,
    cursor: usize,
    position: Position,
    done: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(buffer: &'a str) -> Self {
        Self {
            buffer,
            cursor: 0,
            position: Position::start(),
            done: false,
        }
    }

    /// Scans the next token. Once the input is exhausted every call returns `Eof`.
    pub fn next_token(&mut self) -> Result<Token> {
        let whitespace = self.slice_buffer_while(char::is_whitespace);
        self.advance(whitespace.chars().count());

        let Some(current_char) = self.current_char() else {
            return Ok(Token::new(TokenKind::Eof, "", Span::point(self.position)));
        };

        if current_char.is_ascii_digit() {
            let slice = self.slice_buffer_while(|c| c.is_ascii_digit());
            return Ok(self.token(TokenKind::Integer, slice));
        }

        if current_char.is_ascii_alphabetic() || current_char == '_' {
            let slice = self.slice_buffer_while(is_identifier_char);
            let kind = if BOOLEANS.contains(&slice) {
                TokenKind::Boolean
            } else {
                KEYWORDS
                    .iter()
                    .find(|(keyword, _)| *keyword == slice)
                    .map_or(TokenKind::Identifier, |(_, kind)| *kind)
            };
            return Ok(self.token(kind, slice));
        }

        for (symbol, kind) in SYMBOLS {
            if self.remaining_buffer().starts_with(symbol) {
                return match kind {
                    Some(kind) => Ok(self.token(*kind, symbol)),
                    None => Err(Error::UnsupportedSymbol(
                        symbol.to_string(),
                        self.span_from_range(symbol.chars().count()),
                    )),
                };
            }
        }

        Err(Error::InvalidCharacter(
            current_char,
            self.span_from_range(1),
        ))
    }

    fn current_char(&self) -> Option<char> {
        self.remaining_buffer().chars().next()
    }

    fn remaining_buffer(&self) -> &'a str {
        &self.buffer[self.cursor..]
    }

    fn slice_buffer_while<P: Fn(char) -> bool>(&self, predicate: P) -> &'a str {
        let buffer = self.remaining_buffer();
        if let Some(pos) = buffer.find(|c| !predicate(c)) {
            &buffer[..pos]
        } else {
            buffer
        }
    }

    fn token(&mut self, kind: TokenKind, text: &'a str) -> Token {
        let span = self.advance_with_span(text.chars().count());
        Token::new(kind, text, span)
    }

    fn advance(&mut self, n: usize) {
        self.position = self.position_after(n);
        self.cursor = self
            .remaining_buffer()
            .char_indices()
            .nth(n)
            .map_or(self.buffer.len(), |(i, _)| self.cursor + i);
    }

    fn advance_with_span(&mut self, n: usize) -> Span {
        let start = self.position;
        self.advance(n);
        Span::new(start, self.position)
    }

    fn span_from_range(&self, n: usize) -> Span {
        Span::new(self.position, self.position_after(n))
    }

    fn position_after(&self, n: usize) -> Position {
        let mut pos = self.position;
        for c in self.remaining_buffer().chars().take(n) {
            if c == '\n' {
                pos.line += 1;
                pos.column = 1;
            } else {
                pos.column += 1;
            }
            pos.index += 1;
        }
        pos
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let result = self.next_token();
        if !matches!(&result, Ok(token) if token.kind != TokenKind::Eof) {
            self.done = true;
        }
        Some(result)
    }
}

impl FusedIterator for Lexer<'_> {}

/// Identifiers start with an ASCII letter or `_` and continue with any
/// alphanumeric character.
fn is_identifier_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

/// Lexes the whole input. The returned tokens always end with exactly one `Eof`.
pub fn tokenize(input: &str) -> Result<Vec<Token>> {
    Lexer::new(input).collect()
}
