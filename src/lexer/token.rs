use std::fmt::Display;

use crate::span::Span;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum TokenKind {
    Let,
    In,
    End,
    If,
    Then,
    Else,

    ParenLeft,
    ParenRight,
    Equal,
    Plus,
    Hyphen,
    Star,
    LessThan,
    ColonEqual,

    Identifier,
    Integer,
    Boolean,

    Eof,
}

impl TokenKind {
    /// Whether a token of this kind can begin an atom, and so an application argument.
    pub fn starts_atom(self) -> bool {
        matches!(
            self,
            TokenKind::Identifier | TokenKind::Integer | TokenKind::Boolean | TokenKind::ParenLeft
        )
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            TokenKind::Let => write!(f, "let"),
            TokenKind::In => write!(f, "in"),
            TokenKind::End => write!(f, "end"),
            TokenKind::If => write!(f, "if"),
            TokenKind::Then => write!(f, "then"),
            TokenKind::Else => write!(f, "else"),
            TokenKind::ParenLeft => write!(f, "("),
            TokenKind::ParenRight => write!(f, ")"),
            TokenKind::Equal => write!(f, "="),
            TokenKind::Plus => write!(f, "+"),
            TokenKind::Hyphen => write!(f, "-"),
            TokenKind::Star => write!(f, "*"),
            TokenKind::LessThan => write!(f, "<"),
            TokenKind::ColonEqual => write!(f, ":="),
            TokenKind::Identifier => write!(f, "identifier"),
            TokenKind::Integer => write!(f, "integer"),
            TokenKind::Boolean => write!(f, "boolean"),
            TokenKind::Eof => write!(f, "EOF"),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
        }
    }

    /// Character offset of the first character of the token.
    pub fn position(&self) -> usize {
        self.span.start.index
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self.kind {
            TokenKind::Identifier | TokenKind::Integer | TokenKind::Boolean => {
                write!(f, "{} '{}'", self.kind, self.text)
            }
            kind => write!(f, "{kind}"),
        }
    }
}

/// Two-character symbols come first so they win over their one-character prefixes.
/// `==` has no kind of its own and is rejected by the lexer.
pub const SYMBOLS: &[(&str, Option<TokenKind>)] = &[
    ("==", None),
    (":=", Some(TokenKind::ColonEqual)),
    ("+", Some(TokenKind::Plus)),
    ("-", Some(TokenKind::Hyphen)),
    ("*", Some(TokenKind::Star)),
    ("<", Some(TokenKind::LessThan)),
    ("(", Some(TokenKind::ParenLeft)),
    (")", Some(TokenKind::ParenRight)),
    ("=", Some(TokenKind::Equal)),
];

pub const KEYWORDS: &[(&str, TokenKind)] = &[
    ("let", TokenKind::Let),
    ("in", TokenKind::In),
    ("end", TokenKind::End),
    ("if", TokenKind::If),
    ("then", TokenKind::Then),
    ("else", TokenKind::Else),
];

pub const BOOLEANS: &[&str] = &["true", "false"];
