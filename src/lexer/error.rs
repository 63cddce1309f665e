use crate::span::Span;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("invalid character '{0}'")]
    InvalidCharacter(char, Span),

    #[error("unsupported symbol '{0}'")]
    UnsupportedSymbol(String, Span),
}

impl Error {
    pub fn span(&self) -> Span {
        match self {
            Error::InvalidCharacter(_, span) | Error::UnsupportedSymbol(_, span) => *span,
        }
    }

    pub fn position(&self) -> usize {
        self.span().start.index
    }
}

pub type Result<T> = std::result::Result<T, Error>;
