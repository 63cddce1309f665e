pub use error::{Error, Result};
pub use lexer::{Lexer, tokenize};
pub use token::{Token, TokenKind};

mod error;
mod lexer;
mod token;
