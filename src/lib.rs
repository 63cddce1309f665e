pub mod api;
pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod render;
pub mod span;

pub use ast::Expr;
pub use parser::parse;
pub use render::{RenderConfig, render, render_with};
