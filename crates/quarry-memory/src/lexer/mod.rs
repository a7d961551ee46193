//! Hand-written lexer producing the token stream the statement parser consumes.

mod span;
mod token;
mod tokenizer;

pub use span::Span;
pub use token::{Keyword, Token, TokenKind};
pub use tokenizer::Lexer;
