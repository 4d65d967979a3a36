pub mod lexer;
pub mod token;

pub use lexer::Lexer;
pub use token::{LexError, Operator, Primitive, Token, TokenKind, Tokens, TypeName};
