pub mod ast;
pub mod expressions;
pub mod parser;

pub use ast::{Ast, Block, Expr, FunctionDecl, Stmt, TypeRef, VariableDecl};
pub use parser::Parser;
