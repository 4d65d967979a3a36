use quill_core::Location;
use quill_token::{Operator, Primitive, TokenKind, TypeName};

/// Root of the tree: the ordered top-level declarations of one source file.
#[derive(Debug, Default)]
pub struct Ast {
    pub decls: Vec<Stmt>,
}

#[derive(Debug)]
pub enum Stmt {
    Function(FunctionDecl),
    Variable(VariableDecl),
    If(IfStmt),
    While(WhileStmt),
    Return(ReturnStmt),
    Expr(ExprStmt),
    Block(Block),
    Error(ErrorNode),
}

#[derive(Debug)]
pub struct FunctionDecl {
    pub name: Location,
    pub params: Vec<ParamDecl>,
    pub return_type: TypeRef,
    pub body: Block,
    pub location: Location,
}

#[derive(Debug)]
pub struct ParamDecl {
    pub name: Location,
    pub ty: TypeRef,
    pub location: Location,
}

#[derive(Debug)]
pub struct VariableDecl {
    pub name: Location,
    /// `var` bindings are mutable, `let` bindings are not.
    pub mutable: bool,
    pub annotation: Option<TypeRef>,
    pub init: Option<Expr>,
    pub location: Location,
}

#[derive(Debug)]
pub struct Block {
    pub statements: Vec<Stmt>,
    pub location: Location,
}

#[derive(Debug)]
pub struct IfStmt {
    pub condition: Expr,
    pub then_branch: Block,
    /// Either a plain `Block` or a chained `If`.
    pub else_branch: Option<Box<Stmt>>,
    pub location: Location,
}

#[derive(Debug)]
pub struct WhileStmt {
    pub condition: Expr,
    pub body: Block,
    pub location: Location,
}

#[derive(Debug)]
pub struct ReturnStmt {
    pub value: Option<Expr>,
    pub location: Location,
}

#[derive(Debug)]
pub struct ExprStmt {
    pub expr: Expr,
    pub location: Location,
}

/// A written type annotation, e.g. the `int` in `var x: int`.
#[derive(Debug, Clone, Copy)]
pub struct TypeRef {
    pub name: TypeName,
    pub location: Location,
}

#[derive(Debug)]
pub struct ErrorNode {
    pub token: TokenKind,
    pub location: Location,
}

impl Stmt {
    pub fn location(&self) -> Location {
        match self {
            Stmt::Function(function) => function.location,
            Stmt::Variable(variable) => variable.location,
            Stmt::If(if_stmt) => if_stmt.location,
            Stmt::While(while_stmt) => while_stmt.location,
            Stmt::Return(return_stmt) => return_stmt.location,
            Stmt::Expr(expr_stmt) => expr_stmt.location,
            Stmt::Block(block) => block.location,
            Stmt::Error(error) => error.location,
        }
    }
}

#[derive(Debug)]
pub struct Assign {
    /// Span of the target identifier.
    pub target: Location,
    pub value: Box<Expr>,
    pub location: Location,
}

#[derive(Debug)]
pub struct Binary {
    pub lhs: Box<Expr>,
    pub rhs: Box<Expr>,
    pub op: Operator,
    pub location: Location,
}

#[derive(Debug)]
pub struct Unary {
    pub op: Operator,
    pub expr: Box<Expr>,
    pub location: Location,
}

#[derive(Debug)]
pub struct Call {
    /// Span of the callee identifier.
    pub callee: Location,
    pub args: Vec<Expr>,
    pub location: Location,
}

#[derive(Debug)]
pub struct PrimitiveExpr {
    pub value: Primitive,
    pub location: Location,
}

#[derive(Debug)]
pub struct ErrorExpr {
    pub token: TokenKind,
    pub location: Location,
}

#[derive(Debug)]
pub enum Expr {
    Assign(Assign),
    Binary(Binary),
    Unary(Unary),
    Call(Call),
    Ident(Location),
    Str(Location),
    Primitive(PrimitiveExpr),
    Error(ErrorExpr),
}

impl Expr {
    pub fn location(&self) -> Location {
        match self {
            Expr::Assign(assign) => assign.location,
            Expr::Binary(binary) => binary.location,
            Expr::Unary(unary) => unary.location,
            Expr::Call(call) => call.location,
            Expr::Ident(location) => *location,
            Expr::Str(location) => *location,
            Expr::Primitive(primitive) => primitive.location,
            Expr::Error(error) => error.location,
        }
    }
}
