use quill_core::Location;
use quill_token::{Operator, Token, TokenKind, Tokens};

use crate::ast::{
    Ast, Block, ErrorNode, Expr, ExprStmt, FunctionDecl, IfStmt, ParamDecl, ReturnStmt, Stmt,
    TypeRef, VariableDecl, WhileStmt,
};
use crate::expressions::parse_expression;

type Result<T> = std::result::Result<T, ErrorNode>;

/// Recursive-descent parser over the token stream. Parsing is total: a
/// construct that cannot be parsed becomes an `Error` node and the parser
/// resynchronizes at the next statement boundary, so the rest of the file
/// is still parsed and analyzed.
pub struct Parser {
    tokens: Tokens,
}

impl Parser {
    pub fn new(tokens: Tokens) -> Self {
        Self { tokens }
    }

    pub fn parse(mut self) -> Ast {
        let mut decls = vec![];

        while !self.tokens.is_at_end() {
            match self.parse_declaration() {
                Ok(decl) => decls.push(decl),
                Err(error) => {
                    decls.push(Stmt::Error(error));
                    self.synchronize_declaration();
                }
            }
        }

        Ast { decls }
    }

    fn parse_declaration(&mut self) -> Result<Stmt> {
        match self.tokens.peek().kind() {
            TokenKind::TypeName(_) => self.parse_function(),
            TokenKind::Var | TokenKind::Let => self.parse_variable_decl(),
            _ => {
                let token = self.tokens.next_token();
                Err(ErrorNode {
                    token: token.kind(),
                    location: token.location(),
                })
            }
        }
    }

    fn parse_function(&mut self) -> Result<Stmt> {
        let return_type = self.parse_type_ref()?;
        let name = self.expect_identifier()?;

        self.expect_operator(Operator::LParen)?;
        let mut params = vec![];
        if !self.peek_operator(Operator::RParen) {
            loop {
                let ty = self.parse_type_ref()?;
                let param_name = self.expect_identifier()?;
                params.push(ParamDecl {
                    name: param_name,
                    ty,
                    location: ty.location.merge(param_name),
                });

                if self.peek_operator(Operator::Comma) {
                    self.tokens.consume();
                    continue;
                }
                break;
            }
        }
        self.expect_operator(Operator::RParen)?;

        let body = self.parse_block()?;
        let location = return_type.location.merge(body.location);

        Ok(Stmt::Function(FunctionDecl {
            name,
            params,
            return_type,
            body,
            location,
        }))
    }

    fn parse_variable_decl(&mut self) -> Result<Stmt> {
        let keyword = self.tokens.next_token();
        let mutable = matches!(keyword.kind(), TokenKind::Var);
        let name = self.expect_identifier()?;

        // `let` bindings always infer their type from the initializer
        let mut annotation = None;
        if mutable && self.peek_operator(Operator::Colon) {
            self.tokens.consume();
            annotation = Some(self.parse_type_ref()?);
        }

        let mut init = None;
        if self.peek_operator(Operator::Assign) {
            self.tokens.consume();
            init = Some(parse_expression(&mut self.tokens));
        }

        if annotation.is_none() && init.is_none() {
            let token = self.tokens.next_token();
            return Err(ErrorNode {
                token: token.kind(),
                location: keyword.location().merge(token.location()),
            });
        }

        let semi = self.expect_operator(Operator::Semicolon)?;
        Ok(Stmt::Variable(VariableDecl {
            name,
            mutable,
            annotation,
            init,
            location: keyword.location().merge(semi.location()),
        }))
    }

    fn parse_block(&mut self) -> Result<Block> {
        let open = self.expect_operator(Operator::LBrace)?;

        let mut statements = vec![];
        let close = loop {
            let next_token = self.tokens.peek();
            match next_token.kind() {
                TokenKind::Operator(Operator::RBrace) => {
                    self.tokens.consume();
                    break next_token.location();
                }
                TokenKind::Eof => {
                    // unterminated block
                    statements.push(Stmt::Error(ErrorNode {
                        token: next_token.kind(),
                        location: next_token.location(),
                    }));
                    break next_token.location();
                }
                _ => {}
            }

            match self.parse_statement() {
                Ok(stmt) => statements.push(stmt),
                Err(error) => {
                    statements.push(Stmt::Error(error));
                    self.synchronize_statement();
                }
            }
        };

        Ok(Block {
            statements,
            location: open.location().merge(close),
        })
    }

    fn parse_statement(&mut self) -> Result<Stmt> {
        match self.tokens.peek().kind() {
            TokenKind::Var | TokenKind::Let => self.parse_variable_decl(),
            TokenKind::If => Ok(Stmt::If(self.parse_if()?)),
            TokenKind::While => self.parse_while(),
            TokenKind::Return => self.parse_return(),
            TokenKind::Operator(Operator::LBrace) => Ok(Stmt::Block(self.parse_block()?)),
            _ => self.parse_expr_statement(),
        }
    }

    fn parse_if(&mut self) -> Result<IfStmt> {
        let keyword = self.tokens.next_token();

        self.expect_operator(Operator::LParen)?;
        let condition = parse_expression(&mut self.tokens);
        self.expect_operator(Operator::RParen)?;

        let then_branch = self.parse_block()?;
        let mut end = then_branch.location;

        let mut else_branch = None;
        if matches!(self.tokens.peek().kind(), TokenKind::Else) {
            self.tokens.consume();
            let stmt = match self.tokens.peek().kind() {
                TokenKind::If => Stmt::If(self.parse_if()?),
                _ => Stmt::Block(self.parse_block()?),
            };
            end = stmt.location();
            else_branch = Some(Box::new(stmt));
        }

        Ok(IfStmt {
            condition,
            then_branch,
            else_branch,
            location: keyword.location().merge(end),
        })
    }

    fn parse_while(&mut self) -> Result<Stmt> {
        let keyword = self.tokens.next_token();

        self.expect_operator(Operator::LParen)?;
        let condition = parse_expression(&mut self.tokens);
        self.expect_operator(Operator::RParen)?;

        let body = self.parse_block()?;
        let location = keyword.location().merge(body.location);

        Ok(Stmt::While(WhileStmt {
            condition,
            body,
            location,
        }))
    }

    fn parse_return(&mut self) -> Result<Stmt> {
        let keyword = self.tokens.next_token();

        let value = match self.peek_operator(Operator::Semicolon) {
            true => None,
            false => Some(parse_expression(&mut self.tokens)),
        };

        let semi = self.expect_operator(Operator::Semicolon)?;
        Ok(Stmt::Return(ReturnStmt {
            value,
            location: keyword.location().merge(semi.location()),
        }))
    }

    fn parse_expr_statement(&mut self) -> Result<Stmt> {
        let expr = parse_expression(&mut self.tokens);
        let location = expr.location();

        if let Expr::Error(error) = expr {
            return Err(ErrorNode {
                token: error.token,
                location: error.location,
            });
        }

        let semi = self.expect_operator(Operator::Semicolon)?;
        Ok(Stmt::Expr(ExprStmt {
            expr,
            location: location.merge(semi.location()),
        }))
    }

    fn parse_type_ref(&mut self) -> Result<TypeRef> {
        let token = self.tokens.next_token();
        match token.kind() {
            TokenKind::TypeName(name) => Ok(TypeRef {
                name,
                location: token.location(),
            }),
            kind => Err(ErrorNode {
                token: kind,
                location: token.location(),
            }),
        }
    }

    fn expect_identifier(&mut self) -> Result<Location> {
        let token = self.tokens.next_token();
        match token.kind() {
            TokenKind::Identifier(location) => Ok(location),
            kind => Err(ErrorNode {
                token: kind,
                location: token.location(),
            }),
        }
    }

    fn expect_operator(&mut self, operator: Operator) -> Result<Token> {
        let token = self.tokens.next_token();
        match token.kind() {
            TokenKind::Operator(op) if op == operator => Ok(token),
            kind => Err(ErrorNode {
                token: kind,
                location: token.location(),
            }),
        }
    }

    fn peek_operator(&self, operator: Operator) -> bool {
        self.tokens.peek().kind() == TokenKind::Operator(operator)
    }

    fn synchronize_declaration(&mut self) {
        loop {
            match self.tokens.peek().kind() {
                TokenKind::Eof | TokenKind::TypeName(_) | TokenKind::Var | TokenKind::Let => break,
                _ => self.tokens.consume(),
            }
        }
    }

    fn synchronize_statement(&mut self) {
        loop {
            match self.tokens.peek().kind() {
                TokenKind::Eof
                | TokenKind::Var
                | TokenKind::Let
                | TokenKind::If
                | TokenKind::While
                | TokenKind::Return => break,
                TokenKind::Operator(Operator::RBrace) => break,
                TokenKind::Operator(Operator::Semicolon) => {
                    self.tokens.consume();
                    break;
                }
                _ => self.tokens.consume(),
            }
        }
    }
}
