use quill_core::Location;
use quill_token::{Operator, TokenKind, Tokens};

use crate::ast::{Assign, Binary, Call, ErrorExpr, Expr, PrimitiveExpr, Unary};

pub mod precedences {
    pub const INITIAL: u8 = 0;
    pub const ASSIGN: u8 = 1;
    pub const OR: u8 = 2;
    pub const AND: u8 = 3;
    pub const EQUALITY: u8 = 4;
    pub const COMPARISON: u8 = 5;
    pub const SUM: u8 = 6;
    pub const PRODUCT: u8 = 7;
    pub const PREFIX: u8 = 8;
    pub const CALL: u8 = 9;
}

fn get_precedence(op: Operator) -> u8 {
    match op {
        Operator::LParen => precedences::CALL,
        Operator::Mul | Operator::Div | Operator::Mod => precedences::PRODUCT,
        Operator::Plus | Operator::Minus => precedences::SUM,
        Operator::GreaterThan
        | Operator::GreaterThanOrEqual
        | Operator::LessThan
        | Operator::LessThanOrEqual => precedences::COMPARISON,
        Operator::EqualEqual | Operator::NotEqual => precedences::EQUALITY,
        Operator::And => precedences::AND,
        Operator::Or => precedences::OR,
        Operator::Assign => precedences::ASSIGN,

        _ => precedences::INITIAL,
    }
}

pub fn parse_expression(tokens: &mut Tokens) -> Expr {
    parse_expression_inner(tokens, precedences::INITIAL)
}

fn parse_expression_inner(tokens: &mut Tokens, precedence: u8) -> Expr {
    let next = tokens.next_token();
    let location = next.location();

    let mut lhs = match next.kind() {
        TokenKind::Operator(Operator::LParen) => {
            let inner = parse_expression_inner(tokens, precedences::INITIAL);
            match tokens.peek().kind() {
                TokenKind::Operator(Operator::RParen) => {
                    tokens.consume();
                    inner
                }
                _ => {
                    let token = tokens.next_token();
                    Expr::Error(ErrorExpr {
                        token: token.kind(),
                        location: token.location(),
                    })
                }
            }
        }
        TokenKind::Operator(op @ (Operator::Minus | Operator::Not)) => {
            parse_unary_expression(tokens, op, location)
        }
        TokenKind::String(location) => Expr::Str(location),
        TokenKind::Primitive(value) => Expr::Primitive(PrimitiveExpr { value, location }),
        TokenKind::Identifier(location) => Expr::Ident(location),

        _ => {
            return Expr::Error(ErrorExpr {
                token: next.kind(),
                location,
            });
        }
    };

    loop {
        let TokenKind::Operator(op) = tokens.peek().kind() else {
            return lhs;
        };

        let op_precedence = get_precedence(op);

        if precedence >= op_precedence {
            break;
        }

        tokens.consume();

        match op {
            Operator::LParen => {
                lhs = parse_call(tokens, lhs);
                continue;
            }
            Operator::Assign => {
                // assignment is right-associative
                let rhs = parse_expression_inner(tokens, op_precedence - 1);
                let location = lhs.location().merge(rhs.location());
                lhs = match lhs {
                    Expr::Ident(target) => Expr::Assign(Assign {
                        target,
                        value: Box::new(rhs),
                        location,
                    }),
                    invalid => Expr::Error(ErrorExpr {
                        token: TokenKind::Operator(Operator::Assign),
                        location: invalid.location(),
                    }),
                };
                continue;
            }
            _ => {}
        }

        let rhs = parse_expression_inner(tokens, op_precedence);
        let location = lhs.location().merge(rhs.location());
        lhs = Expr::Binary(Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
            location,
        });
    }

    lhs
}

fn parse_unary_expression(tokens: &mut Tokens, operator: Operator, location: Location) -> Expr {
    let expr = parse_expression_inner(tokens, precedences::PREFIX);
    let location = location.merge(expr.location());

    Expr::Unary(Unary {
        op: operator,
        expr: Box::new(expr),
        location,
    })
}

fn parse_call(tokens: &mut Tokens, callee: Expr) -> Expr {
    let mut args = vec![];

    let end_location = loop {
        let next_token = tokens.peek();
        match next_token.kind() {
            TokenKind::Operator(Operator::RParen) => {
                tokens.consume();
                break next_token.location();
            }
            TokenKind::Eof => break next_token.location(),
            TokenKind::Operator(Operator::Comma) => {
                tokens.consume();
                continue;
            }
            _ => {}
        }
        args.push(parse_expression_inner(tokens, precedences::INITIAL));
    };

    match callee {
        Expr::Ident(name) => Expr::Call(Call {
            callee: name,
            args,
            location: name.merge(end_location),
        }),
        // only a named function can be called
        invalid => Expr::Error(ErrorExpr {
            token: TokenKind::Operator(Operator::LParen),
            location: invalid.location(),
        }),
    }
}
