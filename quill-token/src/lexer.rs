use std::iter::Peekable;
use std::str::CharIndices;

use crate::token::{IntoToken, LexError, Operator, Primitive, Token, TokenKind, TypeName};

pub struct Lexer<'lex> {
    chars: Peekable<CharIndices<'lex>>,
    content: &'lex str,
}

impl<'lex> Lexer<'lex> {
    pub fn new(content: &'lex str) -> Self {
        Self {
            chars: content.char_indices().peekable(),
            content,
        }
    }

    fn next_token(&mut self) -> Token {
        let (index, curr) = loop {
            match self.chars.next() {
                None => return self.eof(),
                Some((_, c)) if c.is_whitespace() => continue,
                Some(curr) => break curr,
            }
        };

        let next = self.chars.peek().map(|(_, c)| *c);

        match (curr, next) {
            ('/', Some('/')) => {
                self.chars.next();
                loop {
                    if let Some((_, '\n')) | None = self.chars.peek() {
                        break;
                    }
                    self.chars.next();
                }
                self.next_token()
            }
            ('&', Some('&')) => {
                let _ = self.chars.next();
                Operator::And.into_token(index, index + 2)
            }
            ('|', Some('|')) => {
                let _ = self.chars.next();
                Operator::Or.into_token(index, index + 2)
            }
            ('=', Some('=')) => {
                let _ = self.chars.next();
                Operator::EqualEqual.into_token(index, index + 2)
            }
            ('!', Some('=')) => {
                let _ = self.chars.next();
                Operator::NotEqual.into_token(index, index + 2)
            }
            ('>', Some('=')) => {
                let _ = self.chars.next();
                Operator::GreaterThanOrEqual.into_token(index, index + 2)
            }
            ('<', Some('=')) => {
                let _ = self.chars.next();
                Operator::LessThanOrEqual.into_token(index, index + 2)
            }

            ('(', _) => Operator::LParen.into_token(index, index + 1),
            (')', _) => Operator::RParen.into_token(index, index + 1),
            ('{', _) => Operator::LBrace.into_token(index, index + 1),
            ('}', _) => Operator::RBrace.into_token(index, index + 1),
            (':', _) => Operator::Colon.into_token(index, index + 1),
            (',', _) => Operator::Comma.into_token(index, index + 1),
            (';', _) => Operator::Semicolon.into_token(index, index + 1),
            ('=', _) => Operator::Assign.into_token(index, index + 1),
            ('+', _) => Operator::Plus.into_token(index, index + 1),
            ('-', _) => Operator::Minus.into_token(index, index + 1),
            ('*', _) => Operator::Mul.into_token(index, index + 1),
            ('/', _) => Operator::Div.into_token(index, index + 1),
            ('%', _) => Operator::Mod.into_token(index, index + 1),
            ('!', _) => Operator::Not.into_token(index, index + 1),
            ('>', _) => Operator::GreaterThan.into_token(index, index + 1),
            ('<', _) => Operator::LessThan.into_token(index, index + 1),

            ('a'..='z' | 'A'..='Z' | '_', _) => self.lex_identifier(index),
            ('0'..='9', _) => self.lex_number(index),
            ('"', _) => self.lex_string(index),
            _ => LexError::UnexpectedCharacter.into_token(index, index + curr.len_utf8()),
        }
    }

    fn eof(&self) -> Token {
        let location = self.content.len()..self.content.len();
        Token(TokenKind::Eof, location.into())
    }

    fn lex_identifier(&mut self, start_byte: usize) -> Token {
        let mut end_byte = start_byte;
        while let Some((e, 'a'..='z' | 'A'..='Z' | '_' | '0'..='9')) = self.chars.peek() {
            end_byte = *e;
            self.chars.next();
        }

        let str = &self.content[start_byte..=end_byte];

        let kind = match str {
            "var" => TokenKind::Var,
            "let" => TokenKind::Let,
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "while" => TokenKind::While,
            "return" => TokenKind::Return,
            "true" => TokenKind::Primitive(Primitive::Bool(true)),
            "false" => TokenKind::Primitive(Primitive::Bool(false)),
            "int" => TokenKind::TypeName(TypeName::Int),
            "float" => TokenKind::TypeName(TypeName::Float),
            "bool" => TokenKind::TypeName(TypeName::Bool),
            "str" => TokenKind::TypeName(TypeName::Str),
            "void" => TokenKind::TypeName(TypeName::Void),
            _ => TokenKind::Identifier((start_byte, end_byte + 1).into()),
        };

        kind.into_token(start_byte, end_byte + 1)
    }

    fn lex_number(&mut self, start_byte: usize) -> Token {
        let mut end_byte = start_byte;
        while let Some((e, '0'..='9')) = self.chars.peek() {
            end_byte = *e;
            self.chars.next();
        }

        let mut is_float = false;
        if let Some((e, '.')) = self.chars.peek() {
            is_float = true;
            end_byte = *e;
            self.chars.next();
            while let Some((e, '0'..='9')) = self.chars.peek() {
                end_byte = *e;
                self.chars.next();
            }
        }

        let literal = &self.content[start_byte..=end_byte];
        let kind = match is_float {
            true => match literal.parse() {
                Ok(value) => TokenKind::Primitive(Primitive::Float(value)),
                Err(_) => TokenKind::Error(LexError::MalformedNumber),
            },
            false => match literal.parse() {
                Ok(value) => TokenKind::Primitive(Primitive::Int(value)),
                Err(_) => TokenKind::Error(LexError::MalformedNumber),
            },
        };

        kind.into_token(start_byte, end_byte + 1)
    }

    fn lex_string(&mut self, start_byte: usize) -> Token {
        loop {
            match self.chars.next() {
                Some((end_byte, '"')) => {
                    // include the closing delimiter in the token
                    let end_byte = end_byte + 1;
                    let location = (start_byte, end_byte).into();
                    break TokenKind::String(location).into_token(start_byte, end_byte);
                }
                Some((_, '\\')) => {
                    // consume whatever follows the escape character so that
                    // \" and \\ do not terminate the literal
                    if self.chars.next().is_none() {
                        break LexError::UnterminatedString
                            .into_token(start_byte, self.content.len());
                    }
                }
                None => {
                    break LexError::UnterminatedString.into_token(start_byte, self.content.len());
                }
                _ => {}
            }
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_token() {
            Token(TokenKind::Eof, _) => None,
            token => Some(token),
        }
    }
}
