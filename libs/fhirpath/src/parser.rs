//! Parser - converts expression strings to AST
//!
//! Recursive descent over binary precedence levels, lowest first:
//! `or`, `and`, equality (`=` `!=`), inequality (`<` `<=` `>` `>=`),
//! additive (`+` `-`) and multiplicative (`*` `/`). Below those sit prefix
//! `-`, dotted invocation chains and terms.

use rust_decimal::Decimal;
use std::str::FromStr;

use crate::ast::{AstNode, BinaryOperator, Literal};
use crate::error::{Error, Result};
use crate::lexer::Lexer;
use crate::token::{Token, TokenType};

/// Default bound on expression nesting.
pub const DEFAULT_MAX_DEPTH: usize = 200;

type Level = &'static [(TokenType, BinaryOperator)];

const BINARY_LEVELS: [Level; 6] = [
    &[(TokenType::Or, BinaryOperator::Or)],
    &[(TokenType::And, BinaryOperator::And)],
    &[
        (TokenType::Equal, BinaryOperator::Eq),
        (TokenType::NotEqual, BinaryOperator::Ne),
    ],
    &[
        (TokenType::LessThan, BinaryOperator::Lt),
        (TokenType::LessThanOrEqual, BinaryOperator::Le),
        (TokenType::GreaterThan, BinaryOperator::Gt),
        (TokenType::GreaterThanOrEqual, BinaryOperator::Ge),
    ],
    &[
        (TokenType::Plus, BinaryOperator::Add),
        (TokenType::Minus, BinaryOperator::Sub),
    ],
    &[
        (TokenType::Multiply, BinaryOperator::Mul),
        (TokenType::Divide, BinaryOperator::Div),
    ],
];

pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    depth: usize,
    max_depth: usize,
}

impl Parser {
    /// Tokenize `input` and prepare a parser over it.
    pub fn new(input: &str) -> Result<Self> {
        Self::with_max_depth(input, DEFAULT_MAX_DEPTH)
    }

    pub fn with_max_depth(input: &str, max_depth: usize) -> Result<Self> {
        Ok(Self {
            tokens: Lexer::new(input).tokenize()?,
            current: 0,
            depth: 0,
            max_depth,
        })
    }

    /// Parse the whole input as one expression.
    pub fn parse(&mut self) -> Result<AstNode> {
        if self.at(TokenType::Eof) {
            return Err(self.unexpected("an expression"));
        }
        let expr = self.parse_expression()?;
        if !self.at(TokenType::Eof) {
            return Err(self.unexpected("end of input"));
        }
        Ok(expr)
    }

    fn peek(&self) -> &Token {
        // tokenize() always ends with Eof, and bump() never moves past it
        &self.tokens[self.current]
    }

    fn at(&self, token_type: TokenType) -> bool {
        self.peek().is(token_type)
    }

    fn bump(&mut self) -> Token {
        let token = self.peek().clone();
        if self.current + 1 < self.tokens.len() {
            self.current += 1;
        }
        token
    }

    fn expect(&mut self, token_type: TokenType, expected: &str) -> Result<Token> {
        if self.at(token_type) {
            Ok(self.bump())
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn unexpected(&self, expected: &str) -> Error {
        let token = self.peek();
        Error::syntax(
            format!("Expected {}, got {} at {}", expected, token.describe(), token.span),
            token.position(),
        )
    }

    /// One level deeper in the tree being built. Every operator, `.` and
    /// prefix `-` adds a level, as does each parenthesised or argument
    /// expression, so no accepted tree is deeper than `max_depth`.
    fn descend(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(Error::syntax(
                format!("Expression too deeply nested (max depth: {})", self.max_depth),
                self.peek().position(),
            ));
        }
        Ok(())
    }

    fn parse_expression(&mut self) -> Result<AstNode> {
        let entered = self.depth;
        self.descend()?;
        let expr = self.parse_binary(0)?;
        self.depth = entered;
        Ok(expr)
    }

    fn parse_binary(&mut self, level: usize) -> Result<AstNode> {
        let Some(&operators) = BINARY_LEVELS.get(level) else {
            return self.parse_polarity();
        };

        let entered = self.depth;
        let mut left = self.parse_binary(level + 1)?;
        while let Some(op) = self.operator_in(operators) {
            self.descend()?;
            self.bump();
            let right = self.parse_binary(level + 1)?;
            left = AstNode::binary(op, left, right);
        }
        self.depth = entered;
        Ok(left)
    }

    fn operator_in(&self, operators: Level) -> Option<BinaryOperator> {
        let current = self.peek().token_type;
        operators
            .iter()
            .find(|(token_type, _)| *token_type == current)
            .map(|(_, op)| *op)
    }

    fn parse_polarity(&mut self) -> Result<AstNode> {
        let entered = self.depth;
        if self.at(TokenType::Minus) {
            self.descend()?;
            self.bump();
            let inner = self.parse_polarity()?;
            self.depth = entered;
            return Ok(AstNode::Negate(Box::new(inner)));
        }

        let mut expr = self.parse_term()?;
        while self.at(TokenType::Dot) {
            self.descend()?;
            self.bump();
            expr = AstNode::Invoke {
                target: Box::new(expr),
                invocation: Box::new(self.parse_invocation()?),
            };
        }
        self.depth = entered;
        Ok(expr)
    }

    fn parse_term(&mut self) -> Result<AstNode> {
        match self.peek().token_type {
            TokenType::OpenParen => {
                self.bump();
                let inner = self.parse_expression()?;
                self.expect(TokenType::CloseParen, "')'")?;
                Ok(AstNode::Group(Box::new(inner)))
            }
            TokenType::ExternalConstant => {
                let token = self.bump();
                Ok(AstNode::Constant {
                    name: token.value,
                    position: token.span.position,
                })
            }
            TokenType::BooleanLiteral | TokenType::StringLiteral | TokenType::NumberLiteral => {
                let token = self.bump();
                literal(token).map(AstNode::Literal)
            }
            _ => self.parse_invocation(),
        }
    }

    fn parse_invocation(&mut self) -> Result<AstNode> {
        match self.peek().token_type {
            TokenType::This => {
                self.bump();
                Ok(AstNode::This)
            }
            TokenType::Identifier | TokenType::DelimitedIdentifier => {
                let token = self.bump();
                if !self.at(TokenType::OpenParen) {
                    return Ok(AstNode::Member { name: token.value });
                }

                self.bump();
                let mut args = Vec::new();
                if !self.at(TokenType::CloseParen) {
                    args.push(self.parse_expression()?);
                    while self.at(TokenType::Comma) {
                        self.bump();
                        args.push(self.parse_expression()?);
                    }
                }
                self.expect(TokenType::CloseParen, "')' or ','")?;

                Ok(AstNode::Function {
                    name: token.value,
                    args,
                    position: token.span.position,
                })
            }
            _ => Err(self.unexpected("an identifier, function or literal")),
        }
    }
}

fn literal(token: Token) -> Result<Literal> {
    let position = token.position();
    match token.token_type {
        TokenType::BooleanLiteral => Ok(Literal::Boolean(token.value == "true")),
        TokenType::StringLiteral => Ok(Literal::String(token.value)),
        TokenType::NumberLiteral if !token.value.contains('.') => match token.value.parse::<i64>() {
            Ok(value) => Ok(Literal::Integer(value)),
            // out of i64 range: keep the value as a decimal
            Err(_) => Decimal::from_str(&token.value)
                .map(Literal::Decimal)
                .map_err(|_| Error::syntax(format!("Number '{}' out of range", token.value), position)),
        },
        TokenType::NumberLiteral => Decimal::from_str(&token.value)
            .map(Literal::Decimal)
            .map_err(|_| Error::syntax(format!("Invalid number '{}'", token.value), position)),
        _ => Err(Error::syntax(format!("Expected literal, got {}", token.describe()), position)),
    }
}

/// Parse an expression string into an AST
pub fn parse(input: &str) -> Result<AstNode> {
    Parser::new(input)?.parse()
}
