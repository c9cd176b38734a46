//! Tokens produced by the lexer

use std::fmt;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum TokenType {
    StringLiteral,
    NumberLiteral,
    BooleanLiteral,

    Identifier,
    /// `` `name` ``
    DelimitedIdentifier,
    /// `%name`, `%'name'` or `` %`name` ``
    ExternalConstant,

    And,
    Or,
    This,

    Dot,
    Plus,
    Minus,
    Multiply,
    Divide,
    LessThanOrEqual,
    LessThan,
    GreaterThanOrEqual,
    GreaterThan,
    Equal,
    NotEqual,

    OpenParen,
    CloseParen,
    Comma,

    Eof,
    /// Lexical error; the token value holds the message.
    Error,
}

impl TokenType {
    /// Fixed spelling of punctuation and keyword tokens.
    pub fn symbol(self) -> Option<&'static str> {
        Some(match self {
            TokenType::And => "and",
            TokenType::Or => "or",
            TokenType::This => "$this",
            TokenType::Dot => ".",
            TokenType::Plus => "+",
            TokenType::Minus => "-",
            TokenType::Multiply => "*",
            TokenType::Divide => "/",
            TokenType::LessThanOrEqual => "<=",
            TokenType::LessThan => "<",
            TokenType::GreaterThanOrEqual => ">=",
            TokenType::GreaterThan => ">",
            TokenType::Equal => "=",
            TokenType::NotEqual => "!=",
            TokenType::OpenParen => "(",
            TokenType::CloseParen => ")",
            TokenType::Comma => ",",
            _ => return None,
        })
    }
}

/// Where a token starts. `position` is a character offset, `line` and
/// `column` are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub position: usize,
    pub line: usize,
    pub column: usize,
}

impl Span {
    pub fn start() -> Self {
        Self {
            position: 0,
            line: 1,
            column: 1,
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub token_type: TokenType,
    pub value: String,
    pub span: Span,
}

impl Token {
    pub fn new(token_type: TokenType, value: impl Into<String>, span: Span) -> Self {
        Self {
            token_type,
            value: value.into(),
            span,
        }
    }

    /// Punctuation or keyword token spelled by its type.
    pub fn symbol(token_type: TokenType, span: Span) -> Self {
        Self::new(token_type, token_type.symbol().unwrap_or_default(), span)
    }

    pub fn eof(span: Span) -> Self {
        Self::new(TokenType::Eof, String::new(), span)
    }

    pub fn error(message: impl Into<String>, span: Span) -> Self {
        Self::new(TokenType::Error, message, span)
    }

    pub fn is(&self, token_type: TokenType) -> bool {
        self.token_type == token_type
    }

    pub fn position(&self) -> usize {
        self.span.position
    }

    /// How the token reads in an error message.
    pub fn describe(&self) -> String {
        match self.token_type {
            TokenType::Eof => "end of input".to_string(),
            TokenType::StringLiteral => format!("string '{}'", self.value),
            TokenType::ExternalConstant => format!("%{}", self.value),
            _ => format!("'{}'", self.value),
        }
    }
}
