//! Lexer - tokenizes expression strings
//!
//! Converts expression text into a stream of tokens. Comments (`//` and
//! `/* */`) and whitespace are skipped.

use crate::error::{Error, Result};
use crate::token::{Span, Token, TokenType};

/// The expression lexer
pub struct Lexer {
    chars: Vec<char>,
    cursor: Span,
    current_char: Option<char>,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        let chars: Vec<char> = input.chars().collect();
        let current_char = chars.first().copied();

        Self {
            chars,
            cursor: Span::start(),
            current_char,
        }
    }

    /// Tokenize the whole input, ending with an `Eof` token.
    ///
    /// The first lexical error aborts tokenization.
    pub fn tokenize(mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            match token.token_type {
                TokenType::Error => return Err(Error::syntax(token.value, token.span.position)),
                TokenType::Eof => {
                    tokens.push(token);
                    return Ok(tokens);
                }
                _ => tokens.push(token),
            }
        }
    }

    fn advance(&mut self) {
        if let Some(c) = self.current_char {
            if c == '\n' {
                self.cursor.line += 1;
                self.cursor.column = 1;
            } else {
                self.cursor.column += 1;
            }
        }
        self.cursor.position += 1;
        self.current_char = self.chars.get(self.cursor.position).copied();
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.cursor.position + 1).copied()
    }

    fn at_comment(&self) -> bool {
        self.current_char == Some('/') && matches!(self.peek(), Some('/') | Some('*'))
    }

    /// Skip whitespace and comments up to the next token.
    fn skip_trivia(&mut self) -> Result<()> {
        loop {
            while matches!(self.current_char, Some(c) if c.is_whitespace()) {
                self.advance();
            }
            if !self.at_comment() {
                return Ok(());
            }

            let start = self.cursor.position;
            let block = self.peek() == Some('*');
            self.advance();
            self.advance();

            if block {
                loop {
                    match self.current_char {
                        Some('*') if self.peek() == Some('/') => {
                            self.advance();
                            self.advance();
                            break;
                        }
                        Some(_) => self.advance(),
                        None => return Err(Error::syntax("Unterminated block comment", start)),
                    }
                }
            } else {
                while let Some(c) = self.current_char {
                    self.advance();
                    if c == '\n' {
                        break;
                    }
                }
            }
        }
    }

    fn take_while(&mut self, accept: impl Fn(char) -> bool) -> String {
        let start = self.cursor.position;
        while matches!(self.current_char, Some(c) if accept(c)) {
            self.advance();
        }
        self.chars[start..self.cursor.position].iter().collect()
    }

    fn read_identifier(&mut self) -> String {
        self.take_while(|c| c.is_alphanumeric() || c == '_')
    }

    /// Read a quoted run ending at `quote`, used by string literals ('...')
    /// and delimited identifiers (`...`). A doubled quote is an escaped quote.
    fn read_quoted(&mut self, quote: char, what: &str) -> Result<String> {
        let start = self.cursor.position;
        self.advance();

        let mut value = String::new();
        while let Some(c) = self.current_char {
            match c {
                _ if c == quote && self.peek() == Some(quote) => {
                    value.push(quote);
                    self.advance();
                    self.advance();
                }
                _ if c == quote => {
                    self.advance();
                    return Ok(value);
                }
                '\\' => {
                    self.advance();
                    value.push(self.read_escape()?);
                }
                _ => {
                    value.push(c);
                    self.advance();
                }
            }
        }

        Err(Error::syntax(format!("Unterminated {}", what), start))
    }

    /// Decode one escape sequence; the backslash is already consumed.
    fn read_escape(&mut self) -> Result<char> {
        let at = self.cursor.position;
        let escaped = self
            .current_char
            .ok_or_else(|| Error::syntax("Incomplete escape sequence", at))?;
        self.advance();

        Ok(match escaped {
            'f' => '\x0C',
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            'u' => {
                let digits: String = (0..4)
                    .map_while(|_| {
                        let c = self.current_char.filter(char::is_ascii_hexdigit)?;
                        self.advance();
                        Some(c)
                    })
                    .collect();
                if digits.len() != 4 {
                    return Err(Error::syntax("Invalid unicode escape sequence", at));
                }
                u32::from_str_radix(&digits, 16)
                    .ok()
                    .and_then(char::from_u32)
                    .ok_or_else(|| Error::syntax("Invalid unicode character", at))?
            }
            // \' \\ \/ \" \` and anything else stand for themselves
            other => other,
        })
    }

    /// Read an integer or decimal number. A dot only belongs to the number
    /// when digits follow it (`1.exists()` is a path).
    fn read_number(&mut self) -> String {
        let mut text = self.take_while(|c| c.is_ascii_digit());
        if self.current_char == Some('.') && matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.advance();
            text.push('.');
            text.push_str(&self.take_while(|c| c.is_ascii_digit()));
        }
        text
    }

    /// Consume `len` characters as a punctuation token.
    fn punct(&mut self, token_type: TokenType, len: usize) -> Token {
        let token = Token::symbol(token_type, self.cursor);
        for _ in 0..len {
            self.advance();
        }
        token
    }

    /// Get the next token from the input
    pub fn next_token(&mut self) -> Token {
        if let Err(e) = self.skip_trivia() {
            return Token::error(error_message(e), self.cursor);
        }

        let start = self.cursor;
        let Some(c) = self.current_char else {
            return Token::eof(start);
        };
        let next = self.peek();

        match c {
            '.' => self.punct(TokenType::Dot, 1),
            '(' => self.punct(TokenType::OpenParen, 1),
            ')' => self.punct(TokenType::CloseParen, 1),
            ',' => self.punct(TokenType::Comma, 1),
            '+' => self.punct(TokenType::Plus, 1),
            '-' => self.punct(TokenType::Minus, 1),
            '*' => self.punct(TokenType::Multiply, 1),
            '/' => self.punct(TokenType::Divide, 1),
            '=' => self.punct(TokenType::Equal, 1),
            '<' if next == Some('=') => self.punct(TokenType::LessThanOrEqual, 2),
            '<' => self.punct(TokenType::LessThan, 1),
            '>' if next == Some('=') => self.punct(TokenType::GreaterThanOrEqual, 2),
            '>' => self.punct(TokenType::GreaterThan, 1),
            '!' if next == Some('=') => self.punct(TokenType::NotEqual, 2),
            '!' => Token::error("Unexpected '!' character", start),
            '%' => {
                self.advance();
                let name = match self.current_char {
                    Some(quote @ ('\'' | '`')) => self.read_quoted(quote, "constant name"),
                    _ => Ok(self.read_identifier()),
                };
                match name {
                    Ok(name) if name.is_empty() => Token::error("Expected constant name after '%'", start),
                    Ok(name) => Token::new(TokenType::ExternalConstant, name, start),
                    Err(e) => Token::error(error_message(e), start),
                }
            }
            '\'' | '`' => {
                let (token_type, what) = if c == '\'' {
                    (TokenType::StringLiteral, "string literal")
                } else {
                    (TokenType::DelimitedIdentifier, "delimited identifier")
                };
                match self.read_quoted(c, what) {
                    Ok(value) => Token::new(token_type, value, start),
                    Err(e) => Token::error(error_message(e), start),
                }
            }
            '$' => {
                self.advance();
                match self.read_identifier().as_str() {
                    "this" => Token::symbol(TokenType::This, start),
                    other => Token::error(format!("Unknown variable: ${}", other), start),
                }
            }
            _ if c.is_ascii_digit() => Token::new(TokenType::NumberLiteral, self.read_number(), start),
            _ if c.is_alphabetic() || c == '_' => {
                let ident = self.read_identifier();
                let token_type = match ident.as_str() {
                    "true" | "false" => TokenType::BooleanLiteral,
                    "and" => TokenType::And,
                    "or" => TokenType::Or,
                    _ => TokenType::Identifier,
                };
                Token::new(token_type, ident, start)
            }
            _ => Token::error(format!("Unexpected character: {}", c), start),
        }
    }
}

fn error_message(error: Error) -> String {
    match error {
        Error::Syntax { message, .. } => message,
        other => other.to_string(),
    }
}
