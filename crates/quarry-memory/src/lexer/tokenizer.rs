//! Statement tokenizer.

use super::{Keyword, Span, Token, TokenKind};

/// A lexer over one statement's text. Positions are byte offsets.
pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    start: usize,
}

impl<'a> Lexer<'a> {
    #[must_use]
    pub const fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            start: 0,
        }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_next(&self) -> Option<char> {
        self.rest().chars().nth(1)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    /// Consumes `expected` if it is next.
    fn eat(&mut self, expected: char) -> bool {
        let matched = self.peek() == Some(expected);
        if matched {
            self.pos += expected.len_utf8();
        }
        matched
    }

    fn eat_while(&mut self, pred: impl Fn(char) -> bool) {
        while self.peek().is_some_and(&pred) {
            self.bump();
        }
    }

    fn skip_trivia(&mut self) {
        loop {
            self.eat_while(char::is_whitespace);
            if self.rest().starts_with("--") {
                self.eat_while(|c| c != '\n');
            } else if self.rest().starts_with("/*") {
                let rest = self.rest();
                self.pos += rest[2..].find("*/").map_or(rest.len(), |end| end + 4);
            } else {
                return;
            }
        }
    }

    fn token(&self, kind: TokenKind) -> Token {
        Token::new(kind, Span::new(self.start, self.pos))
    }

    fn error(&self, message: impl Into<String>) -> Token {
        self.token(TokenKind::Error(message.into()))
    }

    fn text(&self) -> &'a str {
        &self.input[self.start..self.pos]
    }

    fn word(&mut self) -> Token {
        self.eat_while(|c| c.is_alphanumeric() || c == '_');
        let text = self.text();
        self.token(Keyword::lookup(text).map_or_else(
            || TokenKind::Identifier(String::from(text)),
            TokenKind::Keyword,
        ))
    }

    /// Reads up to the closing `quote`, where a doubled quote stands for itself.
    fn quoted(&mut self, quote: char) -> Option<String> {
        self.bump();
        let mut value = String::new();
        loop {
            let c = self.bump()?;
            if c != quote {
                value.push(c);
            } else if self.eat(quote) {
                value.push(quote);
            } else {
                return Some(value);
            }
        }
    }

    /// Integers too large for `i64` become floats.
    fn number(&mut self) -> Token {
        self.eat_while(|c| c.is_ascii_digit());
        let mut fractional = false;
        if self.peek() == Some('.') && self.peek_next().is_some_and(|c| c.is_ascii_digit()) {
            fractional = true;
            self.bump();
            self.eat_while(|c| c.is_ascii_digit());
        }
        if self.eat('e') || self.eat('E') {
            fractional = true;
            if !self.eat('+') {
                self.eat('-');
            }
            self.eat_while(|c| c.is_ascii_digit());
        }

        let text = self.text();
        if let (false, Ok(n)) = (fractional, text.parse::<i64>()) {
            return self.token(TokenKind::Integer(n));
        }
        match text.parse::<f64>() {
            Ok(f) => self.token(TokenKind::Float(f)),
            Err(e) => self.error(format!("Invalid number: {e}")),
        }
    }

    /// `X'..'` with hex digit pairs, whitespace allowed between them.
    fn blob(&mut self) -> Token {
        self.bump();
        let Some(body) = self.quoted('\'') else {
            return self.error("Unterminated blob literal");
        };
        let digits: Vec<u8> = body.bytes().filter(|b| !b.is_ascii_whitespace()).collect();
        if !digits.iter().all(u8::is_ascii_hexdigit) {
            return self.error("Invalid character in blob literal");
        }
        if digits.len() % 2 != 0 {
            return self.error("Odd number of hex digits in blob literal");
        }
        let bytes = digits
            .chunks(2)
            .filter_map(|pair| std::str::from_utf8(pair).ok())
            .filter_map(|pair| u8::from_str_radix(pair, 16).ok())
            .collect();
        self.token(TokenKind::Blob(bytes))
    }

    /// Lexes the next token; the end of input yields [`TokenKind::Eof`] forever.
    #[must_use]
    pub fn next_token(&mut self) -> Token {
        self.skip_trivia();
        self.start = self.pos;

        let Some(c) = self.peek() else {
            return self.token(TokenKind::Eof);
        };
        match c {
            '\'' => {
                return match self.quoted(c) {
                    Some(value) => self.token(TokenKind::String(value)),
                    None => self.error("Unterminated string literal"),
                };
            }
            '"' | '`' => {
                return match self.quoted(c) {
                    Some(value) => self.token(TokenKind::Identifier(value)),
                    None => self.error("Unterminated quoted identifier"),
                };
            }
            'X' | 'x' if self.peek_next() == Some('\'') => return self.blob(),
            c if c.is_ascii_digit() => return self.number(),
            c if c.is_alphabetic() || c == '_' => return self.word(),
            _ => {}
        }

        self.bump();
        let kind = match c {
            '(' => TokenKind::LeftParen,
            ')' => TokenKind::RightParen,
            ',' => TokenKind::Comma,
            ';' => TokenKind::Semicolon,
            '.' => TokenKind::Dot,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '?' => TokenKind::Question,
            '=' => TokenKind::Eq,
            '<' if self.eat('=') => TokenKind::LtEq,
            '<' if self.eat('>') => TokenKind::NotEq,
            '<' => TokenKind::Lt,
            '>' if self.eat('=') => TokenKind::GtEq,
            '>' => TokenKind::Gt,
            '!' if self.eat('=') => TokenKind::NotEq,
            _ => TokenKind::Error(format!("Unexpected character: {c}")),
        };
        self.token(kind)
    }

    /// Lexes the whole input, ending with [`TokenKind::Eof`].
    #[must_use]
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = vec![];
        loop {
            let token = self.next_token();
            let done = token.is_eof();
            tokens.push(token);
            if done {
                return tokens;
            }
        }
    }
}
