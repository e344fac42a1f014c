use std::str::Chars;

use peekmore::{PeekMore, PeekMoreIterator};

use crate::error::ScanError;
use crate::literal::Literal;
use crate::token::{Location, Token, Type};

/// A maximal-munch lexer over the source text. Scan errors (an unterminated
/// string, an unexpected character) are collected rather than raised
/// immediately, so a single run can surface every one of them instead of
/// stopping at the first.
pub struct Scanner<'a> {
    source: PeekMoreIterator<Chars<'a>>,
    tokens: Vec<Token>,
    errors: Vec<ScanError>,
    line: usize,
    column: usize,
    token_line: usize,
    token_column: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str) -> Scanner<'a> {
        Scanner {
            source: source.chars().peekmore(),
            tokens: Vec::new(),
            errors: Vec::new(),
            line: 1,
            column: 0,
            token_line: 1,
            token_column: 0,
        }
    }

    /// Scans the whole source and returns its tokens (terminated by `EOF`)
    /// alongside any scan errors encountered along the way.
    pub fn scan_tokens(mut self) -> (Vec<Token>, Vec<ScanError>) {
        while !self.is_at_end() {
            self.token_line = self.line;
            self.token_column = self.column;
            self.scan_token();
        }

        self.tokens.push(Token::new(Type::EOF, String::new(), None, Location::new(self.line, self.column)));

        (self.tokens, self.errors)
    }

    fn is_at_end(&mut self) -> bool {
        self.source.peek_nth(0).is_none()
    }

    fn peek(&mut self) -> char {
        self.source.peek_nth(0).copied().unwrap_or('\0')
    }

    fn peek_next(&mut self) -> char {
        self.source.peek_nth(1).copied().unwrap_or('\0')
    }

    fn advance(&mut self) -> char {
        let c = self.source.next().expect("advance called past end of source");
        if c == '\n' {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }
        c
    }

    fn match_next(&mut self, expected: char) -> bool {
        if self.peek() == expected {
            self.advance();
            true
        } else {
            false
        }
    }

    fn add_token(&mut self, r#type: Type, lexeme: String, literal: Option<Literal>) {
        self.tokens.push(Token::new(r#type, lexeme, literal, Location::new(self.token_line, self.token_column)));
    }

    fn error(&mut self, message: impl Into<String>) {
        self.errors.push(ScanError {
            location: Location::new(self.token_line, self.token_column),
            message: message.into(),
        });
    }

    /// A string literal. No escape sequences; terminated by the next `"`.
    fn string(&mut self) {
        let mut value = String::new();

        while self.peek() != '"' && !self.is_at_end() {
            value.push(self.advance());
        }

        if self.is_at_end() {
            self.error("Unterminated string.");
            return;
        }

        self.advance(); // the closing quote

        // The literal excludes the quotes; the lexeme includes them.
        self.add_token(Type::String, format!("\"{value}\""), Some(Literal::String(value)));
    }

    /// A number literal: digits, optionally `.` followed by more digits.
    fn number(&mut self, first: char) {
        let mut lexeme = String::from(first);

        while self.peek().is_ascii_digit() {
            lexeme.push(self.advance());
        }

        if self.peek() == '.' && self.peek_next().is_ascii_digit() {
            lexeme.push(self.advance()); // the dot
            while self.peek().is_ascii_digit() {
                lexeme.push(self.advance());
            }
        }

        let value: f64 = lexeme.parse().expect("a maximal-munch digit run always parses as f64");
        self.add_token(Type::Number, lexeme, Some(Literal::Number(value)));
    }

    /// An identifier or a keyword from the fixed keyword table.
    fn identifier(&mut self, first: char) {
        let mut lexeme = String::from(first);

        while self.peek().is_alphanumeric() || self.peek() == '_' {
            lexeme.push(self.advance());
        }

        let r#type = match lexeme.as_str() {
            "and" => Type::And,
            "class" => Type::Class,
            "def" => Type::Def,
            "else" => Type::Else,
            "false" => Type::False,
            "for" => Type::For,
            "if" => Type::If,
            "nil" => Type::Nil,
            "or" => Type::Or,
            "print" => Type::Print,
            "return" => Type::Return,
            "self" => Type::SelfKw,
            "super" => Type::Super,
            "true" => Type::True,
            "var" => Type::Var,
            "while" => Type::While,
            "break" => Type::Break,
            "continue" => Type::Continue,
            _ => Type::Identifier,
        };

        self.add_token(r#type, lexeme, None);
    }

    fn scan_token(&mut self) {
        let c = self.advance();
        match c {
            '(' => self.add_token(Type::LeftParen, c.to_string(), None),
            ')' => self.add_token(Type::RightParen, c.to_string(), None),
            '{' => self.add_token(Type::LeftBrace, c.to_string(), None),
            '}' => self.add_token(Type::RightBrace, c.to_string(), None),
            ',' => self.add_token(Type::Comma, c.to_string(), None),
            '.' => self.add_token(Type::Dot, c.to_string(), None),
            ':' => self.add_token(Type::Colon, c.to_string(), None),
            '-' => self.add_token(Type::Minus, c.to_string(), None),
            '+' => self.add_token(Type::Plus, c.to_string(), None),
            ';' => self.add_token(Type::Semicolon, c.to_string(), None),
            '*' => self.add_token(Type::Star, c.to_string(), None),

            '!' => {
                if self.match_next('=') {
                    self.add_token(Type::BangEqual, "!=".to_string(), None);
                } else {
                    self.add_token(Type::Bang, "!".to_string(), None);
                }
            }
            '=' => {
                if self.match_next('=') {
                    self.add_token(Type::EqualEqual, "==".to_string(), None);
                } else {
                    self.add_token(Type::Equal, "=".to_string(), None);
                }
            }
            '<' => {
                if self.match_next('=') {
                    self.add_token(Type::LessEqual, "<=".to_string(), None);
                } else {
                    self.add_token(Type::Less, "<".to_string(), None);
                }
            }
            '>' => {
                if self.match_next('=') {
                    self.add_token(Type::GreaterEqual, ">=".to_string(), None);
                } else {
                    self.add_token(Type::Greater, ">".to_string(), None);
                }
            }
            '/' => {
                if self.match_next('/') {
                    while self.peek() != '\n' && !self.is_at_end() {
                        self.advance();
                    }
                } else {
                    self.add_token(Type::Slash, "/".to_string(), None);
                }
            }

            ' ' | '\r' | '\t' | '\n' => {}

            '"' => self.string(),

            c if c.is_ascii_digit() => self.number(c),
            c if c.is_alphabetic() || c == '_' => self.identifier(c),

            other => self.error(format!("Unexpected character '{other}'.")),
        }
    }
}
