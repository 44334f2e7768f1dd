pub mod token;

#[cfg(test)]
mod test;

use lazy_static::lazy_static;
use log::trace;
use std::collections::HashMap;
use std::str::Chars;
use thiserror::Error;
use token::{Keyword, Span, Token, TokenType};

macro_rules! hash_map {
    ( $( $key: expr => $value: expr ),* $(,)? ) => {{
        let mut m = HashMap::new();
        $(
            m.insert($key, $value);
        )*
        m
    }}
}

lazy_static! {
    static ref KEYWORDS: HashMap<&'static str, Keyword> = hash_map! {
        "class"       => Keyword::Class,
        "constructor" => Keyword::Constructor,
        "function"    => Keyword::Function,
        "method"      => Keyword::Method,
        "field"       => Keyword::Field,
        "static"      => Keyword::Static,
        "var"         => Keyword::Var,
        "int"         => Keyword::Int,
        "char"        => Keyword::Char,
        "boolean"     => Keyword::Boolean,
        "void"        => Keyword::Void,
        "true"        => Keyword::True,
        "false"       => Keyword::False,
        "null"        => Keyword::Null,
        "this"        => Keyword::This,
        "let"         => Keyword::Let,
        "do"          => Keyword::Do,
        "if"          => Keyword::If,
        "else"        => Keyword::Else,
        "while"       => Keyword::While,
        "return"      => Keyword::Return,
    };
}

pub const SYMBOLS: [char; 19] = [
    '{', '}', '(', ')', '[', ']', '.', ',', ';', '+', '-', '*', '/', '&', '|', '<', '>', '=', '~',
];

pub const MAX_INT: u16 = 32767;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LexerErrorType {
    #[error("unexpected EOF")]
    UnexpectedEOF,

    #[error("integer constant {0} is out of range (max 32767)")]
    IntegerOutOfRange(String),

    #[error("expected start of token, found {0:?}")]
    UnexpectedChar(char),
}

#[derive(Error, Debug, Clone)]
#[error("LexerError at line {line}: {error}")]
pub struct LexerError {
    pub span: Span,
    pub line: usize,
    #[source]
    pub error: LexerErrorType,
}

pub type LexerResult = Result<Token, LexerError>;

/// Pull-based tokenizer. Every call to [`Lexer::advance`] produces exactly
/// one token; consumed tokens are never handed out again.
pub struct Lexer<'a> {
    input_str: &'a str,
    input: Chars<'a>,
    line: usize,
    start: usize,
    current: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input_str: &'a str) -> Self {
        Self {
            input_str,
            input: input_str.chars(),
            line: 1,
            start: 0,
            current: 0,
        }
    }

    /// Line the read position is currently on.
    pub fn line(&self) -> usize {
        self.line
    }

    fn peek(&self) -> Option<char> {
        self.input.clone().next()
    }

    fn peek_next(&self) -> Option<char> {
        let mut iter = self.input.clone();
        iter.next();
        iter.next()
    }

    fn advance_char(&mut self) -> Option<char> {
        let c = self.input.next()?;
        self.current += c.len_utf8();
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    fn make_token(&self, tok_type: TokenType, line: usize) -> Token {
        Token {
            tok_type,
            span: Span(self.start, self.current),
            line,
        }
    }

    fn make_error(&self, error: LexerErrorType, line: usize) -> LexerError {
        LexerError {
            span: Span(self.start, self.current),
            line,
            error,
        }
    }

    fn skip_whitespace(&mut self) {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.advance_char();
                }
                Some('/') => match self.peek_next() {
                    Some('/') => {
                        while let Some(c) = self.advance_char() {
                            if c == '\n' {
                                break;
                            }
                        }
                    }
                    Some('*') => {
                        self.advance_char();
                        self.advance_char();
                        // An unclosed block comment swallows the rest of the input.
                        while let Some(c) = self.advance_char() {
                            if c == '*' && self.peek() == Some('/') {
                                self.advance_char();
                                break;
                            }
                        }
                    }
                    _ => break,
                },
                _ => break,
            };
        }
    }

    fn get_lexeme(&self) -> &'a str {
        &self.input_str[self.start..self.current]
    }

    fn number(&mut self, line: usize) -> LexerResult {
        while let Some(c) = self.peek() {
            if !c.is_ascii_digit() {
                break;
            }
            self.advance_char();
        }

        let lexeme = self.get_lexeme();
        match lexeme.parse::<u16>() {
            Ok(value) if value <= MAX_INT => Ok(self.make_token(TokenType::IntConst(value), line)),
            _ => Err(self.make_error(
                LexerErrorType::IntegerOutOfRange(lexeme.to_string()),
                line,
            )),
        }
    }

    fn string(&mut self, line: usize) -> LexerResult {
        let content_start = self.current;
        loop {
            match self.advance_char() {
                None => return Err(self.make_error(LexerErrorType::UnexpectedEOF, line)),
                Some('"') => break,
                Some(_) => {}
            };
        }
        let content = &self.input_str[content_start..self.current - 1];
        Ok(self.make_token(TokenType::StringConst(content.to_string()), line))
    }

    fn identifier(&mut self, line: usize) -> LexerResult {
        loop {
            match self.peek() {
                Some(c) if c == '_' || c.is_alphanumeric() => self.advance_char(),
                _ => break,
            };
        }
        let lexeme = self.get_lexeme();

        if let Some(kw) = KEYWORDS.get(lexeme) {
            Ok(self.make_token(TokenType::Keyword(*kw), line))
        } else {
            Ok(self.make_token(TokenType::Identifier(lexeme.to_string()), line))
        }
    }
}

impl<'a> Lexer<'a> {
    /// Skips whitespace and comments, then reports whether a token follows.
    pub fn has_more(&mut self) -> bool {
        self.skip_whitespace();
        self.peek().is_some()
    }

    /// Reads the next token. Calling this with no input left is an error.
    pub fn advance(&mut self) -> LexerResult {
        self.skip_whitespace();

        self.start = self.current;
        let line = self.line;
        let Some(c) = self.advance_char() else {
            return Err(self.make_error(LexerErrorType::UnexpectedEOF, line));
        };

        let token = match c {
            c if SYMBOLS.contains(&c) => Ok(self.make_token(TokenType::Symbol(c), line)),
            '"' => self.string(line),
            c if c.is_ascii_digit() => self.number(line),
            c if c == '_' || c.is_alphabetic() => self.identifier(line),
            _ => Err(self.make_error(LexerErrorType::UnexpectedChar(c), line)),
        }?;

        trace!("token {:?} at line {}", token.tok_type, token.line);
        Ok(token)
    }

    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexerError> {
        self.collect()
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = LexerResult;

    fn next(&mut self) -> Option<Self::Item> {
        if self.has_more() {
            Some(self.advance())
        } else {
            None
        }
    }
}
