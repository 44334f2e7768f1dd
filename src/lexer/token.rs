use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Class,
    Constructor,
    Function,
    Method,
    Field,
    Static,
    Var,
    Int,
    Char,
    Boolean,
    Void,
    True,
    False,
    Null,
    This,
    Let,
    Do,
    If,
    Else,
    While,
    Return,
}

impl Keyword {
    pub fn as_str(&self) -> &'static str {
        match self {
            Keyword::Class => "class",
            Keyword::Constructor => "constructor",
            Keyword::Function => "function",
            Keyword::Method => "method",
            Keyword::Field => "field",
            Keyword::Static => "static",
            Keyword::Var => "var",
            Keyword::Int => "int",
            Keyword::Char => "char",
            Keyword::Boolean => "boolean",
            Keyword::Void => "void",
            Keyword::True => "true",
            Keyword::False => "false",
            Keyword::Null => "null",
            Keyword::This => "this",
            Keyword::Let => "let",
            Keyword::Do => "do",
            Keyword::If => "if",
            Keyword::Else => "else",
            Keyword::While => "while",
            Keyword::Return => "return",
        }
    }
}

impl Display for Keyword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The five token classes of the language, without payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Keyword,
    Symbol,
    Identifier,
    IntConst,
    StringConst,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenType {
    Keyword(Keyword),
    Symbol(char),
    Identifier(String),
    IntConst(u16),
    StringConst(String),
}

impl TokenType {
    pub fn kind(&self) -> TokenKind {
        match self {
            TokenType::Keyword(_) => TokenKind::Keyword,
            TokenType::Symbol(_) => TokenKind::Symbol,
            TokenType::Identifier(_) => TokenKind::Identifier,
            TokenType::IntConst(_) => TokenKind::IntConst,
            TokenType::StringConst(_) => TokenKind::StringConst,
        }
    }
}

impl Display for TokenType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenType::Keyword(kw) => write!(f, "{kw}"),
            TokenType::Symbol(c) => write!(f, "{c}"),
            TokenType::Identifier(name) => write!(f, "{name}"),
            TokenType::IntConst(value) => write!(f, "{value}"),
            TokenType::StringConst(s) => write!(f, "\"{s}\""),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span(pub usize, pub usize);

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub span: Span,
    pub line: usize,
    pub tok_type: TokenType,
}

impl Token {
    pub fn kind(&self) -> TokenKind {
        self.tok_type.kind()
    }

    /// Source text covered by this token, quotes included for strings.
    pub fn lexeme<'a>(&self, input: &'a str) -> &'a str {
        &input[self.span.0..self.span.1]
    }
}
