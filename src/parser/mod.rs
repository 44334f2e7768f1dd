mod expr;
mod stmt;


use std::io;

use crate::lexer::token::{Keyword, Token, TokenType};
use crate::lexer::{LexerError, LexerErrorType, Lexer};
use crate::symbol_table::{Kind, SymbolError, SymbolTable};
use crate::vm::{Instruction, Segment, VmSink};
use log::{debug, trace};
use thiserror::Error;

// <class>            ::= "class" <identifier> "{" <class-var-dec>* <subroutine-dec>* "}"
// <class-var-dec>    ::= ( "static" | "field" ) <type> <identifier> ( "," <identifier> )* ";"
// <type>             ::= "int" | "char" | "boolean" | <identifier>
// <subroutine-dec>   ::= ( "constructor" | "function" | "method" ) ( "void" | <type> ) <identifier>
//                        "(" <parameter-list> ")" <subroutine-body>
// <parameter-list>   ::= ( <type> <identifier> ( "," <type> <identifier> )* )?
// <subroutine-body>  ::= "{" <var-dec>* <statement>* "}"
// <var-dec>          ::= "var" <type> <identifier> ( "," <identifier> )* ";"
// <statement>        ::= <let> | <if> | <while> | <do> | <return>
// <let>              ::= "let" <identifier> ( "[" <expr> "]" )? "=" <expr> ";"
// <if>               ::= "if" "(" <expr> ")" "{" <statement>* "}" ( "else" "{" <statement>* "}" )?
// <while>            ::= "while" "(" <expr> ")" "{" <statement>* "}"
// <do>               ::= "do" <subroutine-call> ";"
// <return>           ::= "return" <expr>? ";"
// <expr>             ::= <term> ( <op> <term> )*
// <term>             ::= <int> | <string> | "true" | "false" | "null" | "this"
//                      | <identifier> | <identifier> "[" <expr> "]" | <subroutine-call>
//                      | "(" <expr> ")" | ( "-" | "~" ) <term>
// <subroutine-call>  ::= <identifier> "(" <expr-list> ")"
//                      | <identifier> "." <identifier> "(" <expr-list> ")"
// <op>               ::= "+" | "-" | "*" | "/" | "&" | "|" | "<" | ">" | "="

#[derive(Error, Debug)]
#[error("ParseError at line {line}: {error}")]
pub struct ParseError {
    /// Offending token, `None` when the input ended early.
    pub token: Option<Token>,
    pub line: usize,
    #[source]
    pub error: ParseErrorType,
}

#[derive(Error, Debug)]
pub enum ParseErrorType {
    #[error("expected `{exp}`, got {got}")]
    Expected { exp: &'static str, got: String },

    #[error(transparent)]
    Lexer(#[from] LexerErrorType),

    #[error(transparent)]
    Symbol(#[from] SymbolError),

    #[error("constant {0} does not fit in a VM word")]
    ConstantOutOfRange(usize),

    #[error("failed to emit instruction: {0}")]
    Emit(#[from] io::Error),
}

impl From<LexerError> for ParseError {
    fn from(err: LexerError) -> Self {
        ParseError {
            token: None,
            line: err.line,
            error: ParseErrorType::Lexer(err.error),
        }
    }
}

pub type ParseResult<T> = Result<T, ParseError>;

#[derive(Debug, Clone, PartialEq)]
pub struct WithToken<T>(pub T, pub Token);

impl<T> std::ops::Deref for WithToken<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Observer of the parse. Productions are reported as they open and close,
/// terminals as they are consumed. The unit type ignores everything.
pub trait TreeSink {
    fn open(&mut self, _node: &'static str) {}
    fn close(&mut self, _node: &'static str) {}
    fn terminal(&mut self, _token: &Token) {}
}

impl TreeSink for () {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubroutineKind {
    Constructor,
    Function,
    Method,
}

/// Recursive-descent compiler for a single class. Instructions go to the
/// sink as soon as each construct is recognized; there is no syntax tree.
pub struct Parser<'a, S: VmSink, T: TreeSink = ()> {
    input: &'a str,
    lexer: Lexer<'a>,
    current: Option<Token>,
    symbols: SymbolTable,
    sink: S,
    tree: T,
    class_name: String,
    subroutine_kind: SubroutineKind,
    label_count: usize,
}

impl<'a, S: VmSink> Parser<'a, S> {
    pub fn new(input: &'a str, sink: S) -> ParseResult<Self> {
        Parser::with_tree(input, sink, ())
    }
}

impl<'a, S: VmSink, T: TreeSink> Parser<'a, S, T> {
    pub fn with_tree(input: &'a str, sink: S, tree: T) -> ParseResult<Self> {
        let mut lexer = Lexer::new(input);
        let current = if lexer.has_more() {
            Some(lexer.advance()?)
        } else {
            None
        };

        Ok(Self {
            input,
            lexer,
            current,
            symbols: SymbolTable::new(),
            sink,
            tree,
            class_name: String::new(),
            subroutine_kind: SubroutineKind::Function,
            label_count: 0,
        })
    }

    fn peek(&self) -> Option<&Token> {
        self.current.as_ref()
    }

    fn peek_token_type(&self) -> Option<&TokenType> {
        self.peek().map(|t| &t.tok_type)
    }

    /// Moves to the next token and returns the one that was current.
    fn advance(&mut self) -> ParseResult<Option<Token>> {
        let next = if self.lexer.has_more() {
            Some(self.lexer.advance()?)
        } else {
            None
        };
        let prev = std::mem::replace(&mut self.current, next);
        if let Some(token) = &prev {
            self.tree.terminal(token);
        }
        Ok(prev)
    }

    /// Runs one production, bracketed by open/close notifications.
    fn node<R>(
        &mut self,
        name: &'static str,
        production: impl FnOnce(&mut Self) -> ParseResult<R>,
    ) -> ParseResult<R> {
        self.tree.open(name);
        let result = production(self)?;
        self.tree.close(name);
        Ok(result)
    }

    fn check_symbol(&self, c: char) -> bool {
        matches!(self.peek_token_type(), Some(TokenType::Symbol(s)) if *s == c)
    }

    fn check_keyword(&self, kws: &[Keyword]) -> bool {
        matches!(self.peek_token_type(), Some(TokenType::Keyword(kw)) if kws.contains(kw))
    }

    fn match_symbol(&mut self, c: char) -> ParseResult<bool> {
        if self.check_symbol(c) {
            self.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn consume_symbol(&mut self, c: char, exp: &'static str) -> ParseResult<Token> {
        if self.check_symbol(c) {
            self.consume_current()
        } else {
            Err(self.expected(exp))
        }
    }

    fn consume_keyword(&mut self, kws: &[Keyword], exp: &'static str) -> ParseResult<Keyword> {
        match self.peek_token_type() {
            Some(TokenType::Keyword(kw)) if kws.contains(kw) => {
                let kw = *kw;
                self.advance()?;
                Ok(kw)
            }
            _ => Err(self.expected(exp)),
        }
    }

    fn consume_identifier(&mut self) -> ParseResult<WithToken<String>> {
        match self.peek_token_type() {
            Some(TokenType::Identifier(name)) => {
                let name = name.clone();
                let token = self.consume_current()?;
                Ok(WithToken(name, token))
            }
            _ => Err(self.expected("<identifier>")),
        }
    }

    fn consume_current(&mut self) -> ParseResult<Token> {
        match self.advance()? {
            Some(token) => Ok(token),
            None => Err(self.expected("<token>")),
        }
    }

    fn expected(&self, exp: &'static str) -> ParseError {
        let got = match self.peek() {
            Some(token) => format!("`{}`", token.lexeme(self.input)),
            None => String::from("<eof>"),
        };
        self.error_at_current(ParseErrorType::Expected { exp, got })
    }

    fn error_at(&self, token: &Token, error: impl Into<ParseErrorType>) -> ParseError {
        ParseError {
            token: Some(token.clone()),
            line: token.line,
            error: error.into(),
        }
    }

    fn error_at_current(&self, error: ParseErrorType) -> ParseError {
        match self.peek() {
            Some(token) => self.error_at(token, error),
            None => ParseError {
                token: None,
                line: self.lexer.line(),
                error,
            },
        }
    }

    fn emit(&mut self, instruction: Instruction) -> ParseResult<()> {
        trace!("emit {instruction}");
        self.sink
            .emit(instruction)
            .map_err(|e| self.error_at_current(e.into()))
    }

    fn new_label_id(&mut self) -> usize {
        let id = self.label_count;
        self.label_count += 1;
        id
    }

    fn label(&self, prefix: &str, id: usize) -> String {
        format!("{}.{}{}", self.class_name, prefix, id)
    }

    /// Resolves a variable reference to the segment slot holding it.
    fn variable(&self, name: &WithToken<String>) -> ParseResult<(Segment, u16)> {
        let symbol = self
            .symbols
            .resolve(name)
            .map_err(|e| self.error_at(&name.1, e))?;

        if symbol.kind == Kind::Field && self.subroutine_kind == SubroutineKind::Function {
            return Err(self.error_at(&name.1, SymbolError::FieldWithoutReceiver(name.0.clone())));
        }
        Ok((Segment::of_kind(symbol.kind), symbol.index))
    }

    fn define(&mut self, name: &WithToken<String>, ty: &str, kind: Kind) -> ParseResult<()> {
        match self.symbols.define(name, ty, kind) {
            Ok(_) => Ok(()),
            Err(e) => Err(self.error_at(&name.1, e)),
        }
    }
}

impl<'a, S: VmSink, T: TreeSink> Parser<'a, S, T> {
    /// Compiles the whole class and hands back the sink and tree.
    pub fn compile_class(mut self) -> ParseResult<(S, T)> {
        self.node("class", Self::class)?;

        if self.peek().is_some() {
            return Err(self.expected("<eof>"));
        }

        Ok((self.sink, self.tree))
    }

    fn class(&mut self) -> ParseResult<()> {
        self.consume_keyword(&[Keyword::Class], "class")?;
        let name = self.consume_identifier()?;
        self.class_name = name.0;
        debug!("compiling class {}", self.class_name);

        self.consume_symbol('{', "{")?;

        while self.check_keyword(&[Keyword::Static, Keyword::Field]) {
            self.node("classVarDec", Self::class_var_dec)?;
        }

        while self.check_keyword(&[Keyword::Constructor, Keyword::Function, Keyword::Method]) {
            self.node("subroutineDec", Self::subroutine_dec)?;
        }

        self.consume_symbol('}', "}")?;
        Ok(())
    }

    fn class_var_dec(&mut self) -> ParseResult<()> {
        let Some(token) = self.peek().cloned() else {
            return Err(self.expected("static` or `field"));
        };
        let kw = self.consume_keyword(&[Keyword::Static, Keyword::Field], "static` or `field")?;
        let kind = Kind::try_from(kw).map_err(|e| self.error_at(&token, e))?;

        let ty = self.var_type()?;
        self.var_names(&ty, kind)
    }

    fn var_dec(&mut self) -> ParseResult<()> {
        self.consume_keyword(&[Keyword::Var], "var")?;
        let ty = self.var_type()?;
        self.var_names(&ty, Kind::Local)
    }

    fn var_names(&mut self, ty: &str, kind: Kind) -> ParseResult<()> {
        loop {
            let name = self.consume_identifier()?;
            self.define(&name, ty, kind)?;
            if !self.match_symbol(',')? {
                break;
            }
        }
        self.consume_symbol(';', ";")?;
        Ok(())
    }

    fn var_type(&mut self) -> ParseResult<String> {
        match self.peek_token_type() {
            Some(TokenType::Keyword(kw @ (Keyword::Int | Keyword::Char | Keyword::Boolean))) => {
                let ty = kw.to_string();
                self.advance()?;
                Ok(ty)
            }
            Some(TokenType::Identifier(_)) => self.consume_identifier().map(|name| name.0),
            _ => Err(self.expected("<type>")),
        }
    }

    fn subroutine_dec(&mut self) -> ParseResult<()> {
        let kw = self.consume_keyword(
            &[Keyword::Constructor, Keyword::Function, Keyword::Method],
            "constructor`, `function` or `method",
        )?;
        self.subroutine_kind = match kw {
            Keyword::Constructor => SubroutineKind::Constructor,
            Keyword::Method => SubroutineKind::Method,
            _ => SubroutineKind::Function,
        };

        if !self.check_keyword(&[Keyword::Void]) {
            self.var_type()?;
        } else {
            self.advance()?;
        }

        let name = self.consume_identifier()?;
        debug!(
            "compiling {:?} {}.{}",
            self.subroutine_kind, self.class_name, name.0
        );

        self.symbols.reset_subroutine_scope();
        if self.subroutine_kind == SubroutineKind::Method {
            let receiver = WithToken(String::from("this"), name.1.clone());
            let class_name = self.class_name.clone();
            self.define(&receiver, &class_name, Kind::Argument)?;
        }

        self.consume_symbol('(', "(")?;
        self.node("parameterList", Self::parameter_list)?;
        self.consume_symbol(')', ")")?;

        self.node("subroutineBody", |p| p.subroutine_body(&name))
    }

    fn parameter_list(&mut self) -> ParseResult<()> {
        if self.check_symbol(')') {
            return Ok(());
        }

        loop {
            let ty = self.var_type()?;
            let name = self.consume_identifier()?;
            self.define(&name, &ty, Kind::Argument)?;
            if !self.match_symbol(',')? {
                break;
            }
        }
        Ok(())
    }

    fn subroutine_body(&mut self, name: &WithToken<String>) -> ParseResult<()> {
        self.consume_symbol('{', "{")?;

        while self.check_keyword(&[Keyword::Var]) {
            self.node("varDec", Self::var_dec)?;
        }

        let full_name = format!("{}.{}", self.class_name, name.0);
        let n_locals = self.symbols.var_count(Kind::Local);
        self.emit(Instruction::Function(full_name, n_locals))?;

        match self.subroutine_kind {
            SubroutineKind::Constructor => {
                let n_fields = self.symbols.var_count(Kind::Field);
                self.emit(Instruction::Push(Segment::Constant, n_fields))?;
                self.emit(Instruction::Call(String::from("Memory.alloc"), 1))?;
                self.emit(Instruction::Pop(Segment::Pointer, 0))?;
            }
            SubroutineKind::Method => {
                self.emit(Instruction::Push(Segment::Argument, 0))?;
                self.emit(Instruction::Pop(Segment::Pointer, 0))?;
            }
            SubroutineKind::Function => {}
        }

        self.statements()?;
        self.consume_symbol('}', "}")?;
        Ok(())
    }
}

/// Compiles one class from source into the given sink.
pub fn compile_class<S: VmSink>(input: &str, sink: S) -> ParseResult<S> {
    Parser::new(input, sink)?.compile_class().map(|(sink, _)| sink)
}

/// Like [`compile_class`], also reporting the parse to `tree`.
pub fn compile_class_with_tree<S: VmSink, T: TreeSink>(
    input: &str,
    sink: S,
    tree: T,
) -> ParseResult<(S, T)> {
    Parser::with_tree(input, sink, tree)?.compile_class()
}
