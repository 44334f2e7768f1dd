use super::*;
use crate::lexer::MAX_INT;
use crate::vm::Command;

/// Binary operators all share one precedence level and associate to the left.
fn binary_op(c: char) -> Option<Instruction> {
    let inst = match c {
        '+' => Instruction::Arithmetic(Command::Add),
        '-' => Instruction::Arithmetic(Command::Sub),
        '*' => Instruction::Call(String::from("Math.multiply"), 2),
        '/' => Instruction::Call(String::from("Math.divide"), 2),
        '&' => Instruction::Arithmetic(Command::And),
        '|' => Instruction::Arithmetic(Command::Or),
        '<' => Instruction::Arithmetic(Command::Lt),
        '>' => Instruction::Arithmetic(Command::Gt),
        '=' => Instruction::Arithmetic(Command::Eq),
        _ => return None,
    };
    Some(inst)
}

impl<'a, S: VmSink, T: TreeSink> Parser<'a, S, T> {
    pub(super) fn expression(&mut self) -> ParseResult<()> {
        self.node("expression", |p| {
            p.term()?;
            while let Some(TokenType::Symbol(c)) = p.peek_token_type() {
                let Some(op) = binary_op(*c) else {
                    break;
                };
                p.advance()?;
                p.term()?;
                p.emit(op)?;
            }
            Ok(())
        })
    }

    fn term(&mut self) -> ParseResult<()> {
        self.node("term", Self::operand)
    }

    fn operand(&mut self) -> ParseResult<()> {
        let Some(tok_type) = self.peek_token_type().cloned() else {
            return Err(self.expected("<term>"));
        };

        match tok_type {
            TokenType::IntConst(value) => {
                self.advance()?;
                self.emit(Instruction::Push(Segment::Constant, value))
            }
            TokenType::StringConst(s) => {
                let token = self.consume_current()?;
                self.string_constant(&s, &token)
            }
            TokenType::Keyword(Keyword::True) => {
                self.advance()?;
                self.emit(Instruction::Push(Segment::Constant, 0))?;
                self.emit(Instruction::Arithmetic(Command::Not))
            }
            TokenType::Keyword(Keyword::False | Keyword::Null) => {
                self.advance()?;
                self.emit(Instruction::Push(Segment::Constant, 0))
            }
            TokenType::Keyword(Keyword::This) => {
                self.advance()?;
                self.emit(Instruction::Push(Segment::Pointer, 0))
            }
            TokenType::Symbol('(') => {
                self.advance()?;
                self.expression()?;
                self.consume_symbol(')', ")")?;
                Ok(())
            }
            TokenType::Symbol(c @ ('-' | '~')) => {
                self.advance()?;
                self.term()?;
                let cmd = if c == '-' { Command::Neg } else { Command::Not };
                self.emit(Instruction::Arithmetic(cmd))
            }
            TokenType::Identifier(_) => {
                let name = self.consume_identifier()?;
                if self.match_symbol('[')? {
                    let (segment, index) = self.variable(&name)?;
                    self.expression()?;
                    self.consume_symbol(']', "]")?;
                    self.emit(Instruction::Push(segment, index))?;
                    self.emit(Instruction::Arithmetic(Command::Add))?;
                    self.emit(Instruction::Pop(Segment::Pointer, 1))?;
                    self.emit(Instruction::Push(Segment::That, 0))
                } else if self.check_symbol('(') || self.check_symbol('.') {
                    self.subroutine_call(name)
                } else {
                    let (segment, index) = self.variable(&name)?;
                    self.emit(Instruction::Push(segment, index))
                }
            }
            _ => Err(self.expected("<term>")),
        }
    }

    /// Builds the string at run time: `String.new(len)` then one
    /// `appendChar` per character.
    fn string_constant(&mut self, s: &str, token: &Token) -> ParseResult<()> {
        let len = s.chars().count();
        self.emit(Instruction::Push(Segment::Constant, constant(len, token)?))?;
        self.emit(Instruction::Call(String::from("String.new"), 1))?;

        for c in s.chars() {
            let code = constant(c as usize, token)?;
            self.emit(Instruction::Push(Segment::Constant, code))?;
            self.emit(Instruction::Call(String::from("String.appendChar"), 2))?;
        }
        Ok(())
    }

    /// Compiles a call whose leading identifier has already been consumed.
    pub(super) fn subroutine_call(&mut self, name: WithToken<String>) -> ParseResult<()> {
        let mut n_args = 0;
        let target = if self.match_symbol('.')? {
            let member = self.consume_identifier()?;
            match self.symbols.lookup(&name).map(|s| s.ty.clone()) {
                Some(ty) => {
                    // method call on an object held in a variable
                    let (segment, index) = self.variable(&name)?;
                    self.emit(Instruction::Push(segment, index))?;
                    n_args += 1;
                    format!("{}.{}", ty, member.0)
                }
                None => format!("{}.{}", name.0, member.0),
            }
        } else {
            self.emit(Instruction::Push(Segment::Pointer, 0))?;
            n_args += 1;
            format!("{}.{}", self.class_name, name.0)
        };

        self.consume_symbol('(', "(")?;
        n_args += self.expression_list()?;
        self.consume_symbol(')', ")")?;

        self.emit(Instruction::Call(target, n_args))
    }

    fn expression_list(&mut self) -> ParseResult<u16> {
        self.node("expressionList", |p| {
            if p.check_symbol(')') {
                return Ok(0);
            }

            let mut count = 0;
            loop {
                p.expression()?;
                count += 1;
                if !p.match_symbol(',')? {
                    break;
                }
            }
            Ok(count)
        })
    }
}

fn constant(value: usize, token: &Token) -> ParseResult<u16> {
    match u16::try_from(value) {
        Ok(v) if v <= MAX_INT => Ok(v),
        _ => Err(ParseError {
            token: Some(token.clone()),
            line: token.line,
            error: ParseErrorType::ConstantOutOfRange(value),
        }),
    }
}
