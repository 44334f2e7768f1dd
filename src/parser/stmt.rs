use super::*;
use crate::vm::Command;

impl<'a, S: VmSink, T: TreeSink> Parser<'a, S, T> {
    pub(super) fn statements(&mut self) -> ParseResult<()> {
        self.node("statements", |p| {
            while let Some(TokenType::Keyword(kw)) = p.peek_token_type() {
                let (node, statement): (&'static str, fn(&mut Self) -> ParseResult<()>) = match kw {
                    Keyword::Let => ("letStatement", Self::let_statement),
                    Keyword::If => ("ifStatement", Self::if_statement),
                    Keyword::While => ("whileStatement", Self::while_statement),
                    Keyword::Do => ("doStatement", Self::do_statement),
                    Keyword::Return => ("returnStatement", Self::return_statement),
                    _ => break,
                };
                p.node(node, statement)?;
            }
            Ok(())
        })
    }

    fn let_statement(&mut self) -> ParseResult<()> {
        self.consume_keyword(&[Keyword::Let], "let")?;
        let name = self.consume_identifier()?;
        let (segment, index) = self.variable(&name)?;

        if self.match_symbol('[')? {
            self.expression()?;
            self.consume_symbol(']', "]")?;
            self.emit(Instruction::Push(segment, index))?;
            self.emit(Instruction::Arithmetic(Command::Add))?;

            self.consume_symbol('=', "=")?;
            self.expression()?;
            self.consume_symbol(';', ";")?;

            // the target address sits under the value until `that` is rebound
            self.emit(Instruction::Pop(Segment::Temp, 0))?;
            self.emit(Instruction::Pop(Segment::Pointer, 1))?;
            self.emit(Instruction::Push(Segment::Temp, 0))?;
            self.emit(Instruction::Pop(Segment::That, 0))?;
        } else {
            self.consume_symbol('=', "=")?;
            self.expression()?;
            self.consume_symbol(';', ";")?;
            self.emit(Instruction::Pop(segment, index))?;
        }
        Ok(())
    }

    fn block(&mut self) -> ParseResult<()> {
        self.consume_symbol('{', "{")?;
        self.statements()?;
        self.consume_symbol('}', "}")?;
        Ok(())
    }

    fn condition(&mut self) -> ParseResult<()> {
        self.consume_symbol('(', "(")?;
        self.expression()?;
        self.consume_symbol(')', ")")?;
        Ok(())
    }

    fn if_statement(&mut self) -> ParseResult<()> {
        self.consume_keyword(&[Keyword::If], "if")?;
        let id = self.new_label_id();
        let else_label = self.label("IF_ELSE", id);
        let end_label = self.label("IF_END", id);

        self.condition()?;
        self.emit(Instruction::Arithmetic(Command::Not))?;
        self.emit(Instruction::IfGoto(else_label.clone()))?;

        self.block()?;
        self.emit(Instruction::Goto(end_label.clone()))?;

        self.emit(Instruction::Label(else_label))?;
        if self.check_keyword(&[Keyword::Else]) {
            self.advance()?;
            self.block()?;
        }
        self.emit(Instruction::Label(end_label))?;
        Ok(())
    }

    fn while_statement(&mut self) -> ParseResult<()> {
        self.consume_keyword(&[Keyword::While], "while")?;
        let id = self.new_label_id();
        let loop_label = self.label("WHILE_EXP", id);
        let end_label = self.label("WHILE_END", id);

        self.emit(Instruction::Label(loop_label.clone()))?;
        self.condition()?;
        self.emit(Instruction::Arithmetic(Command::Not))?;
        self.emit(Instruction::IfGoto(end_label.clone()))?;

        self.block()?;
        self.emit(Instruction::Goto(loop_label))?;
        self.emit(Instruction::Label(end_label))?;
        Ok(())
    }

    fn do_statement(&mut self) -> ParseResult<()> {
        self.consume_keyword(&[Keyword::Do], "do")?;
        let name = self.consume_identifier()?;
        self.subroutine_call(name)?;
        self.consume_symbol(';', ";")?;

        // every call leaves a return value behind, even void ones
        self.emit(Instruction::Pop(Segment::Temp, 0))?;
        Ok(())
    }

    fn return_statement(&mut self) -> ParseResult<()> {
        self.consume_keyword(&[Keyword::Return], "return")?;
        if self.check_symbol(';') {
            self.emit(Instruction::Push(Segment::Constant, 0))?;
        } else {
            self.expression()?;
        }
        self.consume_symbol(';', ";")?;
        self.emit(Instruction::Return)?;
        Ok(())
    }
}
