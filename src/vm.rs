use std::fmt::Display;
use std::io::{self, Write};

use crate::symbol_table::Kind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Constant,
    Argument,
    Local,
    Static,
    This,
    That,
    Pointer,
    Temp,
}

impl Segment {
    /// Segment a variable of the given kind lives in. Fields are only
    /// reachable through `this`, so the caller must have a receiver bound.
    pub fn of_kind(kind: Kind) -> Segment {
        match kind {
            Kind::Static => Segment::Static,
            Kind::Field => Segment::This,
            Kind::Argument => Segment::Argument,
            Kind::Local => Segment::Local,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Segment::Constant => "constant",
            Segment::Argument => "argument",
            Segment::Local => "local",
            Segment::Static => "static",
            Segment::This => "this",
            Segment::That => "that",
            Segment::Pointer => "pointer",
            Segment::Temp => "temp",
        }
    }
}

impl Display for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Add,
    Sub,
    Neg,
    Eq,
    Gt,
    Lt,
    And,
    Or,
    Not,
}

impl Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Command::Add => "add",
            Command::Sub => "sub",
            Command::Neg => "neg",
            Command::Eq => "eq",
            Command::Gt => "gt",
            Command::Lt => "lt",
            Command::And => "and",
            Command::Or => "or",
            Command::Not => "not",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    Push(Segment, u16),
    Pop(Segment, u16),
    Arithmetic(Command),
    Label(String),
    Goto(String),
    IfGoto(String),
    Call(String, u16),
    Function(String, u16),
    Return,
}

impl Display for Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Instruction::Push(seg, index) => write!(f, "push {seg} {index}"),
            Instruction::Pop(seg, index) => write!(f, "pop {seg} {index}"),
            Instruction::Arithmetic(cmd) => write!(f, "{cmd}"),
            Instruction::Label(label) => write!(f, "label {label}"),
            Instruction::Goto(label) => write!(f, "goto {label}"),
            Instruction::IfGoto(label) => write!(f, "if-goto {label}"),
            Instruction::Call(name, n_args) => write!(f, "call {name} {n_args}"),
            Instruction::Function(name, n_locals) => write!(f, "function {name} {n_locals}"),
            Instruction::Return => write!(f, "return"),
        }
    }
}

/// Receiver of generated instructions, in program order.
pub trait VmSink {
    fn emit(&mut self, instruction: Instruction) -> io::Result<()>;
}

impl VmSink for Vec<Instruction> {
    fn emit(&mut self, instruction: Instruction) -> io::Result<()> {
        self.push(instruction);
        Ok(())
    }
}

/// Writes one instruction per line to the underlying writer.
pub struct VmWriter<W: Write> {
    out: W,
}

impl<W: Write> VmWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn write_all(&mut self, instructions: &[Instruction]) -> io::Result<()> {
        for inst in instructions {
            self.emit(inst.clone())?;
        }
        self.out.flush()
    }
}

impl<W: Write> VmSink for VmWriter<W> {
    fn emit(&mut self, instruction: Instruction) -> io::Result<()> {
        writeln!(self.out, "{instruction}")
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::parser::compile_class;

    #[test]
    fn test_instruction_text() {
        let lines: Vec<String> = [
            Instruction::Push(Segment::Constant, 7),
            Instruction::Pop(Segment::That, 0),
            Instruction::Arithmetic(Command::Neg),
            Instruction::Label(String::from("Main.IF_END0")),
            Instruction::Goto(String::from("Main.IF_END0")),
            Instruction::IfGoto(String::from("Main.IF_ELSE0")),
            Instruction::Call(String::from("Math.multiply"), 2),
            Instruction::Function(String::from("Main.main"), 3),
            Instruction::Return,
        ]
        .iter()
        .map(|i| i.to_string())
        .collect();

        assert_eq!(
            lines,
            [
                "push constant 7",
                "pop that 0",
                "neg",
                "label Main.IF_END0",
                "goto Main.IF_END0",
                "if-goto Main.IF_ELSE0",
                "call Math.multiply 2",
                "function Main.main 3",
                "return",
            ]
        );
    }

    #[test]
    fn test_segment_of_kind() {
        assert_eq!(Segment::of_kind(Kind::Static), Segment::Static);
        assert_eq!(Segment::of_kind(Kind::Field), Segment::This);
        assert_eq!(Segment::of_kind(Kind::Argument), Segment::Argument);
        assert_eq!(Segment::of_kind(Kind::Local), Segment::Local);
    }

    #[test]
    fn test_writer_streams_lines() {
        let input = "class A { function int one() { return 1; } }";
        let writer = compile_class(input, VmWriter::new(Vec::new())).unwrap();
        let text = String::from_utf8(writer.into_inner()).unwrap();
        assert_eq!(text, "function A.one 0\npush constant 1\nreturn\n");
    }
}
