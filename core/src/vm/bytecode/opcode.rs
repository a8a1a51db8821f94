use std::fmt;

use serde::{Deserialize, Serialize};

/// One VM instruction. Operands live inside the variant. Each doc line gives
/// the stack effect as `[before] -> [after]`, top of stack rightmost.
///
/// Jump offsets count instructions and are relative to the instruction
/// following the jump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Opcode {
    /// `[] -> [constants[idx]]`
    Constant(u16),
    /// `[] -> [null]`
    Null,
    /// `[] -> [true]`
    True,
    /// `[] -> [false]`
    False,
    /// `[a] -> []`
    Pop,

    /// `[] -> [locals[slot]]`
    GetLocal(u8),
    /// `[a] -> [a]`, storing `a` in `locals[slot]`
    SetLocal(u8),
    /// `[] -> [globals[name]]`; unknown names are a runtime error
    GetGlobal(u16),
    /// `[a] -> []`, binding `a` to `name`
    DefineGlobal(u16),
    /// `[a] -> [a]`, rebinding an existing `name`
    SetGlobal(u16),

    /// `[a, b] -> [a == b]`
    Equal,
    /// `[a, b] -> [a > b]`
    Greater,
    /// `[a, b] -> [a < b]`
    Less,
    /// `[a, b] -> [a + b]`
    Add,
    /// `[a, b] -> [a - b]`
    Subtract,
    /// `[a, b] -> [a * b]`
    Multiply,
    /// `[a, b] -> [a / b]`
    Divide,
    /// `[a] -> [!a]`
    Not,
    /// `[a] -> [-a]`
    Negate,

    /// `[a] -> []`, writing `a` and a newline
    Print,
    /// `[] -> []`, `ip += offset`
    Jump(u16),
    /// `[a] -> [a]`, `ip += offset` when `a` is falsey
    JumpIfFalse(u16),
    /// `[] -> []`, `ip -= offset`
    Loop(u16),
    /// `[callee, args...] -> [result]`
    Call(u8),
    /// `[result] -> []`, leaving the current frame
    Return,

    /// `[prompt] -> [line]`
    Input,
    /// `[a] -> [number(a)]`
    ToNumber,
    /// `[a] -> []`, opening a game scene titled `a`
    Scene,
    /// `[animation] -> []`, rendering it
    Animate,
}

impl Opcode {
    /// Net change in operand stack depth.
    pub fn stack_effect(&self) -> i32 {
        match self {
            Opcode::Constant(_)
            | Opcode::Null
            | Opcode::True
            | Opcode::False
            | Opcode::GetLocal(_)
            | Opcode::GetGlobal(_) => 1,
            Opcode::Pop
            | Opcode::DefineGlobal(_)
            | Opcode::Equal
            | Opcode::Greater
            | Opcode::Less
            | Opcode::Add
            | Opcode::Subtract
            | Opcode::Multiply
            | Opcode::Divide
            | Opcode::Print
            | Opcode::Return
            | Opcode::Scene
            | Opcode::Animate => -1,
            Opcode::Call(argc) => -i32::from(*argc),
            Opcode::SetLocal(_)
            | Opcode::SetGlobal(_)
            | Opcode::Not
            | Opcode::Negate
            | Opcode::Jump(_)
            | Opcode::JumpIfFalse(_)
            | Opcode::Loop(_)
            | Opcode::Input
            | Opcode::ToNumber => 0,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Opcode::Constant(_) => "CONSTANT",
            Opcode::Null => "NULL",
            Opcode::True => "TRUE",
            Opcode::False => "FALSE",
            Opcode::Pop => "POP",
            Opcode::GetLocal(_) => "GET_LOCAL",
            Opcode::SetLocal(_) => "SET_LOCAL",
            Opcode::GetGlobal(_) => "GET_GLOBAL",
            Opcode::DefineGlobal(_) => "DEFINE_GLOBAL",
            Opcode::SetGlobal(_) => "SET_GLOBAL",
            Opcode::Equal => "EQUAL",
            Opcode::Greater => "GREATER",
            Opcode::Less => "LESS",
            Opcode::Add => "ADD",
            Opcode::Subtract => "SUBTRACT",
            Opcode::Multiply => "MULTIPLY",
            Opcode::Divide => "DIVIDE",
            Opcode::Not => "NOT",
            Opcode::Negate => "NEGATE",
            Opcode::Print => "PRINT",
            Opcode::Jump(_) => "JUMP",
            Opcode::JumpIfFalse(_) => "JUMP_IF_FALSE",
            Opcode::Loop(_) => "LOOP",
            Opcode::Call(_) => "CALL",
            Opcode::Return => "RETURN",
            Opcode::Input => "INPUT",
            Opcode::ToNumber => "TO_NUMBER",
            Opcode::Scene => "SCENE",
            Opcode::Animate => "ANIMATE",
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Opcode::Constant(idx)
            | Opcode::GetGlobal(idx)
            | Opcode::DefineGlobal(idx)
            | Opcode::SetGlobal(idx) => write!(f, "{} {idx}", self.name()),
            Opcode::GetLocal(slot) | Opcode::SetLocal(slot) => write!(f, "{} {slot}", self.name()),
            Opcode::Jump(offset) | Opcode::JumpIfFalse(offset) | Opcode::Loop(offset) => {
                write!(f, "{} {offset}", self.name())
            }
            Opcode::Call(argc) => write!(f, "{} {argc}", self.name()),
            _ => f.write_str(self.name()),
        }
    }
}
