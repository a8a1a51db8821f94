use serde::{Deserialize, Serialize};

use super::{Function, Opcode, Value};

/// Constant indices are 16-bit.
pub const MAX_CONSTANTS: usize = u16::MAX as usize + 1;

/// A compiled unit: instructions, their source lines and a constant pool.
/// `lines[i]` is the source line of `instructions[i]`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Chunk {
    pub name: String,
    pub instructions: Vec<Opcode>,
    pub constants: Vec<Value>,
    pub lines: Vec<usize>,
}

impl Chunk {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn write(&mut self, op: Opcode, line: usize) {
        self.instructions.push(op);
        self.lines.push(line);
    }

    /// Add a constant, reusing an identical string or number already in the
    /// pool. Returns `None` once the pool is full.
    pub fn add_constant(&mut self, value: Value) -> Option<u16> {
        if let Some(idx) = self.find_constant(&value) {
            return Some(idx);
        }
        if self.constants.len() >= MAX_CONSTANTS {
            return None;
        }
        self.constants.push(value);
        u16::try_from(self.constants.len() - 1).ok()
    }

    pub fn find_constant(&self, value: &Value) -> Option<u16> {
        self.constants
            .iter()
            .position(|existing| existing.same_constant(value))
            .and_then(|idx| u16::try_from(idx).ok())
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Source line of the instruction at `ip`, or 0 when out of range.
    pub fn line_at(&self, ip: usize) -> usize {
        self.lines.get(ip).copied().unwrap_or(0)
    }

    /// Functions defined directly in this chunk's constant pool.
    pub fn functions(&self) -> impl Iterator<Item = &Function> {
        self.constants.iter().filter_map(|value| match value {
            Value::Function(func) => Some(func.as_ref()),
            _ => None,
        })
    }

    /// Peak operand stack depth reached by running the instructions in
    /// order, ignoring jumps.
    pub fn max_stack_depth(&self) -> usize {
        let mut depth: i64 = 0;
        let mut peak: i64 = 0;
        for op in &self.instructions {
            depth += i64::from(op.stack_effect());
            peak = peak.max(depth);
        }
        peak as usize
    }

    /// Check the structural invariants a loaded chunk must satisfy, including
    /// those of nested function chunks.
    pub fn validate(&self) -> Result<(), String> {
        if self.lines.len() != self.instructions.len() {
            return Err(format!(
                "'{}' has {} instructions but {} line entries",
                self.name,
                self.instructions.len(),
                self.lines.len()
            ));
        }

        for (ip, op) in self.instructions.iter().enumerate() {
            let ok = match *op {
                Opcode::Constant(idx)
                | Opcode::GetGlobal(idx)
                | Opcode::DefineGlobal(idx)
                | Opcode::SetGlobal(idx) => usize::from(idx) < self.constants.len(),
                Opcode::Jump(offset) | Opcode::JumpIfFalse(offset) => {
                    ip + 1 + usize::from(offset) <= self.instructions.len()
                }
                Opcode::Loop(offset) => usize::from(offset) <= ip + 1,
                _ => true,
            };
            if !ok {
                return Err(format!("'{}' instruction {ip} ({op}) is out of range", self.name));
            }
        }

        for func in self.functions() {
            func.chunk.validate()?;
        }
        Ok(())
    }
}
