use std::fmt::Write;

use super::{Chunk, Opcode, Value};

impl Chunk {
    /// Human-readable listing of this chunk followed by every nested
    /// function chunk.
    pub fn disassemble(&self) -> String {
        let mut out = String::new();
        self.disassemble_into(&mut out);
        out
    }

    fn disassemble_into(&self, out: &mut String) {
        let _ = writeln!(out, "== {} ==", self.name);
        for ip in 0..self.instructions.len() {
            self.disassemble_instruction(ip, out);
        }
        for func in self.functions() {
            out.push('\n');
            func.chunk.disassemble_into(out);
        }
    }

    pub fn disassemble_instruction(&self, ip: usize, out: &mut String) {
        let Some(op) = self.instructions.get(ip) else {
            return;
        };

        let _ = write!(out, "{ip:04} ");
        if ip > 0 && self.line_at(ip) == self.line_at(ip - 1) {
            out.push_str("   | ");
        } else {
            let _ = write!(out, "{:4} ", self.line_at(ip));
        }

        let _ = match *op {
            Opcode::Constant(idx)
            | Opcode::GetGlobal(idx)
            | Opcode::DefineGlobal(idx)
            | Opcode::SetGlobal(idx) => writeln!(
                out,
                "{:<16} {idx:4} {}",
                op.name(),
                self.render_constant(idx)
            ),
            Opcode::Jump(offset) | Opcode::JumpIfFalse(offset) => {
                writeln!(out, "{:<16} {offset:4} -> {:04}", op.name(), ip + 1 + usize::from(offset))
            }
            Opcode::Loop(offset) => writeln!(
                out,
                "{:<16} {offset:4} -> {:04}",
                op.name(),
                (ip + 1).saturating_sub(usize::from(offset))
            ),
            Opcode::GetLocal(slot) | Opcode::SetLocal(slot) => {
                writeln!(out, "{:<16} {slot:4}", op.name())
            }
            Opcode::Call(argc) => writeln!(out, "{:<16} {argc:4}", op.name()),
            _ => writeln!(out, "{}", op.name()),
        };
    }

    fn render_constant(&self, idx: u16) -> String {
        match self.constants.get(usize::from(idx)) {
            Some(Value::String(s)) => format!("'{s}'"),
            Some(value) => value.to_string(),
            None => "<invalid>".to_string(),
        }
    }
}
