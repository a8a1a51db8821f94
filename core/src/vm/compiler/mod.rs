mod compile_expr;
mod compile_stmt;

use crate::errors::CompileError;
use crate::parser::ast::Program;

use super::bytecode::{Chunk, Function, Interner, MAX_CONSTANTS, Opcode, Value};

/// Name of the top-level chunk.
pub const SCRIPT_NAME: &str = "<script>";

/// Single-pass compiler from a [`Program`] to a [`Chunk`].
///
/// String constants go through one [`Interner`] shared by the top-level
/// chunk and every nested function chunk, so equal text is one allocation.
/// A compiler can be reused; the interner survives between calls.
pub struct Compiler {
    chunk: Chunk,
    strings: Interner,
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}

impl Compiler {
    pub fn new() -> Self {
        Self {
            chunk: Chunk::new(SCRIPT_NAME),
            strings: Interner::new(),
        }
    }

    pub fn compile(&mut self, program: &Program) -> Result<Chunk, CompileError> {
        let result = self.compile_body(program);
        let chunk = std::mem::replace(&mut self.chunk, Chunk::new(SCRIPT_NAME));
        result?;
        tracing::debug!(
            instructions = chunk.len(),
            constants = chunk.constants.len(),
            max_stack = chunk.max_stack_depth(),
            "compiled program"
        );
        Ok(chunk)
    }

    /// Statements, then the implicit `null` return every chunk ends with.
    fn compile_body(&mut self, program: &Program) -> Result<(), CompileError> {
        for stmt in &program.body {
            self.compile_stmt(stmt)?;
        }
        let line = program.body.last().map_or(1, |stmt| stmt.line);
        self.emit(Opcode::Null, line);
        self.emit(Opcode::Return, line);
        Ok(())
    }

    pub(crate) fn compile_function(
        &mut self,
        name: &str,
        body: &Program,
    ) -> Result<Function, CompileError> {
        let mut nested = Compiler {
            chunk: Chunk::new(name),
            strings: std::mem::take(&mut self.strings),
        };
        let result = nested.compile_body(body);
        self.strings = nested.strings;
        result?;
        Ok(Function {
            name: name.to_string(),
            arity: 0,
            chunk: nested.chunk,
        })
    }

    pub(crate) fn emit(&mut self, op: Opcode, line: usize) {
        self.chunk.write(op, line);
    }

    pub(crate) fn make_constant(&mut self, value: Value) -> Result<u16, CompileError> {
        self.chunk
            .add_constant(value)
            .ok_or_else(|| CompileError::TooManyConstants {
                chunk: self.chunk.name.clone(),
                limit: MAX_CONSTANTS,
            })
    }

    pub(crate) fn emit_constant(&mut self, value: Value, line: usize) -> Result<(), CompileError> {
        let idx = self.make_constant(value)?;
        self.emit(Opcode::Constant(idx), line);
        Ok(())
    }

    /// Pool index of an interned string, used for literals and global names.
    pub(crate) fn string_constant(&mut self, text: &str) -> Result<u16, CompileError> {
        let interned = self.strings.intern(text);
        self.make_constant(Value::String(interned))
    }

    /// Emit a forward jump with a placeholder offset; returns its position
    /// for [`Compiler::patch_jump`].
    pub fn emit_jump(&mut self, jump: fn(u16) -> Opcode, line: usize) -> usize {
        self.emit(jump(u16::MAX), line);
        self.chunk.len() - 1
    }

    /// Point the jump at `at` to the next instruction to be emitted.
    pub fn patch_jump(&mut self, at: usize) -> Result<(), CompileError> {
        let distance = self.chunk.len() - at - 1;
        let offset =
            u16::try_from(distance).map_err(|_| CompileError::JumpTooLarge { distance })?;
        if let Some(op) = self.chunk.instructions.get_mut(at) {
            *op = match *op {
                Opcode::Jump(_) => Opcode::Jump(offset),
                Opcode::JumpIfFalse(_) => Opcode::JumpIfFalse(offset),
                other => other,
            };
        }
        Ok(())
    }

    /// Emit a backward jump to `loop_start`.
    pub fn emit_loop(&mut self, loop_start: usize, line: usize) -> Result<(), CompileError> {
        let distance = self.chunk.len() - loop_start + 1;
        let offset =
            u16::try_from(distance).map_err(|_| CompileError::JumpTooLarge { distance })?;
        self.emit(Opcode::Loop(offset), line);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patched_jump_lands_after_skipped_code() {
        let mut compiler = Compiler::new();
        compiler.emit(Opcode::True, 1);
        let jump = compiler.emit_jump(Opcode::JumpIfFalse, 1);
        compiler.emit(Opcode::Null, 1);
        compiler.emit(Opcode::Print, 1);
        compiler.patch_jump(jump).unwrap();

        assert_eq!(compiler.chunk.instructions[jump], Opcode::JumpIfFalse(2));
        assert_eq!(jump + 1 + 2, compiler.chunk.len());
    }

    #[test]
    fn loop_returns_to_start() {
        let mut compiler = Compiler::new();
        compiler.emit(Opcode::Null, 1);
        let start = compiler.chunk.len();
        compiler.emit(Opcode::True, 1);
        compiler.emit(Opcode::Pop, 1);
        compiler.emit_loop(start, 1).unwrap();

        let loop_at = compiler.chunk.len() - 1;
        let Opcode::Loop(offset) = compiler.chunk.instructions[loop_at] else {
            panic!("expected a loop instruction");
        };
        assert_eq!(loop_at + 1 - usize::from(offset), start);
    }

    #[test]
    fn oversized_jump_is_rejected() {
        let mut compiler = Compiler::new();
        let jump = compiler.emit_jump(Opcode::Jump, 1);
        for _ in 0..=u16::MAX as usize {
            compiler.emit(Opcode::Null, 1);
        }
        let err = compiler.patch_jump(jump).unwrap_err();
        assert!(matches!(err, CompileError::JumpTooLarge { distance } if distance == 65536));
    }

    #[test]
    fn nested_functions_share_interned_strings() {
        let program = crate::parser::parse("text \"hi\"; function f { text \"hi\"; }").unwrap();
        let chunk = Compiler::new().compile(&program).unwrap();

        let Some(Value::String(outer)) = chunk.constants.first() else {
            panic!("expected a string constant");
        };
        let inner = chunk.functions().next().unwrap();
        let Some(Value::String(nested)) = inner.chunk.constants.first() else {
            panic!("expected a string constant");
        };
        assert!(std::rc::Rc::ptr_eq(outer, nested));
    }
}
