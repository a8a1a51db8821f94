use super::Compiler;
use crate::errors::CompileError;
use crate::parser::ast::Expr;
use crate::vm::bytecode::{Opcode, Value};

impl Compiler {
    /// Compile `expr` so that it leaves exactly one value on the stack.
    pub(crate) fn compile_expr(&mut self, expr: &Expr, line: usize) -> Result<(), CompileError> {
        match expr {
            Expr::StringLiteral(text) => {
                let idx = self.string_constant(text)?;
                self.emit(Opcode::Constant(idx), line);
            }
            Expr::NumberLiteral(n) => self.emit_constant(Value::Number(*n), line)?,
            Expr::Boolean(true) => self.emit(Opcode::True, line),
            Expr::Boolean(false) => self.emit(Opcode::False, line),
            Expr::Identifier(name) => {
                let idx = self.string_constant(name)?;
                self.emit(Opcode::GetGlobal(idx), line);
            }
            Expr::Input { prompt } => {
                let idx = self.string_constant(prompt)?;
                self.emit(Opcode::Constant(idx), line);
                self.emit(Opcode::Input, line);
            }
            Expr::NumberConversion { target, expr } => {
                self.compile_conversion(target, expr, line)?;
                let idx = self.string_constant(target)?;
                self.emit(Opcode::GetGlobal(idx), line);
            }
        }
        Ok(())
    }

    /// `target {num} expr`: evaluate, convert, bind. Leaves the stack as it
    /// found it.
    pub(crate) fn compile_conversion(
        &mut self,
        target: &str,
        expr: &Expr,
        line: usize,
    ) -> Result<(), CompileError> {
        self.compile_expr(expr, line)?;
        self.emit(Opcode::ToNumber, line);
        let idx = self.string_constant(target)?;
        self.emit(Opcode::DefineGlobal(idx), line);
        Ok(())
    }
}
