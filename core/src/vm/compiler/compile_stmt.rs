use std::rc::Rc;

use super::Compiler;
use crate::errors::CompileError;
use crate::parser::ast::{Expr, GameEngineBlock, Stmt, StmtKind};
use crate::vm::bytecode::{Animation, Opcode, Value};

impl Compiler {
    pub(crate) fn compile_stmt(&mut self, stmt: &Stmt) -> Result<(), CompileError> {
        let line = stmt.line;
        match &stmt.kind {
            StmtKind::FunctionDefinition { name, body } => {
                let function = self.compile_function(name, body)?;
                self.emit_constant(Value::Function(Rc::new(function)), line)?;
                let name_idx = self.string_constant(name)?;
                self.emit(Opcode::DefineGlobal(name_idx), line);
            }
            StmtKind::Text(message) => {
                self.compile_expr(message, line)?;
                self.emit(Opcode::Print, line);
            }
            StmtKind::Expression(Expr::Identifier(name)) => {
                // invoke the global and discard its result
                let name_idx = self.string_constant(name)?;
                self.emit(Opcode::GetGlobal(name_idx), line);
                self.emit(Opcode::Call(0), line);
                self.emit(Opcode::Pop, line);
            }
            StmtKind::Expression(Expr::NumberConversion { target, expr }) => {
                self.compile_conversion(target, expr, line)?;
            }
            StmtKind::Expression(expr) => {
                self.compile_expr(expr, line)?;
                self.emit(Opcode::Pop, line);
            }
            StmtKind::GameEngine(block) => self.compile_game(block, line)?,
        }
        Ok(())
    }

    fn compile_game(&mut self, block: &GameEngineBlock, line: usize) -> Result<(), CompileError> {
        self.compile_expr(&block.expr, line)?;
        self.emit(Opcode::Scene, line);
        for entry in &block.animations {
            let animation = Animation {
                emoji: entry.emoji.clone(),
                action: entry.action.clone(),
                distance: entry.distance,
                repeat: entry.repeat,
                speed: entry.speed,
            };
            self.emit_constant(Value::Animation(Rc::new(animation)), entry.line)?;
            self.emit(Opcode::Animate, entry.line);
        }
        Ok(())
    }
}
