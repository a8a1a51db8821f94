pub mod bytecode;
pub mod compiler;
pub mod machine;

use crate::errors::{CompileError, IberyError};
use crate::parser;

use bytecode::Chunk;
use compiler::Compiler;
use machine::Vm;

/// Outcome of interpreting a program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    CompileError,
    RuntimeError,
}

impl Status {
    /// Process exit code: 0, 65 for compile errors, 70 for runtime errors.
    pub fn exit_code(self) -> i32 {
        match self {
            Status::Ok => 0,
            Status::CompileError => 65,
            Status::RuntimeError => 70,
        }
    }

    pub fn of<T>(result: &Result<T, IberyError>) -> Status {
        match result {
            Ok(_) => Status::Ok,
            Err(err) => err.status(),
        }
    }
}

/// Parse and compile source into a top-level chunk.
pub fn compile_source(source: &str) -> Result<Chunk, CompileError> {
    let program = parser::parse(source)?;
    Compiler::new().compile(&program)
}

/// Compile and run `source` on a fresh VM with console intrinsics.
pub fn interpret(source: &str) -> Status {
    let mut vm = Vm::new();
    Status::of(&vm.interpret(source))
}
