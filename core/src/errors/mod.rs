mod compile_error;
mod runtime_error;
mod syntax_error;

pub use compile_error::CompileError;
pub use runtime_error::{RuntimeError, RuntimeErrorKind};
pub use syntax_error::SyntaxError;

use miette::Diagnostic;
use thiserror::Error;

use crate::vm::bytecode::format::ChunkFormatError;
use crate::vm::Status;

/// Unified error type wrapping all Ibery++ errors.
#[derive(Debug, Error, Diagnostic)]
pub enum IberyError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Syntax(#[from] SyntaxError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Runtime(#[from] RuntimeError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    ChunkFormat(#[from] ChunkFormatError),

    #[error("i/o error: {0}")]
    #[diagnostic(code(ibery::io))]
    Io(#[from] std::io::Error),
}

impl IberyError {
    /// The interpreter status this error maps to. Input problems that are
    /// neither compile nor runtime faults report as compile errors.
    pub fn status(&self) -> Status {
        match self {
            IberyError::Runtime(_) => Status::RuntimeError,
            _ => Status::CompileError,
        }
    }
}
