use miette::Diagnostic;
use thiserror::Error;

use crate::diagnostics::stack_trace::StackTrace;

/// A fault raised while executing a chunk, located at the source line of the
/// faulting instruction.
#[derive(Debug, Clone, Error, Diagnostic)]
#[error("[line {line}] {kind}")]
#[diagnostic(code(ibery::runtime))]
pub struct RuntimeError {
    pub kind: RuntimeErrorKind,
    pub line: usize,
    pub trace: StackTrace,
}

impl RuntimeError {
    pub fn new(kind: RuntimeErrorKind, line: usize) -> Self {
        Self {
            kind,
            line,
            trace: StackTrace::default(),
        }
    }

    pub fn with_trace(mut self, trace: StackTrace) -> Self {
        self.trace = trace;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeErrorKind {
    #[error("stack underflow")]
    StackUnderflow,

    #[error("stack overflow (limit {limit} values)")]
    StackOverflow { limit: usize },

    #[error("call stack overflow (limit {limit} frames)")]
    FrameOverflow { limit: usize },

    #[error("undefined variable '{name}'")]
    UndefinedVariable { name: String },

    #[error("operand type mismatch: '{op}' expects {expected}, got {found}")]
    OperandTypeMismatch {
        op: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    #[error("a {type_name} value is not callable")]
    NotCallable { type_name: &'static str },

    #[error("expected {expected} arguments but got {got}")]
    ArityMismatch { expected: u8, got: u8 },

    #[error("constant index {index} is out of range")]
    BadConstant { index: u16 },

    #[error("constant {index} is not a variable name")]
    BadGlobalName { index: u16 },

    #[error("local slot {slot} is out of range")]
    BadLocal { slot: u8 },

    #[error("jump lands outside the chunk")]
    BadJump,

    #[error("{intrinsic} failed: {message}")]
    Intrinsic {
        intrinsic: &'static str,
        message: String,
    },
}
