use miette::Diagnostic;
use thiserror::Error;

use super::SyntaxError;

#[derive(Debug, Clone, Error, Diagnostic)]
pub enum CompileError {
    /// The source did not parse, so no chunk was produced.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Parse(#[from] SyntaxError),

    #[error("too many constants in '{chunk}' (limit {limit})")]
    #[diagnostic(code(ibery::compile::constants))]
    TooManyConstants { chunk: String, limit: usize },

    #[error("jump of {distance} instructions does not fit in 16 bits")]
    #[diagnostic(code(ibery::compile::jump))]
    JumpTooLarge { distance: usize },
}
