use miette::Diagnostic;
use thiserror::Error;

use crate::lexer::token::Token;

#[derive(Debug, Clone, Error, Diagnostic)]
#[error("SyntaxError: {message}")]
#[diagnostic(code(ibery::syntax), help("check the syntax around this location"))]
pub struct SyntaxError {
    pub message: String,

    #[label("here")]
    pub span: miette::SourceSpan,

    pub line: usize,
    pub column: usize,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, offset: usize, length: usize) -> Self {
        Self {
            message: message.into(),
            span: (offset, length).into(),
            line: 0,
            column: 0,
        }
    }

    /// An error located at `token`.
    pub fn at(token: &Token, message: impl Into<String>) -> Self {
        Self {
            line: token.line,
            column: token.column,
            ..Self::new(message, token.span.start, token.span.len().max(1))
        }
    }
}
