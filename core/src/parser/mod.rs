pub mod ast;
mod expr_parser;
mod game_parser;
mod stmt_parser;

use crate::errors::SyntaxError;
use crate::lexer::Scanner;
use crate::lexer::token::{Token, TokenKind};
use ast::Program;

/// Parse source text into a Program AST.
pub fn parse(source: &str) -> Result<Program, SyntaxError> {
    let mut parser = Parser::new(source);
    let program = parser.parse_program();
    match parser.error {
        Some(err) => Err(err),
        None => Ok(program),
    }
}

/// Recursive-descent parser pulling tokens from a [`Scanner`] with one token
/// of lookahead.
///
/// The first error is sticky: it stops the parse, and the nodes built so far
/// for the failing statement are dropped.
pub struct Parser<'src> {
    scanner: Scanner<'src>,
    current: Token,
    error: Option<SyntaxError>,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str) -> Self {
        let mut scanner = Scanner::new(source);
        let current = scanner.next_token();
        Self {
            scanner,
            current,
            error: None,
        }
    }

    /// Parse statements until end of input or the first error. On error the
    /// returned program holds only the statements completed before it.
    pub fn parse_program(&mut self) -> Program {
        let mut body = Vec::new();
        while self.error.is_none() && !self.is_at_end() {
            match self.parse_statement() {
                Ok(stmt) => body.push(stmt),
                Err(err) => {
                    tracing::debug!(line = err.line, column = err.column, "parse failed: {}", err.message);
                    self.error = Some(err);
                }
            }
        }
        let program = Program { body };
        tracing::trace!(nodes = program.node_count(), "parsed program");
        program
    }

    pub fn had_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn error(&self) -> Option<&SyntaxError> {
        self.error.as_ref()
    }

    pub(crate) fn peek(&self) -> &TokenKind {
        &self.current.kind
    }

    pub(crate) fn advance(&mut self) -> Token {
        let next = self.scanner.next_token();
        std::mem::replace(&mut self.current, next)
    }

    /// Consume the current token if it matches `expected`. Otherwise leave it
    /// in place and report it.
    pub(crate) fn expect(&mut self, expected: &TokenKind) -> Result<Token, SyntaxError> {
        if self.check(expected) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(&format!("'{expected}'")))
        }
    }

    pub(crate) fn is_at_end(&self) -> bool {
        matches!(self.peek(), TokenKind::Eof)
    }

    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        self.peek() == kind
    }

    pub(crate) fn expect_ident(&mut self) -> Result<String, SyntaxError> {
        match self.peek() {
            TokenKind::Ident(name) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            _ => Err(self.unexpected("identifier")),
        }
    }

    pub(crate) fn expect_string(&mut self, what: &str) -> Result<String, SyntaxError> {
        match self.peek() {
            TokenKind::String(value) => {
                let value = value.clone();
                self.advance();
                Ok(value)
            }
            _ => Err(self.unexpected(what)),
        }
    }

    pub(crate) fn expect_number(&mut self, what: &str) -> Result<f64, SyntaxError> {
        match self.peek() {
            TokenKind::Number(value) => {
                let value = *value;
                self.advance();
                Ok(value)
            }
            _ => Err(self.unexpected(what)),
        }
    }

    /// Error at the current token. A lexer error token reports its own
    /// message.
    pub(crate) fn unexpected(&self, expected: &str) -> SyntaxError {
        match self.peek() {
            TokenKind::Error(message) => SyntaxError::at(&self.current, message.clone()),
            found => SyntaxError::at(
                &self.current,
                format!("expected {expected}, found {}", describe(found)),
            ),
        }
    }

    pub(crate) fn line(&self) -> usize {
        self.current.line
    }
}

fn describe(kind: &TokenKind) -> String {
    match kind {
        TokenKind::Eof => kind.to_string(),
        TokenKind::Ident(name) => format!("identifier '{name}'"),
        _ => format!("'{kind}'"),
    }
}
