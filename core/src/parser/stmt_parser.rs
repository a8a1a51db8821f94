use super::Parser;
use super::ast::{Expr, Program, Stmt, StmtKind};
use crate::errors::SyntaxError;
use crate::lexer::token::TokenKind;

impl Parser<'_> {
    pub(crate) fn parse_statement(&mut self) -> Result<Stmt, SyntaxError> {
        match self.peek() {
            TokenKind::Function => self.parse_function_definition(),
            TokenKind::Text => self.parse_text(),
            TokenKind::Game => self.parse_game_engine(),
            TokenKind::Ident(_) => self.parse_expression_statement(),
            _ => Err(self.unexpected("a statement")),
        }
    }

    fn parse_function_definition(&mut self) -> Result<Stmt, SyntaxError> {
        let line = self.line();
        self.advance(); // consume 'function'
        let name = self.expect_ident()?;
        let body = self.parse_block()?;
        Ok(Stmt::new(StmtKind::FunctionDefinition { name, body }, line))
    }

    fn parse_text(&mut self) -> Result<Stmt, SyntaxError> {
        let line = self.line();
        self.advance(); // consume 'text'
        let message = match self.peek() {
            TokenKind::String(value) => Expr::StringLiteral(value.clone()),
            TokenKind::Ident(name) => Expr::Identifier(name.clone()),
            _ => return Err(self.unexpected("a string or identifier after 'text'")),
        };
        self.advance();
        self.expect(&TokenKind::Semicolon)?;
        Ok(Stmt::new(StmtKind::Text(message), line))
    }

    fn parse_expression_statement(&mut self) -> Result<Stmt, SyntaxError> {
        let line = self.line();
        let expr = self.parse_expression()?;
        self.expect(&TokenKind::Semicolon)?;
        Ok(Stmt::new(StmtKind::Expression(expr), line))
    }

    /// `{ statement* }`, used for function bodies.
    pub(crate) fn parse_block(&mut self) -> Result<Program, SyntaxError> {
        self.expect(&TokenKind::LeftBrace)?;
        let mut body = Vec::new();
        while !self.check(&TokenKind::RightBrace) && !self.is_at_end() {
            body.push(self.parse_statement()?);
        }
        self.expect(&TokenKind::RightBrace)?;
        Ok(Program { body })
    }
}
