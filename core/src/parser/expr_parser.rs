use super::Parser;
use super::ast::Expr;
use crate::errors::SyntaxError;
use crate::lexer::token::TokenKind;

impl Parser<'_> {
    pub(crate) fn parse_expression(&mut self) -> Result<Expr, SyntaxError> {
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expr, SyntaxError> {
        let expr = match self.peek() {
            TokenKind::String(value) => Expr::StringLiteral(value.clone()),
            TokenKind::Number(value) => Expr::NumberLiteral(*value),
            TokenKind::True => Expr::Boolean(true),
            TokenKind::False => Expr::Boolean(false),
            TokenKind::Input => return self.parse_input(),
            TokenKind::Ident(name) => {
                let name = name.clone();
                self.advance();
                if self.check(&TokenKind::LeftBrace) {
                    return self.parse_number_conversion(name);
                }
                return Ok(Expr::Identifier(name));
            }
            _ => return Err(self.unexpected("an expression")),
        };
        self.advance();
        Ok(expr)
    }

    fn parse_input(&mut self) -> Result<Expr, SyntaxError> {
        self.advance(); // consume 'input'
        self.expect(&TokenKind::LeftBrace)?;
        let prompt = self.expect_string("a prompt string")?;
        self.expect(&TokenKind::RightBrace)?;
        Ok(Expr::Input { prompt })
    }

    /// `name { num } expr`
    fn parse_number_conversion(&mut self, target: String) -> Result<Expr, SyntaxError> {
        self.advance(); // consume '{'
        self.expect(&TokenKind::Num)?;
        self.expect(&TokenKind::RightBrace)?;
        let expr = self.parse_expression()?;
        Ok(Expr::NumberConversion {
            target,
            expr: Box::new(expr),
        })
    }
}
