use super::Parser;
use super::ast::{AnimationSpec, GameEngineBlock, Stmt, StmtKind};
use crate::errors::SyntaxError;
use crate::lexer::token::TokenKind;

impl Parser<'_> {
    pub(crate) fn parse_game_engine(&mut self) -> Result<Stmt, SyntaxError> {
        let line = self.line();
        self.advance(); // consume 'game'
        self.expect(&TokenKind::LeftBrace)?;
        let expr = self.parse_expression()?;

        let mut animations = Vec::new();
        while !self.check(&TokenKind::RightBrace) && !self.is_at_end() {
            animations.push(self.parse_animation()?);
        }
        self.expect(&TokenKind::RightBrace)?;

        Ok(Stmt::new(
            StmtKind::GameEngine(GameEngineBlock { expr, animations }),
            line,
        ))
    }

    fn parse_animation(&mut self) -> Result<AnimationSpec, SyntaxError> {
        let line = self.line();
        let emoji = self.expect_string("an emoji string")?;
        let action = self.expect_string("an action string")?;
        let distance = count(self.expect_number("a distance")?);
        let repeat = self.optional_count(1);
        let speed = self.optional_count(1);
        Ok(AnimationSpec {
            emoji,
            action,
            distance,
            repeat,
            speed,
            line,
        })
    }

    fn optional_count(&mut self, default: u32) -> u32 {
        match self.peek() {
            TokenKind::Number(value) => {
                let value = count(*value);
                self.advance();
                value
            }
            _ => default,
        }
    }
}

/// Animation counts are whole and non-negative; fractions truncate.
fn count(value: f64) -> u32 {
    value as u32
}
