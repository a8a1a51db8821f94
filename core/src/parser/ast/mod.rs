mod expression;
mod game;
mod statement;

pub use expression::Expr;
pub use game::{AnimationSpec, GameEngineBlock};
pub use statement::{Stmt, StmtKind};

/// A complete Ibery++ program, or the body of a function: a list of
/// statements in source order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub body: Vec<Stmt>,
}

impl Program {
    /// Total number of AST nodes, this one included.
    pub fn node_count(&self) -> usize {
        1 + self.body.iter().map(Stmt::node_count).sum::<usize>()
    }
}
