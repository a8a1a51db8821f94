use super::Program;
use super::expression::Expr;
use super::game::GameEngineBlock;

/// A statement together with the line it starts on.
#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub line: usize,
}

/// Statement AST nodes.
#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    /// `function name { ... }`
    FunctionDefinition { name: String, body: Program },
    /// `text "message";` or `text name;`
    Text(Expr),
    /// A primary expression used as a statement. A bare identifier here is
    /// an invocation of the global it names.
    Expression(Expr),
    /// `game { expr animation* }`
    GameEngine(GameEngineBlock),
}

impl Stmt {
    pub fn new(kind: StmtKind, line: usize) -> Self {
        Self { kind, line }
    }

    pub fn node_count(&self) -> usize {
        1 + match &self.kind {
            StmtKind::FunctionDefinition { body, .. } => body.node_count(),
            StmtKind::Text(expr) | StmtKind::Expression(expr) => expr.node_count(),
            StmtKind::GameEngine(block) => block.node_count(),
        }
    }
}
