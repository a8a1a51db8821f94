/// Expression AST nodes. The language has primaries only.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    StringLiteral(String),
    NumberLiteral(f64),
    Boolean(bool),
    Identifier(String),
    /// `input { "prompt" }`
    Input { prompt: String },
    /// `target { num } expr`: convert `expr` to a number and bind it to the
    /// global `target`.
    NumberConversion { target: String, expr: Box<Expr> },
}

impl Expr {
    pub fn node_count(&self) -> usize {
        match self {
            Expr::NumberConversion { expr, .. } => 1 + expr.node_count(),
            _ => 1,
        }
    }
}
