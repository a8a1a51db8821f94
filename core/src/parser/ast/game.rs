use super::expression::Expr;

/// `game { expr animation* }`
#[derive(Debug, Clone, PartialEq)]
pub struct GameEngineBlock {
    pub expr: Expr,
    pub animations: Vec<AnimationSpec>,
}

/// `"emoji" "action" distance [repeat [speed]]`
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationSpec {
    pub emoji: String,
    pub action: String,
    pub distance: u32,
    pub repeat: u32,
    pub speed: u32,
    pub line: usize,
}

impl GameEngineBlock {
    pub fn node_count(&self) -> usize {
        1 + self.expr.node_count() + self.animations.len()
    }
}
