use std::fmt;

/// A single token with its kind, byte span and 1-based source position.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    pub line: usize,
    pub column: usize,
}

impl Token {
    /// The source text covered by this token.
    pub fn lexeme<'src>(&self, source: &'src str) -> &'src str {
        source.get(self.span.start..self.span.end).unwrap_or("")
    }
}

/// Byte offset span in the source string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    Number(f64),
    String(String),

    // Identifier
    Ident(String),

    // Keywords
    Function,
    Class,
    If,
    Else,
    While,
    Return,
    True,
    False,
    Input,
    Text,
    Num,
    Game,

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Assign,
    Less,
    Greater,

    // Punctuation
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    Semicolon,
    Comma,
    Dot,

    // Special
    Error(String),
    Eof,
}

impl TokenKind {
    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::Function
                | TokenKind::Class
                | TokenKind::If
                | TokenKind::Else
                | TokenKind::While
                | TokenKind::Return
                | TokenKind::True
                | TokenKind::False
                | TokenKind::Input
                | TokenKind::Text
                | TokenKind::Num
                | TokenKind::Game
        )
    }
}

/// Renders a token kind back to source form, so a token stream joined with
/// whitespace re-lexes to the same kinds.
impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TokenKind::Number(n) => return write!(f, "{n}"),
            TokenKind::String(s) => return write!(f, "\"{s}\""),
            TokenKind::Ident(name) => name.as_str(),
            TokenKind::Function => "function",
            TokenKind::Class => "class",
            TokenKind::If => "if",
            TokenKind::Else => "else",
            TokenKind::While => "while",
            TokenKind::Return => "return",
            TokenKind::True => "true",
            TokenKind::False => "false",
            TokenKind::Input => "input",
            TokenKind::Text => "text",
            TokenKind::Num => "num",
            TokenKind::Game => "game",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Assign => "=",
            TokenKind::Less => "<",
            TokenKind::Greater => ">",
            TokenKind::LeftParen => "(",
            TokenKind::RightParen => ")",
            TokenKind::LeftBrace => "{",
            TokenKind::RightBrace => "}",
            TokenKind::Semicolon => ";",
            TokenKind::Comma => ",",
            TokenKind::Dot => ".",
            TokenKind::Error(message) => return write!(f, "<error: {message}>"),
            TokenKind::Eof => "end of input",
        };
        f.write_str(text)
    }
}
