pub mod cursor;
pub mod scanner;
pub mod token;

pub use scanner::Scanner;
use token::Token;

/// Tokenize source code into a list of tokens, ending with `Eof`.
///
/// Lexical errors are kept in the stream as `TokenKind::Error` tokens.
pub fn lex(source: &str) -> Vec<Token> {
    Scanner::new(source).collect()
}
