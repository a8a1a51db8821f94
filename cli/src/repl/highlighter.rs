use std::borrow::Cow;

use ibery::lexer::Scanner;
use ibery::lexer::token::TokenKind;
use owo_colors::OwoColorize;

/// Color a line by its tokens. Text between tokens (whitespace, comments) is
/// kept as is.
pub fn highlight_line(line: &str) -> Cow<'_, str> {
    let mut out = String::with_capacity(line.len() * 2);
    let mut last = 0;

    for token in Scanner::new(line) {
        if token.kind == TokenKind::Eof {
            break;
        }
        out.push_str(line.get(last..token.span.start).unwrap_or(""));
        let text = token.lexeme(line);
        let colored = match &token.kind {
            kind if kind.is_keyword() => text.blue().bold().to_string(),
            TokenKind::String(_) => text.green().to_string(),
            TokenKind::Number(_) => text.yellow().to_string(),
            TokenKind::Error(_) => text.red().underline().to_string(),
            _ => text.to_string(),
        };
        out.push_str(&colored);
        last = token.span.end;
    }
    out.push_str(line.get(last..).unwrap_or(""));
    Cow::Owned(out)
}

pub fn highlight_hint(hint: &str) -> Cow<'_, str> {
    Cow::Owned(hint.bright_black().to_string())
}
