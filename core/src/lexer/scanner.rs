use super::cursor::Cursor;
use super::token::{Span, Token, TokenKind};

/// Scans source code into a sequence of tokens, one at a time.
///
/// Lexical problems never abort the scan. They surface as
/// [`TokenKind::Error`] tokens and the scanner carries on after them. Once the
/// input is exhausted every further call yields `Eof`.
pub struct Scanner<'src> {
    cursor: Cursor<'src>,
    finished: bool,
}

impl<'src> Scanner<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            cursor: Cursor::new(source),
            finished: false,
        }
    }

    /// Produce the next token.
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace_and_comments();

        let start = self.cursor.pos();
        let line = self.cursor.line();
        let column = self.cursor.column();

        let kind = match self.cursor.peek() {
            None => TokenKind::Eof,
            Some(c) if c.is_ascii_alphabetic() => self.scan_identifier(start),
            Some(c) if c.is_ascii_digit() => self.scan_number(start),
            Some(b'"') => self.scan_string(start),
            Some(_) => self.scan_symbol(),
        };

        Token {
            kind,
            span: Span::new(start, self.cursor.pos()),
            line,
            column,
        }
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.cursor.peek() {
                Some(b' ' | b'\t' | b'\r' | b'\n') => {
                    self.cursor.advance();
                }
                Some(b'/') if self.cursor.peek_next() == Some(b'/') => {
                    self.cursor.advance_while(|c| c != b'\n');
                }
                _ => break,
            }
        }
    }

    fn scan_symbol(&mut self) -> TokenKind {
        let Some(ch) = self.cursor.advance_char() else {
            return TokenKind::Eof;
        };

        match ch {
            '(' => TokenKind::LeftParen,
            ')' => TokenKind::RightParen,
            '{' => TokenKind::LeftBrace,
            '}' => TokenKind::RightBrace,
            ';' => TokenKind::Semicolon,
            ',' => TokenKind::Comma,
            '.' => TokenKind::Dot,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '=' => TokenKind::Assign,
            '<' => TokenKind::Less,
            '>' => TokenKind::Greater,
            other => TokenKind::Error(format!("unexpected character '{other}'")),
        }
    }

    fn scan_identifier(&mut self, start: usize) -> TokenKind {
        self.cursor
            .advance_while(|c| c.is_ascii_alphanumeric() || c == b'_');
        keyword_or_ident(self.cursor.slice_from(start))
    }

    /// Consumes the whole run of digits and dots, then validates it as
    /// `digits ('.' digits)?`. Numerals too large for an `f64` are rejected.
    fn scan_number(&mut self, start: usize) -> TokenKind {
        self.cursor.advance_while(|c| c.is_ascii_digit() || c == b'.');
        let text = self.cursor.slice_from(start);

        let well_formed = match text.split_once('.') {
            None => true,
            Some((whole, frac)) => {
                !whole.is_empty() && !frac.is_empty() && !frac.contains('.')
            }
        };

        match text.parse::<f64>() {
            Ok(value) if well_formed && value.is_finite() => TokenKind::Number(value),
            _ => TokenKind::Error(format!("malformed number literal '{text}'")),
        }
    }

    /// Strings are raw: no escape sequences, and they may span lines.
    fn scan_string(&mut self, start: usize) -> TokenKind {
        // consume opening quote
        self.cursor.advance();
        let content_start = start + 1;

        self.cursor.advance_while(|c| c != b'"');
        if self.cursor.is_at_end() {
            return TokenKind::Error("unterminated string literal".to_string());
        }

        let value = self.cursor.slice_from(content_start).to_string();
        // consume closing quote
        self.cursor.advance();
        TokenKind::String(value)
    }
}

impl Iterator for Scanner<'_> {
    type Item = Token;

    /// Yields tokens up to and including the first `Eof`.
    fn next(&mut self) -> Option<Token> {
        if self.finished {
            return None;
        }
        let token = self.next_token();
        if token.kind == TokenKind::Eof {
            self.finished = true;
        }
        Some(token)
    }
}

fn keyword_or_ident(text: &str) -> TokenKind {
    match text {
        "function" => TokenKind::Function,
        "class" => TokenKind::Class,
        "if" => TokenKind::If,
        "else" => TokenKind::Else,
        "while" => TokenKind::While,
        "return" => TokenKind::Return,
        "true" => TokenKind::True,
        "false" => TokenKind::False,
        "input" => TokenKind::Input,
        "text" => TokenKind::Text,
        "num" => TokenKind::Num,
        "game" => TokenKind::Game,
        _ => TokenKind::Ident(text.to_string()),
    }
}
