//! Line-oriented source checks that run before compilation.
//!
//! A [`Preprocessor`] never rewrites text on its own. It reports [`Fix`]es,
//! and callers decide whether to print them or hand them to [`apply_fixes`].

use std::collections::{HashMap, HashSet};
use std::fmt;

use super::source_map::SourceMap;
use crate::lexer::Scanner;
use crate::lexer::token::{Token, TokenKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixKind {
    MissingTerminator,
    MissingDelimiter,
    UndefinedReference,
    TypeMismatch,
    UnusedBinding,
    DuplicateDefinition,
    InvalidOperator,
    /// Not produced by [`LineFixer`]: the grammar has no `return` yet.
    MissingReturn,
    InvalidSyntax,
}

/// A suggested edit. `replacement`, when present, is the full new text of
/// `line`; a line past the end of the source means "append".
#[derive(Debug, Clone, PartialEq)]
pub struct Fix {
    pub kind: FixKind,
    pub line: usize,
    pub column: usize,
    pub message: String,
    pub replacement: Option<String>,
}

impl fmt::Display for Fix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Line {}, Column {}: {}", self.line, self.column, self.message)?;
        if let Some(replacement) = &self.replacement {
            write!(f, "\nFix: {replacement}")?;
        }
        Ok(())
    }
}

pub trait Preprocessor {
    /// Inspect `source` and suggest fixes. An empty list accepts the text as is.
    fn suggest(&self, source: &str) -> Vec<Fix>;
}

/// Checks statement terminators, brace balance, reserved statements and
/// how names are defined and used.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineFixer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Block {
    Function,
    Game,
    Other,
}

const BLOCK_KEYWORDS: [&str; 7] = ["function", "game", "class", "if", "else", "while", "return"];

/// Keywords the lexer knows that no statement may start with.
const RESERVED: [&str; 5] = ["class", "if", "else", "while", "return"];

impl Preprocessor for LineFixer {
    fn suggest(&self, source: &str) -> Vec<Fix> {
        let map = SourceMap::from_source(source);
        let tokens: Vec<Token> = Scanner::new(source).collect();
        let defined = defined_names(&tokens);
        let mut fixes = Vec::new();
        let mut blocks: Vec<(Block, usize)> = Vec::new();
        let mut in_string = false;

        for line_no in 1..=map.line_count() {
            let Some(text) = map.line_text(source, line_no) else {
                continue;
            };
            let started_in_string = in_string;
            let inside_game = blocks.last().is_some_and(|(block, _)| *block == Block::Game);
            let first_word = leading_word(text.trim_start());

            let mut code_end = 0;
            let mut prev = '\0';
            for (idx, ch) in text.char_indices() {
                if in_string {
                    in_string = ch != '"';
                    code_end = idx + ch.len_utf8();
                    continue;
                }
                match ch {
                    '"' => in_string = true,
                    '/' if prev == '/' => {
                        code_end = text[..idx - 1].trim_end().len();
                        break;
                    }
                    '{' => blocks.push((block_for(first_word), line_no)),
                    '}' => {
                        if blocks.pop().is_none() {
                            fixes.push(Fix {
                                kind: FixKind::InvalidSyntax,
                                line: line_no,
                                column: text[..idx].chars().count() + 1,
                                message: "'}' has no matching '{'".to_string(),
                                replacement: None,
                            });
                        }
                    }
                    _ => {}
                }
                if !ch.is_whitespace() {
                    code_end = idx + ch.len_utf8();
                }
                prev = ch;
            }

            if started_in_string || in_string || inside_game {
                continue;
            }
            let code = text[..code_end].trim();
            if RESERVED.contains(&first_word) {
                fixes.push(Fix {
                    kind: FixKind::InvalidSyntax,
                    line: line_no,
                    column: text.len() - text.trim_start().len() + 1,
                    message: format!("'{first_word}' is reserved and cannot start a statement"),
                    replacement: None,
                });
            }
            if first_word.is_empty() || BLOCK_KEYWORDS.contains(&first_word) {
                continue;
            }

            if first_word != "text" && code.trim_end_matches(';') == first_word
                && !defined.contains(first_word)
            {
                fixes.push(Fix {
                    kind: FixKind::UndefinedReference,
                    line: line_no,
                    column: text.len() - text.trim_start().len() + 1,
                    message: format!("'{first_word}' is called but never defined"),
                    replacement: None,
                });
            }

            if !code.ends_with([';', '{', '}']) {
                fixes.push(Fix {
                    kind: FixKind::MissingTerminator,
                    line: line_no,
                    column: text[..code_end].chars().count() + 1,
                    message: "missing ';' at end of statement".to_string(),
                    replacement: Some(format!("{};{}", &text[..code_end], &text[code_end..])),
                });
            }
        }

        fixes.extend(token_fixes(&tokens));

        for (_, opened_on) in blocks.iter().rev() {
            fixes.push(Fix {
                kind: FixKind::MissingDelimiter,
                line: map.line_count() + 1,
                column: 1,
                message: format!("missing '}}' to close the block opened on line {opened_on}"),
                replacement: Some("}".to_string()),
            });
        }

        fixes
    }
}

/// Apply every fix that carries a replacement. Only the first fix per line
/// is applied.
pub fn apply_fixes(source: &str, fixes: &[Fix]) -> String {
    let map = SourceMap::from_source(source);
    let mut edits: Vec<(usize, &str)> = fixes
        .iter()
        .filter_map(|fix| Some((fix.line, fix.replacement.as_deref()?)))
        .collect();
    edits.sort_by_key(|(line, _)| *line);

    let mut out = String::with_capacity(source.len() + edits.len());
    let mut appended = Vec::new();
    let mut cursor = 0;
    for (line, replacement) in edits {
        match map.line_span(source, line) {
            Some(span) if span.start >= cursor => {
                out.push_str(&source[cursor..span.start]);
                out.push_str(replacement);
                cursor = span.end;
            }
            Some(_) => {}
            None => appended.push(replacement),
        }
    }
    out.push_str(&source[cursor..]);

    for replacement in appended {
        if !out.is_empty() && !out.ends_with('\n') {
            out.push('\n');
        }
        out.push_str(replacement);
        out.push('\n');
    }
    out
}

/// Names bound by `function name` or `name {num}` anywhere in the source.
fn defined_names(tokens: &[Token]) -> HashSet<String> {
    let mut names = HashSet::new();
    for window in tokens.windows(3) {
        match [&window[0].kind, &window[1].kind, &window[2].kind] {
            [TokenKind::Function, TokenKind::Ident(name), _]
            | [TokenKind::Ident(name), TokenKind::LeftBrace, TokenKind::Num] => {
                names.insert(name.clone());
            }
            _ => {}
        }
    }
    names
}

/// Checks that need the token stream: redefined functions, conversions that
/// are never read or cannot yield a number, and operators the grammar lacks.
fn token_fixes(tokens: &[Token]) -> Vec<Fix> {
    let mut fixes = Vec::new();
    let mut functions: HashMap<&str, usize> = HashMap::new();
    let mut uses: HashMap<&str, usize> = HashMap::new();
    let mut bindings: Vec<(&str, &Token)> = Vec::new();

    for (idx, token) in tokens.iter().enumerate() {
        let next = |offset: usize| tokens.get(idx + offset).map(|token| &token.kind);
        match &token.kind {
            TokenKind::Function => {
                let Some(TokenKind::Ident(name)) = next(1) else {
                    continue;
                };
                let name_token = &tokens[idx + 1];
                if let Some(first) = functions.get(name.as_str()) {
                    fixes.push(advisory(
                        FixKind::DuplicateDefinition,
                        name_token,
                        format!("function '{name}' is already defined on line {first}"),
                    ));
                } else {
                    functions.insert(name.as_str(), name_token.line);
                }
            }
            TokenKind::Ident(name) => {
                *uses.entry(name.as_str()).or_default() += 1;
                if next(1) == Some(&TokenKind::LeftBrace) && next(2) == Some(&TokenKind::Num) {
                    bindings.push((name.as_str(), token));
                    if let (Some(TokenKind::RightBrace), Some(TokenKind::String(text))) =
                        (next(3), next(4))
                    {
                        if !has_leading_number(text) {
                            fixes.push(advisory(
                                FixKind::TypeMismatch,
                                &tokens[idx + 4],
                                format!("\"{text}\" has no leading number and converts to 0"),
                            ));
                        }
                    }
                }
            }
            TokenKind::Plus
            | TokenKind::Minus
            | TokenKind::Star
            | TokenKind::Slash
            | TokenKind::Assign
            | TokenKind::Less
            | TokenKind::Greater => fixes.push(advisory(
                FixKind::InvalidOperator,
                token,
                format!("operator '{}' is not supported", token.kind),
            )),
            _ => {}
        }
    }

    let bound: HashMap<&str, usize> = bindings.iter().fold(HashMap::new(), |mut acc, (name, _)| {
        *acc.entry(*name).or_default() += 1;
        acc
    });
    let mut reported = HashSet::new();
    for (name, token) in bindings {
        let never_read = uses.get(name) == bound.get(name);
        if never_read && reported.insert(name) {
            fixes.push(advisory(
                FixKind::UnusedBinding,
                token,
                format!("'{name}' is converted but never used"),
            ));
        }
    }
    fixes
}

fn advisory(kind: FixKind, token: &Token, message: String) -> Fix {
    Fix {
        kind,
        line: token.line,
        column: token.column,
        message,
        replacement: None,
    }
}

/// Whether a string converts to something other than the fallback `0`.
fn has_leading_number(text: &str) -> bool {
    let text = text.trim_start();
    let text = text.strip_prefix(['+', '-']).unwrap_or(text);
    let text = text.strip_prefix('.').unwrap_or(text);
    text.starts_with(|c: char| c.is_ascii_digit())
}

fn leading_word(text: &str) -> &str {
    let end = text
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(text.len());
    match text.as_bytes().first() {
        Some(c) if c.is_ascii_alphabetic() => &text[..end],
        _ => "",
    }
}

fn block_for(first_word: &str) -> Block {
    match first_word {
        "function" => Block::Function,
        "game" => Block::Game,
        _ => Block::Other,
    }
}
