use rustyline::completion::Pair;

const KEYWORDS: [&str; 7] = ["function", "text", "input", "num", "game", "true", "false"];

const COMMANDS: [&str; 5] = [".help", ".clear", ".load", ".sh", ".exit"];

/// Complete REPL commands, keywords and names defined in the session.
pub fn complete_line(line: &str, pos: usize, names: &[String]) -> (usize, Vec<Pair>) {
    let safe_pos = pos.min(line.len());
    let prefix = line.get(..safe_pos).unwrap_or(line);

    if prefix.trim_start().starts_with('.') && !prefix.contains(' ') {
        let start = prefix.len() - prefix.trim_start().len();
        let needle = prefix.trim_start();
        let matches = COMMANDS
            .iter()
            .copied()
            .filter(|cmd| cmd.starts_with(needle))
            .collect::<Vec<_>>();
        return (start, pairs(&matches));
    }

    let start = word_start(prefix);
    let needle = &prefix[start..];
    let words = KEYWORDS
        .iter()
        .copied()
        .chain(names.iter().map(String::as_str))
        .filter(|word| word.starts_with(needle))
        .collect::<Vec<_>>();

    (start, pairs(&words))
}

fn pairs(values: &[&str]) -> Vec<Pair> {
    values
        .iter()
        .map(|v| Pair {
            display: (*v).to_string(),
            replacement: (*v).to_string(),
        })
        .collect()
}

fn word_start(prefix: &str) -> usize {
    prefix
        .char_indices()
        .rev()
        .find(|(_, ch)| !is_ident_char(*ch))
        .map_or(0, |(idx, ch)| idx + ch.len_utf8())
}

fn is_ident_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}
