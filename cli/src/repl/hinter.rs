/// Inline hint shown after the cursor: the shape of a statement when the
/// line so far is its keyword, otherwise the rest of a session name the
/// last word uniquely starts.
pub fn hint_for(line: &str, pos: usize, names: &[String]) -> Option<String> {
    if pos < line.len() {
        return None;
    }

    let trimmed = line.trim_start();
    let hint = match trimmed {
        "text" => " \"message\";",
        "input" => " { \"prompt\" }",
        "game" => " { \"title\" \"🙂\" \"fly\" 5 }",
        "function" => " name { }",
        _ if is_conversion_start(trimmed) => " num } input { \"prompt\" };",
        _ => return name_rest(line, names),
    };
    Some(hint.to_string())
}

fn name_rest(line: &str, names: &[String]) -> Option<String> {
    let start = line
        .rfind(|c: char| !is_name_char(c))
        .map_or(0, |idx| idx + 1);
    let word = &line[start..];
    if word.is_empty() {
        return None;
    }

    let mut candidates = names
        .iter()
        .filter(|name| name.len() > word.len() && name.starts_with(word));
    match (candidates.next(), candidates.next()) {
        (Some(name), None) => Some(name[word.len()..].to_string()),
        _ => None,
    }
}

/// `name {` with nothing after the brace yet.
fn is_conversion_start(text: &str) -> bool {
    let Some(name) = text.strip_suffix('{') else {
        return false;
    };
    let name = name.trim_end();
    !name.is_empty()
        && name.starts_with(|c: char| c.is_ascii_alphabetic())
        && name.chars().all(is_name_char)
        && !matches!(name, "function" | "game" | "input" | "text")
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_hint_their_statement_shape() {
        assert_eq!(hint_for("text", 4, &[]).as_deref(), Some(" \"message\";"));
        assert_eq!(hint_for("age {", 5, &[]).as_deref(), Some(" num } input { \"prompt\" };"));
        assert_eq!(hint_for("text", 2, &[]), None);
    }

    #[test]
    fn session_names_are_hinted_when_unambiguous() {
        let names = vec!["greet".to_string(), "game_over".to_string(), "gamer".to_string()];
        assert_eq!(hint_for("gr", 2, &names).as_deref(), Some("eet"));
        assert_eq!(hint_for("text \"x\";\ngre", 13, &names).as_deref(), Some("et"));
        assert_eq!(hint_for("game_", 5, &names).as_deref(), Some("over"));
        assert_eq!(hint_for("gam", 3, &names), None);
        assert_eq!(hint_for("greet", 5, &names), None);
        assert_eq!(hint_for("", 0, &names), None);
    }
}
