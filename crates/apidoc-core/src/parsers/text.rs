//! Text helpers shared by the tag parsers.

use regex::Regex;
use std::sync::LazyLock;

static RE_WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Strip the common leading whitespace from every non-blank line, and
/// leading/trailing blank lines.
pub fn unindent(text: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let indent = lines
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.chars().take_while(|c| *c == ' ' || *c == '\t').count())
        .min()
        .unwrap_or(0);

    let stripped: Vec<String> = lines
        .iter()
        .map(|line| line.chars().skip(indent).collect::<String>())
        .collect();
    stripped.join("\n").trim_matches('\n').trim_end().to_string()
}

/// Collapse runs of whitespace into `_`, as used for names and groups.
pub fn underscore_whitespace(text: &str) -> String {
    RE_WHITESPACE.replace_all(text.trim(), "_").into_owned()
}

/// First line of `content`, trimmed.
pub fn first_line(content: &str) -> &str {
    content.lines().next().unwrap_or("").trim()
}

/// Lines after the first, unindented.
pub fn following_lines(content: &str) -> String {
    match content.split_once('\n') {
        Some((_, rest)) => unindent(rest),
        None => String::new(),
    }
}
