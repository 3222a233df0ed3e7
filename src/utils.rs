//! Small text helpers shared by the lexer, the model and the CLI.

/// Maximum number of characters of raw input quoted in error messages
pub const SNIPPET_MAX_CHARS: usize = 32;

/// Returns the first line of `s`, shortened to `max_chars` characters.
///
/// Counts characters, not bytes, so multi-byte input is never split. When
/// truncation happens an ellipsis ("...") is appended and counted toward the
/// limit.
pub fn snippet(s: &str, max_chars: usize) -> String {
    let line = s.lines().next().unwrap_or("");
    if line.chars().count() <= max_chars {
        return line.to_string();
    }

    let keep_chars = max_chars.saturating_sub(3);
    let truncated: String = line.chars().take(keep_chars).collect();
    format!("{truncated}...")
}

/// Characters allowed in a bare word: module paths, versions, directive keywords
pub fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '.' | '-' | '/' | '_' | '+')
}

/// Whether `s` would come back from the lexer as a single bare word
pub fn is_bare_word(s: &str) -> bool {
    !s.is_empty() && !s.starts_with("//") && s.chars().all(is_word_char)
}

/// Whether `s` is a complete double-quoted string as produced by the lexer
pub fn is_quoted(s: &str) -> bool {
    s.len() >= 3 && s.starts_with('"') && s.ends_with('"') && !s[1..s.len() - 1].contains('"')
}

/// Wraps `s` in double quotes when it would not survive re-tokenizing as one word.
///
/// Anything containing a space is quoted, as is any other text the lexer
/// would split or reject.
pub fn quote_if_needed(s: &str) -> String {
    if is_bare_word(s) {
        s.to_string()
    } else {
        format!("\"{s}\"")
    }
}
