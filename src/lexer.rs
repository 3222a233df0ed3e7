//! Tokenizer for go.mod manifests
//!
//! Splits the text into a flat sequence of atoms that covers every character
//! of the input exactly once. The lexer only classifies shape; deciding what a
//! word means is the parser's job.
//!
//! Atom boundaries, tried in order at each position:
//! - `//` comment marker (only at the start of an atom)
//! - a double-quoted string, no escape processing, at least one character
//! - a run of word characters (letters, digits, `.`, `-`, `/`, plus `_` and
//!   `+` for underscored paths and `+incompatible` versions)
//! - `(` or `)`
//! - the `=>` arrow
//! - a run of whitespace, newlines included

use crate::error::{ManifestError, Position};
use crate::utils::{SNIPPET_MAX_CHARS, is_word_char, snippet};

/// Shape of a lexical atom
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AtomKind {
    /// Module path, version, keyword or any other unquoted word
    Word,
    /// Double-quoted string (quotes included in the atom text)
    Quoted,
    OpenParen,
    CloseParen,
    /// `=>` separating a replaced module from its replacement
    Arrow,
    /// `//` line comment marker
    Comment,
    /// Spaces, tabs and newlines
    Whitespace,
}

/// A classified slice of the input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Atom<'a> {
    pub kind: AtomKind,
    /// Raw text, exactly as it appears in the input
    pub text: &'a str,
    /// Where the atom starts
    pub position: Position,
}

impl<'a> Atom<'a> {
    /// Text with surrounding quotes removed for quoted strings
    pub fn value(&self) -> &'a str {
        match self.kind {
            AtomKind::Quoted => &self.text[1..self.text.len() - 1],
            _ => self.text,
        }
    }

    /// Whether this is a whitespace run that ends a line
    pub fn is_newline(&self) -> bool {
        self.kind == AtomKind::Whitespace && self.text.contains('\n')
    }

    /// Byte offset just past the end of the atom
    pub fn end(&self) -> usize {
        self.position.offset + self.text.len()
    }
}

/// Lazy atom scanner over manifest text.
///
/// Yields `Err` once for the first unclassifiable input and then stops.
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    input: &'a str,
    position: Position,
    failed: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            position: Position::start(),
            failed: false,
        }
    }

    fn fail(&mut self, found: String) -> Option<Result<Atom<'a>, ManifestError>> {
        self.failed = true;
        Some(Err(ManifestError::Lex {
            position: self.position,
            found,
        }))
    }

    fn advance(&mut self, text: &str) {
        for c in text.chars() {
            if c == '\n' {
                self.position.line += 1;
                self.position.column = 1;
            } else {
                self.position.column += 1;
            }
        }
        self.position.offset += text.len();
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<Atom<'a>, ManifestError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        let rest = &self.input[self.position.offset..];
        let first = rest.chars().next()?;

        let (kind, len) = match first {
            '/' if rest.starts_with("//") => (AtomKind::Comment, 2),
            '"' => match rest[1..].find('"') {
                Some(0) => return self.fail("\"\"".to_string()),
                Some(idx) => (AtomKind::Quoted, idx + 2),
                None => return self.fail(snippet(rest, SNIPPET_MAX_CHARS)),
            },
            c if is_word_char(c) => (
                AtomKind::Word,
                rest.find(|c: char| !is_word_char(c)).unwrap_or(rest.len()),
            ),
            '(' => (AtomKind::OpenParen, 1),
            ')' => (AtomKind::CloseParen, 1),
            '=' if rest.starts_with("=>") => (AtomKind::Arrow, 2),
            c if c.is_whitespace() => (
                AtomKind::Whitespace,
                rest.find(|c: char| !c.is_whitespace())
                    .unwrap_or(rest.len()),
            ),
            other => return self.fail(other.to_string()),
        };

        let text = &rest[..len];
        let atom = Atom {
            kind,
            text,
            position: self.position,
        };
        self.advance(text);
        Some(Ok(atom))
    }
}

/// Tokenize the whole input eagerly
pub fn tokenize(input: &str) -> Result<Vec<Atom<'_>>, ManifestError> {
    Lexer::new(input).collect()
}
