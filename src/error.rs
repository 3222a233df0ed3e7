//! Error types for manifest parsing
//!
//! Every failure aborts the whole parse: a manifest that produced an error
//! must be treated as unusable.

use std::fmt;

use thiserror::Error;

/// A location in the manifest text (1-based line and column, 0-based byte offset)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub line: u32,
    pub column: u32,
    pub offset: usize,
}

impl Position {
    /// Position of the first character of the input
    pub const fn start() -> Self {
        Self {
            line: 1,
            column: 1,
            offset: 0,
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::start()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Errors raised while tokenizing or parsing a manifest
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ManifestError {
    /// A character run the tokenizer cannot classify
    #[error("unexpected input {found:?} at {position}")]
    Lex { position: Position, found: String },

    /// Bracket mismatch, duplicated bracket or punctuation out of place
    #[error("{message} at {position}")]
    Structural { position: Position, message: String },

    /// A record with the wrong number of tokens for its directive
    #[error("malformed {directive} record {tokens:?} at {position}")]
    RecordShape {
        position: Position,
        directive: &'static str,
        tokens: Vec<String>,
    },

    /// A `replace` record without a `=>` right-hand side
    #[error("replace record {tokens:?} has no target at {position}")]
    ReplaceTargetMissing {
        position: Position,
        tokens: Vec<String>,
    },
}

/// Reasons a module reference cannot be built
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModuleRefError {
    #[error("module name must not be empty")]
    EmptyName,

    #[error("version of {name} must not be empty")]
    EmptyVersion { name: String },

    /// Manifest text has no escapes, so a `"` can never be written back
    #[error("{value:?} contains a double quote")]
    Quote { value: String },
}

impl ManifestError {
    /// Where in the input the error was detected
    pub fn position(&self) -> Position {
        match self {
            ManifestError::Lex { position, .. }
            | ManifestError::Structural { position, .. }
            | ManifestError::RecordShape { position, .. }
            | ManifestError::ReplaceTargetMissing { position, .. } => *position,
        }
    }

    pub(crate) fn structural(position: Position, message: impl Into<String>) -> Self {
        ManifestError::Structural {
            position,
            message: message.into(),
        }
    }

    pub(crate) fn record_shape(position: Position, directive: &'static str, tokens: &[&str]) -> Self {
        ManifestError::RecordShape {
            position,
            directive,
            tokens: tokens.iter().map(|t| t.to_string()).collect(),
        }
    }

    pub(crate) fn replace_target_missing(position: Position, tokens: &[&str]) -> Self {
        ManifestError::ReplaceTargetMissing {
            position,
            tokens: tokens.iter().map(|t| t.to_string()).collect(),
        }
    }
}
