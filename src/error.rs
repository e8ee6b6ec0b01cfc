//! Error types for the Xode model front end.
//!
//! This module provides a unified error type [`XodeError`] that covers
//! all error conditions that can occur while preprocessing, extracting and
//! expanding a model file. User-facing input errors carry a [`SourceLocation`]
//! so they can be printed with a caret pointing at the offending column.

use std::fmt;

use thiserror::Error;

use crate::dsl::SourceLine;

/// Result type alias using [`XodeError`].
pub type Result<T> = std::result::Result<T, XodeError>;

/// Unified error type for all Xode operations.
#[derive(Error, Debug)]
pub enum XodeError {
    // ============ Model Source Errors ============
    /// Error located in a line of the model source
    #[error("{kind} in line {location}")]
    Source {
        kind: ErrorKind,
        location: SourceLocation,
    },

    /// The model source contains no statements
    #[error("Model '{name}' contains no statements")]
    EmptyModel { name: String },

    // ============ I/O Errors ============
    /// Error reading the model file
    #[error("Failed to read model file '{path}': {source}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Error reading a lookup table file
    #[error("Failed to read table file '{path}': {source}")]
    TableReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    // ============ Contract Violations ============
    /// Misuse of a keyword trie
    #[error(transparent)]
    Trie(#[from] TrieError),

    // ============ Output Errors ============
    /// Error serializing the expanded model
    #[error("Failed to serialize model: {0}")]
    SerializeError(#[from] serde_json::Error),

    // ============ WASM Errors ============
    /// WASM-specific error
    #[cfg(feature = "wasm")]
    #[error("WASM error: {message}")]
    WasmError { message: String },
}

impl XodeError {
    /// Create an error pointing at `column` of a source line.
    pub fn source(kind: ErrorKind, line: &SourceLine, column: usize) -> Self {
        Self::Source {
            kind,
            location: SourceLocation::new(line.number, &line.text, column),
        }
    }

    /// Create an error for a bare piece of text, e.g. an expression that no
    /// longer corresponds to a full source line.
    pub fn at(kind: ErrorKind, number: usize, text: impl Into<String>, column: usize) -> Self {
        Self::Source {
            kind,
            location: SourceLocation::new(number, text, column),
        }
    }

    /// The error kind, if this error is located in the model source.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Source { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// The source location, if this error is located in the model source.
    pub fn location(&self) -> Option<&SourceLocation> {
        match self {
            Self::Source { location, .. } => Some(location),
            _ => None,
        }
    }
}

/// Kinds of input errors reported while parsing a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    DuplicatedName,
    ReservedKeyword,
    ReservedFunction,
    ReservedOption,
    UnknownOption,
    UnknownVariable,
    UnknownName,
    MissingArgument,
    MissingOpeningBracket,
    MissingClosingBracket,
    MissingMarkovAssignment,
    ExpectedNumber,
    ExpectedListArgument,
    ExpectedTableAssignment,
    WrongArrayAssignment,
    WrongMarkovAssignment,
    WrongTableAssignment,
    UnknownAssignment,
    CircularReference,
}

impl ErrorKind {
    /// Human-readable description of the error kind.
    pub fn message(&self) -> &'static str {
        match self {
            Self::DuplicatedName => "Name has already been reserved",
            Self::ReservedKeyword => "Given name is a reserved keyword",
            Self::ReservedFunction => "Given function name is reserved",
            Self::ReservedOption => "Given name is a reserved option",
            Self::UnknownOption => "Unknown option chosen",
            Self::UnknownVariable => "Unknown variable for initial condition",
            Self::UnknownName => "Unknown name in expression",
            Self::MissingArgument => "Cannot find function argument",
            Self::MissingOpeningBracket => "Cannot find opening bracket",
            Self::MissingClosingBracket => "Cannot find closing bracket",
            Self::MissingMarkovAssignment => {
                "Missing assignment of markov transition probability"
            }
            Self::ExpectedNumber => "Cannot parse number",
            Self::ExpectedListArgument => "Missing argument in list",
            Self::ExpectedTableAssignment => "Missing value for the lookup table",
            Self::WrongArrayAssignment => "Wrong array assignment",
            Self::WrongMarkovAssignment => {
                "Superfluous assignment of markov transition probability"
            }
            Self::WrongTableAssignment => "Wrong assignment of table expression",
            Self::UnknownAssignment => "Unknown assignment",
            Self::CircularReference => "Circular reference between definitions",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// A line of the model source together with a caret column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    /// Line number in the model file (1-indexed)
    pub line: usize,
    /// Text of the (preprocessed) line
    pub text: String,
    /// Character offset within `text` (0-indexed)
    pub column: usize,
}

impl SourceLocation {
    /// Create a new source location.
    pub fn new(line: usize, text: impl Into<String>, column: usize) -> Self {
        Self {
            line,
            text: text.into(),
            column,
        }
    }

    /// The caret marker aligned under `text`.
    pub fn pointer(&self) -> String {
        format!("{}^", " ".repeat(self.column))
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:\n{}\n{}", self.line, self.text, self.pointer())
    }
}

/// Contract violations of the keyword trie.
///
/// These indicate programmer errors while building a dictionary, not
/// problems with the model source.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TrieError {
    /// The same (normalized) keyword was inserted twice
    #[error("Attempted to add keyword '{keyword}' to the keyword trie twice")]
    DuplicateKeyword { keyword: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_error_display() {
        let line = SourceLine::new("par a=1,a=2", 3);
        let err = XodeError::source(ErrorKind::DuplicatedName, &line, 8);
        assert_eq!(
            err.to_string(),
            "Name has already been reserved in line 3:\npar a=1,a=2\n        ^"
        );
        assert_eq!(err.kind(), Some(ErrorKind::DuplicatedName));
        assert_eq!(err.location().map(|l| l.column), Some(8));
    }

    #[test]
    fn test_trie_error_converts() {
        let err: XodeError = TrieError::DuplicateKeyword {
            keyword: "par".to_string(),
        }
        .into();
        assert!(err.kind().is_none());
        assert!(err.to_string().contains("'par'"));
    }

    #[test]
    fn test_serialize_error_converts() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: XodeError = json_err.into();
        assert!(err.kind().is_none());
        assert!(err.to_string().starts_with("Failed to serialize model"));
    }
}
