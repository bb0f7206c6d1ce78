//! Error types for crossword generation and dictionary loading.

use derive_more::{Display, Error};
use tracing::instrument;

/// What went wrong during a generation attempt.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum GenerateErrorKind {
    /// No word to seed the grid with.
    #[display("word pool is empty")]
    EmptyPool,
    /// Seed word longer than the grid side.
    #[display("word {word:?} does not fit a {grid_size}x{grid_size} grid")]
    WordTooLong {
        /// Offending word.
        word: String,
        /// Grid side length.
        grid_size: usize,
    },
}

/// Generation error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Generation error: {} at {}:{}", kind, file, line)]
pub struct GenerateError {
    /// Error kind.
    pub kind: GenerateErrorKind,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl GenerateError {
    /// Creates a new generation error with caller location tracking.
    #[track_caller]
    #[instrument]
    pub fn new(kind: GenerateErrorKind) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

/// Dictionary loading error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Dictionary error: {} at {}:{}", message, file, line)]
pub struct DictionaryError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl DictionaryError {
    /// Creates a new dictionary error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

impl From<std::io::Error> for DictionaryError {
    #[track_caller]
    fn from(err: std::io::Error) -> Self {
        Self::new(format!("I/O error: {}", err))
    }
}

impl From<serde_json::Error> for DictionaryError {
    #[track_caller]
    fn from(err: serde_json::Error) -> Self {
        Self::new(format!("Invalid dictionary JSON: {}", err))
    }
}
