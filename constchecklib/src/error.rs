//! Error types for constchecklib

use std::path::PathBuf;
use thiserror::Error;

/// A failure to tokenize Python source.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("line {line}: {message}")]
pub struct LexError {
    /// 1-based line where lexing stopped
    pub line: usize,
    /// What went wrong
    pub message: String,
}

impl LexError {
    pub(crate) fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

/// Errors that can occur while checking for repeated strings
#[derive(Error, Debug)]
pub enum ConstcheckError {
    /// Failed to read or decode a file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The tokenizer could not lex the source
    #[error("failed to tokenize {origin}: {source}")]
    MalformedSource {
        origin: String,
        #[source]
        source: LexError,
    },

    /// A threshold was out of range
    #[error("invalid {name} '{value}': {reason}")]
    InvalidThreshold {
        name: &'static str,
        value: i64,
        reason: &'static str,
    },

    /// Invalid glob pattern
    #[error("invalid glob pattern '{pattern}': {message}")]
    InvalidGlob { pattern: String, message: String },

    /// Path does not exist
    #[error("path does not exist: {0}")]
    PathNotFound(PathBuf),

    /// Failed to parse pyproject.toml
    #[error("failed to parse config '{path}': {message}")]
    Config { path: PathBuf, message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
