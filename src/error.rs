//! Error types for physman.
//!
//! The game itself never fails: bad or repeated guesses are ignored. Errors
//! only come from the edges (caller-supplied words, the embedded vocabulary,
//! configuration files and the scoring service).

use thiserror::Error;

/// Errors that can occur outside the guessing loop.
#[derive(Debug, Error)]
pub enum Error {
    /// A target word was empty or contained something other than ASCII letters.
    #[error("invalid word {0:?}: expected one or more ASCII letters")]
    InvalidWord(String),

    /// A vocabulary had no words in it.
    #[error("vocabulary {0:?} contains no words")]
    EmptyVocabulary(String),

    /// No vocabulary with this name is embedded in the binary.
    #[error("unknown vocabulary: {0}")]
    UnknownVocabulary(String),

    /// A page URL could not be parsed.
    #[error("invalid page url {url:?}: {reason}")]
    InvalidPageUrl { url: String, reason: String },

    /// The scoring service answered with a non-success status.
    #[error("result submission rejected with status {0}")]
    Rejected(u16),

    /// I/O error while reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Transport error talking to the scoring service.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
