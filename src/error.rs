use std::error::Error as StdError;

use thiserror::Error;

/// Subtitler's crate-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Subtitler's crate-wide error type.
///
/// This is intentionally decoupled from `anyhow` so downstream libraries aren't forced to
/// adopt `anyhow` in their own public APIs.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error("{0}")]
    Message(String),

    #[error(transparent)]
    Other(#[from] Box<dyn StdError + Send + Sync>),
}

/// Fatal problems with the timestamped records handed to the engine.
///
/// These are surfaced to the caller as-is; the engine never retries or repairs them.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("no timestamped records were provided")]
    Empty,

    #[error(
        "record {index} starts at {start}s, before the previous record's start of {previous_start}s"
    )]
    OutOfOrder {
        index: usize,
        previous_start: f64,
        start: f64,
    },

    #[error("record {index} ends at {end}s, before its start of {start}s")]
    InvertedWord { index: usize, start: f64, end: f64 },

    #[error("record {index} has a non-finite timestamp")]
    NonFinite { index: usize },
}

impl Error {
    pub(crate) fn msg(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Message(format!("{err:#}"))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Other(Box::new(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Other(Box::new(err))
    }
}

impl From<std::str::Utf8Error> for Error {
    fn from(err: std::str::Utf8Error) -> Self {
        Self::Other(Box::new(err))
    }
}

impl From<std::string::FromUtf8Error> for Error {
    fn from(err: std::string::FromUtf8Error) -> Self {
        Self::Other(Box::new(err))
    }
}
