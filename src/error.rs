use std::path::PathBuf;
use thiserror::Error;

/// Failures of schema inference. The only error the core itself produces.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// The first record is not a JSON object, so it has no keys to derive columns from
    #[error("first record is a {found}, expected an object")]
    NonObjectRecord { found: &'static str },
}

/// Failures while retrieving JSON from a remote endpoint
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("invalid URL format: {0} (expected a full URL starting with http:// or https://)")]
    InvalidUrl(String),

    #[error("invalid header {0:?} (expected \"Key: Value\")")]
    InvalidHeader(String),

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("server returned {status} for {url}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },
}

/// Malformed JSON input
#[derive(Error, Debug)]
#[error("error parsing JSON: {source}")]
pub struct DecodeError {
    #[from]
    source: serde_json::Error,
}

impl DecodeError {
    /// Line of the input where decoding failed (1-based)
    pub fn line(&self) -> usize {
        self.source.line()
    }

    /// Column of the input where decoding failed (1-based)
    pub fn column(&self) -> usize {
        self.source.column()
    }
}

/// Failures while writing the generated script
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("failed to create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("error saving file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Every failure the library can surface
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
