//! @ai:module:intent Define error types for annotation expansion
//! @ai:module:layer domain
//! @ai:module:public_api Error, Result
//! @ai:module:stateless true

use std::path::PathBuf;
use thiserror::Error;

/// @ai:intent Unified error type for all annotate operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Unable to find LABEL in: {payload}\nA label followed by a comma must come first")]
    MissingLabel { payload: String },

    #[error("Unable to parse GLOBS from: {payload}\nGlobs must be an array of strings (even if length is one!): {reason}")]
    InvalidGlobs { payload: String, reason: String },

    #[error("Unable to parse OPTIONS from: {payload}\nOptions must be a JSON object: {reason}")]
    InvalidOptions { payload: String, reason: String },

    #[error("Duplicate label! `{label}` is used by more than one //@Load annotation")]
    DuplicateLabel { label: String },

    #[error("Empty arguments! //@Load() needs a label and a glob array")]
    EmptyArguments,

    #[error("Unable to version `{target}`: it has no extension and is not a path, prefix it with ./")]
    UnversionableTarget { target: String },

    #[error("Stream is not supported (yet)!")]
    UnsupportedStream,

    #[error("Invalid glob pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("File {path} is not valid UTF-8")]
    InvalidUtf8 { path: PathBuf },

    #[error("Invalid configuration {path}: {message}")]
    Config { path: PathBuf, message: String },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// @ai:intent Stable diagnostic code used in check reports
    /// @ai:effects pure
    pub fn code(&self) -> &'static str {
        match self {
            Error::MissingLabel { .. } => "E001",
            Error::InvalidGlobs { .. } => "E002",
            Error::InvalidOptions { .. } => "E003",
            Error::DuplicateLabel { .. } => "E004",
            Error::EmptyArguments => "E005",
            Error::UnversionableTarget { .. } => "E006",
            Error::UnsupportedStream => "E007",
            Error::InvalidPattern { .. } => "E008",
            Error::InvalidUtf8 { .. } => "E009",
            Error::Io(_) | Error::FileRead { .. } | Error::FileWrite { .. } => "E100",
            Error::Config { .. } | Error::Json(_) => "E101",
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
