//! Error handling and custom error types
//!
//! Provides unified error handling across the studio using thiserror.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    AiProvider(String),

    #[error("{0}")]
    Validation(String),

    #[error("No result: {0}")]
    MissingResult(String),

    #[error("Credential error: {0}")]
    Credential(String),

    #[error("{0}")]
    Location(String),

    #[error("Audio decode error: {0}")]
    Audio(String),

    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] dotenvy::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
