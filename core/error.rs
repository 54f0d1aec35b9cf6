use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = AppError> = std::result::Result<T, E>;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum AppError {
    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("TOML Parsing Error: {0}")]
    TomlParse(String),

    #[error("Invalid Argument: {0}")]
    InvalidArgument(String),

    #[error("File Read Error: Path '{path}', Error: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Authentication Error: {0}")]
    Authentication(String),

    #[error(
        "Model Not Found: '{model}' was rejected by the API ({message}). Try a different model with --model."
    )]
    ModelNotFound { model: String, message: String },

    #[error("Remote API Error (HTTP {status}): {message}")]
    RemoteApi { status: u16, message: String },

    #[error("HTTP Error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Empty Response: {0}")]
    EmptyResponse(String),

    #[error("JSON Serialization Error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    #[error("TikToken Error: {0}")]
    TikToken(String),

    #[error("Duration Parsing Error: {0}")]
    DurationParse(String),
}
