//! Errors raised while building or querying the [`Environment`](super::Environment).
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum EnvironmentError {
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("I/O error reading '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unknown or unsupported configuration format for path: {path}")]
    UnsupportedFormat { path: PathBuf },

    #[error("Failed to parse {format} document '{path}': {message}")]
    Parse {
        path: PathBuf,
        format: &'static str,
        message: String,
    },

    #[error("Property '{key}' has value '{value}' which is not a valid {expected}")]
    InvalidValue {
        key: String,
        value: String,
        expected: &'static str,
    },

    #[error("Could not resolve placeholder '{placeholder}'")]
    UnresolvablePlaceholder { placeholder: String },

    #[error("Invalid version '{version}' for library '{library}': {message}")]
    InvalidVersion {
        library: String,
        version: String,
        message: String,
    },
}
