//! Error types for the EchoTwin core.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result type for core operations.
pub type EchoResult<T> = Result<T, EchoError>;

/// Errors that can occur while extracting, deriving or synthesizing.
#[derive(Debug, Error)]
pub enum EchoError {
    /// A file could not be opened, read or written.
    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        /// Path of the file involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// An array or embedding file is malformed.
    #[error("format error: {message}")]
    Format {
        /// What was wrong with the file.
        message: String,
    },

    /// Input data is empty or too short for the requested operation.
    #[error("data error: {message}")]
    Data {
        /// What was wrong with the data.
        message: String,
    },

    /// A configuration value is unusable.
    #[error("invalid config '{name}': {message}")]
    InvalidConfig {
        /// Config field name.
        name: String,
        /// Error message.
        message: String,
    },
}

impl EchoError {
    /// Creates an I/O error tagged with the offending path.
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Creates a format error.
    pub fn format(message: impl Into<String>) -> Self {
        Self::Format {
            message: message.into(),
        }
    }

    /// Creates a data error.
    pub fn data(message: impl Into<String>) -> Self {
        Self::Data {
            message: message.into(),
        }
    }

    /// Creates an invalid config error.
    pub fn invalid_config(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Stable error code for reports.
    pub fn code(&self) -> &'static str {
        match self {
            EchoError::Io { .. } => "ECHO_001",
            EchoError::Format { .. } => "ECHO_002",
            EchoError::Data { .. } => "ECHO_003",
            EchoError::InvalidConfig { .. } => "ECHO_004",
        }
    }

    /// Coarse error category.
    pub fn category(&self) -> &'static str {
        match self {
            EchoError::Io { .. } => "io",
            EchoError::Format { .. } => "format",
            EchoError::Data { .. } => "data",
            EchoError::InvalidConfig { .. } => "config",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_helper() {
        let err = EchoError::format("missing 'shape' field");
        assert!(err.to_string().contains("missing 'shape' field"));
        assert_eq!(err.code(), "ECHO_002");
        assert_eq!(err.category(), "format");
    }

    #[test]
    fn test_io_error_mentions_path() {
        let source = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = EchoError::io("voices/missing.vec", source);
        let msg = err.to_string();
        assert!(msg.contains("voices/missing.vec"));
        assert!(msg.contains("no such file"));
        assert_eq!(err.category(), "io");
    }

    #[test]
    fn test_invalid_config_helper() {
        let err = EchoError::invalid_config("hop_length", "must be non-zero");
        assert!(err.to_string().contains("hop_length"));
        assert_eq!(err.code(), "ECHO_004");
    }
}
