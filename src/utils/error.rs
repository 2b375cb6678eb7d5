//! Error types for StemSplit
//!
//! The playback controller itself never fails; these errors cover the
//! fallible edges around it: configuration, media element commands and
//! the demo separation job.

use thiserror::Error;

/// Main error type for StemSplit
#[derive(Error, Debug)]
pub enum StemSplitError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("File error: {0}")]
    FileIO(#[from] std::io::Error),

    /// Invalid input errors
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Resource not found
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// A bound media element rejected a command
    #[error("Media error: {0}")]
    Media(String),

    /// Separation job rejected
    #[error("Separation error: {0}")]
    Separation(String),
}

impl StemSplitError {
    /// Create a media error from string
    pub fn media_error<S: Into<String>>(msg: S) -> Self {
        StemSplitError::Media(msg.into())
    }
}

/// Convenience type alias for Results in StemSplit
pub type Result<T> = std::result::Result<T, StemSplitError>;

/// Extension trait for converting other errors to StemSplitError
pub trait IntoStemSplitError<T> {
    fn config_err(self, context: &str) -> Result<T>;
}

impl<T, E: std::fmt::Display> IntoStemSplitError<T> for std::result::Result<T, E> {
    fn config_err(self, context: &str) -> Result<T> {
        self.map_err(|e| StemSplitError::Config(format!("{}: {}", context, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StemSplitError::Separation("No audio data provided".to_string());
        assert_eq!(err.to_string(), "Separation error: No audio data provided");

        let err = StemSplitError::media_error("element detached");
        assert_eq!(err.to_string(), "Media error: element detached");
    }

    #[test]
    fn test_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: StemSplitError = io_err.into();
        assert!(matches!(err, StemSplitError::FileIO(_)));
    }

    #[test]
    fn test_context_extension() {
        let result: std::result::Result<(), &str> = Err("bad number");
        match result.config_err("Parsing STEMSPLIT_VOLUME") {
            Err(StemSplitError::Config(msg)) => {
                assert_eq!(msg, "Parsing STEMSPLIT_VOLUME: bad number");
            }
            _ => panic!("Expected Config error"),
        }
    }
}
