//! Errors from the external balance source.

use thiserror::Error;

/// Errors that can occur while fetching an external balance.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The source could not be reached or answered with an error.
    #[error("Balance source unavailable: {0}")]
    Unavailable(String),

    /// The source did not answer within the configured deadline.
    #[error("Balance source timed out")]
    Timeout,
}

impl SourceError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Unavailable(_) => "SOURCE_UNAVAILABLE",
            Self::Timeout => "SOURCE_TIMEOUT",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            SourceError::Unavailable("boom".into()).error_code(),
            "SOURCE_UNAVAILABLE"
        );
        assert_eq!(SourceError::Timeout.error_code(), "SOURCE_TIMEOUT");
    }

    #[test]
    fn test_display() {
        assert_eq!(
            SourceError::Unavailable("connection refused".into()).to_string(),
            "Balance source unavailable: connection refused"
        );
    }
}
