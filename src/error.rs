/// Error types for the scanner
///
/// `AnalysisError` covers everything that can go wrong between pressing
/// "Upload Now" and getting a verdict back. `ConfigError` covers loading
/// the config file. All of these are recoverable.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from submitting an image for analysis
///
/// Must be `Clone` because it travels inside iced messages.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    /// Submit was pressed with nothing selected
    #[error("Please select an image file first!")]
    NoFileSelected,

    /// A submission is already in flight
    #[error("An analysis is already in progress")]
    AlreadyInProgress,

    /// The endpoint could not be reached (connect, timeout, broken body)
    #[error("Could not reach the detection service: {0}")]
    NetworkFailure(String),

    /// The endpoint answered with a non-2xx status
    #[error("Detection service returned {status}: {reason}")]
    ServerRejected { status: u16, reason: String },

    /// The endpoint answered 2xx but the body was not a valid verdict
    #[error("Detection service sent an invalid verdict: {0}")]
    MalformedResponse(String),
}

impl AnalysisError {
    /// True for the errors that settle a submission as Failed.
    ///
    /// `NoFileSelected` and `AlreadyInProgress` are refused before any
    /// request exists and never touch the result slot.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            AnalysisError::NetworkFailure(_)
                | AnalysisError::ServerRejected { .. }
                | AnalysisError::MalformedResponse(_)
        )
    }
}

impl From<reqwest::Error> for AnalysisError {
    fn from(err: reqwest::Error) -> Self {
        AnalysisError::NetworkFailure(err.to_string())
    }
}

/// Errors from loading `config.json`
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("invalid setting {key}: {reason}")]
    InvalidValue { key: &'static str, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_classification() {
        assert!(!AnalysisError::NoFileSelected.is_failure());
        assert!(!AnalysisError::AlreadyInProgress.is_failure());
        assert!(AnalysisError::NetworkFailure("refused".into()).is_failure());
        assert!(AnalysisError::MalformedResponse("no label".into()).is_failure());
        assert!(AnalysisError::ServerRejected {
            status: 500,
            reason: "boom".into()
        }
        .is_failure());
    }

    #[test]
    fn test_server_rejected_message() {
        let err = AnalysisError::ServerRejected {
            status: 400,
            reason: "File type not allowed".into(),
        };
        assert_eq!(
            err.to_string(),
            "Detection service returned 400: File type not allowed"
        );
    }
}
