// Error types for imgmeta.
// Covers probe failures, storage I/O and serialization.

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImgMetaError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} for {url}")]
    Status { status: StatusCode, url: String },

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl ImgMetaError {
    /// Status code carried by a structured HTTP-response error.
    pub fn status_code(&self) -> Option<StatusCode> {
        match self {
            ImgMetaError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether retrying can't help: a client error other than 429.
    pub fn is_fatal(&self) -> bool {
        self.status_code().is_some_and(|status| {
            status.is_client_error() && status != StatusCode::TOO_MANY_REQUESTS
        })
    }
}

pub type Result<T> = std::result::Result<T, ImgMetaError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn status(code: u16) -> ImgMetaError {
        ImgMetaError::Status {
            status: StatusCode::from_u16(code).unwrap(),
            url: "https://example.com/a.png".to_string(),
        }
    }

    #[test]
    fn test_client_errors_are_fatal() {
        assert!(status(400).is_fatal());
        assert!(status(404).is_fatal());
        assert!(status(499).is_fatal());
    }

    #[test]
    fn test_rate_limit_and_server_errors_are_retryable() {
        assert!(!status(429).is_fatal());
        assert!(!status(500).is_fatal());
        assert!(!status(503).is_fatal());
        assert!(!ImgMetaError::Other("boom".to_string()).is_fatal());
    }

    #[test]
    fn test_status_display() {
        assert_eq!(
            status(404).to_string(),
            "HTTP 404 Not Found for https://example.com/a.png"
        );
    }
}
