//! Error types for region API operations.
//!
//! This module provides the error type shared by all region clients, a stable
//! error code per variant, and the mapping from unexpected HTTP statuses.

use reqwest::StatusCode;
use thiserror::Error;

/// Main error type for region API operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Network, DNS or connection failure, or a request that could not be formed
    #[error("Transport error: {0}")]
    TransportError(String),

    /// Response body was not the expected JSON or envelope
    #[error("Failed to decode region API response: {0}")]
    DecodeError(String),

    /// Resource not found (HTTP 404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Region API rejected the credentials (HTTP 401/403)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Any other unsuccessful HTTP status
    #[error("Region API error {status}: {message}")]
    HttpError {
        /// HTTP status code
        status: u16,
        /// Response body or reason
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Specialized result type for region API operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns the error code for this error type.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::TransportError(_) => "TRANSPORT_ERROR",
            Self::DecodeError(_) => "DECODE_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::HttpError { .. } => "HTTP_ERROR",
            Self::ConfigError(_) => "CONFIG_ERROR",
        }
    }

    /// Map an unsuccessful HTTP status and its body text to an error.
    #[must_use]
    pub fn from_status(status: StatusCode, text: String) -> Self {
        match status {
            StatusCode::NOT_FOUND => Self::NotFound(text),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Self::Unauthorized(text),
            _ => Self::HttpError {
                status: status.as_u16(),
                message: text,
            },
        }
    }

    /// Returns true if this error should be logged as a serious error.
    #[must_use]
    pub const fn should_log(&self) -> bool {
        matches!(
            self,
            Self::TransportError(_) | Self::ConfigError(_) | Self::DecodeError(_)
        )
    }
}

// Conversions from external error types
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::TransportError(err.to_string())
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::ConfigError(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::DecodeError(err.to_string())
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::ConfigError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            Error::TransportError("test".to_string()).error_code(),
            "TRANSPORT_ERROR"
        );
        assert_eq!(
            Error::DecodeError("test".to_string()).error_code(),
            "DECODE_ERROR"
        );
        assert_eq!(
            Error::NotFound("test".to_string()).error_code(),
            "NOT_FOUND"
        );
        assert_eq!(
            Error::Unauthorized("test".to_string()).error_code(),
            "UNAUTHORIZED"
        );
        assert_eq!(
            Error::HttpError {
                status: 500,
                message: "boom".to_string()
            }
            .error_code(),
            "HTTP_ERROR"
        );
        assert_eq!(
            Error::ConfigError("test".to_string()).error_code(),
            "CONFIG_ERROR"
        );
    }

    #[test]
    fn test_error_display() {
        let err = Error::HttpError {
            status: 409,
            message: "service already stopped".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Region API error 409: service already stopped"
        );

        let err = Error::ConfigError("region api url can not be empty".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration error: region api url can not be empty"
        );
    }

    #[test]
    fn test_from_status() {
        assert!(matches!(
            Error::from_status(StatusCode::NOT_FOUND, String::new()),
            Error::NotFound(_)
        ));
        assert!(matches!(
            Error::from_status(StatusCode::FORBIDDEN, String::new()),
            Error::Unauthorized(_)
        ));
        assert_eq!(
            Error::from_status(StatusCode::BAD_GATEWAY, "upstream".to_string()),
            Error::HttpError {
                status: 502,
                message: "upstream".to_string()
            }
        );
    }

    #[test]
    fn test_not_found_display() {
        let err = Error::NotFound("svc-123".to_string());
        assert_eq!(err.to_string(), "Not found: svc-123");
        assert_eq!(err.error_code(), "NOT_FOUND");
    }

    #[test]
    fn test_should_log() {
        assert!(Error::TransportError("test".to_string()).should_log());
        assert!(Error::ConfigError("test".to_string()).should_log());
        assert!(Error::DecodeError("test".to_string()).should_log());

        assert!(!Error::NotFound("test".to_string()).should_log());
        assert!(!Error::Unauthorized("test".to_string()).should_log());
    }

    #[test]
    fn test_from_url_parse_error() {
        let err = url::Url::parse("not a url").unwrap_err();
        let region_err: Error = err.into();
        assert!(matches!(region_err, Error::ConfigError(_)));
    }

    #[test]
    fn test_from_serde_json_error() {
        let err = serde_json::from_str::<serde_json::Value>("{invalid json}").unwrap_err();
        let region_err: Error = err.into();
        assert!(matches!(region_err, Error::DecodeError(_)));
        assert_eq!(region_err.error_code(), "DECODE_ERROR");
    }
}
