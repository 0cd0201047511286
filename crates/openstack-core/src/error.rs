//! Error types for OpenStack operations.
//!
//! Every failure a client can hit is expressed through [`Error`]: authentication
//! problems, malformed endpoints, transport failures, non-2xx responses, and
//! payloads that do not match the expected JSON shape.

use serde::Deserialize;
use std::collections::HashMap;
use thiserror::Error;

/// Main error type for OpenStack operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Credentials were missing or rejected, or the identity service could not be reached
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The service catalog has no usable endpoint for a service
    #[error("Endpoint not found: {0}")]
    EndpointNotFound(String),

    /// A base endpoint or request path could not form a valid URL
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Remote service could not be reached
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Request timed out
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// HTTP request failed before a response was received
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// The service answered with a non-2xx status
    #[error("HTTP status {status}: {body}")]
    Status {
        /// Numeric HTTP status code
        status: u16,
        /// Raw response body
        body: String,
    },

    /// Response body did not match the expected JSON shape
    #[error("Failed to decode response: {0}")]
    DecodeError(String),

    /// Request body could not be encoded
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Invalid UUID format
    #[error("Invalid UUID: {0}")]
    InvalidUuid(String),
}

/// Specialized result type for OpenStack operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns the error code for this error type.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::AuthenticationFailed(_) => "AUTHENTICATION_FAILED",
            Self::EndpointNotFound(_) => "ENDPOINT_NOT_FOUND",
            Self::InvalidEndpoint(_) => "INVALID_ENDPOINT",
            Self::ConfigError(_) => "CONFIG_ERROR",
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
            Self::Timeout(_) => "TIMEOUT",
            Self::HttpError(_) => "HTTP_ERROR",
            Self::Status { .. } => "HTTP_STATUS",
            Self::DecodeError(_) => "DECODE_ERROR",
            Self::InvalidRequest(_) => "INVALID_REQUEST",
            Self::InvalidUuid(_) => "INVALID_UUID",
        }
    }

    /// Build a status error from a response code and body.
    #[must_use]
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::Status {
            status,
            body: body.into(),
        }
    }

    /// HTTP status code carried by this error, if any.
    #[must_use]
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns true when the service reported that the resource does not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404, .. })
    }

    /// Returns true for authentication failures and 401 responses.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            Self::AuthenticationFailed(_) | Self::Status { status: 401, .. }
        )
    }

    /// Extract the human-readable message from an OpenStack fault body.
    ///
    /// Nova wraps faults as `{"itemNotFound": {"message": "...", "code": 404}}`,
    /// Neutron as `{"NeutronError": {"message": "...", "type": "..."}}`. Both
    /// shapes are a single-key object whose value holds a `message`.
    #[must_use]
    pub fn fault_message(&self) -> Option<String> {
        #[derive(Deserialize)]
        struct Fault {
            message: String,
        }

        let Self::Status { body, .. } = self else {
            return None;
        };

        let faults: HashMap<String, Fault> = serde_json::from_str(body).ok()?;
        faults.into_values().next().map(|fault| fault.message)
    }

    /// Returns true if this error should be logged as a serious error.
    #[must_use]
    pub const fn should_log(&self) -> bool {
        match self {
            Self::Status { status, .. } => *status >= 500,
            Self::ConfigError(_) | Self::DecodeError(_) | Self::ServiceUnavailable(_) => true,
            _ => false,
        }
    }
}

// Conversions from external error types
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_connect() {
            Self::ServiceUnavailable(err.to_string())
        } else if err.is_decode() {
            Self::DecodeError(err.to_string())
        } else {
            Self::HttpError(err.to_string())
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidEndpoint(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::DecodeError(err.to_string())
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::ValidationError(err.to_string())
    }
}

impl From<uuid::Error> for Error {
    fn from(err: uuid::Error) -> Self {
        Self::InvalidUuid(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            Error::AuthenticationFailed("test".to_string()).error_code(),
            "AUTHENTICATION_FAILED"
        );
        assert_eq!(
            Error::EndpointNotFound("compute".to_string()).error_code(),
            "ENDPOINT_NOT_FOUND"
        );
        assert_eq!(
            Error::InvalidEndpoint("test".to_string()).error_code(),
            "INVALID_ENDPOINT"
        );
        assert_eq!(Error::status(404, "").error_code(), "HTTP_STATUS");
        assert_eq!(
            Error::DecodeError("test".to_string()).error_code(),
            "DECODE_ERROR"
        );
        assert_eq!(Error::Timeout("test".to_string()).error_code(), "TIMEOUT");
    }

    #[test]
    fn test_status_display_contains_code() {
        let err = Error::status(409, "conflict");
        assert_eq!(err.to_string(), "HTTP status 409: conflict");
        assert_eq!(err.status_code(), Some(409));
        assert_eq!(Error::Timeout("slow".into()).status_code(), None);
    }

    #[test]
    fn test_not_found_classification() {
        assert!(Error::status(404, "missing").is_not_found());
        assert!(!Error::status(400, "bad").is_not_found());
        assert!(!Error::HttpError("404".into()).is_not_found());
    }

    #[test]
    fn test_unauthorized_classification() {
        assert!(Error::status(401, "").is_unauthorized());
        assert!(Error::AuthenticationFailed("bad password".into()).is_unauthorized());
        assert!(!Error::status(403, "").is_unauthorized());
    }

    #[test]
    fn test_fault_message_nova() {
        let err = Error::status(
            404,
            r#"{"itemNotFound": {"message": "Keypair demo not found for user 42", "code": 404}}"#,
        );
        assert_eq!(
            err.fault_message().as_deref(),
            Some("Keypair demo not found for user 42")
        );
    }

    #[test]
    fn test_fault_message_neutron() {
        let err = Error::status(
            404,
            r#"{"NeutronError": {"type": "SubnetNotFound", "message": "Subnet abc could not be found.", "detail": ""}}"#,
        );
        assert_eq!(
            err.fault_message().as_deref(),
            Some("Subnet abc could not be found.")
        );
    }

    #[test]
    fn test_fault_message_plain_body() {
        assert!(Error::status(500, "Internal Server Error")
            .fault_message()
            .is_none());
        assert!(Error::Timeout("x".into()).fault_message().is_none());
    }

    #[test]
    fn test_should_log() {
        assert!(Error::status(503, "").should_log());
        assert!(Error::DecodeError("bad".into()).should_log());
        assert!(!Error::status(404, "").should_log());
        assert!(!Error::AuthenticationFailed("x".into()).should_log());
    }

    #[test]
    fn test_from_url_parse_error() {
        let err = url::Url::parse("not a url").unwrap_err();
        let os_err: Error = err.into();
        assert!(matches!(os_err, Error::InvalidEndpoint(_)));
    }

    #[test]
    fn test_from_uuid_error() {
        let err = uuid::Uuid::parse_str("not-a-uuid").unwrap_err();
        let os_err: Error = err.into();
        assert!(matches!(os_err, Error::InvalidUuid(_)));
    }

    #[test]
    fn test_from_serde_json_error() {
        let err = serde_json::from_str::<serde_json::Value>("{invalid json}").unwrap_err();
        let os_err: Error = err.into();
        assert!(matches!(os_err, Error::DecodeError(_)));
    }
}
