//! Sienge-specific error classification
//!
//! Categorizes transport and HTTP failures so the data-fetching layer can
//! decide what is worth retrying, and converts into the domain error enum
//! surfaced to callers.

use std::fmt;

use capexflow_domain::CapexFlowError;
use reqwest::StatusCode;

/// Failure category for a Sienge API call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiengeErrorCategory {
    /// Request exceeded the deadline
    Timeout,

    /// Network unreachable or connection refused
    NetworkOffline,

    /// Sienge returned a 5xx
    ServerUnavailable,

    /// Authentication rejected (401, 403)
    Authentication,

    /// Rate limit exceeded (429)
    RateLimited,

    /// Invalid request or data (other 4xx)
    Validation,

    /// Unknown or unclassified error
    Unknown,
}

impl SiengeErrorCategory {
    /// True if a call failing with this category is worth retrying
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Timeout | Self::NetworkOffline | Self::ServerUnavailable | Self::RateLimited
        )
    }

    /// Classify an HTTP status code
    #[must_use]
    pub fn from_status(status: StatusCode) -> Self {
        match status.as_u16() {
            401 | 403 => Self::Authentication,
            429 => Self::RateLimited,
            400..=499 => Self::Validation,
            500..=599 => Self::ServerUnavailable,
            _ => Self::Unknown,
        }
    }

    /// Classify an already-built domain error. Used by the data service to
    /// apply its retry policy to gateway failures.
    #[must_use]
    pub fn classify(err: &CapexFlowError) -> Self {
        match err {
            CapexFlowError::Timeout(_) => Self::Timeout,
            CapexFlowError::Network(_) => Self::NetworkOffline,
            CapexFlowError::Auth(_) => Self::Authentication,
            CapexFlowError::Http { status, .. } => match StatusCode::from_u16(*status) {
                Ok(status) => Self::from_status(status),
                Err(_) => Self::Unknown,
            },
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for SiengeErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(f, "Timeout"),
            Self::NetworkOffline => write!(f, "Network Offline"),
            Self::ServerUnavailable => write!(f, "Server Unavailable"),
            Self::Authentication => write!(f, "Authentication Failed"),
            Self::RateLimited => write!(f, "Rate Limited"),
            Self::Validation => write!(f, "Validation Error"),
            Self::Unknown => write!(f, "Unknown Error"),
        }
    }
}

/// Classified non-2xx response carrying the message shown to users
#[derive(Debug, Clone)]
pub struct SiengeError {
    category: SiengeErrorCategory,
    status: StatusCode,
    message: String,
}

impl SiengeError {
    /// Classify a non-2xx response. `message` is the value extracted from
    /// the JSON error body, or the synthesized `HTTP <status>: <reason>`
    /// line when no parsable body was present.
    #[must_use]
    pub fn from_response(status: StatusCode, message: String) -> Self {
        Self { category: SiengeErrorCategory::from_status(status), status, message }
    }

    /// Get the error category
    #[must_use]
    pub fn category(&self) -> SiengeErrorCategory {
        self.category
    }

    /// Get the error message
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Convert to the domain error type
    #[must_use]
    pub fn into_domain_error(self) -> CapexFlowError {
        CapexFlowError::Http { status: self.status.as_u16(), message: self.message }
    }
}

impl fmt::Display for SiengeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.category, self.message)
    }
}

impl std::error::Error for SiengeError {}

impl From<SiengeError> for CapexFlowError {
    fn from(err: SiengeError) -> Self {
        err.into_domain_error()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_401_maps_to_authentication() {
        let category = SiengeErrorCategory::from_status(StatusCode::UNAUTHORIZED);
        assert_eq!(category, SiengeErrorCategory::Authentication);
        assert!(!category.is_retryable());
    }

    #[test]
    fn status_429_is_retryable() {
        let category = SiengeErrorCategory::from_status(StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(category, SiengeErrorCategory::RateLimited);
        assert!(category.is_retryable());
    }

    #[test]
    fn status_404_maps_to_validation() {
        let category = SiengeErrorCategory::from_status(StatusCode::NOT_FOUND);
        assert_eq!(category, SiengeErrorCategory::Validation);
        assert!(!category.is_retryable());
    }

    #[test]
    fn status_500_is_retryable() {
        let category = SiengeErrorCategory::from_status(StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(category, SiengeErrorCategory::ServerUnavailable);
        assert!(category.is_retryable());
    }

    #[test]
    fn classifies_domain_errors_for_retry_decisions() {
        let timeout = CapexFlowError::Timeout("deadline exceeded".to_string());
        assert!(SiengeErrorCategory::classify(&timeout).is_retryable());

        let network = CapexFlowError::Network("connection refused".to_string());
        assert!(SiengeErrorCategory::classify(&network).is_retryable());

        let not_found = CapexFlowError::Http { status: 404, message: "not found".to_string() };
        assert!(!SiengeErrorCategory::classify(&not_found).is_retryable());

        let server = CapexFlowError::Http { status: 503, message: "down".to_string() };
        assert!(SiengeErrorCategory::classify(&server).is_retryable());

        let auth = CapexFlowError::Auth("rejected".to_string());
        assert!(!SiengeErrorCategory::classify(&auth).is_retryable());
    }

    #[test]
    fn response_errors_become_http_domain_errors() {
        let err = SiengeError::from_response(StatusCode::NOT_FOUND, "not found".to_string());
        match err.into_domain_error() {
            CapexFlowError::Http { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "not found");
            }
            other => panic!("expected Http error, got {other:?}"),
        }
    }
}
