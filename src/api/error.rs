/// Failure types raised by the remote client.
///
/// The client only raises on transport-level or HTTP-level problems. A
/// well-formed envelope reporting `success: false` is not an error here; the
/// sync core inspects it and classifies it as [`FailureKind::Logical`].
use std::fmt;

use thiserror::Error;

/// Coarse failure class, used for journaling only. Callers of the sync core
/// always see the same `success: false` shape regardless of the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureKind {
    /// The request never produced a usable HTTP response (DNS, refused
    /// connection, timeout, unreadable body).
    Network,
    /// The service answered with a status outside 2xx.
    Http,
    /// The envelope came back with `success: false` or without its data.
    Logical,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network => write!(f, "network"),
            Self::Http => write!(f, "http"),
            Self::Logical => write!(f, "logical"),
        }
    }
}

/// Error raised by a single remote call.
#[derive(Debug, Clone, Error)]
pub enum RequestError {
    #[error("network error: {0}")]
    Network(String),

    #[error("API request failed: {status} {status_text}")]
    Http { status: u16, status_text: String },

    #[error("invalid response body: {0}")]
    Decode(String),

    #[error("failed to encode request body: {0}")]
    Encode(String),
}

impl RequestError {
    /// Classify the error for the journal.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Http { .. } => FailureKind::Http,
            Self::Network(_) | Self::Decode(_) | Self::Encode(_) => FailureKind::Network,
        }
    }

    /// Only transport failures are worth another attempt.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

/// Result alias for remote calls.
pub type ApiResult<T> = Result<T, RequestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_error_message_carries_status() {
        let err = RequestError::Http {
            status: 503,
            status_text: "Service Unavailable".to_string(),
        };
        assert_eq!(err.to_string(), "API request failed: 503 Service Unavailable");
        assert_eq!(err.kind(), FailureKind::Http);
        assert!(!err.is_transient());
    }

    #[test]
    fn decode_errors_count_as_network_failures() {
        let err = RequestError::Decode("expected value at line 1".to_string());
        assert_eq!(err.kind(), FailureKind::Network);
        assert!(!err.is_transient());
    }

    #[test]
    fn only_transport_errors_are_transient() {
        assert!(RequestError::Network("connection refused".to_string()).is_transient());
        assert!(!RequestError::Encode("bad".to_string()).is_transient());
    }

    #[test]
    fn failure_kind_display() {
        assert_eq!(FailureKind::Network.to_string(), "network");
        assert_eq!(FailureKind::Http.to_string(), "http");
        assert_eq!(FailureKind::Logical.to_string(), "logical");
    }
}
