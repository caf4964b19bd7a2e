//! Error types for the HTTP client core.

use serde_json::Value;
use thiserror::Error;

/// Failure below HTTP: no response was received.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Could not connect to the backend
    #[error("Connection failed: {0}")]
    Connect(String),

    /// Request exceeded the configured timeout
    #[error("Request timed out")]
    Timeout,

    /// Any other transport-level failure
    #[error("Transport failure: {0}")]
    Other(String),
}

impl TransportError {
    /// Returns true if the request could succeed when sent again.
    pub fn is_transient(&self) -> bool {
        matches!(self, TransportError::Connect(_) | TransportError::Timeout)
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else if err.is_connect() {
            TransportError::Connect(err.to_string())
        } else {
            TransportError::Other(err.to_string())
        }
    }
}

/// Error returned by every request issued through the client core.
#[derive(Error, Debug)]
pub enum ApiError {
    /// No response received; surfaced unchanged
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Final authorization failure
    #[error("Unauthorized: {path}")]
    Unauthorized { path: String, body: Value },

    /// Any other non-2xx response
    #[error("HTTP {status} from {path}{}", describe(.body))]
    Status {
        status: u16,
        path: String,
        body: Value,
    },

    /// Response body did not have the expected shape
    #[error("Unexpected response from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// Response decoded but violates the backend contract
    #[error("Invalid response from {path}: {reason}")]
    Protocol { path: String, reason: String },

    /// Client construction or configuration problem
    #[error("Configuration error: {0}")]
    Config(String),

    /// The owning session was disposed
    #[error("Session closed")]
    Closed,
}

impl ApiError {
    /// Returns true if a caller-level retry could succeed.
    ///
    /// Transient errors are connection failures, timeouts, and 5xx responses.
    /// Authorization failures are never transient: the core has already made
    /// its single refresh attempt.
    pub fn is_transient(&self) -> bool {
        match self {
            ApiError::Transport(e) => e.is_transient(),
            ApiError::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }

    /// HTTP status of the failed response, if one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized { .. } => Some(401),
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Server-provided message from the error body (`message` or `error`).
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Unauthorized { body, .. } | ApiError::Status { body, .. } => {
                body_message(body)
            }
            _ => None,
        }
    }
}

fn body_message(body: &Value) -> Option<&str> {
    match body {
        Value::String(s) if !s.is_empty() => Some(s.as_str()),
        Value::Object(map) => map
            .get("message")
            .or_else(|| map.get("error"))
            .and_then(Value::as_str),
        _ => None,
    }
}

fn describe(body: &Value) -> String {
    body_message(body)
        .map(|m| format!(": {}", m))
        .unwrap_or_default()
}

/// Result type alias using ApiError.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_is_transient_transport() {
        assert!(ApiError::Transport(TransportError::Timeout).is_transient());
        assert!(ApiError::Transport(TransportError::Connect("refused".into())).is_transient());
        assert!(!ApiError::Transport(TransportError::Other("bad url".into())).is_transient());
    }

    #[test]
    fn test_is_transient_server_errors_only() {
        let server = ApiError::Status {
            status: 503,
            path: "/api/orders".into(),
            body: Value::Null,
        };
        let client = ApiError::Status {
            status: 404,
            path: "/api/orders".into(),
            body: Value::Null,
        };
        assert!(server.is_transient());
        assert!(!client.is_transient());
    }

    #[test]
    fn test_is_not_transient_unauthorized() {
        let err = ApiError::Unauthorized {
            path: "/api/orders".into(),
            body: Value::Null,
        };
        assert!(!err.is_transient());
        assert!(err.is_unauthorized());
        assert_eq!(err.status(), Some(401));
    }

    #[test]
    fn test_server_message_extraction() {
        let err = ApiError::Status {
            status: 409,
            path: "/api/cart/items".into(),
            body: json!({"message": "Out of stock"}),
        };
        assert_eq!(err.server_message(), Some("Out of stock"));
        assert_eq!(err.to_string(), "HTTP 409 from /api/cart/items: Out of stock");

        let err = ApiError::Status {
            status: 500,
            path: "/api/orders".into(),
            body: json!({"error": "boom"}),
        };
        assert_eq!(err.server_message(), Some("boom"));

        let err = ApiError::Status {
            status: 502,
            path: "/api/orders".into(),
            body: Value::Null,
        };
        assert_eq!(err.server_message(), None);
        assert_eq!(err.to_string(), "HTTP 502 from /api/orders");
    }
}
