use std::fmt;
use thiserror::Error;

/// Result type for Bravia operations
pub type Result<T> = std::result::Result<T, BraviaError>;

/// Classification of a transport-level failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The request did not complete within the configured timeout
    Timeout,
    /// The TV could not be reached (refused, unroutable, DNS)
    Connection,
    /// Anything else: bad HTTP status, truncated body, malformed HTTP
    Other,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FailureKind::Timeout => "timeout",
            FailureKind::Connection => "connection",
            FailureKind::Other => "transport",
        };
        f.write_str(label)
    }
}

/// Errors that can occur when talking to a Bravia TV
#[derive(Error, Debug)]
pub enum BraviaError {
    /// The HTTP exchange itself failed
    #[error("HTTP {kind} error: {detail}")]
    Transport {
        /// What kind of failure occurred
        kind: FailureKind,
        /// Human readable description from the HTTP layer
        detail: String,
    },

    /// The TV answered with an `error` payload
    #[error("API error {code}: {message}")]
    Api {
        /// Numeric error code reported by the TV
        code: i64,
        /// Error message reported by the TV
        message: String,
    },

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid or unexpected response from the TV
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A hardware address could not be parsed
    #[error("Invalid MAC address: {0}")]
    InvalidMac(String),

    /// Wake-on-LAN was requested but no MAC address is configured
    #[error("No MAC address configured")]
    MissingMac,

    /// The underlying HTTP client could not be created
    #[error("HTTP client error: {0}")]
    HttpClient(String),
}

impl BraviaError {
    /// Build a transport error of the given kind
    pub(crate) fn transport(kind: FailureKind, detail: impl Into<String>) -> Self {
        BraviaError::Transport {
            kind,
            detail: detail.into(),
        }
    }

    /// The transport failure kind, if this is a transport error
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            BraviaError::Transport { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// The device error code, if this is a protocol-level error
    pub fn api_code(&self) -> Option<i64> {
        match self {
            BraviaError::Api { code, .. } => Some(*code),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for BraviaError {
    fn from(error: reqwest::Error) -> Self {
        let kind = if error.is_timeout() {
            FailureKind::Timeout
        } else if error.is_connect() {
            FailureKind::Connection
        } else {
            FailureKind::Other
        };
        BraviaError::transport(kind, error.to_string())
    }
}
