use thiserror::Error;

/// Failure classes the discovery session reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Transient transport failure; keep the last good state.
    Network,
    /// The backend rejected or failed the query; keep the last good state.
    Server,
    /// A forward-geocode query matched nothing; report, do not retry.
    NotFound,
}

/// Errors returned by the backend and geocoder clients.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{operation} timed out after {after_secs}s")]
    Timeout {
        operation: &'static str,
        after_secs: u64,
    },

    /// Non-2xx status, or a 2xx envelope with `"success": false`.
    #[error("server error (status {status}): {message}")]
    Server { status: u16, message: String },

    #[error("no place found for \"{query}\"")]
    NotFound { query: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

impl ClientError {
    /// Maps the error onto the recovery taxonomy.
    ///
    /// Malformed bodies and bad configuration are reported as server-side
    /// failures: neither is fixed by waiting.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Http(_) | ClientError::Timeout { .. } => ErrorKind::Network,
            ClientError::NotFound { .. } => ErrorKind::NotFound,
            ClientError::Server { .. }
            | ClientError::Deserialize { .. }
            | ClientError::InvalidBaseUrl { .. } => ErrorKind::Server,
        }
    }
}

/// Failure to obtain the device's current position.
///
/// Both variants are recoverable: callers fall back to the configured
/// default center.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LocationError {
    #[error("location permission denied")]
    PermissionDenied,

    #[error("location unavailable: {0}")]
    Unavailable(String),
}
