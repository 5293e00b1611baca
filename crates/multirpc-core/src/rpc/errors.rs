use thiserror::Error;

/// Errors that can occur when talking to a single RPC endpoint.
///
/// This layer only knows about transport and JSON-RPC protocol failures;
/// engine-level semantics (rejections, confirmation outcomes, aggregate
/// failures) live in `engine::errors::EngineError`.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum RpcError {
    /// Request exceeded the configured timeout duration.
    #[error("request timeout")]
    Timeout,

    /// Failed to establish a connection to the endpoint.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// HTTP-level error occurred (non-2xx status code).
    ///
    /// First field is the HTTP status code, second is the error message.
    #[error("http error {0}: {1}")]
    Http(u16, String),

    /// JSON-RPC error returned by the endpoint.
    ///
    /// First field is the RPC error code, second is the error message.
    #[error("rpc error {0}: {1}")]
    Rpc(i32, String),

    /// Network-level error from the underlying HTTP client.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Response could not be parsed or was malformed.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Request validation failed before being sent.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl RpcError {
    /// Returns `true` if this error is a connectivity failure: the endpoint
    /// never produced a JSON-RPC answer (timeout, connect failure, 5xx/429,
    /// network-level trouble). These are the errors the confirmation poller
    /// counts against its connection-retry budget.
    #[must_use]
    pub fn is_connection(&self) -> bool {
        match self {
            Self::Timeout | Self::ConnectionFailed(_) => true,
            Self::Http(status, _) => (500..=599).contains(status) || *status == 429,
            Self::Network(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            _ => false,
        }
    }

    /// Returns `true` if the endpoint answered with a JSON-RPC rejection
    /// (as opposed to failing at the transport level).
    #[must_use]
    pub fn is_rpc_rejection(&self) -> bool {
        matches!(self, Self::Rpc(_, _))
    }

    /// The rejection message, when the endpoint produced one.
    #[must_use]
    pub fn rejection_message(&self) -> Option<&str> {
        match self {
            Self::Rpc(_, message) => Some(message),
            _ => None,
        }
    }
}

impl From<crate::types::ValueParseError> for RpcError {
    fn from(e: crate::types::ValueParseError) -> Self {
        RpcError::InvalidResponse(e.to_string())
    }
}
