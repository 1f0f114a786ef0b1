//! Error types for the network layer.

use thiserror::Error;

/// A request never produced a response.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The HTTP client failed (connection, TLS, body read).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The request could not be built.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A scripted or in-memory transport failure.
    #[error("connection failed: {0}")]
    Connection(String),
}

/// Errors that can occur during network operations.
#[derive(Debug, Error)]
pub enum NetError {
    /// The endpoint URL does not have the `http(s)://.../graphql` shape.
    #[error("invalid GraphQL endpoint: {0}")]
    InvalidEndpoint(String),

    /// Transport failures persisted through every retry.
    #[error("Failed to fetch from {url} after {retries} retries")]
    RetriesExhausted {
        url: String,
        retries: u32,
        #[source]
        source: TransportError,
    },

    /// Transport failure on a single, unretried request.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The server answered with a non-success status.
    #[error("{status_text}")]
    Status { status: u16, status_text: String },

    /// The response body was not the expected JSON.
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl NetError {
    /// The HTTP status, for status errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            NetError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type for network operations.
pub type Result<T> = std::result::Result<T, NetError>;
