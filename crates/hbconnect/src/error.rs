//! Error types for the node client.

use hbconnect_net::NetError;
use hbconnect_signer::SignerError;
use thiserror::Error;

/// Broad classes of failure a caller may want to branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Bad setup or arguments; never retried.
    Configuration,
    /// A signing authority or node broke the protocol.
    ProtocolViolation,
    /// No response could be obtained.
    Transport,
    /// The server answered with a failure.
    Http,
}

/// Errors that can occur during client operations.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("missed wallet")]
    MissingWallet,

    #[error("Missed target process")]
    MissingTarget,

    #[error("missed process id.")]
    MissingProcess,

    #[error("missed message or slot.")]
    MissingMessageOrSlot,

    /// Signing failed.
    #[error("signing error: {0}")]
    Signer(#[from] SignerError),

    /// Network error.
    #[error("network error: {0}")]
    Net(#[from] NetError),

    /// Non-success status, with the response body.
    #[error("{status}: {body}")]
    Http { status: u16, body: String },

    #[error("Spawn failed ({status})")]
    SpawnFailed { status: u16 },

    /// The GraphQL response carried errors or lacked the expected shape.
    #[error("query error: {0}")]
    Query(String),

    /// A node response was not the expected JSON.
    #[error("invalid response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ClientError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ClientError::MissingWallet
            | ClientError::MissingTarget
            | ClientError::MissingProcess
            | ClientError::MissingMessageOrSlot => ErrorCategory::Configuration,
            ClientError::Signer(e) if e.is_configuration() => ErrorCategory::Configuration,
            ClientError::Signer(SignerError::PermissionDenied(_)) => ErrorCategory::Configuration,
            ClientError::Signer(_) => ErrorCategory::ProtocolViolation,
            ClientError::Net(NetError::InvalidEndpoint(_)) => ErrorCategory::Configuration,
            ClientError::Net(NetError::RetriesExhausted { .. } | NetError::Transport(_)) => {
                ErrorCategory::Transport
            }
            ClientError::Net(NetError::Status { .. }) => ErrorCategory::Http,
            ClientError::Net(NetError::Decode(_)) | ClientError::Decode(_) => {
                ErrorCategory::ProtocolViolation
            }
            ClientError::Http { .. } | ClientError::SpawnFailed { .. } | ClientError::Query(_) => {
                ErrorCategory::Http
            }
        }
    }

    /// HTTP status, when the failure came with one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Http { status, .. } | ClientError::SpawnFailed { status } => Some(*status),
            ClientError::Net(e) => e.status(),
            _ => None,
        }
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;
    use hbconnect_net::TransportError;

    #[test]
    fn test_argument_errors_are_configuration() {
        for err in [
            ClientError::MissingWallet,
            ClientError::MissingTarget,
            ClientError::MissingProcess,
            ClientError::MissingMessageOrSlot,
        ] {
            assert_eq!(err.category(), ErrorCategory::Configuration, "{err}");
            assert_eq!(err.status(), None);
        }
    }

    #[test]
    fn test_categories() {
        assert_eq!(ClientError::MissingTarget.category(), ErrorCategory::Configuration);
        assert_eq!(
            ClientError::from(SignerError::UnknownKind("x".into())).category(),
            ErrorCategory::Configuration
        );
        assert_eq!(
            ClientError::from(SignerError::ConstructionNeverInvoked).category(),
            ErrorCategory::ProtocolViolation
        );
        assert_eq!(
            ClientError::from(SignerError::InvalidSignature).category(),
            ErrorCategory::ProtocolViolation
        );
        assert_eq!(
            ClientError::from(NetError::InvalidEndpoint("ftp://x".into())).category(),
            ErrorCategory::Configuration
        );
        let exhausted = NetError::RetriesExhausted {
            url: "https://x/graphql".into(),
            retries: 2,
            source: TransportError::Connection("reset".into()),
        };
        assert_eq!(ClientError::from(exhausted).category(), ErrorCategory::Transport);
        let http = ClientError::Http {
            status: 500,
            body: "boom".into(),
        };
        assert_eq!(http.category(), ErrorCategory::Http);
        assert_eq!(http.to_string(), "500: boom");
        assert_eq!(http.status(), Some(500));
    }
}
