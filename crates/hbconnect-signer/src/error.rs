//! Error types for the signing protocol.

use thiserror::Error;

use crate::wallet::Permission;

/// Errors that can occur while signing a data item.
#[derive(Debug, Error)]
pub enum SignerError {
    /// The signer kind token is not one of the known kinds.
    #[error("signer kind unknown \"{0}\"")]
    UnknownKind(String),

    /// The authority settled without ever calling the construction callback.
    #[error("create() must be invoked in order to construct the data to sign")]
    ConstructionNeverInvoked,

    /// The authority returned neither a signed item nor a signature.
    #[error("signer must return its signature and address")]
    MissingSignature,

    /// A signature came back but no unsigned bytes were ever built.
    #[error("authority returned a signature without requesting signature data")]
    UnsignedDataUnavailable,

    /// The construction callback answered with the wrong shape for the request.
    #[error("unexpected construction result: {0}")]
    UnexpectedConstruction(&'static str),

    /// Self-verification of the signed item failed.
    #[error("data item signature is not valid")]
    InvalidSignature,

    /// The single-resolution cell was resolved twice.
    #[error("deferred value already resolved")]
    AlreadyResolved,

    /// The wallet refused a capability.
    #[error("permission not granted: {0}")]
    PermissionDenied(Permission),

    /// The wallet failed to produce what was asked of it.
    #[error("authority error: {0}")]
    Authority(String),

    /// Encoding the envelope failed.
    #[error("encoding error: {0}")]
    Encoding(#[from] hbconnect_core::CoreError),
}

impl SignerError {
    /// Errors caused by how the signer was set up rather than by what the
    /// authority returned.
    pub fn is_configuration(&self) -> bool {
        matches!(self, SignerError::UnknownKind(_) | SignerError::Encoding(_))
    }

    /// Errors that mean the authority (or its adapter) broke the protocol.
    pub fn is_protocol_violation(&self) -> bool {
        matches!(
            self,
            SignerError::ConstructionNeverInvoked
                | SignerError::MissingSignature
                | SignerError::UnsignedDataUnavailable
                | SignerError::UnexpectedConstruction(_)
                | SignerError::InvalidSignature
                | SignerError::AlreadyResolved
        )
    }
}

/// Result type for signing operations.
pub type Result<T> = std::result::Result<T, SignerError>;
