//! Error types for hbconnect core.

use thiserror::Error;

/// Errors raised while encoding or decoding data items.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unsupported signature type: {0}")]
    UnsupportedSignatureType(u16),

    #[error("invalid public key length: expected {expected}, got {actual}")]
    InvalidPublicKeyLength { expected: usize, actual: usize },

    #[error("invalid signature length: expected {expected}, got {actual}")]
    InvalidSignatureLength { expected: usize, actual: usize },

    #[error("invalid public key")]
    InvalidPublicKey,

    #[error("invalid signature")]
    InvalidSignature,

    #[error("invalid target {target:?}: {reason}")]
    InvalidTarget { target: String, reason: String },

    #[error("anchor must be 32 bytes, got {0}")]
    InvalidAnchor(usize),

    #[error("invalid tag: {0}")]
    InvalidTag(String),

    #[error("malformed data item: {0}")]
    MalformedDataItem(String),

    #[error("decoding error: {0}")]
    DecodingError(String),
}

/// Validation errors for signed data items.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("signature verification failed")]
    SignatureFailed,

    #[error("unsupported signature type: {0}")]
    UnsupportedSignatureType(u16),

    #[error("too many tags: {0} (max 128)")]
    TooManyTags(usize),

    #[error("tag {index} has an invalid {field} length of {len} bytes")]
    TagLength {
        index: usize,
        field: &'static str,
        len: usize,
    },

    #[error("structural error: {0}")]
    StructuralError(String),
}

impl From<CoreError> for ValidationError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::InvalidSignature | CoreError::InvalidPublicKey => {
                ValidationError::SignatureFailed
            }
            CoreError::UnsupportedSignatureType(t) => ValidationError::UnsupportedSignatureType(t),
            other => ValidationError::StructuralError(other.to_string()),
        }
    }
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
