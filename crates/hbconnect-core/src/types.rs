//! Strong type definitions for hbconnect.
//!
//! Identifiers are newtypes; envelopes carry their tags in insertion order.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::crypto::sha256;
use crate::error::CoreError;

/// A 32-byte data item identifier: SHA-256 of the raw signature.
///
/// Rendered as unpadded base64url, which is how nodes and gateways
/// address messages and processes.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ItemId(pub [u8; 32]);

impl ItemId {
    /// Create a new ItemId from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Derive the content ID of a signed item from its raw signature.
    pub fn from_signature(signature: &[u8]) -> Self {
        Self(sha256(signature))
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Encode as unpadded base64url.
    pub fn to_base64url(&self) -> String {
        URL_SAFE_NO_PAD.encode(self.0)
    }

    /// Parse from unpadded base64url.
    pub fn from_base64url(s: &str) -> Result<Self, CoreError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(s)
            .map_err(|e| CoreError::DecodingError(e.to_string()))?;
        let arr: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| CoreError::DecodingError(format!("id must be 32 bytes, got {}", bytes.len())))?;
        Ok(Self(arr))
    }
}

impl fmt::Debug for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ItemId({})", self.to_base64url())
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base64url())
    }
}

impl std::str::FromStr for ItemId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_base64url(s)
    }
}

impl AsRef<[u8]> for ItemId {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for ItemId {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

/// A `{name, value}` pair attached to a data item.
///
/// Names are not unique: protocol tags may sit next to same-named user tags.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    pub value: String,
}

impl Tag {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// The unsigned content of a data item: everything the signature commits to
/// apart from the signer's identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Envelope {
    /// Base64url address of the recipient (process or wallet).
    pub target: Option<String>,
    /// Opaque anchor; empty means "no anchor".
    pub anchor: String,
    /// Ordered tags. Order is part of the signed encoding.
    pub tags: Vec<Tag>,
    /// Raw payload bytes.
    pub payload: Bytes,
}

impl Envelope {
    /// Find the first tag with the given name.
    pub fn tag(&self, name: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|t| t.name == name)
            .map(|t| t.value.as_str())
    }
}

/// A signed, content-addressed data item ready for submission.
#[derive(Clone, PartialEq, Eq)]
pub struct SignedDataItem {
    pub id: ItemId,
    pub raw: Bytes,
}

impl fmt::Debug for SignedDataItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignedDataItem")
            .field("id", &self.id)
            .field("len", &self.raw.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_id_base64url_roundtrip() {
        let id = ItemId::from_bytes([0xfb; 32]);
        let text = id.to_base64url();
        assert_eq!(text.len(), 43);
        assert!(!text.contains('=') && !text.contains('+') && !text.contains('/'));
        assert_eq!(ItemId::from_base64url(&text).unwrap(), id);
    }

    #[test]
    fn test_item_id_rejects_wrong_length() {
        assert!(ItemId::from_base64url("AAAA").is_err());
    }

    #[test]
    fn test_item_id_from_signature() {
        let id = ItemId::from_signature(b"abc");
        // SHA-256("abc")
        assert_eq!(id.to_base64url(), "ungWv48Bz-pBQUDeXa4iI7ADYaOWF3qctBD_YfIAFa0");
    }

    #[test]
    fn test_envelope_tag_lookup_first_match() {
        let envelope = Envelope {
            tags: vec![Tag::new("type", "User"), Tag::new("type", "Message")],
            ..Default::default()
        };
        assert_eq!(envelope.tag("type"), Some("User"));
        assert_eq!(envelope.tag("missing"), None);
    }
}
