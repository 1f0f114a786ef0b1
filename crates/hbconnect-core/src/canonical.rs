//! Canonical ANS-104 encoding for data items.
//!
//! Layout (integers little-endian):
//!
//! ```text
//! sig_type:u16 | signature | owner | target_flag:u8 [target:32]
//!   | anchor_flag:u8 [anchor:32] | tag_count:u64 | tag_len:u64 | tags | data
//! ```
//!
//! An unsigned item has its signature region zero-filled. Signing fills
//! exactly that region, so the rest of the encoding (and therefore the
//! signature data) never changes between the unsigned and signed forms.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use std::ops::Range;

use crate::crypto::SignatureType;
use crate::dataitem::DataItem;
use crate::deep_hash::{deep_hash_blobs, DeepHash};
use crate::error::{CoreError, Result};
use crate::tags::encode_tags;
use crate::types::Envelope;
use crate::validation::check_tags;

/// Byte offset of the signature region: it follows the 2-byte type prefix.
pub const SIGNATURE_OFFSET: usize = 2;

/// Length of the target and anchor fields when present.
pub const TARGET_LENGTH: usize = 32;
pub const ANCHOR_LENGTH: usize = 32;

/// Byte range the signature occupies for a given scheme.
pub const fn signature_range(signature_type: SignatureType) -> Range<usize> {
    SIGNATURE_OFFSET..SIGNATURE_OFFSET + signature_type.signature_length()
}

/// Encode an envelope as an unsigned data item owned by `owner`.
///
/// Fails when the owner does not fit the scheme, the target is not a
/// 32-byte base64url address, the anchor is not 32 bytes, or the tags
/// break the protocol limits.
pub fn unsigned_bytes(
    envelope: &Envelope,
    signature_type: SignatureType,
    owner: &[u8],
) -> Result<Vec<u8>> {
    let owner_len = signature_type.public_key_length();
    if owner.len() != owner_len {
        return Err(CoreError::InvalidPublicKeyLength {
            expected: owner_len,
            actual: owner.len(),
        });
    }

    let target = match envelope.target.as_deref() {
        Some(t) if !t.is_empty() => Some(decode_target(t)?),
        _ => None,
    };

    let anchor = if envelope.anchor.is_empty() {
        None
    } else {
        let bytes = envelope.anchor.as_bytes();
        if bytes.len() != ANCHOR_LENGTH {
            return Err(CoreError::InvalidAnchor(bytes.len()));
        }
        Some(bytes)
    };

    check_tags(&envelope.tags).map_err(|e| CoreError::InvalidTag(e.to_string()))?;
    let tag_bytes = encode_tags(&envelope.tags);

    let len = SIGNATURE_OFFSET
        + signature_type.signature_length()
        + owner_len
        + 1
        + target.as_ref().map_or(0, |t| t.len())
        + 1
        + anchor.map_or(0, |a| a.len())
        + 16
        + tag_bytes.len()
        + envelope.payload.len();

    let mut buf = Vec::with_capacity(len);
    buf.extend_from_slice(&signature_type.to_u16().to_le_bytes());
    buf.resize(SIGNATURE_OFFSET + signature_type.signature_length(), 0);
    buf.extend_from_slice(owner);

    match &target {
        Some(t) => {
            buf.push(1);
            buf.extend_from_slice(t);
        }
        None => buf.push(0),
    }

    match anchor {
        Some(a) => {
            buf.push(1);
            buf.extend_from_slice(a);
        }
        None => buf.push(0),
    }

    buf.extend_from_slice(&(envelope.tags.len() as u64).to_le_bytes());
    buf.extend_from_slice(&(tag_bytes.len() as u64).to_le_bytes());
    buf.extend_from_slice(&tag_bytes);
    buf.extend_from_slice(&envelope.payload);

    debug_assert_eq!(buf.len(), len);
    Ok(buf)
}

/// Compute the signature data (deep hash) of an encoded item.
///
/// The signature region is not part of the input, so the value is the
/// same for the unsigned and the signed bytes.
pub fn signature_data(item: &DataItem<'_>) -> DeepHash {
    let signature_type = item.signature_type.to_u16().to_string();
    deep_hash_blobs(&[
        b"dataitem".as_slice(),
        b"1".as_slice(),
        signature_type.as_bytes(),
        item.owner,
        item.target.unwrap_or_default(),
        item.anchor.unwrap_or_default(),
        item.raw_tags,
        item.data,
    ])
}

/// Write `signature` into the signature region of `bytes` in place.
pub fn inject_signature(bytes: &mut [u8], signature: &[u8]) -> Result<()> {
    let signature_type = read_signature_type(bytes)?;
    let range = signature_range(signature_type);
    if signature.len() != range.len() {
        return Err(CoreError::InvalidSignatureLength {
            expected: range.len(),
            actual: signature.len(),
        });
    }
    if bytes.len() < range.end {
        return Err(CoreError::MalformedDataItem("too short for signature".into()));
    }
    bytes[range].copy_from_slice(signature);
    Ok(())
}

/// Read the 2-byte signature type prefix.
pub fn read_signature_type(bytes: &[u8]) -> Result<SignatureType> {
    let prefix: [u8; 2] = bytes
        .get(..SIGNATURE_OFFSET)
        .and_then(|b| b.try_into().ok())
        .ok_or_else(|| CoreError::MalformedDataItem("missing signature type".into()))?;
    SignatureType::from_u16(u16::from_le_bytes(prefix))
}

/// Decode a base64url target address into its 32 raw bytes.
pub fn decode_target(target: &str) -> Result<Vec<u8>> {
    let bytes = URL_SAFE_NO_PAD
        .decode(target.trim_end_matches('='))
        .map_err(|e| CoreError::InvalidTarget {
            target: target.to_string(),
            reason: e.to_string(),
        })?;
    if bytes.len() != TARGET_LENGTH {
        return Err(CoreError::InvalidTarget {
            target: target.to_string(),
            reason: format!("expected {TARGET_LENGTH} bytes, got {}", bytes.len()),
        });
    }
    Ok(bytes)
}
