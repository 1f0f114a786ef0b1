//! Data item validation: tag limits, structure, and signature verification.

use crate::dataitem::DataItem;
use crate::error::ValidationError;
use crate::tags::{MAX_TAG_COUNT, MAX_TAG_NAME_BYTES, MAX_TAG_VALUE_BYTES};
use crate::types::Tag;

/// Check tags against the protocol limits.
///
/// - at most 128 tags
/// - names are 1..=1024 bytes
/// - values are 1..=3072 bytes
pub fn check_tags(tags: &[Tag]) -> Result<(), ValidationError> {
    if tags.len() > MAX_TAG_COUNT {
        return Err(ValidationError::TooManyTags(tags.len()));
    }

    for (index, tag) in tags.iter().enumerate() {
        let name_len = tag.name.len();
        if name_len == 0 || name_len > MAX_TAG_NAME_BYTES {
            return Err(ValidationError::TagLength {
                index,
                field: "name",
                len: name_len,
            });
        }
        let value_len = tag.value.len();
        if value_len == 0 || value_len > MAX_TAG_VALUE_BYTES {
            return Err(ValidationError::TagLength {
                index,
                field: "value",
                len: value_len,
            });
        }
    }

    Ok(())
}

/// Validate a data item's structure without checking its signature.
///
/// This performs:
/// - Layout parse (signature type, region lengths, presence bytes)
/// - Tag decode, with the declared count matching the decoded count
/// - Tag limits
pub fn validate_structure(item: &DataItem<'_>) -> Result<(), ValidationError> {
    let tags = item.tags()?;
    if tags.len() as u64 != item.tag_count {
        return Err(ValidationError::StructuralError(format!(
            "header declares {} tags, found {}",
            item.tag_count,
            tags.len()
        )));
    }
    check_tags(&tags)
}

/// Fully validate encoded data item bytes: structure, then signature.
pub fn verify_data_item(bytes: &[u8]) -> Result<(), ValidationError> {
    let item = DataItem::parse(bytes)?;
    validate_structure(&item)?;
    verify_signature(&item)
}

/// Verify the item's signature against its owner and signature data.
pub fn verify_signature(item: &DataItem<'_>) -> Result<(), ValidationError> {
    let message = item.signature_data();
    item.signature_type
        .verify(item.owner, &message, item.signature)
        .map_err(|_| ValidationError::SignatureFailed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canonical::{inject_signature, unsigned_bytes};
    use crate::crypto::SignatureType;
    use crate::types::Envelope;
    use ed25519_dalek::{Signer, SigningKey};

    fn signing_key() -> SigningKey {
        SigningKey::from_bytes(&[0x42; 32])
    }

    fn signed(envelope: &Envelope) -> Vec<u8> {
        let key = signing_key();
        let owner = key.verifying_key().to_bytes();
        let mut bytes = unsigned_bytes(envelope, SignatureType::Ed25519, &owner).unwrap();
        let message = DataItem::parse(&bytes).unwrap().signature_data();
        inject_signature(&mut bytes, &key.sign(&message).to_bytes()).unwrap();
        bytes
    }

    fn envelope() -> Envelope {
        Envelope {
            target: None,
            anchor: String::new(),
            tags: vec![Tag::new("Action", "Eval"), Tag::new("Type", "Message")],
            payload: b"return 1".to_vec().into(),
        }
    }

    #[test]
    fn test_valid_item() {
        let bytes = signed(&envelope());
        assert!(verify_data_item(&bytes).is_ok());
    }

    #[test]
    fn test_unsigned_item_fails() {
        let owner = signing_key().verifying_key().to_bytes();
        let bytes = unsigned_bytes(&envelope(), SignatureType::Ed25519, &owner).unwrap();
        assert!(matches!(
            verify_data_item(&bytes),
            Err(ValidationError::SignatureFailed)
        ));
    }

    #[test]
    fn test_tampered_payload_fails() {
        let mut bytes = signed(&envelope());
        let last = bytes.len() - 1;
        bytes[last] ^= 0x01;
        assert!(matches!(
            verify_data_item(&bytes),
            Err(ValidationError::SignatureFailed)
        ));
    }

    #[test]
    fn test_tag_count_mismatch() {
        let mut bytes = signed(&envelope());
        // tag count lives right after the two absent-field flags
        bytes[100] = 3;
        assert!(matches!(
            verify_data_item(&bytes),
            Err(ValidationError::StructuralError(_))
        ));
    }

    #[test]
    fn test_check_tags_limits() {
        assert!(check_tags(&[]).is_ok());

        let too_many: Vec<Tag> = (0..129).map(|i| Tag::new(format!("n{i}"), "v")).collect();
        assert!(matches!(
            check_tags(&too_many),
            Err(ValidationError::TooManyTags(129))
        ));

        assert!(matches!(
            check_tags(&[Tag::new("", "v")]),
            Err(ValidationError::TagLength { index: 0, field: "name", len: 0 })
        ));
        assert!(matches!(
            check_tags(&[Tag::new("ok", "v"), Tag::new("n", "v".repeat(3073))]),
            Err(ValidationError::TagLength { index: 1, field: "value", .. })
        ));
        assert!(check_tags(&[Tag::new("n".repeat(1024), "v".repeat(3072))]).is_ok());
    }

    #[test]
    fn test_unsupported_type_maps_through() {
        let mut bytes = signed(&envelope());
        bytes[0] = 7;
        assert!(matches!(
            verify_data_item(&bytes),
            Err(ValidationError::UnsupportedSignatureType(7))
        ));
    }
}
