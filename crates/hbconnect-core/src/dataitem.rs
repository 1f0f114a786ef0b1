//! Borrowed view over an encoded data item.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

use crate::canonical::{read_signature_type, signature_data, ANCHOR_LENGTH, SIGNATURE_OFFSET, TARGET_LENGTH};
use crate::crypto::{owner_address, SignatureType};
use crate::deep_hash::DeepHash;
use crate::error::{CoreError, Result, ValidationError};
use crate::tags::decode_tags;
use crate::types::{ItemId, Tag};

/// The regions of an encoded data item, borrowed from its bytes.
#[derive(Debug, Clone, Copy)]
pub struct DataItem<'a> {
    pub signature_type: SignatureType,
    pub signature: &'a [u8],
    pub owner: &'a [u8],
    pub target: Option<&'a [u8]>,
    pub anchor: Option<&'a [u8]>,
    /// Tag count as declared in the header.
    pub tag_count: u64,
    /// Avro-encoded tag bytes.
    pub raw_tags: &'a [u8],
    pub data: &'a [u8],
    raw: &'a [u8],
}

impl<'a> DataItem<'a> {
    /// Split encoded bytes into their regions.
    ///
    /// Only the layout is checked here; see
    /// [`verify_data_item`](crate::validation::verify_data_item) for tags
    /// and signature.
    pub fn parse(bytes: &'a [u8]) -> Result<Self> {
        let signature_type = read_signature_type(bytes)?;
        let mut cursor = Cursor {
            bytes,
            pos: SIGNATURE_OFFSET,
        };

        let signature = cursor.take(signature_type.signature_length(), "signature")?;
        let owner = cursor.take(signature_type.public_key_length(), "owner")?;
        let target = cursor.optional(TARGET_LENGTH, "target")?;
        let anchor = cursor.optional(ANCHOR_LENGTH, "anchor")?;
        let tag_count = cursor.u64("tag count")?;
        let tag_len = cursor.u64("tag length")?;
        let tag_len = usize::try_from(tag_len)
            .map_err(|_| CoreError::MalformedDataItem("tag length overflow".into()))?;
        let raw_tags = cursor.take(tag_len, "tags")?;
        let data = &bytes[cursor.pos..];

        Ok(Self {
            signature_type,
            signature,
            owner,
            target,
            anchor,
            tag_count,
            raw_tags,
            data,
            raw: bytes,
        })
    }

    /// The full encoded bytes.
    pub fn raw(&self) -> &'a [u8] {
        self.raw
    }

    /// Content ID: SHA-256 of the raw signature.
    pub fn id(&self) -> ItemId {
        ItemId::from_signature(self.signature)
    }

    /// Address of the owner key.
    pub fn owner_address(&self) -> String {
        owner_address(self.owner)
    }

    /// Target as a base64url address.
    pub fn target_address(&self) -> Option<String> {
        self.target.map(|t| URL_SAFE_NO_PAD.encode(t))
    }

    /// Anchor as text (anchors are written from their UTF-8 bytes).
    pub fn anchor_text(&self) -> Option<String> {
        self.anchor.map(|a| String::from_utf8_lossy(a).into_owned())
    }

    /// Decode the tags.
    pub fn tags(&self) -> Result<Vec<Tag>> {
        decode_tags(self.raw_tags)
    }

    /// The deep hash the signature must cover.
    pub fn signature_data(&self) -> DeepHash {
        signature_data(self)
    }

    /// Check structure, tag limits and the signature.
    pub fn verify(&self) -> std::result::Result<(), ValidationError> {
        crate::validation::validate_structure(self)?;
        crate::validation::verify_signature(self)
    }

    /// True when the signature region is still zero-filled.
    pub fn is_unsigned(&self) -> bool {
        self.signature.iter().all(|b| *b == 0)
    }
}

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn take(&mut self, len: usize, what: &str) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.bytes.len())
            .ok_or_else(|| CoreError::MalformedDataItem(format!("truncated {what}")))?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn optional(&mut self, len: usize, what: &str) -> Result<Option<&'a [u8]>> {
        match self.take(1, what)?[0] {
            0 => Ok(None),
            1 => self.take(len, what).map(Some),
            flag => Err(CoreError::MalformedDataItem(format!(
                "invalid {what} presence byte {flag}"
            ))),
        }
    }

    fn u64(&mut self, what: &str) -> Result<u64> {
        let bytes: [u8; 8] = self
            .take(8, what)?
            .try_into()
            .map_err(|_| CoreError::MalformedDataItem(format!("truncated {what}")))?;
        Ok(u64::from_le_bytes(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canonical::{inject_signature, unsigned_bytes};
    use crate::types::Envelope;

    const TARGET: &str = "AQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQE";

    fn encoded() -> Vec<u8> {
        let envelope = Envelope {
            target: Some(TARGET.into()),
            anchor: "0123456789abcdef0123456789abcdef".into(),
            tags: vec![Tag::new("Action", "Balance")],
            payload: b"payload".to_vec().into(),
        };
        unsigned_bytes(&envelope, SignatureType::Ed25519, &[0x22; 32]).unwrap()
    }

    #[test]
    fn test_parse_regions() {
        let bytes = encoded();
        let item = DataItem::parse(&bytes).unwrap();

        assert_eq!(item.signature_type, SignatureType::Ed25519);
        assert_eq!(item.signature.len(), 64);
        assert_eq!(item.owner, &[0x22; 32]);
        assert_eq!(item.target_address().as_deref(), Some(TARGET));
        assert_eq!(
            item.anchor_text().as_deref(),
            Some("0123456789abcdef0123456789abcdef")
        );
        assert_eq!(item.tag_count, 1);
        assert_eq!(item.tags().unwrap(), vec![Tag::new("Action", "Balance")]);
        assert_eq!(item.data, b"payload");
        assert!(item.is_unsigned());
        assert_eq!(item.raw().len(), bytes.len());
    }

    #[test]
    fn test_id_tracks_signature() {
        let mut bytes = encoded();
        inject_signature(&mut bytes, &[0x33; 64]).unwrap();
        let item = DataItem::parse(&bytes).unwrap();
        assert!(!item.is_unsigned());
        assert_eq!(item.id(), ItemId::from_signature(&[0x33; 64]));
    }

    #[test]
    fn test_parse_truncated() {
        let bytes = encoded();
        assert!(DataItem::parse(&bytes[..50]).is_err());
        assert!(DataItem::parse(&bytes[..1]).is_err());
    }

    #[test]
    fn test_parse_bad_presence_byte() {
        let mut bytes = encoded();
        // target presence byte for Ed25519 items
        bytes[98] = 7;
        assert!(matches!(
            DataItem::parse(&bytes),
            Err(CoreError::MalformedDataItem(_))
        ));
    }

    #[test]
    fn test_parse_unknown_signature_type() {
        let mut bytes = encoded();
        bytes[0] = 9;
        assert!(matches!(
            DataItem::parse(&bytes),
            Err(CoreError::UnsupportedSignatureType(9))
        ));
    }
}
