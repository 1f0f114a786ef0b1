//! Proptest generators for property-based testing.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use bytes::Bytes;
use ed25519_dalek::{Signer, SigningKey};
use hbconnect_core::canonical::signature_data;
use hbconnect_core::{
    inject_signature, unsigned_bytes, CoreError, DataItem, Envelope, Fields, ItemId,
    SignatureType, SignedDataItem, Tag,
};
use proptest::prelude::*;

/// Generate a random ItemId.
pub fn item_id() -> impl Strategy<Value = ItemId> {
    any::<[u8; 32]>().prop_map(ItemId::from_bytes)
}

/// Generate a base64url target address.
pub fn target() -> impl Strategy<Value = String> {
    any::<[u8; 32]>().prop_map(|bytes| URL_SAFE_NO_PAD.encode(bytes))
}

/// Generate a 32-byte ASCII anchor.
pub fn anchor() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9]{32}".prop_map(String::from)
}

/// Generate a tag within the protocol limits.
pub fn tag() -> impl Strategy<Value = Tag> {
    ("[A-Za-z][A-Za-z0-9-]{0,23}", "[ -~]{1,64}").prop_map(|(name, value)| Tag::new(name, value))
}

/// Generate up to `max` tags.
pub fn tags(max: usize) -> impl Strategy<Value = Vec<Tag>> {
    prop::collection::vec(tag(), 0..=max)
}

/// Generate payload bytes of specified max length.
pub fn payload(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..=max_len)
}

/// Generate an envelope with optional target and anchor.
pub fn envelope() -> impl Strategy<Value = Envelope> {
    (
        prop::option::of(target()),
        prop::option::of(anchor()),
        tags(12),
        payload(512),
    )
        .prop_map(|(target, anchor, tags, payload)| Envelope {
            target,
            anchor: anchor.unwrap_or_default(),
            tags,
            payload: Bytes::from(payload),
        })
}

/// Generate a user field key that is not a reserved request key.
pub fn field_key() -> impl Strategy<Value = String> {
    "[A-Z][a-z]{2,10}(-[A-Z][a-z]{1,6})?"
        .prop_filter("reserved key", |k| !hbconnect_core::request::is_reserved(k))
}

/// Generate request fields with distinct user keys and text values.
pub fn fields(max: usize) -> impl Strategy<Value = Fields> {
    prop::collection::btree_map(field_key(), "[ -~]{1,32}", 0..=max)
        .prop_map(|map| map.into_iter().collect())
}

/// Parameters for generating a signed data item.
#[derive(Debug, Clone)]
pub struct ItemParams {
    pub seed: [u8; 32],
    pub envelope: Envelope,
}

impl Arbitrary for ItemParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (any::<[u8; 32]>(), envelope())
            .prop_map(|(seed, envelope)| ItemParams { seed, envelope })
            .boxed()
    }
}

/// Encode and sign an item from parameters.
pub fn item_from_params(params: &ItemParams) -> Result<SignedDataItem, CoreError> {
    let key = SigningKey::from_bytes(&params.seed);
    let owner = key.verifying_key().to_bytes();
    let mut bytes = unsigned_bytes(&params.envelope, SignatureType::Ed25519, &owner)?;
    let hash = signature_data(&DataItem::parse(&bytes)?);
    let signature = key.sign(&hash).to_bytes();
    inject_signature(&mut bytes, &signature)?;
    Ok(SignedDataItem {
        id: ItemId::from_signature(&signature),
        raw: bytes.into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use hbconnect_core::canonical::decode_target;

    proptest! {
        #[test]
        fn test_generated_targets_decode(t in target()) {
            prop_assert_eq!(t.len(), 43);
            prop_assert!(decode_target(&t).is_ok());
        }

        #[test]
        fn test_signed_item_verifies(params: ItemParams) {
            let item = item_from_params(&params).unwrap();
            let parsed = DataItem::parse(&item.raw).unwrap();
            prop_assert!(parsed.verify().is_ok());
            prop_assert_eq!(parsed.id(), item.id);
            prop_assert_eq!(parsed.data, &params.envelope.payload[..]);
            prop_assert_eq!(parsed.tags().unwrap(), params.envelope.tags.clone());
            prop_assert_eq!(parsed.target_address(), params.envelope.target.clone());
        }

        #[test]
        fn test_signature_data_independent_of_signature(params: ItemParams) {
            let item = item_from_params(&params).unwrap();
            let owner = SigningKey::from_bytes(&params.seed).verifying_key().to_bytes();
            let unsigned = unsigned_bytes(&params.envelope, SignatureType::Ed25519, &owner).unwrap();
            prop_assert_eq!(
                DataItem::parse(&unsigned).unwrap().signature_data(),
                DataItem::parse(&item.raw).unwrap().signature_data()
            );
        }

        #[test]
        fn test_id_changes_with_payload(
            seed in any::<[u8; 32]>(),
            p1 in payload(64),
            p2 in payload(64),
        ) {
            prop_assume!(p1 != p2);
            let a = ItemParams { seed, envelope: Envelope { payload: p1.into(), ..Default::default() } };
            let b = ItemParams { seed, envelope: Envelope { payload: p2.into(), ..Default::default() } };
            prop_assert_ne!(item_from_params(&a).unwrap().id, item_from_params(&b).unwrap().id);
        }
    }
}
