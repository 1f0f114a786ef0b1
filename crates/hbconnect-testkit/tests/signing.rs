//! Signing protocol behaviour through real wallets and misbehaving
//! authorities.

use std::sync::Arc;

use hbconnect_core::{
    canonical::SIGNATURE_OFFSET, crypto::sha256, unsigned_bytes, DataItem, Envelope, ItemId,
    SignatureType, Tag,
};
use hbconnect_signer::{
    ConstructionRequest, DataItemSigner, Permission, SignerError, SignerKind, WalletSigner,
};
use hbconnect_testkit::fixtures::{
    message_envelope, Build, CorruptingAuthority, DoubleConstructAuthority,
    EmptySignatureAuthority, LocalWallet, RecordingAuthority, SilentAuthority, ARWEAVE_KEY_BITS,
    ARWEAVE_MAX_PSS_SALT,
};
use hbconnect_testkit::generators::{envelope, ItemParams};
use hbconnect_testkit::vectors::{all_vectors, envelope_from_vector};
use proptest::prelude::*;
use rsa::RsaPrivateKey;
use tracing_subscriber::filter::LevelFilter;

const TARGET: &str = "AQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQE";

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(LevelFilter::DEBUG)
        .try_init();
}

#[tokio::test]
async fn test_message_kind_matches_golden_vectors() {
    init_tracing();
    for vector in all_vectors() {
        let wallet = LocalWallet::ed25519(vector.seed);
        let signer = DataItemSigner::new(WalletSigner::new(wallet)).with_kind(SignerKind::Message);
        let item = signer.sign(envelope_from_vector(&vector)).await.unwrap();
        assert_eq!(item.id.to_base64url(), vector.expected_id, "vector '{}'", vector.name);
    }
}

#[tokio::test]
async fn test_both_kinds_produce_the_same_item() {
    let wallet = Arc::new(LocalWallet::ed25519([0x21; 32]));
    let envelope = message_envelope(TARGET, b"1 + 1");

    let native = DataItemSigner::new(WalletSigner::from_arc(Arc::clone(&wallet)))
        .sign(envelope.clone())
        .await
        .unwrap();
    let digest = DataItemSigner::new(WalletSigner::from_arc(Arc::clone(&wallet)))
        .with_kind(SignerKind::Message)
        .sign(envelope)
        .await
        .unwrap();

    // Ed25519 is deterministic, so both paths converge byte for byte.
    assert_eq!(native, digest);
    assert_eq!(wallet.items_signed(), 1);
    assert_eq!(wallet.messages_signed(), 1);
}

#[tokio::test]
async fn test_signature_lands_at_offset() {
    let wallet = LocalWallet::ed25519([0x22; 32]);
    let envelope = message_envelope(TARGET, b"payload");
    let owner = wallet.owner().to_vec();
    let unsigned = unsigned_bytes(&envelope, SignatureType::Ed25519, &owner).unwrap();

    let item = DataItemSigner::new(WalletSigner::new(wallet))
        .with_kind(SignerKind::Message)
        .sign(envelope)
        .await
        .unwrap();

    let signature = &item.raw[SIGNATURE_OFFSET..SIGNATURE_OFFSET + 64];
    assert_eq!(DataItem::parse(&item.raw).unwrap().signature, signature);
    assert_eq!(item.id, ItemId::from_bytes(sha256(signature)));
    // Everything outside the signature region is the unsigned encoding.
    assert_eq!(item.raw[..SIGNATURE_OFFSET], unsigned[..SIGNATURE_OFFSET]);
    assert_eq!(item.raw[SIGNATURE_OFFSET + 64..], unsigned[SIGNATURE_OFFSET + 64..]);
}

#[tokio::test]
async fn test_construction_never_invoked_rejects() {
    let err = DataItemSigner::new(SilentAuthority)
        .sign(message_envelope(TARGET, b"x"))
        .await
        .unwrap_err();
    assert!(matches!(err, SignerError::ConstructionNeverInvoked));
    assert_eq!(
        err.to_string(),
        "create() must be invoked in order to construct the data to sign"
    );
}

#[tokio::test]
async fn test_corrupted_signature_rejects() {
    let wallet = LocalWallet::ed25519([0x23; 32]);
    let err = DataItemSigner::new(CorruptingAuthority { wallet: &wallet })
        .with_kind(SignerKind::Message)
        .sign(message_envelope(TARGET, b"x"))
        .await
        .unwrap_err();
    assert!(matches!(err, SignerError::InvalidSignature));
    assert_eq!(err.to_string(), "data item signature is not valid");
}

#[tokio::test]
async fn test_empty_signature_rejects() {
    let wallet = LocalWallet::ed25519([0x24; 32]);
    let err = DataItemSigner::new(EmptySignatureAuthority { wallet: &wallet })
        .sign(message_envelope(TARGET, b"x"))
        .await
        .unwrap_err();
    assert!(matches!(err, SignerError::MissingSignature));
}

#[tokio::test]
async fn test_last_construction_takes_effect() {
    let first = LocalWallet::ed25519([0x25; 32]);
    let second = LocalWallet::ed25519([0x26; 32]);
    let item = DataItemSigner::new(DoubleConstructAuthority {
        first: &first,
        second: &second,
        sign_with: Build::Second,
    })
    .sign(message_envelope(TARGET, b"x"))
    .await
    .unwrap();

    let parsed = DataItem::parse(&item.raw).unwrap();
    parsed.verify().unwrap();
    assert_eq!(parsed.owner, second.owner());
    assert_eq!(parsed.owner_address(), second.address());
}

#[tokio::test]
async fn test_signature_over_superseded_build_rejects() {
    let first = LocalWallet::ed25519([0x25; 32]);
    let second = LocalWallet::ed25519([0x26; 32]);
    let err = DataItemSigner::new(DoubleConstructAuthority {
        first: &first,
        second: &second,
        sign_with: Build::First,
    })
    .sign(message_envelope(TARGET, b"x"))
    .await
    .unwrap_err();
    assert!(matches!(err, SignerError::InvalidSignature));
}

#[tokio::test]
async fn test_repeated_identical_construction_is_accepted() {
    let wallet = LocalWallet::ed25519([0x27; 32]);
    let item = DataItemSigner::new(DoubleConstructAuthority {
        first: &wallet,
        second: &wallet,
        sign_with: Build::First,
    })
    .sign(message_envelope(TARGET, b"x"))
    .await
    .unwrap();
    DataItem::parse(&item.raw).unwrap().verify().unwrap();
}

#[tokio::test]
async fn test_adapters_request_expected_construction() {
    let recording = RecordingAuthority::new(WalletSigner::new(LocalWallet::ed25519([0x28; 32])));

    DataItemSigner::new(&recording)
        .sign(message_envelope(TARGET, b"x"))
        .await
        .unwrap();
    DataItemSigner::new(&recording)
        .with_kind(SignerKind::Message)
        .sign(message_envelope(TARGET, b"x"))
        .await
        .unwrap();

    assert_eq!(recording.kinds(), vec![SignerKind::Envelope, SignerKind::Message]);
    let requests = recording.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0], ConstructionRequest::Passthrough);
    match &requests[1] {
        ConstructionRequest::Sign(identity) => {
            assert_eq!(identity.signature_type, Some(SignatureType::Ed25519));
            assert_eq!(identity.algorithm(), "rsa-pss-sha512");
            assert_eq!(identity.public_key.len(), 32);
        }
        other => panic!("unexpected construction request {other:?}"),
    }
}

#[tokio::test]
async fn test_wallet_refusal_is_configuration_error() {
    let wallet = LocalWallet::ed25519([0x29; 32]).refusing(Permission::SignTransaction);
    let err = DataItemSigner::new(WalletSigner::new(wallet))
        .sign(message_envelope(TARGET, b"x"))
        .await
        .unwrap_err();
    assert!(matches!(err, SignerError::PermissionDenied(Permission::SignTransaction)));
}

#[tokio::test]
async fn test_malformed_target_rejected_before_signing() {
    let wallet = Arc::new(LocalWallet::ed25519([0x2a; 32]));
    let err = DataItemSigner::new(WalletSigner::from_arc(Arc::clone(&wallet)))
        .with_kind(SignerKind::Message)
        .sign(message_envelope("P1", b"x"))
        .await
        .unwrap_err();
    assert!(matches!(err, SignerError::Encoding(_)));
    assert!(err.is_configuration());
    assert_eq!(wallet.messages_signed(), 0);
}

#[tokio::test]
async fn test_arweave_key_signs_both_kinds() {
    init_tracing();
    let wallet = Arc::new(LocalWallet::arweave().unwrap());
    assert_eq!(wallet.owner().len(), 512);

    let envelope = Envelope {
        target: Some(TARGET.to_string()),
        anchor: String::new(),
        tags: vec![Tag::new("Action", "Balance")],
        payload: bytes::Bytes::from_static(b"{}"),
    };

    for kind in [SignerKind::Envelope, SignerKind::Message] {
        let item = DataItemSigner::new(WalletSigner::from_arc(Arc::clone(&wallet)))
            .with_kind(kind)
            .sign(envelope.clone())
            .await
            .unwrap();
        let parsed = DataItem::parse(&item.raw).unwrap();
        assert_eq!(parsed.signature_type, SignatureType::Arweave);
        assert_eq!(parsed.signature.len(), 512);
        assert_eq!(parsed.owner_address(), wallet.address());
        parsed.verify().unwrap();
    }
}

#[tokio::test]
async fn test_arweave_signatures_verify_across_salt_lengths() {
    let key = RsaPrivateKey::new(&mut rand::thread_rng(), ARWEAVE_KEY_BITS).unwrap();
    let envelope = message_envelope(TARGET, b"salted");

    for salt_len in [ARWEAVE_MAX_PSS_SALT, 0] {
        let wallet = Arc::new(LocalWallet::from_rsa(key.clone()).with_pss_salt(salt_len));
        for kind in [SignerKind::Envelope, SignerKind::Message] {
            let item = DataItemSigner::new(WalletSigner::from_arc(Arc::clone(&wallet)))
                .with_kind(kind)
                .sign(envelope.clone())
                .await
                .unwrap();
            let parsed = DataItem::parse(&item.raw).unwrap();
            assert_eq!(parsed.signature_type, SignatureType::Arweave);
            parsed.verify().unwrap();
        }
    }
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn test_unsigned_bytes_deterministic(envelope in envelope(), seed in any::<[u8; 32]>()) {
        let wallet = LocalWallet::ed25519(seed);
        let a = unsigned_bytes(&envelope, SignatureType::Ed25519, wallet.owner()).unwrap();
        let b = unsigned_bytes(&envelope, SignatureType::Ed25519, wallet.owner()).unwrap();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn test_signed_id_is_hash_of_signature(params: ItemParams) {
        let item = runtime().block_on(async {
            DataItemSigner::new(WalletSigner::new(LocalWallet::ed25519(params.seed)))
                .with_kind(SignerKind::Message)
                .sign(params.envelope.clone())
                .await
        }).unwrap();
        let parsed = DataItem::parse(&item.raw).unwrap();
        prop_assert_eq!(item.id, ItemId::from_bytes(sha256(parsed.signature)));
        prop_assert!(parsed.verify().is_ok());
    }
}
