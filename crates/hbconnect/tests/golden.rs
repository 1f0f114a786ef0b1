//! Golden vectors for the request builder and signing pipeline.
//!
//! Every implementation must produce identical:
//! - raw_tags (Avro-encoded tag block)
//! - signature_data (deep hash of the unsigned item)
//! - signature (deterministic Ed25519)
//! - id (base64url SHA-256 of the signature)

use async_trait::async_trait;
use ed25519_dalek::{Signer, SigningKey};
use hbconnect::core::{build_request, DataItem, Fields, SignatureType};
use hbconnect::signer::{
    AuthorityOutput, ConstructData, Constructed, ConstructionRequest, SignerError, SignerIdentity,
    SignerKind, SigningAuthority,
};
use hbconnect::DataItemSigner;
use serde::{Deserialize, Serialize};

/// A single golden test vector.
#[derive(Debug, Serialize, Deserialize)]
pub struct GoldenVector {
    pub name: String,
    pub description: String,

    // Inputs
    pub seed: String,  // 32 bytes hex
    pub owner: String, // 32 bytes hex (derived)
    pub fields: Vec<(String, String)>,

    // Derived outputs
    pub raw_tags: String,       // hex
    pub signature_data: String, // 48 bytes hex
    pub signature: String,      // 64 bytes hex
    pub item_bytes: String,     // hex
    pub id: String,             // base64url
}

/// Signs digests with an in-memory Ed25519 key.
struct KeyAuthority(SigningKey);

#[async_trait]
impl SigningAuthority for KeyAuthority {
    async fn sign(
        &self,
        construct: &mut dyn ConstructData,
        _kind: SignerKind,
    ) -> Result<AuthorityOutput, SignerError> {
        let identity = SignerIdentity::new(self.0.verifying_key().to_bytes().to_vec())
            .with_signature_type(SignatureType::Ed25519);
        let Constructed::SignatureData(hash) =
            construct.construct(ConstructionRequest::Sign(identity))?
        else {
            return Err(SignerError::UnexpectedConstruction("expected signature data"));
        };
        Ok(AuthorityOutput::Signature {
            signature: self.0.sign(&hash).to_bytes().to_vec(),
            address: None,
        })
    }
}

async fn generate_vector(
    name: &str,
    description: &str,
    seed: [u8; 32],
    fields: &[(&str, &str)],
) -> GoldenVector {
    let key = SigningKey::from_bytes(&seed);
    let owner = key.verifying_key().to_bytes();
    let input: Fields = fields.iter().copied().collect();

    let descriptor = build_request(&input);
    let item = DataItemSigner::new(KeyAuthority(key))
        .with_kind(SignerKind::Message)
        .sign(descriptor.envelope)
        .await
        .unwrap();
    let parsed = DataItem::parse(&item.raw).unwrap();

    GoldenVector {
        name: name.to_string(),
        description: description.to_string(),
        seed: hex::encode(seed),
        owner: hex::encode(owner),
        fields: fields
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        raw_tags: hex::encode(parsed.raw_tags),
        signature_data: hex::encode(parsed.signature_data()),
        signature: hex::encode(parsed.signature),
        item_bytes: hex::encode(&item.raw),
        id: item.id.to_base64url(),
    }
}

/// Generate all golden vectors.
pub async fn generate_all_vectors() -> Vec<GoldenVector> {
    vec![
        // Vector 1: an Eval message to a process
        generate_vector(
            "builder_eval",
            "Eval message with target and text payload",
            [0x09; 32],
            &[
                ("target", "AQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQE"),
                ("Action", "Eval"),
                ("data", "1 + 1"),
            ],
        )
        .await,
        // Vector 2: type override, anchor, no target, empty payload
        generate_vector(
            "builder_process",
            "Process type override with an anchor and no payload",
            [0x0a; 32],
            &[
                ("Name", "counter"),
                ("type", "Process"),
                ("anchor", "anchor-anchor-anchor-anchor-0001"),
                ("data", ""),
            ],
        )
        .await,
    ]
}

#[tokio::test]
async fn test_generate_vectors() {
    let vectors = generate_all_vectors().await;
    assert_eq!(vectors.len(), 2);

    for v in &vectors {
        println!("=== {} ===", v.name);
        println!("  description: {}", v.description);
        println!("  owner: {}", v.owner);
        println!("  id: {}", v.id);
        println!();
    }
}

#[tokio::test]
async fn test_vectors_match_expected() {
    let vectors = generate_all_vectors().await;

    let eval = &vectors[0];
    assert_eq!(
        eval.owner,
        "fd1724385aa0c75b64fb78cd602fa1d991fdebf76b13c58ed702eac835e9f618"
    );
    assert_eq!(
        eval.raw_tags,
        "080c416374696f6e084576616c1a646174612d70726f746f636f6c04616f08747970650e4d6573736167650e76617269616e740c616f2e4e2e3100"
    );
    assert_eq!(
        eval.signature_data,
        "428f7e737876a68eddb75c496e8b808ca55cc19cc2f1a59ea1485a1bc6fbae8d8c187ab4f081d46db90a5e9ee333fe8d"
    );
    assert_eq!(
        eval.signature,
        "170d655ac675ac4a035eecb5f3ead66727681c2b9385590177340a8805198963025f0dc9bb3be62f546b4687a6f7ac5fd065abb75466c55ee2c687f2b7461504"
    );
    assert_eq!(eval.id, "FUoodyVoHyYP9ValVBNNl4N9vxdfx-SVGIbwyzuY0E8");

    let process = &vectors[1];
    assert_eq!(
        process.raw_tags,
        "08084e616d650e636f756e7465721a646174612d70726f746f636f6c04616f08747970650e50726f636573730e76617269616e740c616f2e4e2e3100"
    );
    assert_eq!(
        process.signature_data,
        "975157e03c2a48b51472d1a5b6d5c11e9b1947ae134356332ab2183be306733bfc2590e8fbc1a892685be4643a4835c4"
    );
    assert_eq!(process.id, "Pw2sD2nnxt-NRUsG_Gss2743KeAaxnIK2Tw-EPcK2jQ");
}

#[tokio::test]
async fn test_vectors_deterministic() {
    let a = generate_all_vectors().await;
    let b = generate_all_vectors().await;

    for (v1, v2) in a.iter().zip(b.iter()) {
        assert_eq!(v1.item_bytes, v2.item_bytes, "vector '{}' item bytes differ", v1.name);
        assert_eq!(v1.id, v2.id, "vector '{}' id differs", v1.name);
    }
}

#[tokio::test]
async fn test_vectors_serialize() {
    let vectors = generate_all_vectors().await;
    let json = serde_json::to_string_pretty(&vectors).unwrap();
    let back: Vec<GoldenVector> = serde_json::from_str(&json).unwrap();
    assert_eq!(back[0].id, vectors[0].id);
    assert_eq!(back[1].fields[1], ("type".to_string(), "Process".to_string()));
}
