//! Golden test vectors for deterministic verification.
//!
//! Each vector fixes an Ed25519 seed and an envelope. Ed25519 signing is
//! deterministic, so the signature data, the signature and the content ID
//! are all fixed too. The expected values were computed independently of
//! this crate.

use bytes::Bytes;
use ed25519_dalek::{Signer, SigningKey};
use hbconnect_core::canonical::signature_data;
use hbconnect_core::{
    inject_signature, unsigned_bytes, CoreError, DataItem, Envelope, ItemId, SignatureType,
    SignedDataItem, Tag,
};

/// A golden test vector.
#[derive(Debug, Clone)]
pub struct GoldenVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// Ed25519 seed of the signer.
    pub seed: [u8; 32],
    pub target: Option<&'static str>,
    pub anchor: &'static str,
    pub tags: &'static [(&'static str, &'static str)],
    pub payload: &'static [u8],
    /// Expected owner address (base64url).
    pub expected_address: &'static str,
    /// Expected deep hash of the unsigned item (hex).
    pub expected_signature_data: &'static str,
    /// Expected signature (hex).
    pub expected_signature: &'static str,
    /// Expected content ID (base64url).
    pub expected_id: &'static str,
}

static BINARY_PAYLOAD: [u8; 256] = {
    let mut bytes = [0u8; 256];
    let mut i = 0;
    while i < 256 {
        bytes[i] = i as u8;
        i += 1;
    }
    bytes
};

/// Get all golden test vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    vec![
        GoldenVector {
            name: "empty item",
            seed: [0x01; 32],
            target: None,
            anchor: "",
            tags: &[],
            payload: b"",
            expected_address: "NHUPmL1Z_PyUbaRaqr6TO-FUpLUJThxKv0KGZQXzyX4",
            expected_signature_data: "01be897829710dcbe62bb3dcbed14e3f4983b98c98aabaacc743c128705d83306ea92c091b9b80d7b90b3352f26ec848",
            expected_signature: "6d7e74814ba3055c7b620ec95a0c1e13fef11e6aad5f37ce0d0ceeca575a6a31a4df5112239e9795916fb1bb370606aa781a1b5297ee9b0276de678cf6b6020a",
            expected_id: "Y4j-rX-dKgzTVj9Y48KkeVadj5N38SzdkGhOTRj589s",
        },
        GoldenVector {
            name: "eval message",
            seed: [0x02; 32],
            target: Some("AQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQE"),
            anchor: "",
            tags: &[
                ("Action", "Eval"),
                ("Data-Protocol", "ao"),
                ("Type", "Message"),
                ("Variant", "ao.N.1"),
            ],
            payload: b"1 + 1",
            expected_address: "ajgD1fBZkCocba-8m6RykhL3yqwIY0zDrnaydSnwOCc",
            expected_signature_data: "3046fa676c3a967e59a93d9988471327a48d9a0f9b36e4f781b25884e765892d8be232c2f8571455b4f0a3d98c96cd4f",
            expected_signature: "3d005117cabbcb0dceabfb04f8eb62fa07b2f06976e1b09034a3275bd8c5b297c397506e688dc1075393552aa090d8de9a6289977ee1f251516bbbb2de22c009",
            expected_id: "XUcElVeopOhGNeLlLaEUxBTiy7TQKjZXLDDqaqtEAUY",
        },
        GoldenVector {
            name: "anchored item",
            seed: [0x03; 32],
            target: None,
            anchor: "0123456789abcdef0123456789abcdef",
            tags: &[("Name", "demo")],
            payload: b"hello",
            expected_address: "ti6Gf6LzOv5i1daxZC4WIdVDMHhGsqV7iX5xCRm3Zwk",
            expected_signature_data: "f252176b333f85bf44ef3dbc72b46fca3696d78f0fe2fd6386c30789d18d2fb3077b5b8c14d4f582c56ba84b318e9b3f",
            expected_signature: "dc6894c25567705b862e9aa17c1084080cdd9a472c50b4f551dc75706c55e50d1c198e83714794e10e45399385ca512f4b657637ac1dbf27746c4cc0492bf507",
            expected_id: "Yq1AzwwCN6nekL5ebKPq-YSW4dsNVSiU74ujLsvvsGo",
        },
        GoldenVector {
            name: "binary payload with repeated tag",
            seed: [0x04; 32],
            target: Some("__________________________________________8"),
            anchor: "",
            tags: &[("App-Name", "hyper-aos"), ("App-Name", "duplicate")],
            payload: &BINARY_PAYLOAD,
            expected_address: "xblA7T9lw5GWXegpX8XSX0dPpXtI026xCtNjuFOcG3k",
            expected_signature_data: "fa0bb46badb435efc78e90fa7998e40286c502f3d4251224e00643ca98df8d2cef03f0196c6077a9e9d9b1443e9c92ba",
            expected_signature: "f99bf4387257736a824eb896bc400c1e405313d919b81552fd425989843dbe76444c7e47a3101f41e1a60fede6da9ea2f6f4893be074794ea3dd6f0538478607",
            expected_id: "dEDxRgCSq3jQscfg1YavtO2m6ydDf-5EjfxYSBhE0wo",
        },
    ]
}

/// The envelope a vector describes.
pub fn envelope_from_vector(vector: &GoldenVector) -> Envelope {
    Envelope {
        target: vector.target.map(str::to_string),
        anchor: vector.anchor.to_string(),
        tags: vector
            .tags
            .iter()
            .map(|(name, value)| Tag::new(*name, *value))
            .collect(),
        payload: Bytes::from_static(vector.payload),
    }
}

/// The vector's signing key.
pub fn signing_key(vector: &GoldenVector) -> SigningKey {
    SigningKey::from_bytes(&vector.seed)
}

/// Encode and sign a vector directly, without the signing protocol.
pub fn sign_vector(vector: &GoldenVector) -> Result<SignedDataItem, CoreError> {
    let key = signing_key(vector);
    let owner = key.verifying_key().to_bytes();
    let mut bytes = unsigned_bytes(&envelope_from_vector(vector), SignatureType::Ed25519, &owner)?;
    let hash = signature_data(&DataItem::parse(&bytes)?);
    let signature = key.sign(&hash).to_bytes();
    inject_signature(&mut bytes, &signature)?;
    Ok(SignedDataItem {
        id: ItemId::from_signature(&signature),
        raw: bytes.into(),
    })
}

/// Check every vector, returning `(name, matches, actual id)` for each.
pub fn verify_all_vectors() -> Vec<(String, bool, String)> {
    all_vectors()
        .iter()
        .map(|v| match sign_vector(v) {
            Ok(item) => {
                let id = item.id.to_base64url();
                (v.name.to_string(), id == v.expected_id, id)
            }
            Err(e) => (v.name.to_string(), false, e.to_string()),
        })
        .collect()
}
