//! Cryptographic primitives for hbconnect.
//!
//! Signature schemes understood by the data-item codec, plus the SHA-2
//! helpers used for content IDs, owner addresses and the deep hash.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use rsa::traits::PublicKeyParts;
use rsa::{BigUint, Pss, RsaPublicKey};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256, Sha384};
use std::fmt;

use crate::error::CoreError;

/// Public exponent of every Arweave RSA key.
pub const ARWEAVE_PUBLIC_EXPONENT: u32 = 65537;

/// Signature scheme identifier, stored as the first two bytes of a data item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u16)]
pub enum SignatureType {
    /// Arweave RSA-4096, PSS padding over SHA-256. Signers differ on the
    /// salt length; the digest length, the maximum and zero are accepted.
    #[default]
    Arweave = 1,
    /// Ed25519 over the raw signature data.
    Ed25519 = 2,
}

impl SignatureType {
    pub fn from_u16(v: u16) -> Result<Self, CoreError> {
        match v {
            1 => Ok(SignatureType::Arweave),
            2 => Ok(SignatureType::Ed25519),
            other => Err(CoreError::UnsupportedSignatureType(other)),
        }
    }

    pub fn to_u16(self) -> u16 {
        self as u16
    }

    /// Length in bytes of the signature region.
    pub const fn signature_length(self) -> usize {
        match self {
            SignatureType::Arweave => 512,
            SignatureType::Ed25519 => 64,
        }
    }

    /// Length in bytes of the owner (public key) region.
    pub const fn public_key_length(self) -> usize {
        match self {
            SignatureType::Arweave => 512,
            SignatureType::Ed25519 => 32,
        }
    }

    /// Verify `signature` over `message` with the raw owner bytes.
    pub fn verify(self, owner: &[u8], message: &[u8], signature: &[u8]) -> Result<(), CoreError> {
        check_len(self.public_key_length(), owner.len(), true)?;
        check_len(self.signature_length(), signature.len(), false)?;

        match self {
            SignatureType::Arweave => {
                let key = RsaPublicKey::new(
                    BigUint::from_bytes_be(owner),
                    BigUint::from(ARWEAVE_PUBLIC_EXPONENT),
                )
                .map_err(|_| CoreError::InvalidPublicKey)?;
                let hashed = Sha256::digest(message);
                let digest_len = <Sha256 as Digest>::output_size();
                let max_salt = key.size().saturating_sub(digest_len + 2);
                [digest_len, max_salt, 0]
                    .into_iter()
                    .any(|salt| {
                        key.verify(Pss::new_with_salt::<Sha256>(salt), &hashed, signature)
                            .is_ok()
                    })
                    .then_some(())
                    .ok_or(CoreError::InvalidSignature)
            }
            SignatureType::Ed25519 => {
                let key_bytes: [u8; 32] = owner.try_into().map_err(|_| CoreError::InvalidPublicKey)?;
                let sig_bytes: [u8; 64] =
                    signature.try_into().map_err(|_| CoreError::InvalidSignature)?;
                let key = VerifyingKey::from_bytes(&key_bytes)
                    .map_err(|_| CoreError::InvalidPublicKey)?;
                key.verify(message, &Signature::from_bytes(&sig_bytes))
                    .map_err(|_| CoreError::InvalidSignature)
            }
        }
    }
}

impl fmt::Display for SignatureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_u16())
    }
}

impl TryFrom<u16> for SignatureType {
    type Error = CoreError;

    fn try_from(v: u16) -> Result<Self, Self::Error> {
        Self::from_u16(v)
    }
}

fn check_len(expected: usize, actual: usize, key: bool) -> Result<(), CoreError> {
    if expected == actual {
        return Ok(());
    }
    if key {
        Err(CoreError::InvalidPublicKeyLength { expected, actual })
    } else {
        Err(CoreError::InvalidSignatureLength { expected, actual })
    }
}

/// SHA-256 of `data`.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(&Sha256::digest(data));
    out
}

/// SHA-384 of `data`.
pub fn sha384(data: &[u8]) -> [u8; 48] {
    let mut out = [0u8; 48];
    out.copy_from_slice(&Sha384::digest(data));
    out
}

/// Wallet address of an owner: base64url(SHA-256(owner)).
pub fn owner_address(owner: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(sha256(owner))
}
