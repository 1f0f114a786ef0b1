//! The signing-authority contract.
//!
//! An authority is handed a construction callback and a [`SignerKind`]. It
//! calls the callback to learn what to sign, signs it however it likes, and
//! returns either a finished item or a bare signature.

use async_trait::async_trait;
use hbconnect_core::{DeepHash, Envelope, SignatureType, SignedDataItem};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::{Result, SignerError};

/// Algorithm label assumed when the authority does not name one.
pub const DEFAULT_ALGORITHM: &str = "rsa-v1_5-sha256";

/// Which signing path the authority should take.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SignerKind {
    /// The authority encodes and signs the whole data item itself.
    #[default]
    Envelope,
    /// The authority signs an opaque digest computed here.
    Message,
}

impl SignerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignerKind::Envelope => "ans104",
            SignerKind::Message => "httpsig",
        }
    }
}

impl fmt::Display for SignerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignerKind {
    type Err = SignerError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ans104" => Ok(SignerKind::Envelope),
            "httpsig" => Ok(SignerKind::Message),
            other => Err(SignerError::UnknownKind(other.to_string())),
        }
    }
}

/// Who is signing, as declared by the authority.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignerIdentity {
    /// Raw owner bytes embedded in the item.
    pub public_key: Vec<u8>,
    /// Defaults to type 1 (Arweave).
    pub signature_type: Option<SignatureType>,
    /// Defaults to [`DEFAULT_ALGORITHM`].
    pub algorithm: Option<String>,
    pub address: Option<String>,
}

impl SignerIdentity {
    pub fn new(public_key: impl Into<Vec<u8>>) -> Self {
        Self {
            public_key: public_key.into(),
            ..Default::default()
        }
    }

    pub fn with_signature_type(mut self, signature_type: SignatureType) -> Self {
        self.signature_type = Some(signature_type);
        self
    }

    pub fn with_algorithm(mut self, algorithm: impl Into<String>) -> Self {
        self.algorithm = Some(algorithm.into());
        self
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn algorithm(&self) -> &str {
        self.algorithm.as_deref().unwrap_or(DEFAULT_ALGORITHM)
    }
}

/// What the authority asks the construction callback for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstructionRequest {
    /// Hand back the envelope fields untouched.
    Passthrough,
    /// Build the unsigned item for this identity and return its digest.
    Sign(SignerIdentity),
}

/// What the construction callback answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constructed {
    Fields(Envelope),
    SignatureData(DeepHash),
}

/// The construction callback handed to an authority.
pub trait ConstructData: Send {
    fn construct(&mut self, request: ConstructionRequest) -> Result<Constructed>;
}

/// What an authority returns once it has settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorityOutput {
    /// A complete signed item; the authority did its own encoding.
    Signed(SignedDataItem),
    /// A raw signature over the digest from the construction callback.
    Signature {
        signature: Vec<u8>,
        address: Option<String>,
    },
}

/// An external signing authority.
#[async_trait]
pub trait SigningAuthority: Send + Sync {
    async fn sign(
        &self,
        construct: &mut dyn ConstructData,
        kind: SignerKind,
    ) -> Result<AuthorityOutput>;
}

#[async_trait]
impl<A: SigningAuthority + ?Sized> SigningAuthority for Arc<A> {
    async fn sign(
        &self,
        construct: &mut dyn ConstructData,
        kind: SignerKind,
    ) -> Result<AuthorityOutput> {
        (**self).sign(construct, kind).await
    }
}

#[async_trait]
impl<A: SigningAuthority + ?Sized> SigningAuthority for &A {
    async fn sign(
        &self,
        construct: &mut dyn ConstructData,
        kind: SignerKind,
    ) -> Result<AuthorityOutput> {
        (**self).sign(construct, kind).await
    }
}
