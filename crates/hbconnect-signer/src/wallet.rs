//! Capabilities an external wallet exposes.
//!
//! A wallet holds the private key. This crate only ever asks it for
//! permissions, its identity, and signatures.

use async_trait::async_trait;
use hbconnect_core::{Envelope, SignatureType};
use std::fmt;
use std::sync::Arc;

use crate::error::Result;

/// A capability the wallet must grant before it is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    AccessAddress,
    AccessPublicKey,
    Signature,
    SignTransaction,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::AccessAddress => "ACCESS_ADDRESS",
            Permission::AccessPublicKey => "ACCESS_PUBLIC_KEY",
            Permission::Signature => "SIGNATURE",
            Permission::SignTransaction => "SIGN_TRANSACTION",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Hash the wallet applies to a message before signing it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum HashAlgorithm {
    #[default]
    Sha256,
    Sha384,
    Sha512,
}

impl HashAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            HashAlgorithm::Sha256 => "SHA-256",
            HashAlgorithm::Sha384 => "SHA-384",
            HashAlgorithm::Sha512 => "SHA-512",
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An external signing wallet.
#[async_trait]
pub trait Wallet: Send + Sync {
    /// Ask the wallet to grant `permissions`.
    async fn connect(&self, permissions: &[Permission]) -> Result<()>;

    /// Address of the active key.
    async fn active_address(&self) -> Result<String>;

    /// Raw public key (owner bytes) of the active key.
    async fn active_public_key(&self) -> Result<Vec<u8>>;

    /// Scheme of the active key.
    fn signature_type(&self) -> SignatureType {
        SignatureType::Arweave
    }

    /// Sign an opaque message. `hash` names the digest applied before
    /// signing; schemes that sign the message directly ignore it.
    async fn sign_message(&self, message: &[u8], hash: HashAlgorithm) -> Result<Vec<u8>>;

    /// Encode and sign an envelope, returning the signed item bytes.
    async fn sign_data_item(&self, envelope: Envelope) -> Result<Vec<u8>>;
}

#[async_trait]
impl<W: Wallet + ?Sized> Wallet for Arc<W> {
    async fn connect(&self, permissions: &[Permission]) -> Result<()> {
        (**self).connect(permissions).await
    }

    async fn active_address(&self) -> Result<String> {
        (**self).active_address().await
    }

    async fn active_public_key(&self) -> Result<Vec<u8>> {
        (**self).active_public_key().await
    }

    fn signature_type(&self) -> SignatureType {
        (**self).signature_type()
    }

    async fn sign_message(&self, message: &[u8], hash: HashAlgorithm) -> Result<Vec<u8>> {
        (**self).sign_message(message, hash).await
    }

    async fn sign_data_item(&self, envelope: Envelope) -> Result<Vec<u8>> {
        (**self).sign_data_item(envelope).await
    }
}
