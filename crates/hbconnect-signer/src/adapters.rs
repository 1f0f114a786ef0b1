//! Adapters from a [`Wallet`] to the signing-authority contract.
//!
//! - [`EnvelopeNativeAuthority`]: the wallet encodes and signs the item
//! - [`RawMessageAuthority`]: the wallet signs the deep hash built here
//!
//! [`WalletSigner`] dispatches between the two on [`SignerKind`].

use async_trait::async_trait;
use hbconnect_core::{DataItem, SignedDataItem};
use std::sync::Arc;
use tracing::debug;

use crate::authority::{
    AuthorityOutput, ConstructData, Constructed, ConstructionRequest, SignerIdentity, SignerKind,
    SigningAuthority,
};
use crate::error::{Result, SignerError};
use crate::wallet::{HashAlgorithm, Permission, Wallet};

/// Algorithm label the raw-message path declares to construction.
pub const RAW_MESSAGE_ALGORITHM: &str = "rsa-pss-sha512";

/// The wallet signs the whole data item itself.
#[derive(Debug)]
pub struct EnvelopeNativeAuthority<W> {
    wallet: Arc<W>,
}

impl<W> Clone for EnvelopeNativeAuthority<W> {
    fn clone(&self) -> Self {
        Self {
            wallet: Arc::clone(&self.wallet),
        }
    }
}

impl<W: Wallet> EnvelopeNativeAuthority<W> {
    pub fn new(wallet: Arc<W>) -> Self {
        Self { wallet }
    }

    async fn run(&self, construct: &mut dyn ConstructData) -> Result<AuthorityOutput> {
        self.wallet.connect(&[Permission::SignTransaction]).await?;

        let envelope = match construct.construct(ConstructionRequest::Passthrough)? {
            Constructed::Fields(envelope) => envelope,
            Constructed::SignatureData(_) => {
                return Err(SignerError::UnexpectedConstruction(
                    "passthrough returned signature data",
                ))
            }
        };

        let raw = self.wallet.sign_data_item(envelope).await?;
        let id = DataItem::parse(&raw)?.id();
        debug!(%id, "wallet signed data item");

        Ok(AuthorityOutput::Signed(SignedDataItem {
            id,
            raw: raw.into(),
        }))
    }
}

#[async_trait]
impl<W: Wallet> SigningAuthority for EnvelopeNativeAuthority<W> {
    async fn sign(
        &self,
        construct: &mut dyn ConstructData,
        _kind: SignerKind,
    ) -> Result<AuthorityOutput> {
        self.run(construct).await
    }
}

/// The wallet signs an opaque digest built by the construction callback.
#[derive(Debug)]
pub struct RawMessageAuthority<W> {
    wallet: Arc<W>,
    hash: HashAlgorithm,
}

impl<W> Clone for RawMessageAuthority<W> {
    fn clone(&self) -> Self {
        Self {
            wallet: Arc::clone(&self.wallet),
            hash: self.hash,
        }
    }
}

impl<W: Wallet> RawMessageAuthority<W> {
    pub fn new(wallet: Arc<W>) -> Self {
        Self {
            wallet,
            hash: HashAlgorithm::default(),
        }
    }

    /// Hash the wallet applies before signing. SHA-256 matches the type 1
    /// verification scheme.
    pub fn with_hash_algorithm(mut self, hash: HashAlgorithm) -> Self {
        self.hash = hash;
        self
    }

    async fn run(&self, construct: &mut dyn ConstructData) -> Result<AuthorityOutput> {
        self.wallet
            .connect(&[
                Permission::AccessAddress,
                Permission::AccessPublicKey,
                Permission::Signature,
            ])
            .await?;

        let public_key = self.wallet.active_public_key().await?;
        let address = self.wallet.active_address().await?;

        let identity = SignerIdentity::new(public_key)
            .with_signature_type(self.wallet.signature_type())
            .with_algorithm(RAW_MESSAGE_ALGORITHM)
            .with_address(address.clone());

        let hash = match construct.construct(ConstructionRequest::Sign(identity))? {
            Constructed::SignatureData(hash) => hash,
            Constructed::Fields(_) => {
                return Err(SignerError::UnexpectedConstruction(
                    "signing request returned envelope fields",
                ))
            }
        };

        let signature = self.wallet.sign_message(&hash, self.hash).await?;
        debug!(%address, hash = %self.hash, "wallet signed message");

        Ok(AuthorityOutput::Signature {
            signature,
            address: Some(address),
        })
    }
}

#[async_trait]
impl<W: Wallet> SigningAuthority for RawMessageAuthority<W> {
    async fn sign(
        &self,
        construct: &mut dyn ConstructData,
        _kind: SignerKind,
    ) -> Result<AuthorityOutput> {
        self.run(construct).await
    }
}

/// Wraps a wallet and picks the adapter for each requested kind.
#[derive(Debug)]
pub struct WalletSigner<W> {
    envelope: EnvelopeNativeAuthority<W>,
    message: RawMessageAuthority<W>,
}

impl<W> Clone for WalletSigner<W> {
    fn clone(&self) -> Self {
        Self {
            envelope: self.envelope.clone(),
            message: self.message.clone(),
        }
    }
}

impl<W: Wallet> WalletSigner<W> {
    pub fn new(wallet: W) -> Self {
        Self::from_arc(Arc::new(wallet))
    }

    pub fn from_arc(wallet: Arc<W>) -> Self {
        Self {
            envelope: EnvelopeNativeAuthority::new(Arc::clone(&wallet)),
            message: RawMessageAuthority::new(wallet),
        }
    }

    pub fn with_hash_algorithm(mut self, hash: HashAlgorithm) -> Self {
        self.message = self.message.with_hash_algorithm(hash);
        self
    }
}

#[async_trait]
impl<W: Wallet> SigningAuthority for WalletSigner<W> {
    async fn sign(
        &self,
        construct: &mut dyn ConstructData,
        kind: SignerKind,
    ) -> Result<AuthorityOutput> {
        match kind {
            SignerKind::Envelope => self.envelope.run(construct).await,
            SignerKind::Message => self.message.run(construct).await,
        }
    }
}
