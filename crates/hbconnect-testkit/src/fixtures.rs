//! Test fixtures and helpers.
//!
//! In-process wallets that hold a real key, and scripted signing
//! authorities that misbehave in specific ways.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use ed25519_dalek::{Signer, SigningKey};
use hbconnect_core::canonical::signature_data;
use hbconnect_core::{
    inject_signature, owner_address, unsigned_bytes, DataItem, Envelope, SignatureType, Tag,
};
use hbconnect_signer::{
    AuthorityOutput, ConstructData, Constructed, ConstructionRequest, HashAlgorithm, Permission,
    SignerError, SignerIdentity, SignerKind, SigningAuthority, Wallet,
};
use rsa::traits::PublicKeyParts;
use rsa::{Pss, RsaPrivateKey};
use sha2::digest::DynDigest;
use sha2::{Digest, Sha256, Sha384, Sha512};

/// Modulus size of an Arweave key.
pub const ARWEAVE_KEY_BITS: usize = 4096;

/// Largest PSS salt a SHA-256 signature over an Arweave key can carry.
pub const ARWEAVE_MAX_PSS_SALT: usize = ARWEAVE_KEY_BITS / 8 - 32 - 2;

enum LocalKey {
    Ed25519(SigningKey),
    Arweave(Box<RsaPrivateKey>),
}

/// A wallet holding its key in memory.
pub struct LocalWallet {
    key: LocalKey,
    owner: Vec<u8>,
    pss_salt: Option<usize>,
    refused: Option<Permission>,
    granted: Mutex<Vec<Permission>>,
    messages_signed: AtomicUsize,
    items_signed: AtomicUsize,
}

impl LocalWallet {
    /// Ed25519 wallet with a deterministic key.
    pub fn ed25519(seed: [u8; 32]) -> Self {
        let key = SigningKey::from_bytes(&seed);
        let owner = key.verifying_key().to_bytes().to_vec();
        Self::with_key(LocalKey::Ed25519(key), owner)
    }

    /// Arweave wallet with a fresh 4096-bit key. Key generation is slow;
    /// share one wallet across a test where possible.
    pub fn arweave() -> Result<Self, rsa::Error> {
        let key = RsaPrivateKey::new(&mut rand::thread_rng(), ARWEAVE_KEY_BITS)?;
        Ok(Self::from_rsa(key))
    }

    /// Arweave wallet around an existing key.
    pub fn from_rsa(key: RsaPrivateKey) -> Self {
        let modulus = key.n().to_bytes_be();
        let width = SignatureType::Arweave.public_key_length();
        let mut owner = vec![0u8; width.saturating_sub(modulus.len())];
        owner.extend_from_slice(&modulus);
        Self::with_key(LocalKey::Arweave(Box::new(key)), owner)
    }

    fn with_key(key: LocalKey, owner: Vec<u8>) -> Self {
        Self {
            key,
            owner,
            pss_salt: None,
            refused: None,
            granted: Mutex::new(Vec::new()),
            messages_signed: AtomicUsize::new(0),
            items_signed: AtomicUsize::new(0),
        }
    }

    /// Refuse any `connect` that asks for `permission`.
    pub fn refusing(mut self, permission: Permission) -> Self {
        self.refused = Some(permission);
        self
    }

    /// Sign RSA-PSS with a fixed salt length instead of the digest length.
    pub fn with_pss_salt(mut self, salt_len: usize) -> Self {
        self.pss_salt = Some(salt_len);
        self
    }

    pub fn owner(&self) -> &[u8] {
        &self.owner
    }

    pub fn address(&self) -> String {
        owner_address(&self.owner)
    }

    /// Every permission granted so far, in request order.
    pub fn granted(&self) -> Vec<Permission> {
        self.granted
            .lock()
            .map(|g| g.clone())
            .unwrap_or_else(|e| e.into_inner().clone())
    }

    pub fn messages_signed(&self) -> usize {
        self.messages_signed.load(Ordering::SeqCst)
    }

    pub fn items_signed(&self) -> usize {
        self.items_signed.load(Ordering::SeqCst)
    }

    /// Sign `message` synchronously.
    pub fn sign_now(&self, message: &[u8], hash: HashAlgorithm) -> Result<Vec<u8>, SignerError> {
        match &self.key {
            LocalKey::Ed25519(key) => Ok(key.sign(message).to_bytes().to_vec()),
            LocalKey::Arweave(key) => {
                let mut rng = rand::thread_rng();
                let signed = match hash {
                    HashAlgorithm::Sha256 => {
                        let pss = self.pss::<Sha256>();
                        key.sign_with_rng(&mut rng, pss, &Sha256::digest(message))
                    }
                    HashAlgorithm::Sha384 => {
                        let pss = self.pss::<Sha384>();
                        key.sign_with_rng(&mut rng, pss, &Sha384::digest(message))
                    }
                    HashAlgorithm::Sha512 => {
                        let pss = self.pss::<Sha512>();
                        key.sign_with_rng(&mut rng, pss, &Sha512::digest(message))
                    }
                };
                signed.map_err(|e| SignerError::Authority(e.to_string()))
            }
        }
    }
}

impl LocalWallet {
    fn pss<D>(&self) -> Pss
    where
        D: 'static + Digest + DynDigest + Send + Sync,
    {
        match self.pss_salt {
            Some(salt_len) => Pss::new_with_salt::<D>(salt_len),
            None => Pss::new::<D>(),
        }
    }
}

impl std::fmt::Debug for LocalWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalWallet")
            .field("signature_type", &self.signature_type())
            .field("address", &self.address())
            .finish()
    }
}

#[async_trait]
impl Wallet for LocalWallet {
    async fn connect(&self, permissions: &[Permission]) -> hbconnect_signer::Result<()> {
        if let Some(refused) = self.refused.filter(|p| permissions.contains(p)) {
            return Err(SignerError::PermissionDenied(refused));
        }
        let mut granted = self.granted.lock().unwrap_or_else(|e| e.into_inner());
        granted.extend_from_slice(permissions);
        Ok(())
    }

    async fn active_address(&self) -> hbconnect_signer::Result<String> {
        Ok(self.address())
    }

    async fn active_public_key(&self) -> hbconnect_signer::Result<Vec<u8>> {
        Ok(self.owner.clone())
    }

    fn signature_type(&self) -> SignatureType {
        match self.key {
            LocalKey::Ed25519(_) => SignatureType::Ed25519,
            LocalKey::Arweave(_) => SignatureType::Arweave,
        }
    }

    async fn sign_message(
        &self,
        message: &[u8],
        hash: HashAlgorithm,
    ) -> hbconnect_signer::Result<Vec<u8>> {
        self.messages_signed.fetch_add(1, Ordering::SeqCst);
        self.sign_now(message, hash)
    }

    async fn sign_data_item(&self, envelope: Envelope) -> hbconnect_signer::Result<Vec<u8>> {
        self.items_signed.fetch_add(1, Ordering::SeqCst);
        let mut bytes = unsigned_bytes(&envelope, self.signature_type(), &self.owner)?;
        let hash = signature_data(&DataItem::parse(&bytes)?);
        let signature = self.sign_now(&hash, HashAlgorithm::Sha256)?;
        inject_signature(&mut bytes, &signature)?;
        Ok(bytes)
    }
}

/// Returns a signature without ever calling the construction callback.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentAuthority;

#[async_trait]
impl SigningAuthority for SilentAuthority {
    async fn sign(
        &self,
        _construct: &mut dyn ConstructData,
        _kind: SignerKind,
    ) -> hbconnect_signer::Result<AuthorityOutput> {
        Ok(AuthorityOutput::Signature {
            signature: vec![7u8; 64],
            address: None,
        })
    }
}

/// Constructs for `wallet` and answers with an empty signature.
#[derive(Debug)]
pub struct EmptySignatureAuthority<'a> {
    pub wallet: &'a LocalWallet,
}

#[async_trait]
impl SigningAuthority for EmptySignatureAuthority<'_> {
    async fn sign(
        &self,
        construct: &mut dyn ConstructData,
        _kind: SignerKind,
    ) -> hbconnect_signer::Result<AuthorityOutput> {
        construct.construct(ConstructionRequest::Sign(identity_of(self.wallet)))?;
        Ok(AuthorityOutput::Signature {
            signature: Vec::new(),
            address: Some(self.wallet.address()),
        })
    }
}

/// Signs the constructed digest with `wallet`, then flips one bit of the
/// signature.
#[derive(Debug)]
pub struct CorruptingAuthority<'a> {
    pub wallet: &'a LocalWallet,
}

#[async_trait]
impl SigningAuthority for CorruptingAuthority<'_> {
    async fn sign(
        &self,
        construct: &mut dyn ConstructData,
        _kind: SignerKind,
    ) -> hbconnect_signer::Result<AuthorityOutput> {
        let hash = match construct.construct(ConstructionRequest::Sign(identity_of(self.wallet)))? {
            Constructed::SignatureData(hash) => hash,
            Constructed::Fields(_) => {
                return Err(SignerError::UnexpectedConstruction("expected signature data"))
            }
        };
        let mut signature = self.wallet.sign_now(&hash, HashAlgorithm::Sha256)?;
        if let Some(byte) = signature.first_mut() {
            *byte ^= 0x01;
        }
        Ok(AuthorityOutput::Signature {
            signature,
            address: Some(self.wallet.address()),
        })
    }
}

/// Builds once for `first` and once more for `second`, then signs the
/// digest of the build selected by `sign_with`.
#[derive(Debug)]
pub struct DoubleConstructAuthority<'a> {
    pub first: &'a LocalWallet,
    pub second: &'a LocalWallet,
    pub sign_with: Build,
}

/// Which of two construction calls a [`DoubleConstructAuthority`] signs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Build {
    First,
    Second,
}

#[async_trait]
impl SigningAuthority for DoubleConstructAuthority<'_> {
    async fn sign(
        &self,
        construct: &mut dyn ConstructData,
        _kind: SignerKind,
    ) -> hbconnect_signer::Result<AuthorityOutput> {
        let first = construct.construct(ConstructionRequest::Sign(identity_of(self.first)))?;
        let second = construct.construct(ConstructionRequest::Sign(identity_of(self.second)))?;
        let (wallet, constructed) = match self.sign_with {
            Build::First => (self.first, first),
            Build::Second => (self.second, second),
        };
        let Constructed::SignatureData(hash) = constructed else {
            return Err(SignerError::UnexpectedConstruction("expected signature data"));
        };
        Ok(AuthorityOutput::Signature {
            signature: wallet.sign_now(&hash, HashAlgorithm::Sha256)?,
            address: Some(wallet.address()),
        })
    }
}

/// Wraps another authority and records every construction request.
#[derive(Debug, Default)]
pub struct RecordingAuthority<A> {
    inner: A,
    requests: Mutex<Vec<ConstructionRequest>>,
    kinds: Mutex<Vec<SignerKind>>,
}

impl<A> RecordingAuthority<A> {
    pub fn new(inner: A) -> Self {
        Self {
            inner,
            requests: Mutex::new(Vec::new()),
            kinds: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<ConstructionRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_else(|e| e.into_inner().clone())
    }

    pub fn kinds(&self) -> Vec<SignerKind> {
        self.kinds
            .lock()
            .map(|k| k.clone())
            .unwrap_or_else(|e| e.into_inner().clone())
    }

    pub fn construction_count(&self) -> usize {
        self.requests().len()
    }
}

struct Recorder<'a> {
    inner: &'a mut dyn ConstructData,
    requests: &'a Mutex<Vec<ConstructionRequest>>,
}

impl ConstructData for Recorder<'_> {
    fn construct(
        &mut self,
        request: ConstructionRequest,
    ) -> hbconnect_signer::Result<Constructed> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request.clone());
        self.inner.construct(request)
    }
}

#[async_trait]
impl<A: SigningAuthority> SigningAuthority for RecordingAuthority<A> {
    async fn sign(
        &self,
        construct: &mut dyn ConstructData,
        kind: SignerKind,
    ) -> hbconnect_signer::Result<AuthorityOutput> {
        self.kinds
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(kind);
        let mut recorder = Recorder {
            inner: construct,
            requests: &self.requests,
        };
        self.inner.sign(&mut recorder, kind).await
    }
}

/// The identity `wallet` would declare on the digest path.
pub fn identity_of(wallet: &LocalWallet) -> SignerIdentity {
    SignerIdentity::new(wallet.owner().to_vec())
        .with_signature_type(wallet.signature_type())
        .with_address(wallet.address())
}

/// A message envelope addressed to `target`.
pub fn message_envelope(target: &str, payload: &'static [u8]) -> Envelope {
    Envelope {
        target: Some(target.to_string()),
        anchor: String::new(),
        tags: vec![
            Tag::new("Action", "Eval"),
            Tag::new("Data-Protocol", "ao"),
            Tag::new("Type", "Message"),
            Tag::new("Variant", "ao.N.1"),
        ],
        payload: bytes::Bytes::from_static(payload),
    }
}
