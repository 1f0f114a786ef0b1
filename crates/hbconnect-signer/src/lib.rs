//! # hbconnect signer
//!
//! Deferred two-phase signing of data items through external signing
//! authorities.
//!
//! ## Overview
//!
//! The private key never enters this crate. A [`DataItemSigner`] hands its
//! [`SigningAuthority`] a construction callback; the authority calls it to
//! learn what to sign, and returns either a finished item or a signature.
//! The signer then injects, verifies, and derives the content ID.
//!
//! ## Key Concepts
//!
//! - **Construction callback**: builds the unsigned item and its deep hash,
//!   or passes the envelope fields through untouched
//! - **Signer kind**: `ans104` (the wallet signs the whole item) or
//!   `httpsig` (the wallet signs a digest)
//! - **Wallet**: the capability set of an external key holder
//!
//! ## Usage
//!
//! ```rust,no_run
//! use hbconnect_signer::{DataItemSigner, SignerKind, WalletSigner};
//!
//! // let signer = DataItemSigner::new(WalletSigner::new(wallet))
//! //     .with_kind(SignerKind::Message);
//! // let item = signer.sign(envelope).await?;
//! // println!("{}", item.id);
//! ```

pub mod adapters;
pub mod authority;
pub mod deferred;
pub mod error;
pub mod protocol;
pub mod wallet;

pub use adapters::{EnvelopeNativeAuthority, RawMessageAuthority, WalletSigner};
pub use authority::{
    AuthorityOutput, ConstructData, Constructed, ConstructionRequest, SignerIdentity, SignerKind,
    SigningAuthority,
};
pub use error::{Result, SignerError};
pub use protocol::{DataItemSigner, SigningState};
pub use wallet::{HashAlgorithm, Permission, Wallet};
