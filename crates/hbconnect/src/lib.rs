//! # hbconnect
//!
//! Client for HyperBEAM nodes: signed ANS-104 messages, process spawning,
//! result reads, and GraphQL queries.
//!
//! ## Overview
//!
//! - **Request building**: flat field maps become tagged envelopes
//! - **Signing**: envelopes are signed through an external authority; no
//!   private key ever enters this library
//! - **Node surface**: spawn, send, result, scheduler/authority discovery
//! - **Queries**: a retrying GraphQL client for the indexed log
//!
//! ## Usage
//!
//! ```rust,no_run
//! use hbconnect::{ClientConfig, Fields, HyperBeam, SigningAuthority};
//!
//! async fn example(wallet: impl SigningAuthority + 'static) -> hbconnect::Result<()> {
//!     let hb = HyperBeam::connect(ClientConfig::default())?.with_signer(wallet);
//!
//!     let pid = hb.spawn("my-process", "", None).await?;
//!     let fields = Fields::new().with("Action", "Eval");
//!     let sent = hb.send(&pid.to_base64url(), fields, "1 + 1", None).await?;
//!     println!("{:?}", sent.into_json());
//!
//!     let edges = hb.query("query { transactions(first: 1) { edges { node { id } } } }").await?;
//!     println!("{edges}");
//!     Ok(())
//! }
//! ```
//!
//! ## Re-exports
//!
//! This crate re-exports the component crates for convenience:
//!
//! - `hbconnect::core` - Data items, tags, deep hash, request building
//! - `hbconnect::signer` - Deferred signing protocol and wallet adapters
//! - `hbconnect::net` - HTTP transport and GraphQL client

pub mod client;
pub mod config;
pub mod error;

// Re-export component crates
pub use hbconnect_core as core;
pub use hbconnect_net as net;
pub use hbconnect_signer as signer;

// Re-export main types for convenience
pub use client::{HyperBeam, ResultQuery, SendOutcome, AOS_VERSION, DEFAULT_MODULE};
pub use config::{
    gql_urls, ClientConfig, DEFAULT_GQL_ENDPOINT, DEFAULT_NODE_AUTHORITY, DEFAULT_NODE_URL,
    DEFAULT_SCHEDULER_URL, TRUSTED_AUTHORITY,
};
pub use error::{ClientError, ErrorCategory, Result};

// Re-export commonly used component types
pub use hbconnect_core::{Envelope, FieldValue, Fields, ItemId, RequestDescriptor, SignedDataItem, Tag};
pub use hbconnect_signer::{DataItemSigner, SignerKind, SigningAuthority, Wallet, WalletSigner};
