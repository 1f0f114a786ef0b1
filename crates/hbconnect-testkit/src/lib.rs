//! # hbconnect testkit
//!
//! Testing utilities for hbconnect.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Fixed keys and envelopes with independently computed
//!   signature data, signatures, and content IDs
//! - **Generators**: Proptest strategies for envelopes, tags, and request fields
//! - **Fixtures**: In-process wallets and misbehaving signing authorities
//!
//! ## Golden Vectors
//!
//! ```rust
//! use hbconnect_testkit::vectors::verify_all_vectors;
//!
//! for (name, matches, id) in verify_all_vectors() {
//!     assert!(matches, "{name}: {id}");
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use hbconnect_testkit::generators::{item_from_params, ItemParams};
//!
//! proptest! {
//!     #[test]
//!     fn id_is_deterministic(params: ItemParams) {
//!         let a = item_from_params(&params).unwrap();
//!         let b = item_from_params(&params).unwrap();
//!         prop_assert_eq!(a.id, b.id);
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust,ignore
//! use hbconnect_signer::{DataItemSigner, WalletSigner};
//! use hbconnect_testkit::fixtures::{message_envelope, LocalWallet};
//!
//! let signer = DataItemSigner::new(WalletSigner::new(LocalWallet::ed25519([1; 32])));
//! let item = signer.sign(message_envelope(&target, b"1 + 1")).await?;
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{identity_of, message_envelope, LocalWallet};
pub use generators::{item_from_params, ItemParams};
pub use vectors::{all_vectors, envelope_from_vector, sign_vector, verify_all_vectors, GoldenVector};
