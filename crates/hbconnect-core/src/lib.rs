//! # hbconnect core
//!
//! Pure primitives for hbconnect: ANS-104 data items, tags, the deep hash,
//! and request building.
//!
//! This crate contains no I/O, no storage, no networking. It is pure computation
//! over signed binary messages.
//!
//! ## Key Types
//!
//! - [`Envelope`] - The unsigned content of a data item
//! - [`DataItem`] - Borrowed view over encoded item bytes
//! - [`SignedDataItem`] - A signed item and its content ID
//! - [`ItemId`] - Content-addressed identifier (SHA-256 of the signature)
//! - [`Fields`] / [`RequestDescriptor`] - Input and output of the request builder
//!
//! ## Canonicalization
//!
//! Items are encoded in the ANS-104 binary layout. See [`canonical`] module.

pub mod canonical;
pub mod crypto;
pub mod dataitem;
pub mod deep_hash;
pub mod error;
pub mod request;
pub mod tags;
pub mod types;
pub mod validation;

pub use canonical::{inject_signature, signature_range, unsigned_bytes, SIGNATURE_OFFSET};
pub use crypto::{owner_address, SignatureType};
pub use dataitem::DataItem;
pub use deep_hash::{deep_hash, DeepHash, DeepHashChunk};
pub use error::{CoreError, ValidationError};
pub use request::{build as build_request, FieldValue, Fields, RequestDescriptor};
pub use tags::{decode_tags, encode_tags};
pub use types::{Envelope, ItemId, SignedDataItem, Tag};
pub use validation::{check_tags, verify_data_item};
