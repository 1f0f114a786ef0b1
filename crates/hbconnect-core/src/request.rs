//! Request building: flat field maps to `{headers, envelope}` descriptors.
//!
//! Reserved keys (target, anchor, data and the protocol control keys, in
//! both spellings) never become tags. Every other key becomes one user tag,
//! in insertion order, and the three protocol tags are always appended
//! last:
//!
//! ```text
//! [user tags..., data-protocol=ao, type=<type|Message>, variant=<variant|ao.N.1>]
//! ```

use bytes::Bytes;
use std::borrow::Cow;
use std::collections::BTreeMap;

use crate::types::{Envelope, Tag};

/// Content type of a serialized data item.
pub const CONTENT_TYPE_ANS104: &str = "application/ans104";
/// Codec the node should use to decode the body.
pub const CODEC_DEVICE: &str = "ans104@1.0";

/// Default value of the trailing `type` tag.
pub const DEFAULT_TYPE: &str = "Message";
/// Default value of the trailing `variant` tag.
pub const DEFAULT_VARIANT: &str = "ao.N.1";
/// Value of the `data-protocol` tag.
pub const DATA_PROTOCOL: &str = "ao";

/// Keys that never become user tags.
pub const RESERVED_KEYS: &[&str] = &[
    "Target",
    "target",
    "Anchor",
    "anchor",
    "Data",
    "data",
    "data-protocol",
    "Data-Protocol",
    "variant",
    "Variant",
    "dryrun",
    "Dryrun",
    "Type",
    "type",
    "path",
    "method",
    "signingFormat",
    "signing-format",
];

/// True if `key` is dropped from the tag list.
pub fn is_reserved(key: &str) -> bool {
    RESERVED_KEYS.contains(&key)
}

/// A field value: text or raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Bytes(Bytes),
}

impl FieldValue {
    /// Text view; bytes are decoded lossily.
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            FieldValue::Text(s) => Cow::Borrowed(s),
            FieldValue::Bytes(b) => String::from_utf8_lossy(b),
        }
    }

    /// Byte view.
    pub fn to_bytes(&self) -> Bytes {
        match self {
            FieldValue::Text(s) => Bytes::copy_from_slice(s.as_bytes()),
            FieldValue::Bytes(b) => b.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(s) => s.is_empty(),
            FieldValue::Bytes(b) => b.is_empty(),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<&String> for FieldValue {
    fn from(s: &String) -> Self {
        FieldValue::Text(s.clone())
    }
}

impl From<Vec<u8>> for FieldValue {
    fn from(b: Vec<u8>) -> Self {
        FieldValue::Bytes(b.into())
    }
}

impl From<&[u8]> for FieldValue {
    fn from(b: &[u8]) -> Self {
        FieldValue::Bytes(Bytes::copy_from_slice(b))
    }
}

impl From<Bytes> for FieldValue {
    fn from(b: Bytes) -> Self {
        FieldValue::Bytes(b)
    }
}

/// An insertion-ordered field map.
///
/// Inserting an existing key replaces its value without moving it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fields {
    entries: Vec<(String, FieldValue)>,
}

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or replace, returning the previous value.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<FieldValue>,
    ) -> Option<FieldValue> {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => Some(std::mem::replace(existing, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Text value of `key`, if present.
    pub fn get_text(&self, key: &str) -> Option<Cow<'_, str>> {
        self.get(key).map(FieldValue::as_text)
    }

    pub fn remove(&mut self, key: &str) -> Option<FieldValue> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for Fields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut fields = Fields::new();
        fields.extend(iter);
        fields
    }
}

impl<K: Into<String>, V: Into<FieldValue>> Extend<(K, V)> for Fields {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

/// Wire-ready pair for one outbound call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    pub headers: BTreeMap<String, String>,
    pub envelope: Envelope,
}

impl RequestDescriptor {
    /// Header lookup, ignoring ASCII case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Build a request descriptor from a field map.
///
/// Pure and infallible: a missing target yields `target: None`, which
/// signing for a message rejects later.
pub fn build(fields: &Fields) -> RequestDescriptor {
    let mut tags: Vec<Tag> = fields
        .iter()
        .filter(|(key, _)| !is_reserved(key))
        .map(|(key, value)| Tag::new(key, value.as_text()))
        .collect();

    tags.push(Tag::new("data-protocol", DATA_PROTOCOL));
    tags.push(Tag::new(
        "type",
        fields.get_text("type").unwrap_or(Cow::Borrowed(DEFAULT_TYPE)),
    ));
    tags.push(Tag::new(
        "variant",
        fields
            .get_text("variant")
            .unwrap_or(Cow::Borrowed(DEFAULT_VARIANT)),
    ));

    let payload = fields
        .get("data")
        .filter(|v| !v.is_empty())
        .map(FieldValue::to_bytes)
        .unwrap_or_default();

    let envelope = Envelope {
        target: fields.get_text("target").map(Cow::into_owned),
        anchor: fields
            .get_text("anchor")
            .map(Cow::into_owned)
            .unwrap_or_default(),
        tags,
        payload,
    };

    RequestDescriptor {
        headers: default_headers(),
        envelope,
    }
}

/// The fixed header set for data-item submissions.
pub fn default_headers() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("Content-Type".to_string(), CONTENT_TYPE_ANS104.to_string()),
        ("codec-device".to_string(), CODEC_DEVICE.to_string()),
        ("accept-bundle".to_string(), "true".to_string()),
    ])
}
