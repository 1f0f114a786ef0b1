//! Deep hash: the SHA-384 structural digest a data item's signature commits to.
//!
//! ```text
//! blob(b)   = H( H("blob" || len(b)) || H(b) )
//! list(xs)  = fold(H("list" || len(xs)), |acc, x| H(acc || deep(x)))
//! ```
//!
//! Lengths are rendered as decimal ASCII.

use crate::crypto::sha384;

/// A 48-byte deep hash.
pub type DeepHash = [u8; 48];

/// Input to the deep hash: a byte blob or a nested list.
#[derive(Debug, Clone, Copy)]
pub enum DeepHashChunk<'a> {
    Blob(&'a [u8]),
    List(&'a [DeepHashChunk<'a>]),
}

/// Compute the deep hash of a chunk.
pub fn deep_hash(chunk: &DeepHashChunk<'_>) -> DeepHash {
    match chunk {
        DeepHashChunk::Blob(data) => {
            let tag = tagged(b"blob", data.len());
            let mut pair = Vec::with_capacity(96);
            pair.extend_from_slice(&sha384(&tag));
            pair.extend_from_slice(&sha384(data));
            sha384(&pair)
        }
        DeepHashChunk::List(items) => {
            let tag = tagged(b"list", items.len());
            items.iter().fold(sha384(&tag), |acc, item| {
                let mut pair = Vec::with_capacity(96);
                pair.extend_from_slice(&acc);
                pair.extend_from_slice(&deep_hash(item));
                sha384(&pair)
            })
        }
    }
}

/// Deep hash of a flat list of blobs.
pub fn deep_hash_blobs(blobs: &[&[u8]]) -> DeepHash {
    let chunks: Vec<DeepHashChunk<'_>> = blobs.iter().copied().map(DeepHashChunk::Blob).collect();
    deep_hash(&DeepHashChunk::List(&chunks))
}

fn tagged(kind: &[u8], len: usize) -> Vec<u8> {
    let mut tag = kind.to_vec();
    tag.extend_from_slice(len.to_string().as_bytes());
    tag
}
