//! Tag encoding for data items.
//!
//! Tags are serialized as an Avro array of `{name: bytes, value: bytes}`
//! records:
//! - longs are zig-zag varints
//! - the array is written as one block followed by the zero terminator
//! - an empty tag list encodes to zero bytes (no block, no terminator)
//!
//! Decoding also accepts the block-size form (negative count followed by
//! the block's byte size), which other Avro writers may emit.

use crate::error::{CoreError, Result};
use crate::types::Tag;

/// Maximum number of tags on a single data item.
pub const MAX_TAG_COUNT: usize = 128;
/// Maximum tag name length in bytes.
pub const MAX_TAG_NAME_BYTES: usize = 1024;
/// Maximum tag value length in bytes.
pub const MAX_TAG_VALUE_BYTES: usize = 3072;

/// Encode tags to their Avro byte form.
pub fn encode_tags(tags: &[Tag]) -> Vec<u8> {
    if tags.is_empty() {
        return Vec::new();
    }

    let mut buf = Vec::new();
    write_long(&mut buf, tags.len() as i64);
    for tag in tags {
        write_bytes(&mut buf, tag.name.as_bytes());
        write_bytes(&mut buf, tag.value.as_bytes());
    }
    write_long(&mut buf, 0);
    buf
}

/// Decode tags from their Avro byte form.
pub fn decode_tags(bytes: &[u8]) -> Result<Vec<Tag>> {
    if bytes.is_empty() {
        return Ok(Vec::new());
    }

    let mut reader = Reader { bytes, pos: 0 };
    let mut tags = Vec::new();

    loop {
        let mut count = reader.read_long()?;
        if count == 0 {
            break;
        }
        if count < 0 {
            count = count
                .checked_neg()
                .ok_or_else(|| CoreError::DecodingError("tag block count overflow".into()))?;
            // Block byte size; the records that follow are self-delimiting.
            reader.read_long()?;
        }
        for _ in 0..count {
            let name = reader.read_string()?;
            let value = reader.read_string()?;
            tags.push(Tag { name, value });
        }
    }

    if reader.pos != bytes.len() {
        return Err(CoreError::DecodingError(format!(
            "{} trailing bytes after tags",
            bytes.len() - reader.pos
        )));
    }

    Ok(tags)
}

fn write_long(buf: &mut Vec<u8>, n: i64) {
    let mut z = ((n << 1) ^ (n >> 63)) as u64;
    while z & !0x7f != 0 {
        buf.push(((z & 0x7f) | 0x80) as u8);
        z >>= 7;
    }
    buf.push(z as u8);
}

fn write_bytes(buf: &mut Vec<u8>, bytes: &[u8]) {
    write_long(buf, bytes.len() as i64);
    buf.extend_from_slice(bytes);
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn read_long(&mut self) -> Result<i64> {
        let mut z: u64 = 0;
        let mut shift = 0u32;
        loop {
            let byte = *self
                .bytes
                .get(self.pos)
                .ok_or_else(|| CoreError::DecodingError("truncated varint".into()))?;
            self.pos += 1;
            if shift >= 64 {
                return Err(CoreError::DecodingError("varint too long".into()));
            }
            z |= u64::from(byte & 0x7f) << shift;
            if byte & 0x80 == 0 {
                break;
            }
            shift += 7;
        }
        Ok(((z >> 1) as i64) ^ -((z & 1) as i64))
    }

    fn read_slice(&mut self) -> Result<&'a [u8]> {
        let len = self.read_long()?;
        let len = usize::try_from(len)
            .map_err(|_| CoreError::DecodingError(format!("negative length {len}")))?;
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.bytes.len())
            .ok_or_else(|| CoreError::DecodingError("truncated tag bytes".into()))?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn read_string(&mut self) -> Result<String> {
        let slice = self.read_slice()?;
        String::from_utf8(slice.to_vec())
            .map_err(|_| CoreError::InvalidTag("tag is not valid UTF-8".into()))
    }
}
