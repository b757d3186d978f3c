//! Sub-field blocks: a run of `u16 BE length ++ bytes` records.
//!
//! A block carries no count and no terminator. Decoding walks records until
//! the buffer is exactly exhausted; anything else is a malformed block.

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};

/// Size of the length prefix in front of every sub-field.
pub const FIELD_HEADER_SIZE: usize = 2;

const MAX_FIELD: usize = u16::MAX as usize;

/// Concatenate fields as length-prefixed records.
///
/// Lengths are not checked: a field longer than 65535 bytes gets a truncated
/// prefix and corrupts the block. Use [`try_pack_fields`] when field sizes are
/// not already bounded by the caller.
pub fn pack_fields<I, T>(fields: I) -> Bytes
where
    I: IntoIterator<Item = T>,
    T: AsRef<[u8]>,
{
    let mut dst = BytesMut::new();
    for field in fields {
        put_field(&mut dst, field.as_ref());
    }
    dst.freeze()
}

/// Like [`pack_fields`], but rejects any field a 16-bit prefix cannot describe.
pub fn try_pack_fields<I, T>(fields: I) -> Result<Bytes>
where
    I: IntoIterator<Item = T>,
    T: AsRef<[u8]>,
{
    let mut dst = BytesMut::new();
    for (index, field) in fields.into_iter().enumerate() {
        let field = field.as_ref();
        if field.len() > MAX_FIELD {
            return Err(FrameError::FieldTooLarge {
                index,
                size: field.len(),
            });
        }
        put_field(&mut dst, field);
    }
    Ok(dst.freeze())
}

fn put_field(dst: &mut BytesMut, field: &[u8]) {
    dst.reserve(FIELD_HEADER_SIZE + field.len());
    dst.put_u16(field.len() as u16);
    dst.put_slice(field);
}

/// Split a sub-field block into its fields.
///
/// The returned buffers share memory with `src`. An empty block is a valid
/// block with zero fields. A block that is not an exact sequence of records
/// fails as a whole; no partial result is returned.
pub fn unpack_fields(src: &Bytes) -> Result<Vec<Bytes>> {
    FieldIter::new(src)
        .map(|field| field.map(|f| src.slice_ref(f)))
        .collect()
}

/// Borrowing iterator over the records of a sub-field block.
///
/// Yields each field in order. On a malformed record it yields the error once
/// and then ends.
#[derive(Debug, Clone)]
pub struct FieldIter<'a> {
    buf: &'a [u8],
    offset: usize,
    failed: bool,
}

impl<'a> FieldIter<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            buf,
            offset: 0,
            failed: false,
        }
    }

    /// Byte offset of the next record.
    pub fn offset(&self) -> usize {
        self.offset
    }

    fn next_field(&mut self) -> Result<&'a [u8]> {
        let remaining = &self.buf[self.offset..];
        if remaining.len() < FIELD_HEADER_SIZE {
            return Err(FrameError::TruncatedFieldHeader {
                offset: self.offset,
            });
        }

        let declared = u16::from_be_bytes([remaining[0], remaining[1]]) as usize;
        let body = &remaining[FIELD_HEADER_SIZE..];
        if declared > body.len() {
            return Err(FrameError::TruncatedField {
                offset: self.offset,
                declared,
                remaining: body.len(),
            });
        }

        self.offset += FIELD_HEADER_SIZE + declared;
        Ok(&body[..declared])
    }
}

impl<'a> Iterator for FieldIter<'a> {
    type Item = Result<&'a [u8]>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.offset == self.buf.len() {
            return None;
        }
        let item = self.next_field();
        self.failed = item.is_err();
        Some(item)
    }
}
