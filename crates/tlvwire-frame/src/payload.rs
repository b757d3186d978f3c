//! Frame payloads: one action byte followed by content.

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};
use crate::fields::{pack_fields, unpack_fields};

/// A decoded frame payload.
///
/// `content` is opaque: raw application bytes, or a sub-field block when the
/// action calls for one. Use [`Payload::fields`] for the latter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    /// Application-level discriminator.
    pub action: u8,
    /// Everything after the action byte.
    pub content: Bytes,
}

impl Payload {
    pub fn new(action: u8, content: impl Into<Bytes>) -> Self {
        Self {
            action,
            content: content.into(),
        }
    }

    /// Decode `content` as a sub-field block.
    pub fn fields(&self) -> Result<Vec<Bytes>> {
        unpack_fields(&self.content)
    }

    /// Encode back into `action ++ content`.
    pub fn encode(&self) -> Bytes {
        pack_payload(self.action, &self.content)
    }
}

/// Build `action ++ content`.
pub fn pack_payload(action: u8, content: &[u8]) -> Bytes {
    let mut dst = BytesMut::with_capacity(1 + content.len());
    dst.put_u8(action);
    dst.put_slice(content);
    dst.freeze()
}

/// Build `action ++ pack_fields(fields)`.
pub fn pack_payload_multi<I, T>(action: u8, fields: I) -> Bytes
where
    I: IntoIterator<Item = T>,
    T: AsRef<[u8]>,
{
    pack_payload(action, &pack_fields(fields))
}

/// Split a payload into its action byte and content.
///
/// The content shares memory with `payload` and is returned unmodified.
pub fn unpack_payload(payload: &Bytes) -> Result<Payload> {
    match payload.first() {
        Some(&action) => Ok(Payload {
            action,
            content: payload.slice(1..),
        }),
        None => Err(FrameError::EmptyPayload),
    }
}
