use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};

/// Frame header: magic (2) + length (2) = 4 bytes.
pub const HEADER_SIZE: usize = 4;

/// Default magic number marking the start of every frame.
pub const MAGIC: u16 = 0x1234;

/// Largest payload a 16-bit length field can describe.
pub const MAX_PAYLOAD: usize = u16::MAX as usize;

/// Default number of pending writes the serialized writer will queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// Encode a frame into the wire format.
///
/// Wire format:
/// ```text
/// ┌──────────────┬───────────┬─────────────────┐
/// │ Magic (2B)   │ Length    │ Payload         │
/// │ (BE)         │ (2B BE)   │ (Length bytes)  │
/// └──────────────┴───────────┴─────────────────┘
/// ```
///
/// Payloads over [`MAX_PAYLOAD`] are rejected before anything is written.
pub fn encode_frame(magic: u16, payload: &[u8], dst: &mut BytesMut) -> Result<()> {
    if payload.len() > MAX_PAYLOAD {
        return Err(FrameError::PayloadTooLarge {
            size: payload.len(),
            max: MAX_PAYLOAD,
        });
    }
    dst.reserve(HEADER_SIZE + payload.len());
    dst.put_u16(magic);
    dst.put_u16(payload.len() as u16);
    dst.put_slice(payload);
    Ok(())
}

/// Decode a frame payload from a buffer.
///
/// Returns `Ok(None)` if the buffer doesn't contain a complete frame yet.
/// On success, consumes the frame bytes from the buffer.
pub fn decode_frame(src: &mut BytesMut, magic: u16) -> Result<Option<Bytes>> {
    if src.len() < 2 {
        return Ok(None); // Need more data
    }

    let found = u16::from_be_bytes([src[0], src[1]]);
    if found != magic {
        return Err(FrameError::InvalidMagic {
            expected: magic,
            found,
        });
    }

    if src.len() < HEADER_SIZE {
        return Ok(None);
    }

    let payload_len = u16::from_be_bytes([src[2], src[3]]) as usize;
    let total = HEADER_SIZE + payload_len;
    if src.len() < total {
        src.reserve(total - src.len());
        return Ok(None);
    }

    src.advance(HEADER_SIZE);
    Ok(Some(src.split_to(payload_len).freeze()))
}

/// Configuration shared by readers and writers.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Magic number expected on read and emitted on write. Default: `0x1234`.
    pub magic: u16,
    /// Maximum payload size in bytes. Default and ceiling: 65535.
    pub max_payload_size: usize,
    /// Capacity of the serialized writer's pending-write queue. Default: 1024.
    pub queue_capacity: usize,
}

impl FrameConfig {
    /// Configuration with a non-default magic number.
    pub fn with_magic(magic: u16) -> Self {
        Self {
            magic,
            ..Self::default()
        }
    }

    /// The payload limit actually enforced; never wider than the wire allows.
    pub fn effective_max_payload(&self) -> usize {
        self.max_payload_size.min(MAX_PAYLOAD)
    }

    pub(crate) fn check_payload(&self, len: usize) -> Result<()> {
        let max = self.effective_max_payload();
        if len > max {
            return Err(FrameError::PayloadTooLarge { size: len, max });
        }
        Ok(())
    }
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            magic: MAGIC,
            max_payload_size: MAX_PAYLOAD,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}
