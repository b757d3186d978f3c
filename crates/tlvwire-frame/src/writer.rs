use std::io::{ErrorKind, Write};

use bytes::BytesMut;

use crate::codec::{encode_frame, FrameConfig, HEADER_SIZE};
use crate::error::{FrameError, Result};
use crate::payload::Payload;

const INITIAL_BUFFER_CAPACITY: usize = HEADER_SIZE + 1024;

/// Push an already-encoded frame into `w` in full.
///
/// Partial writes are continued; a write that accepts zero bytes ends the
/// frame with [`FrameError::ShortWrite`].
pub fn write_wire<W: Write + ?Sized>(w: &mut W, wire: &[u8]) -> Result<()> {
    let mut offset = 0usize;
    while offset < wire.len() {
        match w.write(&wire[offset..]) {
            Ok(0) => {
                return Err(FrameError::ShortWrite {
                    written: offset,
                    expected: wire.len(),
                })
            }
            Ok(n) => offset += n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
            Err(err) => return Err(FrameError::Io(err)),
        }
    }

    loop {
        match w.flush() {
            Ok(()) => return Ok(()),
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
            Err(err) => return Err(FrameError::Io(err)),
        }
    }
}

/// Writes complete frames to any `Write` stream.
///
/// Suitable when a single owner writes to the stream. Use
/// [`SerializedWriter`](crate::queue::SerializedWriter) when many producers
/// share targets.
pub struct FrameWriter<T> {
    inner: T,
    buf: BytesMut,
    config: FrameConfig,
}

impl<T: Write> FrameWriter<T> {
    /// Create a new frame writer with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame writer with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
        }
    }

    /// Encode `action ++ content` and send it as one frame.
    pub fn write_payload(&mut self, payload: &Payload) -> Result<()> {
        self.send(&payload.encode())
    }

    /// Frame and send a payload (blocking).
    pub fn send(&mut self, payload: &[u8]) -> Result<()> {
        self.config.check_payload(payload.len())?;

        self.buf.clear();
        encode_frame(self.config.magic, payload, &mut self.buf)?;
        write_wire(&mut self.inner, &self.buf)
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Update maximum payload size for subsequent frames.
    pub fn set_max_payload_size(&mut self, max_payload_size: usize) {
        self.config.max_payload_size = max_payload_size;
    }

    /// Current frame writer configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}
