/// Errors that can occur while framing, decoding, or writing messages.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The frame header does not start with the expected magic number.
    #[error("invalid frame magic (expected {expected:#06x}, found {found:#06x})")]
    InvalidMagic { expected: u16, found: u16 },

    /// The payload exceeds the maximum frame size.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// A sub-field cannot be represented by a 16-bit length prefix.
    #[error("field {index} too large ({size} bytes, max 65535)")]
    FieldTooLarge { index: usize, size: usize },

    /// Fewer than two bytes remained where a sub-field length was expected.
    #[error("truncated sub-field header at offset {offset}")]
    TruncatedFieldHeader { offset: usize },

    /// A sub-field declared more bytes than remain in the block.
    #[error("sub-field at offset {offset} declares {declared} bytes, only {remaining} remain")]
    TruncatedField {
        offset: usize,
        declared: usize,
        remaining: usize,
    },

    /// A payload must carry at least the action byte.
    #[error("empty payload (missing action byte)")]
    EmptyPayload,

    /// The target stopped accepting bytes before the whole frame was written.
    #[error("short write ({written} of {expected} bytes)")]
    ShortWrite { written: usize, expected: usize },

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream ended before a complete frame was received.
    #[error("connection closed (incomplete frame)")]
    ConnectionClosed,

    /// The serialized writer has been shut down.
    #[error("frame writer is shut down")]
    WriterClosed,
}

pub type Result<T> = std::result::Result<T, FrameError>;
