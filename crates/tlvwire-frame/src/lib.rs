//! Length-prefixed framing with a nested action/sub-field payload codec.
//!
//! Every message on the wire is framed with:
//! - A 2-byte big-endian magic number (default `0x1234`)
//! - A 2-byte big-endian payload length (0..=65535)
//!
//! Inside a frame, the payload is a 1-byte action followed by content. The
//! content is either raw bytes or a sub-field block: a run of
//! `u16 length ++ bytes` records with no count and no terminator.
//!
//! Writes from many producers are funnelled through a [`SerializedWriter`],
//! whose single worker guarantees frames never interleave on a target.

pub mod codec;
pub mod error;
pub mod fields;
#[cfg(feature = "async")]
pub mod framed;
pub mod payload;
pub mod queue;
pub mod reader;
pub mod writer;

pub use codec::{
    decode_frame, encode_frame, FrameConfig, DEFAULT_QUEUE_CAPACITY, HEADER_SIZE, MAGIC,
    MAX_PAYLOAD,
};
pub use error::{FrameError, Result};
pub use fields::{pack_fields, try_pack_fields, unpack_fields, FieldIter, FIELD_HEADER_SIZE};
#[cfg(feature = "async")]
pub use framed::FrameCodec;
pub use payload::{pack_payload, pack_payload_multi, unpack_payload, Payload};
pub use queue::{
    FrameTarget, SerializedWriter, SharedTarget, SubmitHandle, WriteTicket, WriterStats,
};
pub use reader::{read_frame, FrameReader};
pub use writer::{write_wire, FrameWriter};
