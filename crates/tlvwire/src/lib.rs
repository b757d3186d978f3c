//! Minimal symmetric binary framing for message-oriented streams.
//!
//! tlvwire frames discrete messages as `magic ++ length ++ payload` and
//! structures each payload as a one-byte action plus either raw content or a
//! block of length-prefixed sub-fields.
//!
//! # Crate Structure
//!
//! - [`frame`]: wire codec, sub-field and payload codecs, blocking reader,
//!   direct writer, and the serialized multi-producer writer

/// Re-export frame types.
pub mod frame {
    pub use tlvwire_frame::*;
}
