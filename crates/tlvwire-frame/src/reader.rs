use std::io::{ErrorKind, Read};

use bytes::{Bytes, BytesMut};

use crate::codec::{FrameConfig, HEADER_SIZE};
use crate::error::{FrameError, Result};
use crate::payload::{unpack_payload, Payload};

/// Read exactly one frame from `reader` and return its payload (blocking).
///
/// Reads the 4-byte header, checks the magic, then reads exactly `length`
/// bytes. Nothing is buffered between calls, so each call must start on a
/// frame boundary. A bad magic fails before any payload byte is consumed.
pub fn read_frame<R: Read + ?Sized>(reader: &mut R, magic: u16) -> Result<Bytes> {
    let mut header = [0u8; HEADER_SIZE];
    reader.read_exact(&mut header).map_err(read_error)?;

    let found = u16::from_be_bytes([header[0], header[1]]);
    if found != magic {
        return Err(FrameError::InvalidMagic {
            expected: magic,
            found,
        });
    }

    let len = u16::from_be_bytes([header[2], header[3]]) as usize;
    let mut payload = BytesMut::zeroed(len);
    reader.read_exact(&mut payload).map_err(read_error)?;
    Ok(payload.freeze())
}

fn read_error(err: std::io::Error) -> FrameError {
    match err.kind() {
        ErrorKind::UnexpectedEof => FrameError::ConnectionClosed,
        _ => FrameError::Io(err),
    }
}

/// Reads complete frames from any `Read` stream.
///
/// A thin owner around [`read_frame`] that remembers the configured magic.
/// Once a read fails the stream should be treated as desynchronized.
pub struct FrameReader<T> {
    inner: T,
    config: FrameConfig,
}

impl<T: Read> FrameReader<T> {
    /// Create a new frame reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame reader with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self { inner, config }
    }

    /// Read the next frame payload (blocking).
    ///
    /// Returns `Err(FrameError::ConnectionClosed)` when EOF is reached.
    pub fn read_frame(&mut self) -> Result<Bytes> {
        read_frame(&mut self.inner, self.config.magic)
    }

    /// Read the next frame and split it into action and content.
    pub fn read_payload(&mut self) -> Result<Payload> {
        let frame = self.read_frame()?;
        unpack_payload(&frame)
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current frame reader configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use bytes::{BufMut, BytesMut};

    use super::*;
    use crate::codec::{encode_frame, MAGIC};
    use crate::payload::pack_payload_multi;

    fn wire_of(payloads: &[&[u8]]) -> Vec<u8> {
        let mut wire = BytesMut::new();
        for payload in payloads {
            encode_frame(MAGIC, payload, &mut wire).unwrap();
        }
        wire.to_vec()
    }

    #[test]
    fn read_single_frame() {
        let mut reader = FrameReader::new(Cursor::new(wire_of(&[b"hello"])));
        let frame = reader.read_frame().unwrap();
        assert_eq!(frame.as_ref(), b"hello");
    }

    #[test]
    fn read_multiple_frames() {
        let mut reader = FrameReader::new(Cursor::new(wire_of(&[b"one", b"two", b"three"])));

        assert_eq!(reader.read_frame().unwrap().as_ref(), b"one");
        assert_eq!(reader.read_frame().unwrap().as_ref(), b"two");
        assert_eq!(reader.read_frame().unwrap().as_ref(), b"three");
        assert!(matches!(reader.read_frame(), Err(FrameError::ConnectionClosed)));
    }

    #[test]
    fn read_frame_with_max_payload() {
        let payload = vec![0xABu8; 65535];
        let mut reader = FrameReader::new(Cursor::new(wire_of(&[&payload])));
        let frame = reader.read_frame().unwrap();
        assert_eq!(frame.as_ref(), payload.as_slice());
    }

    #[test]
    fn read_empty_frame() {
        let mut cursor = Cursor::new(wire_of(&[b""]));
        let frame = read_frame(&mut cursor, MAGIC).unwrap();
        assert!(frame.is_empty());
    }

    #[test]
    fn reads_do_not_consume_past_the_frame() {
        let mut wire = wire_of(&[b"abc"]);
        wire.extend_from_slice(b"trailing");

        let mut cursor = Cursor::new(wire);
        read_frame(&mut cursor, MAGIC).unwrap();
        assert_eq!(cursor.position(), (HEADER_SIZE + 3) as u64);
    }

    #[test]
    fn partial_read_handling() {
        let byte_reader = ByteByByteReader {
            bytes: wire_of(&[b"slow"]),
            pos: 0,
        };
        let mut reader = FrameReader::new(byte_reader);

        let frame = reader.read_frame().unwrap();
        assert_eq!(frame.as_ref(), b"slow");
    }

    #[test]
    fn connection_closed_cleanly() {
        let mut reader = FrameReader::new(Cursor::new(Vec::<u8>::new()));
        let err = reader.read_frame().unwrap_err();
        assert!(matches!(err, FrameError::ConnectionClosed));
    }

    #[test]
    fn connection_closed_mid_header() {
        let mut reader = FrameReader::new(Cursor::new(vec![0x12u8, 0x34, 0x00]));
        let err = reader.read_frame().unwrap_err();
        assert!(matches!(err, FrameError::ConnectionClosed));
    }

    #[test]
    fn connection_closed_mid_frame() {
        let mut partial = BytesMut::new();
        partial.put_u16(MAGIC);
        partial.put_u16(16);
        partial.put_slice(b"only-part");

        let mut reader = FrameReader::new(Cursor::new(partial.to_vec()));
        let err = reader.read_frame().unwrap_err();
        assert!(matches!(err, FrameError::ConnectionClosed));
    }

    #[test]
    fn invalid_magic_stops_after_header() {
        let bytes = vec![0x00, 0x01, 0x00, 0x02, b'x', b'y'];
        let mut cursor = Cursor::new(bytes);
        let err = read_frame(&mut cursor, MAGIC).unwrap_err();
        assert!(matches!(
            err,
            FrameError::InvalidMagic {
                expected: MAGIC,
                found: 0x0001
            }
        ));
        assert_eq!(cursor.position(), HEADER_SIZE as u64);
    }

    #[test]
    fn configured_magic_is_enforced() {
        let mut wire = BytesMut::new();
        encode_frame(0xCAFE, b"v2", &mut wire).unwrap();

        let mut default_reader = FrameReader::new(Cursor::new(wire.to_vec()));
        assert!(matches!(default_reader.read_frame(), Err(FrameError::InvalidMagic { .. })));

        let mut reader =
            FrameReader::with_config(Cursor::new(wire.to_vec()), FrameConfig::with_magic(0xCAFE));
        assert_eq!(reader.read_frame().unwrap().as_ref(), b"v2");
        assert_eq!(reader.config().magic, 0xCAFE);
    }

    #[test]
    fn read_payload_unpacks_action_and_fields() {
        let payload = pack_payload_multi(0x05, ["ab", "cde"]);
        let mut reader = FrameReader::new(Cursor::new(wire_of(&[&payload])));

        let decoded = reader.read_payload().unwrap();
        assert_eq!(decoded.action, 5);
        assert_eq!(
            decoded.fields().unwrap(),
            vec![Bytes::from("ab"), Bytes::from("cde")]
        );
    }

    #[test]
    fn read_payload_rejects_empty_frame() {
        let mut reader = FrameReader::new(Cursor::new(wire_of(&[b""])));
        assert!(matches!(reader.read_payload(), Err(FrameError::EmptyPayload)));
    }

    #[derive(Debug)]
    struct ByteByByteReader {
        bytes: Vec<u8>,
        pos: usize,
    }

    impl Read for ByteByByteReader {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.pos >= self.bytes.len() {
                return Ok(0);
            }
            if buf.is_empty() {
                return Ok(0);
            }

            buf[0] = self.bytes[self.pos];
            self.pos += 1;
            Ok(1)
        }
    }

    #[cfg(unix)]
    #[test]
    fn roundtrip_over_pipe() {
        let (left, right) = std::os::unix::net::UnixStream::pair().unwrap();
        let mut writer = crate::writer::FrameWriter::new(left);
        let mut reader = FrameReader::new(right);

        writer.send(b"ping").unwrap();
        assert_eq!(reader.read_frame().unwrap().as_ref(), b"ping");
    }

    #[test]
    fn accessors_expose_stream_position() {
        let mut reader = FrameReader::new(Cursor::new(wire_of(&[b"one", b"two"])));
        reader.read_frame().unwrap();
        assert_eq!(reader.get_ref().position(), (HEADER_SIZE + 3) as u64);

        reader.get_mut().set_position(0);
        assert_eq!(reader.read_frame().unwrap().as_ref(), b"one");
        reader.read_frame().unwrap();

        let inner = reader.into_inner();
        assert_eq!(inner.position(), inner.get_ref().len() as u64);
    }

    #[test]
    fn read_would_block_propagates_io_error() {
        let reader = WouldBlockThenData {
            state: 0,
            bytes: wire_of(&[b"ok"]),
            pos: 0,
        };
        let mut framed = FrameReader::new(reader);
        let err = framed.read_frame().unwrap_err();
        assert!(matches!(err, FrameError::Io(e) if e.kind() == ErrorKind::WouldBlock));
    }

    struct WouldBlockThenData {
        state: u8,
        bytes: Vec<u8>,
        pos: usize,
    }

    impl Read for WouldBlockThenData {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.state == 0 {
                self.state = 1;
                return Err(std::io::Error::from(ErrorKind::WouldBlock));
            }
            if self.pos >= self.bytes.len() {
                return Ok(0);
            }
            let remaining = self.bytes.len() - self.pos;
            let n = remaining.min(buf.len());
            buf[..n].copy_from_slice(&self.bytes[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }

    #[test]
    fn interrupted_read_retries() {
        let reader = InterruptedThenData {
            state: 0,
            bytes: wire_of(&[b"ok"]),
            pos: 0,
        };
        let mut framed = FrameReader::new(reader);
        assert_eq!(framed.read_frame().unwrap().as_ref(), b"ok");
    }

    struct InterruptedThenData {
        state: u8,
        bytes: Vec<u8>,
        pos: usize,
    }

    impl Read for InterruptedThenData {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.state == 0 {
                self.state = 1;
                return Err(std::io::Error::from(ErrorKind::Interrupted));
            }
            if self.pos >= self.bytes.len() {
                return Ok(0);
            }
            let remaining = self.bytes.len() - self.pos;
            let n = remaining.min(buf.len());
            buf[..n].copy_from_slice(&self.bytes[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }
}
