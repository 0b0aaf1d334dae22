//! # RawSocket Framing
//!
//! Length-prefixed framing over byte-oriented transports.
//!
//! ## Wire Format
//! ```text
//! [Length(4, big-endian, unsigned)] [Payload(Length)]
//! ```
//!
//! The framing layer is agnostic to the payload: it carries encoded WAMP
//! messages here, but any byte payload frames identically, so the same
//! layer serves future message catalogs unchanged.
//!
//! Two surfaces are provided:
//! - [`Framing`]: blocking `write_frame`/`read_frame` over any
//!   `std::io` stream. Pure per-call transformations with no state
//!   beyond the configured size limit.
//! - [`FrameCodec`] / [`MessageCodec`]: `tokio_util` codecs for use with
//!   `Framed` async transports.
//!
//! ## Security
//! - The length prefix is bounds-checked against `max_frame_size` before
//!   any body bytes are buffered, so an oversized or hostile prefix
//!   cannot trigger unbounded allocation.
//! - A partial frame at end-of-stream is an error, never a silent EOF:
//!   length-prefixed framing has no way to resynchronize, so the caller
//!   must drop the connection.

use crate::config::ProtocolConfig;
use crate::core::serializer::Serializer;
use crate::error::{Result, WampError};
use crate::protocol::message::Message;
use bytes::{Buf, BufMut, Bytes, BytesMut};
use std::io::{ErrorKind, Read, Write};
use tokio_util::codec::{Decoder, Encoder};

/// Size of the frame length prefix in bytes
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Blocking length-prefixed framing over `std::io` streams.
///
/// Holds only the immutable frame size limit; each call is independent,
/// so one instance may serve any number of streams concurrently as long
/// as each stream has a single logical reader and writer.
#[derive(Debug, Clone, Copy)]
pub struct Framing {
    max_frame_size: usize,
}

impl Framing {
    pub fn new(max_frame_size: usize) -> Self {
        Self { max_frame_size }
    }

    pub fn from_config(config: &ProtocolConfig) -> Self {
        Self::new(config.transport.max_frame_size)
    }

    /// The configured maximum frame body size
    pub fn max_frame_size(&self) -> usize {
        self.max_frame_size
    }

    /// Write one frame: 4-byte big-endian length, then the payload.
    ///
    /// Prefix and payload are assembled into one contiguous buffer and
    /// written with a single `write_all`, so a frame from one writer is
    /// never interleaved with another writer's partial frame on a shared
    /// handle.
    pub fn write_frame<W: Write>(&self, stream: &mut W, payload: &[u8]) -> Result<()> {
        if payload.len() > self.max_frame_size {
            return Err(WampError::FrameTooLarge(payload.len(), self.max_frame_size));
        }
        let len = u32::try_from(payload.len())
            .map_err(|_| WampError::FrameTooLarge(payload.len(), u32::MAX as usize))?;

        let mut frame = Vec::with_capacity(LENGTH_PREFIX_SIZE + payload.len());
        frame.extend_from_slice(&len.to_be_bytes());
        frame.extend_from_slice(payload);

        stream.write_all(&frame).map_err(map_io)?;
        stream.flush().map_err(map_io)
    }

    /// Read one frame, returning exactly the payload bytes.
    ///
    /// Fails with [`WampError::IncompleteLengthPrefix`] if the stream
    /// ends inside the prefix, [`WampError::FrameTooLarge`] if the prefix
    /// declares more than `max_frame_size` (checked before the body is
    /// buffered), and [`WampError::IncompleteBody`] if the stream ends
    /// inside the body.
    pub fn read_frame<R: Read>(&self, stream: &mut R) -> Result<Vec<u8>> {
        let mut prefix = [0u8; LENGTH_PREFIX_SIZE];
        let got = read_full(stream, &mut prefix)?;
        if got < LENGTH_PREFIX_SIZE {
            return Err(WampError::IncompleteLengthPrefix(got));
        }

        let declared = u32::from_be_bytes(prefix) as usize;
        if declared > self.max_frame_size {
            return Err(WampError::FrameTooLarge(declared, self.max_frame_size));
        }

        let mut body = vec![0u8; declared];
        let got = read_full(stream, &mut body)?;
        if got < declared {
            return Err(WampError::IncompleteBody(got, declared));
        }

        Ok(body)
    }
}

/// Read until `buf` is full or the stream ends; returns bytes read.
/// Timeouts surface as [`WampError::Timeout`], never as end-of-stream.
fn read_full<R: Read>(stream: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match stream.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(map_io(e)),
        }
    }
    Ok(filled)
}

fn map_io(e: std::io::Error) -> WampError {
    match e.kind() {
        ErrorKind::TimedOut | ErrorKind::WouldBlock => WampError::Timeout,
        _ => WampError::Io(e),
    }
}

/// Tokio codec for raw length-prefixed frames.
///
/// Decodes to the exact payload of each frame in arrival order; encodes
/// any byte payload up to the configured maximum.
#[derive(Debug, Clone, Copy)]
pub struct FrameCodec {
    max_frame_size: usize,
}

impl FrameCodec {
    pub fn new(max_frame_size: usize) -> Self {
        Self { max_frame_size }
    }
}

impl Decoder for FrameCodec {
    type Item = BytesMut;
    type Error = WampError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<BytesMut>> {
        if src.len() < LENGTH_PREFIX_SIZE {
            return Ok(None);
        }

        let mut prefix = [0u8; LENGTH_PREFIX_SIZE];
        prefix.copy_from_slice(&src[..LENGTH_PREFIX_SIZE]);
        let declared = u32::from_be_bytes(prefix) as usize;

        if declared > self.max_frame_size {
            return Err(WampError::FrameTooLarge(declared, self.max_frame_size));
        }

        if src.len() < LENGTH_PREFIX_SIZE + declared {
            // reserve what the rest of the frame needs, then wait
            src.reserve(LENGTH_PREFIX_SIZE + declared - src.len());
            return Ok(None);
        }

        src.advance(LENGTH_PREFIX_SIZE);
        Ok(Some(src.split_to(declared)))
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<BytesMut>> {
        if let Some(frame) = self.decode(src)? {
            return Ok(Some(frame));
        }
        if src.is_empty() {
            return Ok(None);
        }
        if src.len() < LENGTH_PREFIX_SIZE {
            return Err(WampError::IncompleteLengthPrefix(src.len()));
        }
        let mut prefix = [0u8; LENGTH_PREFIX_SIZE];
        prefix.copy_from_slice(&src[..LENGTH_PREFIX_SIZE]);
        let declared = u32::from_be_bytes(prefix) as usize;
        Err(WampError::IncompleteBody(
            src.len() - LENGTH_PREFIX_SIZE,
            declared,
        ))
    }
}

impl Encoder<Bytes> for FrameCodec {
    type Error = WampError;

    fn encode(&mut self, item: Bytes, dst: &mut BytesMut) -> Result<()> {
        if item.len() > self.max_frame_size {
            return Err(WampError::FrameTooLarge(item.len(), self.max_frame_size));
        }
        let len = u32::try_from(item.len())
            .map_err(|_| WampError::FrameTooLarge(item.len(), u32::MAX as usize))?;

        dst.reserve(LENGTH_PREFIX_SIZE + item.len());
        dst.put_u32(len);
        dst.extend_from_slice(&item);
        Ok(())
    }
}

/// Tokio codec for framed WAMP messages: [`FrameCodec`] composed with a
/// [`Serializer`].
#[derive(Debug, Clone)]
pub struct MessageCodec {
    serializer: Serializer,
    framing: FrameCodec,
}

impl MessageCodec {
    pub fn new(serializer: Serializer, max_frame_size: usize) -> Self {
        Self {
            serializer,
            framing: FrameCodec::new(max_frame_size),
        }
    }

    pub fn from_config(config: &ProtocolConfig) -> Self {
        Self::new(
            Serializer::from_config(&config.codec),
            config.transport.max_frame_size,
        )
    }
}

impl Decoder for MessageCodec {
    type Item = Message;
    type Error = WampError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Message>> {
        match self.framing.decode(src)? {
            Some(frame) => self.serializer.deserialize(&frame).map(Some),
            None => Ok(None),
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Message>> {
        match self.framing.decode_eof(src)? {
            Some(frame) => self.serializer.deserialize(&frame).map(Some),
            None => Ok(None),
        }
    }
}

impl Encoder<Message> for MessageCodec {
    type Error = WampError;

    fn encode(&mut self, item: Message, dst: &mut BytesMut) -> Result<()> {
        let payload = self.serializer.serialize(&item)?;
        self.framing.encode(Bytes::from(payload), dst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_is_big_endian() {
        let framing = Framing::new(1024);
        let mut stream = Vec::new();
        framing
            .write_frame(&mut stream, &[0xAA; 258])
            .expect("write");

        assert_eq!(&stream[..4], &[0x00, 0x00, 0x01, 0x02]);
        assert_eq!(stream.len(), 4 + 258);
    }

    #[test]
    fn codec_waits_for_full_frame() {
        let mut codec = FrameCodec::new(1024);
        let mut buf = BytesMut::new();

        // prefix alone
        buf.extend_from_slice(&8u32.to_be_bytes());
        assert!(codec.decode(&mut buf).expect("decode").is_none());

        // half the body
        buf.extend_from_slice(&[1, 2, 3, 4]);
        assert!(codec.decode(&mut buf).expect("decode").is_none());

        // rest of the body
        buf.extend_from_slice(&[5, 6, 7, 8]);
        let frame = codec.decode(&mut buf).expect("decode").expect("frame");
        assert_eq!(&frame[..], &[1, 2, 3, 4, 5, 6, 7, 8]);
        assert!(buf.is_empty());
    }

    #[test]
    fn codec_rejects_oversized_prefix_without_body() {
        let mut codec = FrameCodec::new(16);
        let mut buf = BytesMut::new();
        buf.extend_from_slice(&64u32.to_be_bytes());

        // no body bytes present at all: the prefix alone must trip the limit
        let err = codec.decode(&mut buf).expect_err("must reject");
        assert!(matches!(err, WampError::FrameTooLarge(64, 16)));
    }

    #[test]
    fn codec_eof_mid_prefix() {
        let mut codec = FrameCodec::new(1024);
        let mut buf = BytesMut::from(&[0x00, 0x00][..]);

        let err = codec.decode_eof(&mut buf).expect_err("must reject");
        assert!(matches!(err, WampError::IncompleteLengthPrefix(2)));
    }

    #[test]
    fn codec_eof_mid_body() {
        let mut codec = FrameCodec::new(1024);
        let mut buf = BytesMut::new();
        buf.extend_from_slice(&10u32.to_be_bytes());
        buf.extend_from_slice(&[0xFF; 3]);

        let err = codec.decode_eof(&mut buf).expect_err("must reject");
        assert!(matches!(err, WampError::IncompleteBody(3, 10)));
    }

    #[test]
    fn codec_eof_clean_boundary() {
        let mut codec = FrameCodec::new(1024);
        let mut buf = BytesMut::new();
        assert!(codec.decode_eof(&mut buf).expect("clean eof").is_none());
    }

    #[test]
    fn timeout_is_not_eof() {
        struct TimingOut;
        impl Read for TimingOut {
            fn read(&mut self, _: &mut [u8]) -> std::io::Result<usize> {
                Err(std::io::Error::new(ErrorKind::TimedOut, "read timed out"))
            }
        }

        let framing = Framing::new(1024);
        let err = framing.read_frame(&mut TimingOut).expect_err("must fail");
        assert!(matches!(err, WampError::Timeout));
    }
}
