//! # Error Types
//!
//! Comprehensive error handling for the WAMP codec and framing layers.
//!
//! This module defines all error variants that can occur while encoding,
//! decoding, framing, or transporting WAMP messages, from low-level I/O
//! errors to protocol violations.
//!
//! ## Error Categories
//! - **I/O Errors**: Network and stream failures (opaque passthrough)
//! - **Framing Errors**: Truncated prefixes/bodies, oversized frames
//! - **Encoding Errors**: Corrupt or truncated MessagePack input
//! - **Message Errors**: Unknown type codes, bad arity, bad field types
//!
//! All errors implement `std::error::Error` for interoperability.
//!
//! ## Fatality
//!
//! Any framing or message-model error is fatal to the connection: once a
//! peer has produced or received malformed data, byte-boundary trust is
//! lost and the stream cannot be resynchronized. [`WampError::is_fatal`]
//! lets the owning session layer decide between dropping the connection
//! and retrying a transient I/O failure.
//!
//! ## Example Usage
//! ```rust
//! use wamp_protocol::error::{Result, WampError};
//! use wamp_protocol::core::serializer::decode_value;
//! use tracing::error;
//!
//! fn inspect(payload: &[u8]) -> Result<()> {
//!     let value = decode_value(payload)?;
//!     println!("decoded: {value}");
//!     Ok(())
//! }
//!
//! fn main() {
//!     if let Err(e) = inspect(&[0x91]) {
//!         error!(error = %e, fatal = e.is_fatal(), "decode failed");
//!     }
//! }
//! ```

use std::io;
use thiserror::Error;

/// WampError is the primary error type for all codec and framing operations
#[derive(Error, Debug)]
pub enum WampError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The leading element of a wire message is missing, is not an
    /// integer, or is an integer with no corresponding catalog entry.
    #[error("unknown message type: {0}")]
    UnknownMessageType(String),

    /// A recognized message whose field at `index` does not satisfy the
    /// type required at that position.
    #[error("malformed message (type {code}): field {index} must be {expected}")]
    MalformedFields {
        code: u64,
        index: usize,
        expected: &'static str,
    },

    /// A recognized message with the wrong number of wire elements.
    /// Trailing extras are rejected, not truncated.
    #[error("arity mismatch for message type {code}: expected {min}..={max} elements, got {actual}")]
    ArityMismatch {
        code: u64,
        min: usize,
        max: usize,
        actual: usize,
    },

    /// The binary payload is not a well-formed value tree (truncated
    /// input, reserved markers, trailing garbage).
    #[error("corrupt encoding: {0}")]
    CorruptEncoding(String),

    #[error("encode error: {0}")]
    Encode(String),

    /// The stream ended while reading the 4-byte length prefix.
    #[error("incomplete length prefix: got {0} of 4 bytes")]
    IncompleteLengthPrefix(usize),

    /// The stream ended while reading a frame body.
    #[error("incomplete frame body: got {0} of {1} bytes")]
    IncompleteBody(usize, usize),

    /// A length prefix declared more bytes than the configured maximum.
    /// Raised before any body bytes are buffered.
    #[error("frame of {0} bytes exceeds maximum of {1}")]
    FrameTooLarge(usize, usize),

    #[error("operation timed out")]
    Timeout,

    #[error("connection closed")]
    ConnectionClosed,

    #[error("transport error: {0}")]
    TransportError(String),

    #[error("configuration error: {0}")]
    ConfigError(String),
}

impl WampError {
    /// Whether this error invalidates the connection it occurred on.
    ///
    /// Every framing and message-model violation is fatal; only transient
    /// transport conditions (`Io`, `Timeout`) leave the stream in a state
    /// the caller may be able to continue from.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, WampError::Io(_) | WampError::Timeout)
    }
}

/// Type alias for Results using WampError
pub type Result<T> = std::result::Result<T, WampError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn framing_errors_are_fatal() {
        assert!(WampError::IncompleteLengthPrefix(2).is_fatal());
        assert!(WampError::IncompleteBody(3, 10).is_fatal());
        assert!(WampError::FrameTooLarge(64, 32).is_fatal());
        assert!(WampError::CorruptEncoding("truncated".into()).is_fatal());
        assert!(WampError::UnknownMessageType("999".into()).is_fatal());
    }

    #[test]
    fn transient_errors_are_not_fatal() {
        assert!(!WampError::Timeout.is_fatal());
        assert!(!WampError::Io(io::Error::new(io::ErrorKind::Interrupted, "eintr")).is_fatal());
    }

    #[test]
    fn display_includes_field_index() {
        let err = WampError::MalformedFields {
            code: 48,
            index: 2,
            expected: "a dict",
        };
        let rendered = err.to_string();
        assert!(rendered.contains("48"));
        assert!(rendered.contains("field 2"));
    }
}
