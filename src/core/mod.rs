//! # Core Codec Components
//!
//! Binary serialization and frame handling for the WAMP wire protocol.
//!
//! This module is deliberately free of WAMP message semantics: the
//! serializer moves generic value trees to and from MessagePack bytes,
//! and the framing layer moves opaque payloads across byte streams.
//!
//! ## Components
//! - **Serializer**: MessagePack encoding with a per-connection format
//!   variant (legacy raw vs. current str/bin families)
//! - **Framing**: 4-byte big-endian length prefix over byte streams,
//!   blocking and tokio codec flavors
//!
//! ## Wire Format
//! ```text
//! [Length(4)] [MessagePack payload(Length)]
//! ```
//!
//! ## Security
//! - Frame length is validated against the configured maximum before any
//!   body bytes are buffered
//! - Decode errors are typed and fatal; no resynchronization is attempted

pub mod framing;
pub mod serializer;
