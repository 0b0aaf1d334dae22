//! # WAMP Protocol
//!
//! Message codec and RawSocket framing core for the Web Application
//! Messaging Protocol.
//!
//! This crate owns the hard, reusable part of a WAMP stack: the typed
//! message catalog, its MessagePack wire encoding, and the
//! length-prefixed framing that carries encoded messages over a byte
//! stream. Session management, routing, and transport negotiation are
//! the caller's business; the codec hands them typed messages and typed
//! errors.
//!
//! ## Layers
//! - [`protocol`]: the closed [`Message`](protocol::message::Message)
//!   catalog and its positional wire mapping
//! - [`core`]: MessagePack serialization with a per-connection format
//!   variant, and 4-byte big-endian length framing (blocking and tokio
//!   codec flavors)
//! - [`transport`]: helpers that attach the codec to TCP and Unix
//!   domain socket streams
//! - [`config`], [`error`], [`utils`]: configuration, the error
//!   taxonomy, logging and timeout support
//!
//! ## Wire Format
//! ```text
//! [Length(4, big-endian)] [MessagePack sequence: [TYPE, field, ...]]
//! ```
//!
//! ## Example
//! ```rust
//! use wamp_protocol::core::framing::Framing;
//! use wamp_protocol::core::serializer::{FormatVariant, Serializer};
//! use wamp_protocol::protocol::message::Message;
//! use wamp_protocol::protocol::roles::ClientRoles;
//!
//! # fn main() -> wamp_protocol::Result<()> {
//! let serializer = Serializer::new(FormatVariant::V5);
//! let framing = Framing::new(16 * 1024 * 1024);
//!
//! let hello = Message::Hello {
//!     realm: "realm1".into(),
//!     roles: ClientRoles::all(),
//! };
//!
//! // sender: message -> payload -> frame
//! let payload = serializer.serialize(&hello)?;
//! let mut stream = Vec::new();
//! framing.write_frame(&mut stream, &payload)?;
//!
//! // receiver: frame -> payload -> message
//! let body = framing.read_frame(&mut stream.as_slice())?;
//! assert_eq!(serializer.deserialize(&body)?, hello);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod protocol;
pub mod transport;
pub mod utils;

pub use error::{Result, WampError};

/// Commonly used types, importable in one line
pub mod prelude {
    pub use crate::config::{CodecConfig, ProtocolConfig, TransportConfig};
    pub use crate::core::framing::{FrameCodec, Framing, MessageCodec};
    pub use crate::core::serializer::{FormatVariant, Serializer};
    pub use crate::error::{Result, WampError};
    pub use crate::protocol::message::{Message, MessageType};
    pub use crate::protocol::roles::{ClientRoles, Role, RoleFeatures, RouterRole, RouterRoles};
    pub use crate::protocol::{Dict, List};
}
