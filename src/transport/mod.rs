//! # Transport Helpers
//!
//! Plumbing that attaches the message codec to real byte streams.
//!
//! The codec itself never owns a connection; these helpers assemble
//! `Framed` streams for the session layer that does.
//!
//! ## Components
//! - **RawSocket**: length-prefixed framing over TCP and Unix domain
//!   sockets

pub mod rawsocket;
