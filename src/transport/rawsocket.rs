//! RawSocket transport plumbing.
//!
//! Assembles framed WAMP connections over TCP or Unix domain sockets.
//! The helpers here only wire a [`MessageCodec`] onto a stream; the
//! session layer owns the stream's lifecycle, and transport negotiation
//! (agreeing the format variant and frame limit) is assumed to have
//! happened before the first frame.

use std::net::SocketAddr;
#[cfg(unix)]
use std::path::Path;

use tokio::net::{TcpListener, TcpStream};
#[cfg(unix)]
use tokio::net::{UnixListener, UnixStream};
use tokio_util::codec::Framed;
use tracing::{debug, info, instrument};

use crate::config::ProtocolConfig;
use crate::core::framing::MessageCodec;
use crate::error::{Result, WampError};
use crate::utils::timeout::with_timeout;

/// A framed TCP connection speaking length-prefixed WAMP messages
pub type TcpConnection = Framed<TcpStream, MessageCodec>;

#[cfg(unix)]
/// A framed Unix domain socket connection
pub type UnixConnection = Framed<UnixStream, MessageCodec>;

/// Connect to a RawSocket peer over TCP.
#[instrument(skip(config))]
pub async fn connect(addr: &str, config: &ProtocolConfig) -> Result<TcpConnection> {
    let stream = with_timeout(config.transport.connect_timeout, TcpStream::connect(addr))
        .await?
        .map_err(WampError::Io)?;
    stream.set_nodelay(true)?;

    info!(
        peer = %addr,
        variant = %config.codec.format_variant,
        "RawSocket connection established"
    );
    Ok(Framed::new(stream, MessageCodec::from_config(config)))
}

/// Connect to a RawSocket peer over a Unix domain socket.
#[cfg(unix)]
#[instrument(skip(path, config), fields(socket_path = %path.as_ref().display()))]
pub async fn connect_uds<P: AsRef<Path>>(path: P, config: &ProtocolConfig) -> Result<UnixConnection> {
    let stream = with_timeout(config.transport.connect_timeout, UnixStream::connect(path))
        .await?
        .map_err(WampError::Io)?;

    info!(variant = %config.codec.format_variant, "RawSocket connection established");
    Ok(Framed::new(stream, MessageCodec::from_config(config)))
}

/// TCP listener handing out framed RawSocket connections.
pub struct RawSocketListener {
    listener: TcpListener,
}

impl RawSocketListener {
    /// Bind a listener on the given address.
    #[instrument]
    pub async fn bind(addr: &str) -> Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        info!(address = %addr, "Listening for RawSocket connections");
        Ok(Self { listener })
    }

    /// The bound local address
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept one connection, framed with the given configuration.
    pub async fn accept(&self, config: &ProtocolConfig) -> Result<(TcpConnection, SocketAddr)> {
        let (stream, peer) = self.listener.accept().await?;
        stream.set_nodelay(true)?;
        debug!(peer = %peer, "Accepted RawSocket connection");
        Ok((Framed::new(stream, MessageCodec::from_config(config)), peer))
    }
}
