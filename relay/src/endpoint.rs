//! The datagram endpoint: a thin wrapper over `tokio::net::UdpSocket` that owns the
//! receive buffer and the truncation check from SPEC_FULL §4.A / §9.

use std::net::SocketAddr;

use tokio::net::UdpSocket;
use tracing::warn;

use relay_core::MAX_DATAGRAM_BYTES;

/// Receive buffer one byte larger than the accepted max, so a datagram that exactly
/// fills `MAX_DATAGRAM_BYTES` can be told apart from one that overflowed it.
const RECV_BUFFER_BYTES: usize = MAX_DATAGRAM_BYTES + 1;

pub struct Endpoint {
    socket: UdpSocket,
}

pub enum Received {
    Datagram(Vec<u8>, SocketAddr),
    /// The datagram filled (or overflowed) the receive buffer; size can't be trusted
    /// to be within bounds. Per §9's open-question resolution, treated as too large.
    TooLarge(SocketAddr),
}

impl Endpoint {
    pub async fn bind(addr: &str) -> std::io::Result<Self> {
        let socket = UdpSocket::bind(addr).await?;
        Ok(Self { socket })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    pub async fn recv(&self) -> std::io::Result<Received> {
        let mut buf = vec![0u8; RECV_BUFFER_BYTES];
        let (len, src) = self.socket.recv_from(&mut buf).await?;
        if len >= RECV_BUFFER_BYTES {
            return Ok(Received::TooLarge(src));
        }
        buf.truncate(len);
        Ok(Received::Datagram(buf, src))
    }

    /// Send one datagram. Failures are logged and swallowed here so a single
    /// unreachable peer can never affect anyone else's fan-out (§4.A, §7).
    pub async fn send(&self, bytes: &[u8], dest: SocketAddr) {
        if let Err(e) = self.socket.send_to(bytes, dest).await {
            warn!(%dest, error = %e, "failed to send datagram");
        }
    }
}
