//! TCP connector
//!
//! Opens a plain TCP stream to the server. The stream is kept for the life of
//! the handle and shut down on `close`.

use std::io;
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use super::{Connector, Endpoint, Transport, TransportError, TransportResult};

/// Connector that opens TCP streams
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpConnector;

impl TcpConnector {
    /// Creates a TCP connector
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Connector for TcpConnector {
    fn establish(
        &self,
        endpoint: &Endpoint,
        timeout: Duration,
    ) -> TransportResult<Box<dyn Transport>> {
        let addrs: Vec<SocketAddr> = (endpoint.host.as_str(), endpoint.port)
            .to_socket_addrs()
            .map_err(|e| TransportError::Resolve {
                host: endpoint.host.clone(),
                reason: e.to_string(),
            })?
            .collect();

        if addrs.is_empty() {
            return Err(TransportError::Resolve {
                host: endpoint.host.clone(),
                reason: "no addresses found".to_string(),
            });
        }

        let mut last_error = TransportError::Timeout;
        for addr in addrs {
            tracing::trace!(%addr, "Trying address");
            match connect_addr(&addr, timeout) {
                Ok(stream) => {
                    let _ = stream.set_nodelay(true);
                    return Ok(Box::new(TcpTransport::new(stream, addr)));
                }
                Err(e) if e.kind() == io::ErrorKind::TimedOut => {
                    last_error = TransportError::Timeout;
                }
                Err(e) => {
                    last_error = TransportError::Unreachable(e.to_string());
                }
            }
        }

        Err(last_error)
    }
}

/// A zero timeout waits for the operating system's own connect limit.
fn connect_addr(addr: &SocketAddr, timeout: Duration) -> io::Result<TcpStream> {
    if timeout.is_zero() {
        TcpStream::connect(addr)
    } else {
        TcpStream::connect_timeout(addr, timeout)
    }
}

/// TCP stream held by a live connection handle
#[derive(Debug)]
pub struct TcpTransport {
    stream: TcpStream,
    peer: SocketAddr,
    open: AtomicBool,
}

impl TcpTransport {
    fn new(stream: TcpStream, peer: SocketAddr) -> Self {
        Self {
            stream,
            peer,
            open: AtomicBool::new(true),
        }
    }
}

impl Transport for TcpTransport {
    fn peer(&self) -> String {
        self.peer.to_string()
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    fn close(&self) {
        if self.open.swap(false, Ordering::AcqRel) {
            // The peer may already have gone away.
            let _ = self.stream.shutdown(Shutdown::Both);
        }
    }
}
