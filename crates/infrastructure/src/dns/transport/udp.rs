//! UDP transport for upstream queries (RFC 1035 §4.2.1).
//!
//! Messages go out unframed. A response with the TC bit set has to be
//! retried over TCP by the caller.

use super::{DnsTransport, TransportResponse};
use async_trait::async_trait;
use cname_finalizer_domain::DomainError;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;
use tokio::net::UdpSocket;
use tracing::{debug, warn};

/// Maximum UDP DNS response size with EDNS(0)
const MAX_UDP_RESPONSE_SIZE: usize = 4096;

pub struct UdpTransport {
    server_addr: SocketAddr,
}

impl UdpTransport {
    pub fn new(server_addr: SocketAddr) -> Self {
        Self { server_addr }
    }

    fn bind_addr(&self) -> SocketAddr {
        if self.server_addr.is_ipv4() {
            SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0))
        } else {
            SocketAddr::from((Ipv6Addr::UNSPECIFIED, 0))
        }
    }

    /// Datagrams from any other source are dropped and the read continues.
    async fn recv_from_server(
        &self,
        socket: &UdpSocket,
        buf: &mut [u8],
    ) -> Result<usize, DomainError> {
        loop {
            let (len, from_addr) = socket
                .recv_from(buf)
                .await
                .map_err(|e| self.io_error("receive", e))?;

            if from_addr == self.server_addr {
                return Ok(len);
            }

            warn!(
                expected = %self.server_addr,
                received_from = %from_addr,
                "Discarding UDP datagram from unexpected source"
            );
        }
    }

    fn io_error(&self, action: &str, e: std::io::Error) -> DomainError {
        DomainError::TransportError {
            server: self.server_addr.to_string(),
            reason: format!("{} failed: {}", action, e),
        }
    }
}

#[async_trait]
impl DnsTransport for UdpTransport {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, DomainError> {
        let socket = UdpSocket::bind(self.bind_addr())
            .await
            .map_err(|e| self.io_error("bind", e))?;

        let bytes_sent =
            tokio::time::timeout(timeout, socket.send_to(message_bytes, self.server_addr))
                .await
                .map_err(|_| DomainError::TransportTimeout {
                    server: self.server_addr.to_string(),
                })?
                .map_err(|e| self.io_error("send", e))?;

        debug!(server = %self.server_addr, bytes_sent, "UDP query sent");

        let mut recv_buf = vec![0u8; MAX_UDP_RESPONSE_SIZE];

        let bytes_received =
            tokio::time::timeout(timeout, self.recv_from_server(&socket, &mut recv_buf))
                .await
                .map_err(|_| DomainError::TransportTimeout {
                    server: self.server_addr.to_string(),
                })??;

        recv_buf.truncate(bytes_received);

        debug!(server = %self.server_addr, bytes_received, "UDP response received");

        Ok(TransportResponse { bytes: recv_buf })
    }

    fn protocol_name(&self) -> &'static str {
        "UDP"
    }
}
