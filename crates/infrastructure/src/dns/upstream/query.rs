use crate::dns::forwarding::{DnsResponse, ResponseParser};
use crate::dns::transport;
use cname_finalizer_domain::{DnsProtocol, DomainError};
use std::time::{Duration, Instant};
use tracing::debug;

/// Send one query to one server and parse the reply.
///
/// A truncated UDP reply is retried over TCP to the same address with
/// whatever is left of `timeout`.
pub async fn query_server(
    protocol: &DnsProtocol,
    query_bytes: &[u8],
    expected_id: u16,
    timeout: Duration,
) -> Result<DnsResponse, DomainError> {
    let start = Instant::now();

    let dns_transport = transport::create_transport(protocol);
    let transport_response = dns_transport.send(query_bytes, timeout).await?;
    let dns_response = parse_checked(protocol, &transport_response.bytes, expected_id)?;

    if !dns_response.truncated || !matches!(protocol, DnsProtocol::Udp { .. }) {
        return Ok(dns_response);
    }

    let tcp_protocol = protocol.as_tcp();

    debug!(server = %protocol.socket_addr(), "Response truncated (TC bit), retrying via TCP");

    let remaining =
        retry_budget(timeout, start.elapsed()).ok_or_else(|| DomainError::TransportTimeout {
            server: tcp_protocol.socket_addr().to_string(),
        })?;

    let tcp_transport = transport::create_transport(&tcp_protocol);
    let tcp_response = tcp_transport.send(query_bytes, remaining).await?;
    parse_checked(&tcp_protocol, &tcp_response.bytes, expected_id)
}

/// Time left for the TCP retry, `None` once `timeout` is spent.
fn retry_budget(timeout: Duration, elapsed: Duration) -> Option<Duration> {
    timeout.checked_sub(elapsed).filter(|left| !left.is_zero())
}

fn parse_checked(
    protocol: &DnsProtocol,
    bytes: &[u8],
    expected_id: u16,
) -> Result<DnsResponse, DomainError> {
    let response = ResponseParser::parse(bytes)?;
    let id = response.message.id();
    if id != expected_id {
        return Err(DomainError::InvalidDnsResponse(format!(
            "{} answered with id {} (expected {})",
            protocol, id, expected_id
        )));
    }
    Ok(response)
}
