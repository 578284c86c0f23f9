use super::query::query_server;
use crate::dns::forwarding::{DnsResponse, ResponseParser};
use cname_finalizer_application::RequestContext;
use cname_finalizer_domain::{DnsProtocol, DomainError};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// What to do with a reply that carries SERVFAIL, REFUSED, NOTIMP or FORMERR.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RcodePolicy {
    /// Hand it back; the caller relays it as is.
    Accept,
    /// Treat it like an unreachable server and try the next one.
    FailOver,
}

/// Ordered list of upstream servers, tried sequentially.
#[derive(Debug, Clone)]
pub struct FailoverPool {
    servers: Arc<[DnsProtocol]>,
    query_timeout: Duration,
}

impl FailoverPool {
    pub fn new(servers: Vec<DnsProtocol>, query_timeout: Duration) -> Self {
        Self {
            servers: servers.into(),
            query_timeout,
        }
    }

    pub fn servers(&self) -> &[DnsProtocol] {
        &self.servers
    }

    /// Per-attempt budget: the configured timeout, shortened by the request deadline.
    fn attempt_timeout(&self, ctx: &RequestContext) -> Duration {
        ctx.remaining()
            .map_or(self.query_timeout, |left| left.min(self.query_timeout))
    }

    pub async fn exchange(
        &self,
        ctx: &RequestContext,
        query_bytes: &[u8],
        id: u16,
        policy: RcodePolicy,
    ) -> Result<DnsResponse, DomainError> {
        if self.servers.is_empty() {
            return Err(DomainError::TransportAllServersUnreachable);
        }

        debug!(strategy = "failover", servers = self.servers.len(), "Trying sequentially");

        for (index, protocol) in self.servers.iter().enumerate() {
            let timeout = self.attempt_timeout(ctx);
            let attempt = ctx
                .guard(query_server(protocol, query_bytes, id, timeout))
                .await;

            match attempt {
                Ok(response) if policy == RcodePolicy::FailOver && response.is_server_error() => {
                    warn!(
                        protocol = %protocol,
                        rcode = ResponseParser::rcode_to_status(response.rcode),
                        position = index,
                        "Upstream refused to answer, failing over"
                    );
                }
                Ok(response) => {
                    debug!(server = %protocol, position = index, "Server responded");
                    return Ok(response);
                }
                Err(e) if e.is_cancellation() => return Err(e),
                Err(e) => {
                    warn!(protocol = %protocol, error = %e, position = index, "Failing over");
                }
            }
        }

        Err(DomainError::TransportAllServersUnreachable)
    }
}
