use crate::dns::forwarding::MessageBuilder;
use async_trait::async_trait;
use cname_finalizer_application::ports::ResponseWriter;
use cname_finalizer_application::use_cases::FinalizeCnameUseCase;
use cname_finalizer_application::RequestContext;
use cname_finalizer_domain::DomainError;
use hickory_proto::op::{Message, MessageType, OpCode, ResponseCode};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

/// Largest reply sent over UDP before falling back to a truncated answer.
const MAX_UDP_REPLY_SIZE: usize = 4096;

/// Sends the reply for one client back over the listening socket.
pub struct UdpResponseWriter {
    socket: Arc<UdpSocket>,
    peer: SocketAddr,
    written: AtomicBool,
}

impl UdpResponseWriter {
    pub fn new(socket: Arc<UdpSocket>, peer: SocketAddr) -> Self {
        Self {
            socket,
            peer,
            written: AtomicBool::new(false),
        }
    }

    pub fn has_written(&self) -> bool {
        self.written.load(Ordering::Acquire)
    }

    async fn send_bytes(&self, bytes: &[u8]) -> Result<(), DomainError> {
        self.socket
            .send_to(bytes, self.peer)
            .await
            .map_err(|e| DomainError::WriteFailed(format!("{}: {}", self.peer, e)))?;
        self.written.store(true, Ordering::Release);
        Ok(())
    }
}

#[async_trait]
impl ResponseWriter for UdpResponseWriter {
    async fn write_message(&self, message: &Message) -> Result<(), DomainError> {
        let bytes = MessageBuilder::serialize_message(message)
            .map_err(|e| DomainError::WriteFailed(e.to_string()))?;

        if bytes.len() <= MAX_UDP_REPLY_SIZE {
            return self.send_bytes(&bytes).await;
        }

        debug!(peer = %self.peer, size = bytes.len(), "Reply too large for UDP, truncating");
        let truncated = truncated_reply(message);
        let bytes = MessageBuilder::serialize_message(&truncated)
            .map_err(|e| DomainError::WriteFailed(e.to_string()))?;
        self.send_bytes(&bytes).await
    }
}

/// Entry point for every datagram received on the DNS socket.
pub struct DnsServerHandler {
    use_case: Arc<FinalizeCnameUseCase>,
    server_label: Arc<str>,
    request_timeout: Duration,
    shutdown: CancellationToken,
}

impl DnsServerHandler {
    pub fn new(
        use_case: Arc<FinalizeCnameUseCase>,
        server_label: impl Into<Arc<str>>,
        request_timeout: Duration,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            use_case,
            server_label: server_label.into(),
            request_timeout,
            shutdown,
        }
    }

    pub async fn handle_datagram(&self, query: &[u8], peer: SocketAddr, socket: Arc<UdpSocket>) {
        let writer = UdpResponseWriter::new(socket, peer);

        let request = match Message::from_vec(query) {
            Ok(request) => request,
            Err(e) => {
                warn!(peer = %peer, error = %e, "Failed to parse DNS query");
                if let Some(id) = recover_id(query) {
                    let reply = error_reply(id, OpCode::Query, false, ResponseCode::FormErr);
                    if let Err(e) = writer.write_message(&reply).await {
                        error!(peer = %peer, error = %e, "Failed to send FORMERR");
                    }
                }
                return;
            }
        };

        let ctx = RequestContext::new(Arc::clone(&self.server_label))
            .with_client(peer)
            .with_cancellation(&self.shutdown)
            .with_timeout(self.request_timeout);

        match self.use_case.execute(&ctx, &request, &writer).await {
            Ok(rcode) => {
                debug!(peer = %peer, id = request.id(), rcode = ?rcode, "Request served");
            }
            Err(e) => {
                error!(peer = %peer, id = request.id(), error = %e, "Request failed");
                if writer.has_written() {
                    return;
                }
                let mut reply = error_reply(
                    request.id(),
                    request.op_code(),
                    request.recursion_desired(),
                    ResponseCode::ServFail,
                );
                for query in request.queries() {
                    reply.add_query(query.clone());
                }
                if let Err(e) = writer.write_message(&reply).await {
                    error!(peer = %peer, error = %e, "Failed to send SERVFAIL");
                }
            }
        }
    }
}

fn recover_id(query: &[u8]) -> Option<u16> {
    match query {
        [hi, lo, ..] => Some(u16::from_be_bytes([*hi, *lo])),
        _ => None,
    }
}

fn error_reply(id: u16, op_code: OpCode, recursion_desired: bool, rcode: ResponseCode) -> Message {
    let mut reply = Message::new(id, MessageType::Response, op_code);
    reply
        .set_recursion_desired(recursion_desired)
        .set_recursion_available(true)
        .set_response_code(rcode);
    reply
}

fn truncated_reply(message: &Message) -> Message {
    let mut reply = error_reply(
        message.id(),
        message.op_code(),
        message.recursion_desired(),
        message.response_code(),
    );
    reply.set_truncated(true);
    for query in message.queries() {
        reply.add_query(query.clone());
    }
    reply
}
