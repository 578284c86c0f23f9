use super::pool::{FailoverPool, RcodePolicy};
use crate::dns::forwarding::MessageBuilder;
use async_trait::async_trait;
use cname_finalizer_application::ports::DownstreamHandler;
use cname_finalizer_application::RequestContext;
use cname_finalizer_domain::DomainError;
use hickory_proto::op::Message;
use tracing::debug;

/// Downstream pipeline that relays the client's query to the upstream servers.
///
/// The upstream reply is returned as received, whatever its rcode, with the
/// client's message ID put back.
pub struct ForwardingHandler {
    pool: FailoverPool,
}

impl ForwardingHandler {
    pub fn new(pool: FailoverPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DownstreamHandler for ForwardingHandler {
    async fn handle(
        &self,
        ctx: &RequestContext,
        request: &Message,
    ) -> Result<Option<Message>, DomainError> {
        let id = fastrand::u16(..);
        let mut outgoing = request.clone();
        rewrite_id(&mut outgoing, id);
        let query_bytes = MessageBuilder::serialize_message(&outgoing)?;

        let response = self
            .pool
            .exchange(ctx, &query_bytes, id, RcodePolicy::Accept)
            .await?;

        let mut message = response.message;
        rewrite_id(&mut message, request.id());

        debug!(
            client = ?ctx.client_addr(),
            rcode = ?response.rcode,
            answers = message.answers().len(),
            "Forwarded query answered"
        );

        Ok(Some(message))
    }
}

fn rewrite_id(message: &mut Message, id: u16) {
    let mut header = *message.header();
    header.set_id(id);
    message.set_header(header);
}
