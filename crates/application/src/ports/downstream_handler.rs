use crate::context::RequestContext;
use async_trait::async_trait;
use cname_finalizer_domain::DomainError;
use hickory_proto::op::Message;

/// The rest of the processing pipeline, whose reply is captured before it
/// reaches the client.
#[async_trait]
pub trait DownstreamHandler: Send + Sync {
    /// `Ok(None)` means the pipeline finished without producing a message.
    async fn handle(
        &self,
        ctx: &RequestContext,
        request: &Message,
    ) -> Result<Option<Message>, DomainError>;
}
