use async_trait::async_trait;
use cname_finalizer_domain::DomainError;
use hickory_proto::op::Message;

#[async_trait]
pub trait ResponseWriter: Send + Sync {
    async fn write_message(&self, message: &Message) -> Result<(), DomainError>;
}
