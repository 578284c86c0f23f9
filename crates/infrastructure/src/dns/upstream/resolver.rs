use super::pool::{FailoverPool, RcodePolicy};
use crate::dns::forwarding::MessageBuilder;
use async_trait::async_trait;
use cname_finalizer_application::ports::UpstreamLookup;
use cname_finalizer_application::RequestContext;
use cname_finalizer_domain::DomainError;
use hickory_proto::rr::{Name, Record, RecordType};
use tracing::debug;

/// Resolves alias targets by asking the configured upstream servers directly.
pub struct UpstreamResolver {
    pool: FailoverPool,
}

impl UpstreamResolver {
    pub fn new(pool: FailoverPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UpstreamLookup for UpstreamResolver {
    async fn lookup(
        &self,
        ctx: &RequestContext,
        name: &Name,
        query_type: RecordType,
    ) -> Result<Vec<Record>, DomainError> {
        let (id, query_bytes) = MessageBuilder::build_query(name, query_type)?;

        let response = self
            .pool
            .exchange(ctx, &query_bytes, id, RcodePolicy::FailOver)
            .await?;

        if response.is_nxdomain() || response.is_nodata() {
            debug!(name = %name, query_type = %query_type, nxdomain = response.is_nxdomain(), "Upstream has no records");
            return Ok(Vec::new());
        }

        Ok(response.message.answers().to_vec())
    }
}
