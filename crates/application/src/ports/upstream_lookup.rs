use crate::context::RequestContext;
use async_trait::async_trait;
use cname_finalizer_domain::DomainError;
use hickory_proto::rr::{Name, Record, RecordType};

#[async_trait]
pub trait UpstreamLookup: Send + Sync {
    /// Resolve a single (name, type) pair and return the answer section.
    ///
    /// An empty vector is a valid answer (NXDOMAIN or NODATA); callers decide
    /// what that means for them.
    async fn lookup(
        &self,
        ctx: &RequestContext,
        name: &Name,
        query_type: RecordType,
    ) -> Result<Vec<Record>, DomainError>;
}
