use cname_finalizer_application::use_cases::FinalizeCnameUseCase;
use cname_finalizer_domain::Config;
use cname_finalizer_infrastructure::dns::upstream::FailoverPool;
use cname_finalizer_infrastructure::dns::{FinalizeMetrics, ForwardingHandler, UpstreamResolver};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

pub struct FinalizerServices {
    pub use_case: Arc<FinalizeCnameUseCase>,
    pub metrics: FinalizeMetrics,
}

impl FinalizerServices {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let servers = config
            .upstream
            .protocols()
            .map_err(anyhow::Error::msg)?;
        let budget = config.finalize.lookup_budget()?;

        info!(
            upstreams = servers.len(),
            budget = %budget,
            "Initializing CNAME finalizer"
        );

        let pool = FailoverPool::new(
            servers,
            Duration::from_millis(config.upstream.query_timeout_ms),
        );
        let metrics = FinalizeMetrics::new()?;
        metrics.init_server(&config.server.server_label());

        let use_case = Arc::new(FinalizeCnameUseCase::new(
            Arc::new(ForwardingHandler::new(pool.clone())),
            Arc::new(UpstreamResolver::new(pool)),
            Arc::new(metrics.clone()),
            budget,
        ));

        Ok(Self { use_case, metrics })
    }
}
