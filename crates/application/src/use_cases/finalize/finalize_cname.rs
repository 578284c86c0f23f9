use super::alias_chain::{find_last_target, has_terminal_record};
use super::chain_state::{ChainAbort, ChainState, SkipReason};
use crate::context::RequestContext;
use crate::ports::{
    DownstreamHandler, FinalizeEvent, FinalizeMetricsPort, ResponseWriter, UpstreamLookup,
};
use cname_finalizer_domain::{DomainError, LookupBudget};
use hickory_proto::op::{Message, Query, ResponseCode};
use hickory_proto::rr::{Record, RecordType};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error};

/// Flattens responses whose answer section is a bare CNAME chain.
///
/// The reply produced by the downstream pipeline is inspected before it is
/// written. When it only holds aliases, the last target is chased upstream
/// until a terminal record shows up, the lookup budget runs out, or a loop
/// is found. Only a fully resolved chain replaces the answer section.
pub struct FinalizeCnameUseCase {
    downstream: Arc<dyn DownstreamHandler>,
    upstream: Arc<dyn UpstreamLookup>,
    metrics: Arc<dyn FinalizeMetricsPort>,
    budget: LookupBudget,
}

impl FinalizeCnameUseCase {
    pub fn new(
        downstream: Arc<dyn DownstreamHandler>,
        upstream: Arc<dyn UpstreamLookup>,
        metrics: Arc<dyn FinalizeMetricsPort>,
        budget: LookupBudget,
    ) -> Self {
        Self {
            downstream,
            upstream,
            metrics,
            budget,
        }
    }

    pub fn budget(&self) -> LookupBudget {
        self.budget
    }

    /// Serve one request and write the (possibly flattened) reply to `writer`.
    ///
    /// Errors are fatal for the request and should be answered with SERVFAIL:
    /// the pipeline failed or produced nothing, or the write itself failed.
    /// Everything that goes wrong while chasing the chain is absorbed and the
    /// original reply is written instead.
    pub async fn execute(
        &self,
        ctx: &RequestContext,
        request: &Message,
        writer: &dyn ResponseWriter,
    ) -> Result<ResponseCode, DomainError> {
        let mut response = self
            .downstream
            .handle(ctx, request)
            .await?
            .ok_or(DomainError::NoDownstreamAnswer)?;

        if let Some(answers) = self.flatten(ctx, &response).await {
            *response.answers_mut() = answers;
        }

        writer.write_message(&response).await?;
        Ok(ResponseCode::NoError)
    }

    /// Returns the replacement answer section, or `None` to keep the original.
    async fn flatten(&self, ctx: &RequestContext, response: &Message) -> Option<Vec<Record>> {
        let query = match Self::check_skip(response) {
            Ok(query) => query,
            Err(reason) => {
                debug!(reason = %reason, "Skipping CNAME finalization");
                return None;
            }
        };

        debug!(
            name = %query.name(),
            query_type = %query.query_type(),
            answers = response.answers().len(),
            "Finalizing CNAME chain"
        );

        self.metrics.record(ctx.server(), FinalizeEvent::RequestObserved);
        let start = Instant::now();

        let result = self.resolve_chain(ctx, query, response.answers()).await;

        self.metrics.observe_duration(ctx.server(), start.elapsed());

        match result {
            Ok(answers) => Some(answers),
            Err(abort) => {
                if let Some(event) = abort.event() {
                    self.metrics.record(ctx.server(), event);
                }
                error!(name = %query.name(), error = %abort, "CNAME finalization aborted");
                None
            }
        }
    }

    fn check_skip(response: &Message) -> Result<&Query, SkipReason> {
        let query = response.queries().first().ok_or(SkipReason::NoQuestion)?;

        if query.query_type() == RecordType::CNAME {
            return Err(SkipReason::AliasQuestion);
        }
        if response.answers().is_empty() {
            return Err(SkipReason::EmptyAnswer);
        }
        if has_terminal_record(response.answers()) {
            return Err(SkipReason::AlreadyResolved);
        }
        Ok(query)
    }

    async fn resolve_chain(
        &self,
        ctx: &RequestContext,
        query: &Query,
        answers: &[Record],
    ) -> Result<Vec<Record>, ChainAbort> {
        let target = find_last_target(answers, query.name())?;
        let mut state = ChainState::new(answers, target);

        loop {
            debug!(
                name = %state.target(),
                lookups = state.lookups(),
                "Resolving CNAME target via upstream"
            );

            if self.budget.is_exhausted(state.lookups()) {
                return Err(ChainAbort::BudgetExceeded {
                    budget: self.budget,
                });
            }

            if state.target_visited() {
                return Err(ChainAbort::CycleDetected(state.target().clone()));
            }

            let target = state.begin_lookup();
            let records = ctx
                .guard(self.upstream.lookup(ctx, &target, query.query_type()))
                .await
                .map_err(|error| ChainAbort::LookupFailed {
                    target: target.clone(),
                    error,
                })?;

            if records.is_empty() {
                return Err(ChainAbort::DanglingAlias(target));
            }

            if has_terminal_record(&records) {
                debug!(name = %target, records = records.len(), "Received finalized answer");
                return Ok(state.commit(records));
            }

            let next = find_last_target(&records, &target)?;
            debug!(name = %target, next = %next, "Found next target name");
            state.advance(records, next);
        }
    }
}
