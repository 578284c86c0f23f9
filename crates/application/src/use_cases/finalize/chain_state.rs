use crate::ports::FinalizeEvent;
use cname_finalizer_domain::{AliasChainError, DomainError, LookupBudget};
use hickory_proto::rr::{Name, Record};
use rustc_hash::FxHashSet;
use std::fmt;

/// Why a response is passed through without attempting to flatten it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NoQuestion,
    AliasQuestion,
    EmptyAnswer,
    AlreadyResolved,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            SkipReason::NoQuestion => "response carries no question",
            SkipReason::AliasQuestion => "question asks for CNAME records",
            SkipReason::EmptyAnswer => "answer section is empty",
            SkipReason::AlreadyResolved => "answer already holds a terminal record",
        };
        f.write_str(reason)
    }
}

/// Reasons the resolution loop gives up. Every one leaves the response untouched.
#[derive(Debug, thiserror::Error)]
pub enum ChainAbort {
    #[error("failed to find last target in CNAME chain: {0}")]
    Chain(#[from] AliasChainError),

    #[error("max lookup {budget} reached for resolving CNAME records")]
    BudgetExceeded { budget: LookupBudget },

    #[error("circular reference in CNAME chain, {0} already processed")]
    CycleDetected(Name),

    #[error("failed to lookup CNAME {target} from upstream: {error}")]
    LookupFailed { target: Name, error: DomainError },

    #[error("received no answer from upstream for {0}")]
    DanglingAlias(Name),
}

impl ChainAbort {
    /// Counter bumped for this abort. Locator failures are only logged.
    pub fn event(&self) -> Option<FinalizeEvent> {
        match self {
            ChainAbort::Chain(_) => None,
            ChainAbort::BudgetExceeded { .. } => Some(FinalizeEvent::MaxLookupReached),
            ChainAbort::CycleDetected(_) => Some(FinalizeEvent::CircularReference),
            ChainAbort::LookupFailed { .. } => Some(FinalizeEvent::UpstreamError),
            ChainAbort::DanglingAlias(_) => Some(FinalizeEvent::DanglingAlias),
        }
    }
}

/// Request-scoped bookkeeping for one flattening attempt.
#[derive(Debug)]
pub struct ChainState {
    visited: FxHashSet<Name>,
    lookups: u32,
    accumulated: Vec<Record>,
    target: Name,
}

impl ChainState {
    /// Starts from the original answer section, which is always part of a
    /// committed result.
    pub fn new(original_answers: &[Record], target: Name) -> Self {
        Self {
            visited: FxHashSet::default(),
            lookups: 0,
            accumulated: original_answers.to_vec(),
            target,
        }
    }

    pub fn target(&self) -> &Name {
        &self.target
    }

    pub fn lookups(&self) -> u32 {
        self.lookups
    }

    pub fn target_visited(&self) -> bool {
        self.visited.contains(&self.target)
    }

    /// Counts one upstream attempt and hands out the name to query.
    pub fn begin_lookup(&mut self) -> Name {
        self.lookups += 1;
        self.target.clone()
    }

    /// The last hop answered with more aliases: keep its records, remember
    /// the name just queried and move on to `next`.
    pub fn advance(&mut self, records: Vec<Record>, next: Name) {
        let previous = std::mem::replace(&mut self.target, next);
        self.visited.insert(previous);
        self.accumulated.extend(records);
    }

    /// The last hop reached a terminal record; returns the full answer section.
    pub fn commit(mut self, records: Vec<Record>) -> Vec<Record> {
        self.accumulated.extend(records);
        self.accumulated
    }
}
