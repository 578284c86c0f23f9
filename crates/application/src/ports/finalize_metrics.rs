use std::time::Duration;

/// Points in the flattening flow that are counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FinalizeEvent {
    RequestObserved,
    CircularReference,
    DanglingAlias,
    MaxLookupReached,
    UpstreamError,
}

impl FinalizeEvent {
    pub fn all() -> &'static [FinalizeEvent] {
        &[
            FinalizeEvent::RequestObserved,
            FinalizeEvent::CircularReference,
            FinalizeEvent::DanglingAlias,
            FinalizeEvent::MaxLookupReached,
            FinalizeEvent::UpstreamError,
        ]
    }

    pub fn metric_name(&self) -> &'static str {
        match self {
            FinalizeEvent::RequestObserved => "request_count_total",
            FinalizeEvent::CircularReference => "circular_reference_count_total",
            FinalizeEvent::DanglingAlias => "dangling_cname_count_total",
            FinalizeEvent::MaxLookupReached => "max_lookup_reached_count_total",
            FinalizeEvent::UpstreamError => "upstream_error_count_total",
        }
    }

    pub fn help(&self) -> &'static str {
        match self {
            FinalizeEvent::RequestObserved => "Counter of requests processed.",
            FinalizeEvent::CircularReference => "Counter of detected circular references.",
            FinalizeEvent::DanglingAlias => "Counter of CNAMES that couldn't be resolved.",
            FinalizeEvent::MaxLookupReached => {
                "Counter of incidents when the maximum lookup depth was reached while trying to resolve a CNAME."
            }
            FinalizeEvent::UpstreamError => "Counter of upstream errors received.",
        }
    }
}

/// Sink for flattening counters. Implementations are shared by every
/// in-flight request and must not block.
pub trait FinalizeMetricsPort: Send + Sync {
    fn record(&self, server: &str, event: FinalizeEvent);

    fn observe_duration(&self, server: &str, elapsed: Duration);
}
