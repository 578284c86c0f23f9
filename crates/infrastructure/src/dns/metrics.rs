use cname_finalizer_application::ports::{FinalizeEvent, FinalizeMetricsPort};
use prometheus::{
    exponential_buckets, Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry,
    TextEncoder,
};
use std::time::Duration;

const NAMESPACE: &str = "coredns";
const SUBSYSTEM: &str = "finalize_cname";
const SERVER_LABEL: &str = "server";

/// 0.25ms doubling, 16 buckets.
const FIRST_BUCKET_SECS: f64 = 0.00025;
const BUCKET_FACTOR: f64 = 2.0;
const BUCKET_COUNT: usize = 16;

fn event_index(event: FinalizeEvent) -> usize {
    match event {
        FinalizeEvent::RequestObserved => 0,
        FinalizeEvent::CircularReference => 1,
        FinalizeEvent::DanglingAlias => 2,
        FinalizeEvent::MaxLookupReached => 3,
        FinalizeEvent::UpstreamError => 4,
    }
}

/// Process-wide counters and duration histogram, one series per `server` label.
#[derive(Clone)]
pub struct FinalizeMetrics {
    registry: Registry,
    counters: [IntCounterVec; 5],
    duration: HistogramVec,
}

impl FinalizeMetrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let counter = |event: FinalizeEvent| -> prometheus::Result<IntCounterVec> {
            let vec = IntCounterVec::new(
                Opts::new(event.metric_name(), event.help())
                    .namespace(NAMESPACE)
                    .subsystem(SUBSYSTEM),
                &[SERVER_LABEL],
            )?;
            registry.register(Box::new(vec.clone()))?;
            Ok(vec)
        };

        let counters = [
            counter(FinalizeEvent::RequestObserved)?,
            counter(FinalizeEvent::CircularReference)?,
            counter(FinalizeEvent::DanglingAlias)?,
            counter(FinalizeEvent::MaxLookupReached)?,
            counter(FinalizeEvent::UpstreamError)?,
        ];

        let duration = HistogramVec::new(
            HistogramOpts::new(
                "request_duration_seconds",
                "Histogram of the time each request took.",
            )
            .namespace(NAMESPACE)
            .subsystem(SUBSYSTEM)
            .buckets(exponential_buckets(
                FIRST_BUCKET_SECS,
                BUCKET_FACTOR,
                BUCKET_COUNT,
            )?),
            &[SERVER_LABEL],
        )?;
        registry.register(Box::new(duration.clone()))?;

        Ok(Self {
            registry,
            counters,
            duration,
        })
    }

    /// Create every series for `server` at zero so it is exported before the
    /// first flattened request.
    pub fn init_server(&self, server: &str) {
        for counter in &self.counters {
            counter.with_label_values(&[server]);
        }
        self.duration.with_label_values(&[server]);
    }

    pub fn count(&self, server: &str, event: FinalizeEvent) -> u64 {
        self.counters[event_index(event)]
            .with_label_values(&[server])
            .get()
    }

    pub fn duration_count(&self, server: &str) -> u64 {
        self.duration
            .with_label_values(&[server])
            .get_sample_count()
    }

    /// Prometheus text exposition of every registered series.
    pub fn render_prometheus(&self) -> prometheus::Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;

        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

impl FinalizeMetricsPort for FinalizeMetrics {
    fn record(&self, server: &str, event: FinalizeEvent) {
        self.counters[event_index(event)]
            .with_label_values(&[server])
            .inc();
    }

    fn observe_duration(&self, server: &str, elapsed: Duration) {
        self.duration
            .with_label_values(&[server])
            .observe(elapsed.as_secs_f64());
    }
}
