mod downstream_handler;
mod finalize_metrics;
mod response_writer;
mod upstream_lookup;

pub use downstream_handler::DownstreamHandler;
pub use finalize_metrics::{FinalizeEvent, FinalizeMetricsPort};
pub use response_writer::ResponseWriter;
pub use upstream_lookup::UpstreamLookup;
