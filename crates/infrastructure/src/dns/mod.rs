pub mod forwarding;
pub mod metrics;
pub mod server;
pub mod transport;
pub mod upstream;

pub use metrics::FinalizeMetrics;
pub use server::{DnsServerHandler, UdpResponseWriter};
pub use upstream::{ForwardingHandler, UpstreamResolver};
