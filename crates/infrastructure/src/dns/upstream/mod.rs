mod forwarding_handler;
mod pool;
mod query;
mod resolver;

pub use forwarding_handler::ForwardingHandler;
pub use pool::{FailoverPool, RcodePolicy};
pub use query::query_server;
pub use resolver::UpstreamResolver;
