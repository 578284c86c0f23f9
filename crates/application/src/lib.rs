//! cname-finalizer application layer: ports and the alias flattening use case
pub mod context;
pub mod ports;
pub mod use_cases;

pub use context::RequestContext;
