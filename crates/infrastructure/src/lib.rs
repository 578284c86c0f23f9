//! cname-finalizer adapters: upstream transports, the UDP front end and metrics.
pub mod dns;
