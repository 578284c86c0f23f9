//! cname-finalizer domain layer
pub mod config;
pub mod dns_protocol;
pub mod errors;
pub mod lookup_budget;

pub use config::{CliOverrides, Config, ConfigError, FinalizeConfig};
pub use dns_protocol::DnsProtocol;
pub use errors::{AliasChainError, DomainError};
pub use lookup_budget::LookupBudget;
