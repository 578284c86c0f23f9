mod alias_chain;
mod chain_state;
mod finalize_cname;

pub use alias_chain::{find_last_target, has_terminal_record, is_alias};
pub use chain_state::{ChainAbort, ChainState, SkipReason};
pub use finalize_cname::FinalizeCnameUseCase;
