pub mod finalize;

pub use finalize::{find_last_target, FinalizeCnameUseCase};
