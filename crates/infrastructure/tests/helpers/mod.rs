#![allow(dead_code)]
mod dns_server_mock;
mod records;

pub use dns_server_mock::{MockDnsServer, Responder};
pub use records::{a, cname, name, reply_to};
