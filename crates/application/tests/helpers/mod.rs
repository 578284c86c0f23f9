#![allow(dead_code)]

mod mock_ports;
mod records;

pub use mock_ports::{
    MockDownstreamHandler, MockFinalizeMetrics, MockUpstreamLookup, RecordingWriter,
};
pub use records::{a, cname, name, response_for};
