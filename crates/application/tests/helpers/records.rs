use hickory_proto::op::{Message, MessageType, OpCode, Query};
use hickory_proto::rr::rdata::{A, CNAME};
use hickory_proto::rr::{Name, RData, Record, RecordType};
use std::net::Ipv4Addr;
use std::str::FromStr;

pub fn name(s: &str) -> Name {
    Name::from_str(s).unwrap()
}

pub fn cname(from: &str, to: &str) -> Record {
    Record::from_rdata(name(from), 300, RData::CNAME(CNAME(name(to))))
}

pub fn a(owner: &str, ip: &str) -> Record {
    let ip: Ipv4Addr = ip.parse().unwrap();
    Record::from_rdata(name(owner), 300, RData::A(A(ip)))
}

/// A NOERROR response to `qname`/`qtype` carrying `answers`.
pub fn response_for(qname: &str, qtype: RecordType, answers: Vec<Record>) -> Message {
    let mut message = Message::new(4242, MessageType::Response, OpCode::Query);
    message
        .set_recursion_desired(true)
        .set_recursion_available(true);
    message.add_query(Query::query(name(qname), qtype));
    message.add_answers(answers);
    message
}
