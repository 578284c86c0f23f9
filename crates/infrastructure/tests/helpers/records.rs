use hickory_proto::op::{Message, MessageType, ResponseCode};
use hickory_proto::rr::rdata::{A, CNAME};
use hickory_proto::rr::{Name, RData, Record};
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

/// Reply to `request` echoing its question.
pub fn reply_to(request: &Message, rcode: ResponseCode, answers: Vec<Record>) -> Message {
    let mut reply = Message::new(request.id(), MessageType::Response, request.op_code());
    reply
        .set_recursion_desired(request.recursion_desired())
        .set_recursion_available(true)
        .set_response_code(rcode);
    for query in request.queries() {
        reply.add_query(query.clone());
    }
    reply.add_answers(answers);
    reply
}
