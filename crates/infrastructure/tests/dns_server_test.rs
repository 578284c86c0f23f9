mod helpers;

use cname_finalizer_application::ports::FinalizeEvent;
use cname_finalizer_application::use_cases::FinalizeCnameUseCase;
use cname_finalizer_domain::{DnsProtocol, LookupBudget};
use cname_finalizer_infrastructure::dns::forwarding::MessageBuilder;
use cname_finalizer_infrastructure::dns::upstream::FailoverPool;
use cname_finalizer_infrastructure::dns::{
    DnsServerHandler, FinalizeMetrics, ForwardingHandler, UpstreamResolver,
};
use helpers::{a, cname, name, reply_to, MockDnsServer, Responder};
use hickory_proto::op::{Message, MessageType, OpCode, Query, ResponseCode};
use hickory_proto::rr::RecordType;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio_util::sync::CancellationToken;

const LABEL: &str = "dns://:5353";

/// a -> b -> 1.2.3.4, x -> y -> b, dangling -> nowhere (NXDOMAIN).
fn zone() -> Responder {
    Arc::new(|request: &Message, _: &'static str| {
        let qname = request.queries()[0].name().to_string();
        let reply = match qname.as_str() {
            "a.example.com." => reply_to(
                request,
                ResponseCode::NoError,
                vec![cname("a.example.com.", "b.example.com.")],
            ),
            "b.example.com." => reply_to(
                request,
                ResponseCode::NoError,
                vec![a("b.example.com.", "1.2.3.4")],
            ),
            "x.example.com." => reply_to(
                request,
                ResponseCode::NoError,
                vec![
                    cname("x.example.com.", "y.example.com."),
                    cname("y.example.com.", "b.example.com."),
                ],
            ),
            "dangling.example.com." => reply_to(
                request,
                ResponseCode::NoError,
                vec![cname("dangling.example.com.", "nowhere.example.com.")],
            ),
            _ => reply_to(request, ResponseCode::NXDomain, vec![]),
        };
        Some(reply)
    })
}

struct Harness {
    handler: DnsServerHandler,
    metrics: FinalizeMetrics,
    server_socket: Arc<UdpSocket>,
    client: UdpSocket,
}

impl Harness {
    async fn new(upstream: &MockDnsServer, timeout: Duration) -> Self {
        let pool = FailoverPool::new(
            vec![DnsProtocol::Udp {
                addr: upstream.addr(),
            }],
            timeout,
        );
        let metrics = FinalizeMetrics::new().unwrap();
        let use_case = FinalizeCnameUseCase::new(
            Arc::new(ForwardingHandler::new(pool.clone())),
            Arc::new(UpstreamResolver::new(pool)),
            Arc::new(metrics.clone()),
            LookupBudget::default(),
        );
        let handler = DnsServerHandler::new(
            Arc::new(use_case),
            LABEL,
            Duration::from_secs(2),
            CancellationToken::new(),
        );

        let server_socket = Arc::new(UdpSocket::bind("127.0.0.1:0").await.unwrap());
        let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        client
            .connect(server_socket.local_addr().unwrap())
            .await
            .unwrap();

        Self {
            handler,
            metrics,
            server_socket,
            client,
        }
    }

    /// Send `bytes` from the client, serve exactly one datagram, return the reply.
    async fn round_trip(&self, bytes: &[u8]) -> Message {
        self.client.send(bytes).await.unwrap();

        let mut buf = vec![0u8; 4096];
        let (len, peer) = self.server_socket.recv_from(&mut buf).await.unwrap();
        self.handler
            .handle_datagram(&buf[..len], peer, Arc::clone(&self.server_socket))
            .await;

        let mut reply = vec![0u8; 4096];
        let len = tokio::time::timeout(Duration::from_secs(5), self.client.recv(&mut reply))
            .await
            .unwrap()
            .unwrap();
        Message::from_vec(&reply[..len]).unwrap()
    }
}

fn query_bytes(id: u16, qname: &str, qtype: RecordType) -> Vec<u8> {
    let mut request = Message::new(id, MessageType::Query, OpCode::Query);
    request.set_recursion_desired(true);
    request.add_query(Query::query(name(qname), qtype));
    MessageBuilder::serialize_message(&request).unwrap()
}

#[tokio::test]
async fn test_alias_only_reply_is_flattened_end_to_end() {
    let upstream = MockDnsServer::start(zone()).await;
    let harness = Harness::new(&upstream, Duration::from_millis(500)).await;

    let reply = harness
        .round_trip(&query_bytes(0x1001, "a.example.com.", RecordType::A))
        .await;

    assert_eq!(reply.id(), 0x1001);
    assert_eq!(reply.response_code(), ResponseCode::NoError);
    assert_eq!(
        reply.answers(),
        &[
            cname("a.example.com.", "b.example.com."),
            a("b.example.com.", "1.2.3.4"),
        ]
    );
    assert_eq!(upstream.udp_queries(), 2);
    assert_eq!(harness.metrics.count(LABEL, FinalizeEvent::RequestObserved), 1);
    assert_eq!(harness.metrics.duration_count(LABEL), 1);
}

#[tokio::test]
async fn test_multi_alias_reply_is_flattened_end_to_end() {
    let upstream = MockDnsServer::start(zone()).await;
    let harness = Harness::new(&upstream, Duration::from_millis(500)).await;

    let reply = harness
        .round_trip(&query_bytes(0x1005, "x.example.com.", RecordType::A))
        .await;

    assert_eq!(reply.id(), 0x1005);
    assert_eq!(reply.response_code(), ResponseCode::NoError);
    assert_eq!(
        reply.answers(),
        &[
            cname("x.example.com.", "y.example.com."),
            cname("y.example.com.", "b.example.com."),
            a("b.example.com.", "1.2.3.4"),
        ]
    );
    assert_eq!(upstream.udp_queries(), 2);
}

#[tokio::test]
async fn test_dangling_alias_returns_original_reply() {
    let upstream = MockDnsServer::start(zone()).await;
    let harness = Harness::new(&upstream, Duration::from_millis(500)).await;

    let reply = harness
        .round_trip(&query_bytes(0x1002, "dangling.example.com.", RecordType::A))
        .await;

    assert_eq!(reply.response_code(), ResponseCode::NoError);
    assert_eq!(
        reply.answers(),
        &[cname("dangling.example.com.", "nowhere.example.com.")]
    );
    assert_eq!(harness.metrics.count(LABEL, FinalizeEvent::DanglingAlias), 1);
}

#[tokio::test]
async fn test_cname_question_is_relayed_untouched() {
    let upstream = MockDnsServer::start(zone()).await;
    let harness = Harness::new(&upstream, Duration::from_millis(500)).await;

    let reply = harness
        .round_trip(&query_bytes(0x1003, "a.example.com.", RecordType::CNAME))
        .await;

    assert_eq!(reply.answers().len(), 1);
    assert_eq!(upstream.udp_queries(), 1);
    assert_eq!(harness.metrics.count(LABEL, FinalizeEvent::RequestObserved), 0);
}

#[tokio::test]
async fn test_unreachable_upstream_yields_servfail() {
    let upstream = MockDnsServer::start(Arc::new(|_: &Message, _: &'static str| None)).await;
    let harness = Harness::new(&upstream, Duration::from_millis(100)).await;

    let reply = harness
        .round_trip(&query_bytes(0x1004, "a.example.com.", RecordType::A))
        .await;

    assert_eq!(reply.id(), 0x1004);
    assert_eq!(reply.message_type(), MessageType::Response);
    assert_eq!(reply.response_code(), ResponseCode::ServFail);
    assert_eq!(reply.queries()[0].name(), &name("a.example.com."));
}

#[tokio::test]
async fn test_garbage_query_yields_formerr() {
    let upstream = MockDnsServer::start(zone()).await;
    let harness = Harness::new(&upstream, Duration::from_millis(500)).await;

    let reply = harness.round_trip(&[0xab, 0xcd, 0xff]).await;

    assert_eq!(reply.id(), 0xabcd);
    assert_eq!(reply.response_code(), ResponseCode::FormErr);
    assert_eq!(upstream.udp_queries(), 0);
}
