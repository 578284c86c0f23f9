use cname_finalizer_infrastructure::dns::forwarding::MessageBuilder;
use hickory_proto::op::Message;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, UdpSocket};
use tokio::sync::oneshot;

/// Builds the reply for a query. The second argument is "UDP" or "TCP".
/// Returning `None` drops the query without answering.
pub type Responder = Arc<dyn Fn(&Message, &'static str) -> Option<Message> + Send + Sync>;

/// Upstream stand-in listening on 127.0.0.1 over UDP and TCP on the same port.
pub struct MockDnsServer {
    addr: SocketAddr,
    udp_queries: Arc<AtomicUsize>,
    tcp_queries: Arc<AtomicUsize>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockDnsServer {
    pub async fn start(responder: Responder) -> Self {
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = socket.local_addr().unwrap();
        let listener = TcpListener::bind(addr).await.unwrap();

        let udp_queries = Arc::new(AtomicUsize::new(0));
        let tcp_queries = Arc::new(AtomicUsize::new(0));
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        let udp_count = Arc::clone(&udp_queries);
        let tcp_count = Arc::clone(&tcp_queries);

        tokio::spawn(async move {
            let mut buf = vec![0u8; 4096];

            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    result = socket.recv_from(&mut buf) => {
                        let Ok((len, peer)) = result else { continue };
                        udp_count.fetch_add(1, Ordering::SeqCst);
                        if let Some(bytes) = Self::answer(&responder, &buf[..len], "UDP") {
                            let _ = socket.send_to(&bytes, peer).await;
                        }
                    }
                    accepted = listener.accept() => {
                        let Ok((mut stream, _)) = accepted else { continue };
                        tcp_count.fetch_add(1, Ordering::SeqCst);
                        let responder = Arc::clone(&responder);
                        tokio::spawn(async move {
                            let mut len_buf = [0u8; 2];
                            if stream.read_exact(&mut len_buf).await.is_err() {
                                return;
                            }
                            let mut query = vec![0u8; u16::from_be_bytes(len_buf) as usize];
                            if stream.read_exact(&mut query).await.is_err() {
                                return;
                            }
                            if let Some(bytes) = Self::answer(&responder, &query, "TCP") {
                                let len = (bytes.len() as u16).to_be_bytes();
                                let _ = stream.write_all(&len).await;
                                let _ = stream.write_all(&bytes).await;
                            }
                        });
                    }
                }
            }
        });

        Self {
            addr,
            udp_queries,
            tcp_queries,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    fn answer(responder: &Responder, query: &[u8], transport: &'static str) -> Option<Vec<u8>> {
        let request = Message::from_vec(query).ok()?;
        let reply = responder(&request, transport)?;
        MessageBuilder::serialize_message(&reply).ok()
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn udp_queries(&self) -> usize {
        self.udp_queries.load(Ordering::SeqCst)
    }

    pub fn tcp_queries(&self) -> usize {
        self.tcp_queries.load(Ordering::SeqCst)
    }

    pub fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockDnsServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
