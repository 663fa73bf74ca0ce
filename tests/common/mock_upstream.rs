use hickory_proto::op::{Header, Message, MessageType, OpCode, ResponseCode};
use hickory_proto::rr::rdata::{self, SOA};
use hickory_proto::rr::{Name, RData, Record};
use hickory_proto::serialize::binary::{BinEncodable, BinEncoder};
use std::net::{Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio::sync::oneshot;

#[derive(Debug, Clone)]
pub enum MockBehavior {
    Answer { ip: Ipv4Addr, ttl: u32 },
    NxDomain { soa_minimum: Option<u32> },
}

/// UDP upstream stand-in answering every query the same way.
pub struct MockUpstream {
    addr: SocketAddr,
    queries_seen: Arc<AtomicU64>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockUpstream {
    pub async fn start(behavior: MockBehavior) -> std::io::Result<Self> {
        let socket = UdpSocket::bind("127.0.0.1:0").await?;
        let addr = socket.local_addr()?;
        let queries_seen = Arc::new(AtomicU64::new(0));
        let counter = queries_seen.clone();
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            let mut buf = vec![0u8; 512];
            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    result = socket.recv_from(&mut buf) => {
                        if let Ok((len, peer)) = result {
                            counter.fetch_add(1, Ordering::Relaxed);
                            if let Some(reply) = build_reply(&buf[..len], &behavior) {
                                let _ = socket.send_to(&reply, peer).await;
                            }
                        }
                    }
                }
            }
        });

        Ok(Self {
            addr,
            queries_seen,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn queries_seen(&self) -> u64 {
        self.queries_seen.load(Ordering::Relaxed)
    }
}

impl Drop for MockUpstream {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

fn build_reply(query_bytes: &[u8], behavior: &MockBehavior) -> Option<Vec<u8>> {
    let query = Message::from_vec(query_bytes).ok()?;
    let question = query.queries().first()?.clone();
    let qname = question.name().clone();

    let mut header = Header::new();
    header
        .set_id(query.id())
        .set_message_type(MessageType::Response)
        .set_op_code(OpCode::Query)
        .set_recursion_desired(true)
        .set_recursion_available(true);

    let mut reply = Message::new();
    reply.set_header(header);
    reply.add_query(question);

    match behavior {
        MockBehavior::Answer { ip, ttl } => {
            reply.add_answer(Record::from_rdata(qname, *ttl, RData::A(rdata::A(*ip))));
        }
        MockBehavior::NxDomain { soa_minimum } => {
            reply.set_response_code(ResponseCode::NXDomain);
            if let Some(minimum) = soa_minimum {
                let mname = Name::from_str("ns1.test.").ok()?;
                let rname = Name::from_str("hostmaster.test.").ok()?;
                let soa = SOA::new(mname, rname, 1, 3600, 600, 86400, *minimum);
                reply.add_name_server(Record::from_rdata(qname, 3600, RData::SOA(soa)));
            }
        }
    }

    let mut bytes = Vec::with_capacity(512);
    let mut encoder = BinEncoder::new(&mut bytes);
    reply.emit(&mut encoder).ok()?;
    Some(bytes)
}
