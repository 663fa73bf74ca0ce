//! Full resolution flow over the wire:
//! UDP query → cache miss → mock upstream → cached answer on repeat.

use hickory_proto::op::{Message, MessageType, OpCode, Query, ResponseCode};
use hickory_proto::rr::{DNSClass, Name, RData, RecordType as WireRecordType};
use hickory_proto::serialize::binary::{BinEncodable, BinEncoder};
use kestrel_dns_infrastructure::dns::ResolverService;
use std::net::Ipv4Addr;
use std::str::FromStr;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::timeout;

#[path = "../common/mod.rs"]
mod common;
use common::{config_for, MockBehavior, MockUpstream};

fn wire_query(id: u16, name: &str) -> Vec<u8> {
    let mut query = Query::new();
    query.set_name(Name::from_str(name).unwrap());
    query.set_query_type(WireRecordType::A);
    query.set_query_class(DNSClass::IN);

    let mut message = Message::new();
    message
        .set_id(id)
        .set_message_type(MessageType::Query)
        .set_op_code(OpCode::Query)
        .set_recursion_desired(true)
        .add_query(query);

    let mut bytes = Vec::with_capacity(512);
    let mut encoder = BinEncoder::new(&mut bytes);
    message.emit(&mut encoder).unwrap();
    bytes
}

async fn query_once(listen: &str, id: u16, name: &str) -> Message {
    let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    client.send_to(&wire_query(id, name), listen).await.unwrap();

    let mut buf = vec![0u8; 512];
    let (len, _) = timeout(Duration::from_secs(2), client.recv_from(&mut buf))
        .await
        .expect("timed out waiting for reply")
        .unwrap();
    Message::from_vec(&buf[..len]).unwrap()
}

#[tokio::test]
async fn test_complete_resolution_flow() {
    let upstream = MockUpstream::start(MockBehavior::Answer {
        ip: Ipv4Addr::new(203, 0, 113, 7),
        ttl: 240,
    })
    .await
    .unwrap();

    let service = ResolverService::new(config_for(&upstream));
    service.start().await.unwrap();
    let listen = service.status().await.listen.unwrap();

    // Cache miss goes upstream.
    let reply = query_once(&listen, 1, "flow.test.").await;
    assert_eq!(reply.response_code(), ResponseCode::NoError);
    match reply.answers()[0].data() {
        Some(RData::A(a)) => assert_eq!(a.0, Ipv4Addr::new(203, 0, 113, 7)),
        other => panic!("expected A record, got {:?}", other),
    }

    // Repeat is served from cache; the upstream sees exactly one query.
    let reply = query_once(&listen, 2, "flow.test.").await;
    assert_eq!(reply.answers().len(), 1);
    assert_eq!(upstream.queries_seen(), 1);

    // The cached answer's TTL never exceeds the original.
    assert!(reply.answers()[0].ttl() <= 240);

    let status = service.status().await;
    assert_eq!(status.stats.total_queries, 2);
    assert_eq!(status.stats.forwarded_queries, 1);
    assert_eq!(status.stats.cached_queries, 1);

    service.stop().await.unwrap();
}

#[tokio::test]
async fn test_nxdomain_flow_counts_and_caches() {
    let upstream = MockUpstream::start(MockBehavior::NxDomain {
        soa_minimum: Some(120),
    })
    .await
    .unwrap();

    let service = ResolverService::new(config_for(&upstream));
    service.start().await.unwrap();
    let listen = service.status().await.listen.unwrap();

    let reply = query_once(&listen, 3, "ghost.test.").await;
    assert_eq!(reply.response_code(), ResponseCode::NXDomain);
    assert!(reply.answers().is_empty());

    let reply = query_once(&listen, 4, "ghost.test.").await;
    assert_eq!(reply.response_code(), ResponseCode::NXDomain);
    assert_eq!(upstream.queries_seen(), 1);

    let status = service.status().await;
    assert_eq!(status.stats.nxdomain_queries, 1);
    assert_eq!(status.stats.cached_queries, 1);
    assert_eq!(status.stats.error_queries, 0);

    service.stop().await.unwrap();
}

#[tokio::test]
async fn test_qname_case_is_folded_into_one_cache_entry() {
    let upstream = MockUpstream::start(MockBehavior::Answer {
        ip: Ipv4Addr::new(203, 0, 113, 9),
        ttl: 300,
    })
    .await
    .unwrap();

    let service = ResolverService::new(config_for(&upstream));
    service.start().await.unwrap();
    let listen = service.status().await.listen.unwrap();

    query_once(&listen, 5, "Mixed.Case.Test.").await;
    query_once(&listen, 6, "mixed.case.test.").await;

    assert_eq!(upstream.queries_seen(), 1);

    service.stop().await.unwrap();
}
