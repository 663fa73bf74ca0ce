use hickory_proto::op::{Message, ResponseCode};
use hickory_proto::rr::RData;
use kestrel_dns_domain::{DnsRecord, DomainError, RecordData};
use tracing::debug;

use super::super::codec::normalize_name;
use super::super::record_map::RecordTypeMapper;

/// Parsed upstream response, reduced to what the cache needs.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub rcode: ResponseCode,
    pub records: Vec<DnsRecord>,
    /// Smallest TTL across the answer section; governs the cache entry.
    pub min_ttl: Option<u32>,
    /// SOA minimum from the authority section; negative-cache TTL source.
    pub negative_soa_ttl: Option<u32>,
    pub truncated: bool,
}

impl UpstreamResponse {
    pub fn is_nxdomain(&self) -> bool {
        self.rcode == ResponseCode::NXDomain
    }

    pub fn is_success(&self) -> bool {
        self.rcode == ResponseCode::NoError || self.is_nxdomain()
    }
}

pub struct ResponseParser;

impl ResponseParser {
    /// Parse an upstream response and verify it matches the query ID.
    pub fn parse(response_bytes: &[u8], expected_id: u16) -> Result<UpstreamResponse, DomainError> {
        let message = Message::from_vec(response_bytes).map_err(|e| {
            DomainError::MalformedMessage(format!("failed to parse DNS response: {}", e))
        })?;

        if message.id() != expected_id {
            return Err(DomainError::MalformedMessage(format!(
                "response ID {} does not match query ID {}",
                message.id(),
                expected_id
            )));
        }

        let rcode = message.response_code();
        let truncated = message.truncated();

        let mut records = Vec::with_capacity(message.answers().len());
        let mut min_ttl: Option<u32> = None;

        for record in message.answers() {
            let record_type = match RecordTypeMapper::from_hickory(record.record_type()) {
                Some(rt) => rt,
                None => continue,
            };
            let data = match record.data().and_then(to_record_data) {
                Some(data) => data,
                None => continue,
            };

            let record_ttl = record.ttl();
            min_ttl = Some(min_ttl.map_or(record_ttl, |current| current.min(record_ttl)));

            records.push(DnsRecord::new(
                normalize_name(&record.name().to_utf8()),
                record_type,
                data,
                record_ttl,
            ));
        }

        let negative_soa_ttl = message.name_servers().iter().find_map(|r| {
            if let Some(RData::SOA(soa)) = r.data() {
                Some(soa.minimum().min(r.ttl()))
            } else {
                None
            }
        });

        debug!(
            rcode = ?rcode,
            answers = records.len(),
            truncated = truncated,
            "Upstream response parsed"
        );

        Ok(UpstreamResponse {
            rcode,
            records,
            min_ttl,
            negative_soa_ttl,
            truncated,
        })
    }
}

fn to_record_data(rdata: &RData) -> Option<RecordData> {
    match rdata {
        RData::A(a) => Some(RecordData::A(a.0)),
        RData::AAAA(aaaa) => Some(RecordData::Aaaa(aaaa.0)),
        RData::CNAME(cname) => Some(RecordData::Cname(normalize_name(&cname.0.to_utf8()))),
        RData::MX(mx) => Some(RecordData::Mx {
            preference: mx.preference(),
            exchange: normalize_name(&mx.exchange().to_utf8()),
        }),
        RData::TXT(txt) => {
            let text = txt
                .txt_data()
                .iter()
                .map(|part| String::from_utf8_lossy(part).into_owned())
                .collect::<Vec<_>>()
                .join("");
            Some(RecordData::Txt(text))
        }
        RData::NS(ns) => Some(RecordData::Ns(normalize_name(&ns.0.to_utf8()))),
        RData::PTR(ptr) => Some(RecordData::Ptr(normalize_name(&ptr.0.to_utf8()))),
        _ => None,
    }
}
