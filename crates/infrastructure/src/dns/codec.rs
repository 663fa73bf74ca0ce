//! Wire-format codec for inbound queries and outbound answers.
//!
//! Pure functions over byte buffers via `hickory-proto`; malformed input
//! surfaces as `DomainError::MalformedMessage` and is answered with a
//! FORMERR reply upstream of this module, never a crash.

use hickory_proto::op::{Message, MessageType, OpCode, Query, ResponseCode};
use hickory_proto::rr::{rdata, Name, RData, Record};
use hickory_proto::serialize::binary::{BinEncodable, BinEncoder};
use kestrel_dns_domain::{Answer, DomainError, RecordData, RecordType};
use std::str::FromStr;
use std::sync::Arc;

use super::record_map::RecordTypeMapper;

/// A decoded inbound query.
#[derive(Debug, Clone)]
pub struct WireQuery {
    pub id: u16,
    /// Lowercased, trailing-dot normalized qname.
    pub qname: Arc<str>,
    /// `None` when the qtype is outside the served set (answered NOTIMP).
    pub record_type: Option<RecordType>,
    question: Query,
}

/// Parse a raw wire-format query.
pub fn decode_query(bytes: &[u8]) -> Result<WireQuery, DomainError> {
    let message = Message::from_vec(bytes)
        .map_err(|e| DomainError::MalformedMessage(format!("unparseable query: {}", e)))?;

    if message.message_type() != MessageType::Query {
        return Err(DomainError::MalformedMessage(
            "message is not a query".to_string(),
        ));
    }
    if message.queries().len() != 1 {
        return Err(DomainError::MalformedMessage(format!(
            "expected exactly one question, got {}",
            message.queries().len()
        )));
    }

    let question = message.queries()[0].clone();
    let qname = normalize_name(&question.name().to_utf8());
    let record_type = RecordTypeMapper::from_hickory(question.query_type());

    Ok(WireQuery {
        id: message.id(),
        qname: Arc::from(qname),
        record_type,
        question,
    })
}

/// Encode an answer to a previously decoded query, preserving record TTLs.
///
/// `ttl_override` replaces every record TTL; used to serve cache hits with
/// the remaining (rather than original) TTL.
pub fn encode_answer(
    wire: &WireQuery,
    answer: &Answer,
    ttl_override: Option<u32>,
) -> Result<Vec<u8>, DomainError> {
    let mut message = response_for(wire);

    match answer {
        Answer::Records(records) => {
            for record in records.iter() {
                let name = Name::from_str(&record.name).map_err(|e| {
                    DomainError::InvalidDomainName(format!("{}: {}", record.name, e))
                })?;
                let ttl = ttl_override.unwrap_or(record.ttl);
                message.add_answer(Record::from_rdata(name, ttl, to_rdata(&record.data)?));
            }
        }
        Answer::NxDomain => {
            message.set_response_code(ResponseCode::NXDomain);
        }
    }

    serialize(&message)
}

/// Encode an empty response carrying only a response code (SERVFAIL, NOTIMP).
pub fn encode_failure(wire: &WireQuery, rcode: ResponseCode) -> Result<Vec<u8>, DomainError> {
    let mut message = response_for(wire);
    message.set_response_code(rcode);
    serialize(&message)
}

/// Header-only FORMERR reply for input too mangled to decode.
pub fn encode_format_error(id: u16) -> Result<Vec<u8>, DomainError> {
    let mut message = Message::new();
    message
        .set_id(id)
        .set_message_type(MessageType::Response)
        .set_op_code(OpCode::Query)
        .set_response_code(ResponseCode::FormErr);
    serialize(&message)
}

/// The message ID is the first two bytes; recoverable even from otherwise
/// unparseable packets so the FORMERR reply can be matched by the client.
pub fn recover_id(bytes: &[u8]) -> Option<u16> {
    bytes
        .get(0..2)
        .map(|b| u16::from_be_bytes([b[0], b[1]]))
}

fn response_for(wire: &WireQuery) -> Message {
    let mut message = Message::new();
    message
        .set_id(wire.id)
        .set_message_type(MessageType::Response)
        .set_op_code(OpCode::Query)
        .set_recursion_desired(true)
        .set_recursion_available(true)
        .add_query(wire.question.clone());
    message
}

fn to_rdata(data: &RecordData) -> Result<RData, DomainError> {
    let rdata = match data {
        RecordData::A(addr) => RData::A(rdata::A(*addr)),
        RecordData::Aaaa(addr) => RData::AAAA(rdata::AAAA(*addr)),
        RecordData::Cname(name) => RData::CNAME(rdata::CNAME(parse_name(name)?)),
        RecordData::Mx {
            preference,
            exchange,
        } => RData::MX(rdata::MX::new(*preference, parse_name(exchange)?)),
        RecordData::Txt(text) => RData::TXT(rdata::TXT::new(vec![text.clone()])),
        RecordData::Ns(name) => RData::NS(rdata::NS(parse_name(name)?)),
        RecordData::Ptr(name) => RData::PTR(rdata::PTR(parse_name(name)?)),
    };
    Ok(rdata)
}

fn parse_name(name: &str) -> Result<Name, DomainError> {
    Name::from_str(name).map_err(|e| DomainError::InvalidDomainName(format!("{}: {}", name, e)))
}

pub(crate) fn normalize_name(name: &str) -> String {
    let mut normalized = name.trim().to_ascii_lowercase();
    if !normalized.ends_with('.') {
        normalized.push('.');
    }
    normalized
}

fn serialize(message: &Message) -> Result<Vec<u8>, DomainError> {
    let mut buf = Vec::with_capacity(512);
    let mut encoder = BinEncoder::new(&mut buf);
    message
        .emit(&mut encoder)
        .map_err(|e| DomainError::MalformedMessage(format!("failed to serialize: {}", e)))?;
    Ok(buf)
}
