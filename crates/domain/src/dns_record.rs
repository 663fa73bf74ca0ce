use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::str::FromStr;
use std::sync::Arc;

use crate::errors::DomainError;

/// DNS record types the resolver caches and forwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordType {
    A,
    AAAA,
    CNAME,
    MX,
    TXT,
    NS,
    PTR,
}

impl RecordType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::AAAA => "AAAA",
            RecordType::CNAME => "CNAME",
            RecordType::MX => "MX",
            RecordType::TXT => "TXT",
            RecordType::NS => "NS",
            RecordType::PTR => "PTR",
        }
    }

    /// Numeric QTYPE (RFC 1035 §3.2.2).
    pub fn to_qtype(&self) -> u16 {
        match self {
            RecordType::A => 1,
            RecordType::NS => 2,
            RecordType::CNAME => 5,
            RecordType::PTR => 12,
            RecordType::MX => 15,
            RecordType::TXT => 16,
            RecordType::AAAA => 28,
        }
    }

    pub fn from_qtype(qtype: u16) -> Option<Self> {
        match qtype {
            1 => Some(RecordType::A),
            2 => Some(RecordType::NS),
            5 => Some(RecordType::CNAME),
            12 => Some(RecordType::PTR),
            15 => Some(RecordType::MX),
            16 => Some(RecordType::TXT),
            28 => Some(RecordType::AAAA),
            _ => None,
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "A" => Ok(RecordType::A),
            "AAAA" => Ok(RecordType::AAAA),
            "CNAME" => Ok(RecordType::CNAME),
            "MX" => Ok(RecordType::MX),
            "TXT" => Ok(RecordType::TXT),
            "NS" => Ok(RecordType::NS),
            "PTR" => Ok(RecordType::PTR),
            other => Err(DomainError::NotImplemented(other.to_string())),
        }
    }
}

/// Typed RDATA for the record types this resolver understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordData {
    A(Ipv4Addr),
    Aaaa(Ipv6Addr),
    Cname(String),
    Mx { preference: u16, exchange: String },
    Txt(String),
    Ns(String),
    Ptr(String),
}

impl fmt::Display for RecordData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordData::A(addr) => write!(f, "{}", addr),
            RecordData::Aaaa(addr) => write!(f, "{}", addr),
            RecordData::Cname(name) => write!(f, "{}", name),
            RecordData::Mx {
                preference,
                exchange,
            } => write!(f, "{} {}", preference, exchange),
            RecordData::Txt(text) => write!(f, "\"{}\"", text),
            RecordData::Ns(name) => write!(f, "{}", name),
            RecordData::Ptr(name) => write!(f, "{}", name),
        }
    }
}

/// One resource record of an answer set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsRecord {
    pub name: String,
    pub record_type: RecordType,
    pub data: RecordData,
    /// Time to live in seconds, as declared by the upstream.
    pub ttl: u32,
}

impl DnsRecord {
    pub fn new(name: String, record_type: RecordType, data: RecordData, ttl: u32) -> Self {
        Self {
            name,
            record_type,
            data,
            ttl,
        }
    }
}

/// Resolution result for a `(qname, qtype)` key.
///
/// NXDOMAIN is an authoritative answer in its own right and is cached like
/// a positive one, which is why it lives here and not in the error enum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    Records(Arc<Vec<DnsRecord>>),
    NxDomain,
}

impl Answer {
    pub fn records(records: Vec<DnsRecord>) -> Self {
        Answer::Records(Arc::new(records))
    }

    pub fn is_nxdomain(&self) -> bool {
        matches!(self, Answer::NxDomain)
    }

    pub fn record_count(&self) -> usize {
        match self {
            Answer::Records(records) => records.len(),
            Answer::NxDomain => 0,
        }
    }
}
