//! Data model shared by the reconciler and its collaborators

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use crate::error::Error;

/// Address family being reconciled
///
/// The protocol selects which address-echo endpoint is queried, which DNS
/// record type is targeted and which cache key is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Protocol {
    /// IPv4, published as an A record
    #[serde(rename = "ipv4")]
    V4,
    /// IPv6, published as an AAAA record
    #[serde(rename = "ipv6")]
    V6,
}

impl Protocol {
    /// Both protocols in default reconciliation order
    pub const ALL: [Protocol; 2] = [Protocol::V4, Protocol::V6];

    /// Protocol identifier, also used as the cache key
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::V4 => "ipv4",
            Protocol::V6 => "ipv6",
        }
    }

    /// DNS record type carrying addresses of this protocol
    pub fn record_type(&self) -> RecordType {
        match self {
            Protocol::V4 => RecordType::A,
            Protocol::V6 => RecordType::Aaaa,
        }
    }

    /// Whether `ip` belongs to this address family
    pub fn matches(&self, ip: &IpAddr) -> bool {
        match self {
            Protocol::V4 => ip.is_ipv4(),
            Protocol::V6 => ip.is_ipv6(),
        }
    }

    /// Parse a textual address, accepting it only if it is a literal of
    /// this protocol's family
    ///
    /// Surrounding whitespace is ignored. Empty, malformed and wrong-family
    /// inputs all yield `None`.
    pub fn parse_address(&self, text: &str) -> Option<IpAddr> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        text.parse::<IpAddr>().ok().filter(|ip| self.matches(ip))
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Protocol {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ipv4" | "v4" | "4" | "a" => Ok(Protocol::V4),
            "ipv6" | "v6" | "6" | "aaaa" => Ok(Protocol::V6),
            other => Err(Error::invalid_input(format!(
                "unknown protocol '{}', expected ipv4 or ipv6",
                other
            ))),
        }
    }
}

/// DNS record type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordType {
    /// A record (IPv4)
    A,
    /// AAAA record (IPv6)
    #[serde(rename = "AAAA")]
    Aaaa,
}

impl RecordType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The single rrset a reconciliation reads and overwrites
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordTarget {
    /// DNS zone, e.g. "example.com"
    pub domain: String,
    /// Record name within the zone, e.g. "@" or "home"
    pub name: String,
    /// A or AAAA
    pub record_type: RecordType,
}

impl RecordTarget {
    pub fn new(domain: impl Into<String>, name: impl Into<String>, record_type: RecordType) -> Self {
        Self {
            domain: domain.into(),
            name: name.into(),
            record_type,
        }
    }
}

impl fmt::Display for RecordTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} record '{}' for {}", self.record_type, self.name, self.domain)
    }
}

/// Per-invocation verdict on whether a record must change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateDecision {
    /// Currently observed public address
    pub address: IpAddr,
    /// Last published address, if it could be determined
    pub previous: Option<IpAddr>,
    /// True when `address` differs from `previous` (or `previous` is unknown)
    pub changed: bool,
}

impl UpdateDecision {
    /// Compare the observed address with the last published one
    pub fn decide(address: IpAddr, previous: Option<IpAddr>) -> Self {
        Self {
            address,
            previous,
            changed: previous != Some(address),
        }
    }
}
