// # DNS Provider Trait
//
// Defines the interface for reading and replacing a DNS record via a
// provider API.
//
// ## Implementations
//
// - Gandi LiveDNS: `gandi-ddns-provider-livedns` crate
//
// ## Usage
//
// ```rust,ignore
// use gandi_ddns_core::{DnsProvider, RecordTarget, RecordType};
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let provider = /* DnsProvider implementation */;
//     let target = RecordTarget::new("example.com", "@", RecordType::A);
//
//     // Replace the A record with a single value
//     provider.update_record(
//         &target,
//         &std::net::IpAddr::from([203, 0, 113, 5]),
//         300,
//     ).await?;
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use std::net::IpAddr;

use crate::types::{RecordTarget, RecordType};

/// Result of a DNS update operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateResult {
    /// The provider accepted the new value set
    Updated {
        /// The new IP address
        new_ip: IpAddr,
    },
    /// The request was logged but not sent
    DryRun {
        /// The IP address that would have been set
        new_ip: IpAddr,
    },
}

impl UpdateResult {
    /// The address the record now holds (or would hold)
    pub fn new_ip(&self) -> IpAddr {
        match self {
            UpdateResult::Updated { new_ip } | UpdateResult::DryRun { new_ip } => *new_ip,
        }
    }
}

/// Provider-side state of a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordMetadata {
    /// The record name
    pub name: String,
    /// The record type
    pub record_type: RecordType,
    /// Values currently published
    pub values: Vec<String>,
    /// Time-to-live for the record
    pub ttl: Option<u32>,
}

impl RecordMetadata {
    /// The record's current value (first element of the value set)
    pub fn current_value(&self) -> Option<&str> {
        self.values.first().map(String::as_str)
    }
}

/// Trait for DNS provider implementations
///
/// The provider owns the authoritative copy of the record. The client only
/// ever reads one rrset or overwrites it; it never lists, creates arbitrary
/// records or deletes anything.
///
/// # Contract
///
/// - **Stateless**: no knowledge of the cache or of previous calls.
/// - **Single-shot**: one API call per method invocation, no retries.
/// - **Replace, never append**: `update_record` leaves exactly one value in
///   the record's value set.
/// - Credentials never appear in logs or error messages.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Read the record's current state
    ///
    /// # Returns
    ///
    /// - `Ok(RecordMetadata)`: The record as published
    /// - `Err(Error)`: The record doesn't exist or the request failed
    async fn get_record(&self, target: &RecordTarget) -> Result<RecordMetadata, crate::Error>;

    /// Replace the record's value set with `new_ip`
    ///
    /// # Parameters
    ///
    /// - `target`: The rrset to overwrite
    /// - `new_ip`: The single value to publish
    /// - `ttl`: Time-to-live in seconds
    ///
    /// # Returns
    ///
    /// - `Ok(UpdateResult)`: The provider accepted the change
    /// - `Err(Error)`: The update failed; the record is assumed unchanged
    async fn update_record(
        &self,
        target: &RecordTarget,
        new_ip: &IpAddr,
        ttl: u32,
    ) -> Result<UpdateResult, crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
