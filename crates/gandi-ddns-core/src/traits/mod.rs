//! Core traits for the DDNS client
//!
//! This module defines the seams between the reconciler and the outside
//! world.
//!
//! - [`AddressSource`]: Observe the current public address
//! - [`DnsProvider`]: Read and replace the published record
//! - [`AddressCache`]: Durable hint of the last published address

pub mod address_source;
pub mod dns_provider;
pub mod address_cache;

pub use address_source::AddressSource;
pub use dns_provider::{DnsProvider, UpdateResult, RecordMetadata};
pub use address_cache::AddressCache;
