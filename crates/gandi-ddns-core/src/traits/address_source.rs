// # Address Source Trait
//
// Defines the interface for observing the host's current public address.
//
// ## Implementations
//
// - HTTP address-echo service: `gandi-ddns-ip-http` crate
//
// ## Usage
//
// ```rust,ignore
// use gandi_ddns_core::{AddressSource, Protocol};
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let source = /* AddressSource implementation */;
//
//     let current = source.current(Protocol::V4).await?;
//     println!("public address: {}", current);
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use std::net::IpAddr;

use crate::types::Protocol;

/// Trait for address source implementations
///
/// A source answers one question: what is this host's public address for
/// the given protocol right now?
///
/// # Contract
///
/// - The returned address is always of `protocol`'s family.
/// - Network failure, timeout, non-success status, an empty body or a body
///   that is not an address literal are all reported as
///   [`Error::Fetch`](crate::Error::Fetch).
/// - Single-shot: no retries, no background polling. A failed fetch is
///   retried by the next invocation of the client.
#[async_trait]
pub trait AddressSource: Send + Sync {
    /// Fetch the current public address for `protocol`
    ///
    /// # Returns
    ///
    /// - `Ok(IpAddr)`: The observed address
    /// - `Err(Error)`: The address is unavailable
    async fn current(&self, protocol: Protocol) -> Result<IpAddr, crate::Error>;

    /// Source name (for logging/debugging)
    fn source_name(&self) -> &'static str;
}
