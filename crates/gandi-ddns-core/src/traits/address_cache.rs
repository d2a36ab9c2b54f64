// # Address Cache Trait
//
// Defines the interface for the local hint of the last published address.
//
// ## Purpose
//
// The cache lets the client skip a live read of the DNS record on every
// run. It is never the source of truth: when it has no entry, the
// provider's record is consulted instead.
//
// ## Implementations
//
// - File-based: one file per key (`FileAddressCache`)
// - In-memory: `MemoryAddressCache`
//
// ## Usage
//
// ```rust,ignore
// use gandi_ddns_core::AddressCache;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let cache = /* AddressCache implementation */;
//
//     // Check last published address
//     let last = cache.get("ipv4").await?;
//
//     // Record a successful update
//     cache.set("ipv4", "203.0.113.5").await?;
//
//     Ok(())
// }
// ```

use async_trait::async_trait;

/// Trait for address cache implementations
///
/// A single-value-per-key store that survives process restarts.
///
/// # Contract
///
/// - At most one value per key.
/// - A key that was never written reads as `Ok(None)`, not as an error and
///   not as an empty string.
/// - `set` is durable before it returns; no buffering across the process
///   lifetime.
/// - Write failures are reported, never swallowed.
#[async_trait]
pub trait AddressCache: Send + Sync {
    /// Get the stored value for `key`
    ///
    /// # Returns
    ///
    /// - `Ok(Some(String))`: The stored value
    /// - `Ok(None)`: Nothing has ever been stored for `key`
    /// - `Err(Error)`: Storage error
    async fn get(&self, key: &str) -> Result<Option<String>, crate::Error>;

    /// Persist `value` for `key`, overwriting any prior value
    ///
    /// # Returns
    ///
    /// - `Ok(())`: Value is durably stored
    /// - `Err(Error)`: Storage error
    async fn set(&self, key: &str, value: &str) -> Result<(), crate::Error>;

    /// Cache name (for logging/debugging)
    fn cache_name(&self) -> &'static str;
}
