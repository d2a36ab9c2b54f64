// # gandi-ddns-core
//
// Core library for the Gandi dynamic DNS client.
//
// ## Architecture Overview
//
// This library provides the address-reconciliation logic for dynamic DNS
// updates:
// - **AddressSource**: Trait for observing the current public address
// - **DnsProvider**: Trait for reading and replacing DNS records via provider APIs
// - **AddressCache**: Trait for the durable last-published-address hint
// - **Reconciler**: Decides per protocol whether the record must change and applies it
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Core logic is separate from HTTP implementations
// 2. **Explicit Configuration**: One immutable `DdnsConfig`, no globals
// 3. **Explicit Errors**: Every network operation returns a `Result`
// 4. **Idempotency**: An unchanged address never reaches the provider
// 5. **Best Effort**: One protocol's failure never stops another

pub mod traits;
pub mod reconciler;
pub mod cache;
pub mod config;
pub mod error;
pub mod types;

// Re-export core types for convenience
pub use traits::{AddressSource, DnsProvider, AddressCache};
pub use reconciler::{Reconciler, ReconcileOutcome, RunReport};
pub use config::{DdnsConfig, ProviderConfig, AddressSourceConfig, CacheConfig, Credential};
pub use error::{Error, Result};
pub use cache::{MemoryAddressCache, FileAddressCache};
pub use types::{Protocol, RecordTarget, RecordType, UpdateDecision};
