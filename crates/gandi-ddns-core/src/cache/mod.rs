// # Address Cache Implementations
//
// This module provides implementations of the AddressCache trait for
// different persistence strategies.

pub mod file;
pub mod memory;

pub use file::FileAddressCache;
pub use memory::MemoryAddressCache;

use crate::config::CacheConfig;
use crate::traits::AddressCache;
use crate::types::Protocol;

/// Build the cache described by `config`
pub fn from_config(config: &CacheConfig) -> Box<dyn AddressCache> {
    match config {
        CacheConfig::File {
            dir,
            ipv4_path,
            ipv6_path,
        } => {
            let mut cache = FileAddressCache::new(dir);
            if let Some(path) = ipv4_path {
                cache = cache.with_path(Protocol::V4.as_str(), path);
            }
            if let Some(path) = ipv6_path {
                cache = cache.with_path(Protocol::V6.as_str(), path);
            }
            Box::new(cache)
        }
        CacheConfig::Memory => Box::new(MemoryAddressCache::new()),
    }
}
