// # Memory Address Cache
//
// In-memory implementation of AddressCache.
//
// ## Purpose
//
// Nothing survives the process. Since the client runs once per invocation,
// every run starts with an empty cache and falls back to reading the live
// record, which makes this the "stateless" mode. Also used by tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::Error;
use crate::traits::AddressCache;

/// In-memory address cache
///
/// Clones share the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct MemoryAddressCache {
    inner: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryAddressCache {
    /// Create a new empty memory cache
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AddressCache for MemoryAddressCache {
    async fn get(&self, key: &str) -> Result<Option<String>, Error> {
        let guard = self.inner.read().await;
        Ok(guard.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), Error> {
        let mut guard = self.inner.write().await;
        guard.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn cache_name(&self) -> &'static str {
        "memory"
    }
}
