//! In-process cache stand-in

use std::collections::HashMap;

use super::CacheStore;
use crate::error::FixtureError;

/// Map-backed `CacheStore` for harness runs without a cache server. After
/// `close`, every operation fails the same way a dropped connection would.
pub struct MemoryCache {
    entries: Option<HashMap<String, String>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self {
            entries: Some(HashMap::new()),
        }
    }

    fn closed() -> FixtureError {
        FixtureError::ResourceUnavailable("cache connection is closed".to_string())
    }
}

impl CacheStore for MemoryCache {
    fn set(&mut self, key: &str, value: &str) -> Result<(), FixtureError> {
        let entries = self.entries.as_mut().ok_or_else(MemoryCache::closed)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn get(&mut self, key: &str) -> Result<Option<String>, FixtureError> {
        let entries = self.entries.as_ref().ok_or_else(MemoryCache::closed)?;
        Ok(entries.get(key).cloned())
    }

    fn key_count(&mut self) -> Result<u64, FixtureError> {
        let entries = self.entries.as_ref().ok_or_else(MemoryCache::closed)?;
        Ok(entries.len() as u64)
    }

    fn flush_all(&mut self) -> Result<(), FixtureError> {
        let entries = self.entries.as_mut().ok_or_else(MemoryCache::closed)?;
        entries.clear();
        Ok(())
    }

    fn close(&mut self) {
        self.entries = None;
    }
}
