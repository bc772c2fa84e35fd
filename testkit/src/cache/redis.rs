//! Redis-backed cache handle

use redis::Commands;

use super::CacheStore;
use crate::error::FixtureError;

pub struct RedisCache {
    conn: Option<redis::Connection>,
}

impl RedisCache {
    /// Open a connection to the cache server
    pub fn connect(url: &str) -> Result<Self, FixtureError> {
        let client = redis::Client::open(url)?;
        let conn = client.get_connection()?;
        log::debug!("Connected to cache at {}", url);
        Ok(Self { conn: Some(conn) })
    }

    fn closed() -> FixtureError {
        FixtureError::ResourceUnavailable("cache connection is closed".to_string())
    }
}

impl CacheStore for RedisCache {
    fn set(&mut self, key: &str, value: &str) -> Result<(), FixtureError> {
        let conn = self.conn.as_mut().ok_or_else(RedisCache::closed)?;
        let _: () = conn.set(key, value)?;
        Ok(())
    }

    fn get(&mut self, key: &str) -> Result<Option<String>, FixtureError> {
        let conn = self.conn.as_mut().ok_or_else(RedisCache::closed)?;
        let value: Option<String> = conn.get(key)?;
        Ok(value)
    }

    fn key_count(&mut self) -> Result<u64, FixtureError> {
        let conn = self.conn.as_mut().ok_or_else(RedisCache::closed)?;
        let count: u64 = redis::cmd("DBSIZE").query(conn)?;
        Ok(count)
    }

    /// Flushes the whole instance, not a single database. Do not point this
    /// at shared infrastructure.
    fn flush_all(&mut self) -> Result<(), FixtureError> {
        let conn = self.conn.as_mut().ok_or_else(RedisCache::closed)?;
        redis::cmd("FLUSHALL").exec(conn)?;
        Ok(())
    }

    fn close(&mut self) {
        self.conn = None;
    }
}
