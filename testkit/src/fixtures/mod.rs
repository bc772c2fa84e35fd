//! Fixture reset - brings the store and cache to an empty baseline
//!
//! The reset runs as a short linear sequence of blocking calls: verify the
//! schema, empty the fixture tables in one transaction, flush the cache. It is
//! fail-fast; nothing is retried and there is no partial-cleanup guarantee.

use std::sync::Arc;

use crate::cache::CacheStore;
use crate::db::Database;
use crate::error::FixtureError;

/// Tables emptied by a reset, children before parents so a plain delete
/// sweep never trips a foreign key.
pub const FIXTURE_TABLES: &[&str] = &[
    "posts",
    "metrics",
    "alerts",
    "api_keys",
    "refresh_tokens",
    "agents",
    "users",
];

type Hook = Box<dyn Fn(&Database) -> Result<(), FixtureError>>;

/// Owns the handles a test suite resets around. Both handles are passed in
/// explicitly so independent suites never share connections.
pub struct FixtureReset {
    db: Arc<Database>,
    cache: Box<dyn CacheStore>,
    before_each: Vec<Hook>,
    after_each: Vec<Hook>,
}

impl FixtureReset {
    pub fn new(db: Arc<Database>, cache: Box<dyn CacheStore>) -> Self {
        Self {
            db,
            cache,
            before_each: Vec::new(),
            after_each: Vec::new(),
        }
    }

    /// Empty every fixture table and flush every cache key.
    ///
    /// The store is cleared first; if that fails the cache is never touched.
    /// Safe to call repeatedly - resetting an already-empty environment
    /// succeeds and leaves it empty.
    pub fn reset_all(&mut self) -> Result<(), FixtureError> {
        self.check_drift()?;
        self.db.clear_tables(FIXTURE_TABLES)?;
        self.cache.flush_all()?;
        log::info!(
            "Reset complete: {} tables cleared, cache flushed",
            FIXTURE_TABLES.len()
        );
        Ok(())
    }

    /// Fail loudly if the live schema has grown tables the fixture list does
    /// not cover, instead of silently leaving them populated.
    fn check_drift(&self) -> Result<(), FixtureError> {
        let stray: Vec<String> = self
            .db
            .table_names()?
            .into_iter()
            .filter(|t| !FIXTURE_TABLES.contains(&t.as_str()))
            .collect();

        if stray.is_empty() {
            Ok(())
        } else {
            Err(FixtureError::SchemaDrift(stray))
        }
    }

    /// Release the store connection. A second call is a no-op; any later
    /// store operation fails with `ResourceUnavailable`.
    pub fn teardown(&self) -> Result<(), FixtureError> {
        self.db.close()
    }

    /// Register a hook to run before each test case
    pub fn on_before_each<F>(&mut self, hook: F)
    where
        F: Fn(&Database) -> Result<(), FixtureError> + 'static,
    {
        self.before_each.push(Box::new(hook));
    }

    /// Register a hook to run after each test case
    pub fn on_after_each<F>(&mut self, hook: F)
    where
        F: Fn(&Database) -> Result<(), FixtureError> + 'static,
    {
        self.after_each.push(Box::new(hook));
    }

    /// Run registered before-each hooks in registration order
    pub fn before_each(&self) -> Result<(), FixtureError> {
        for hook in &self.before_each {
            hook(&self.db)?;
        }
        Ok(())
    }

    /// Run registered after-each hooks in registration order
    pub fn after_each(&self) -> Result<(), FixtureError> {
        for hook in &self.after_each {
            hook(&self.db)?;
        }
        Ok(())
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    /// Handle to the cache connection
    pub fn cache(&mut self) -> &mut dyn CacheStore {
        self.cache.as_mut()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::cache::MemoryCache;

    fn seeded_fixtures() -> FixtureReset {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let user = db.insert_user("ada", "ada@example.com").unwrap();
        db.insert_user("bob", "bob@example.com").unwrap();
        db.insert_user("carol", "carol@example.com").unwrap();
        let agent = db.insert_agent(user.id, "scout", "curious").unwrap();
        db.insert_post(agent.id, "hello").unwrap();
        db.record_metric(agent.id, "posts_per_hour", 1.0).unwrap();
        db.raise_alert(agent.id, "info", "started", None).unwrap();
        db.insert_api_key(user.id, "ci").unwrap();
        db.insert_refresh_token(user.id, 30).unwrap();

        let mut cache = MemoryCache::new();
        cache.set("session:1", "ada").unwrap();

        FixtureReset::new(db, Box::new(cache))
    }

    #[test]
    fn test_reset_all_empties_every_table_and_the_cache() {
        let mut fixtures = seeded_fixtures();
        assert_eq!(fixtures.db().row_count("users").unwrap(), 3);

        fixtures.reset_all().unwrap();

        for table in FIXTURE_TABLES {
            assert_eq!(
                fixtures.db().row_count(table).unwrap(),
                0,
                "{} not empty",
                table
            );
        }
        assert_eq!(fixtures.cache().key_count().unwrap(), 0);
        assert_eq!(fixtures.cache().get("session:1").unwrap(), None);
    }

    #[test]
    fn test_reset_all_is_idempotent() {
        let mut fixtures = seeded_fixtures();
        fixtures.reset_all().unwrap();
        fixtures.reset_all().unwrap();
        assert_eq!(fixtures.db().row_count("users").unwrap(), 0);
        assert_eq!(fixtures.cache().key_count().unwrap(), 0);
    }

    #[test]
    fn test_reset_on_closed_store_leaves_cache_untouched() {
        let mut fixtures = seeded_fixtures();
        fixtures.teardown().unwrap();

        match fixtures.reset_all() {
            Err(FixtureError::ResourceUnavailable(_)) => {}
            other => panic!("expected ResourceUnavailable, got {:?}", other),
        }
        // Store failed first, so the flush was never attempted
        assert_eq!(
            fixtures.cache().get("session:1").unwrap(),
            Some("ada".to_string())
        );
    }

    #[test]
    fn test_teardown_twice_is_a_noop() {
        let fixtures = seeded_fixtures();
        fixtures.teardown().unwrap();
        fixtures.teardown().unwrap();
        assert!(fixtures.db().is_closed());
    }

    #[test]
    fn test_stray_table_fails_with_schema_drift() {
        let mut fixtures = seeded_fixtures();
        fixtures
            .db()
            .execute("CREATE TABLE leftover_experiments (id INTEGER PRIMARY KEY)")
            .unwrap();

        match fixtures.reset_all() {
            Err(FixtureError::SchemaDrift(tables)) => {
                assert_eq!(tables, vec!["leftover_experiments".to_string()]);
            }
            other => panic!("expected SchemaDrift, got {:?}", other),
        }
        // Nothing was cleared
        assert_eq!(fixtures.db().row_count("users").unwrap(), 3);
        assert_eq!(fixtures.cache().key_count().unwrap(), 1);
    }

    #[test]
    fn test_hooks_run_in_registration_order() {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let mut fixtures = FixtureReset::new(db, Box::new(MemoryCache::new()));

        let calls = Arc::new(AtomicUsize::new(0));
        let first = calls.clone();
        fixtures.on_before_each(move |_| {
            // First registered hook sees an even count
            assert_eq!(first.fetch_add(1, Ordering::SeqCst) % 2, 0);
            Ok(())
        });
        let second = calls.clone();
        fixtures.on_before_each(move |_| {
            assert_eq!(second.fetch_add(1, Ordering::SeqCst) % 2, 1);
            Ok(())
        });

        fixtures.before_each().unwrap();
        fixtures.before_each().unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 4);

        // No after-each hooks registered: a bare call succeeds
        fixtures.after_each().unwrap();
    }

    #[test]
    fn test_failing_hook_propagates() {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let mut fixtures = FixtureReset::new(db, Box::new(MemoryCache::new()));
        fixtures.on_after_each(|_| Err(FixtureError::Storage("hook failed".to_string())));

        match fixtures.after_each() {
            Err(FixtureError::Storage(msg)) => assert_eq!(msg, "hook failed"),
            other => panic!("expected Storage, got {:?}", other),
        }
    }
}
