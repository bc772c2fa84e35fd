use dotenv::dotenv;
use std::sync::Arc;

use testkit::cache::RedisCache;
use testkit::config::Config;
use testkit::db::Database;
use testkit::fixtures::FixtureReset;

/// Resets the configured fixture environment: empties every fixture table and
/// flushes the cache, then releases the store connection. Configuration comes
/// from the environment (TESTKIT_DATABASE_URL, TESTKIT_CACHE_URL).
fn main() {
    dotenv().ok();
    env_logger::init();

    let config = Config::from_env();

    log::info!("Opening fixture database at {}", config.database_url);
    let db = Arc::new(Database::new(&config.database_url).expect("Failed to open fixture database"));

    log::info!("Connecting to cache at {}", config.cache_url);
    let cache = RedisCache::connect(&config.cache_url).expect("Failed to connect to cache");

    let mut fixtures = FixtureReset::new(db, Box::new(cache));
    if let Err(e) = fixtures.reset_all() {
        log::error!("Fixture reset failed: {}", e);
        std::process::exit(1);
    }

    fixtures.teardown().expect("Failed to release store connection");
    log::info!("Fixture environment reset");
}
