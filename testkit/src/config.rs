use std::env;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub cache_url: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("TESTKIT_DATABASE_URL")
                .unwrap_or_else(|_| "./.testkit/fixtures.db".to_string()),
            cache_url: env::var("TESTKIT_CACHE_URL")
                .unwrap_or_else(|_| "redis://127.0.0.1:6379/".to_string()),
        }
    }
}
