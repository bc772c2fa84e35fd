//! Error taxonomy shared by the store, cache, and fixture layers.

use std::fmt;

#[derive(Debug)]
pub enum FixtureError {
    /// The store or cache is unreachable, or a handle was used after close.
    ResourceUnavailable(String),
    /// A relational operation failed on a live connection.
    Storage(String),
    /// A cache command failed on a live connection.
    Cache(String),
    /// The live schema contains user tables not covered by the fixture list.
    SchemaDrift(Vec<String>),
}

impl fmt::Display for FixtureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FixtureError::ResourceUnavailable(msg) => write!(f, "resource unavailable: {}", msg),
            FixtureError::Storage(msg) => write!(f, "storage error: {}", msg),
            FixtureError::Cache(msg) => write!(f, "cache error: {}", msg),
            FixtureError::SchemaDrift(tables) => {
                write!(f, "schema drift: unlisted tables: {}", tables.join(", "))
            }
        }
    }
}

impl std::error::Error for FixtureError {}

impl From<rusqlite::Error> for FixtureError {
    fn from(e: rusqlite::Error) -> Self {
        match &e {
            rusqlite::Error::SqliteFailure(inner, _) => match inner.code {
                rusqlite::ErrorCode::CannotOpen
                | rusqlite::ErrorCode::DatabaseBusy
                | rusqlite::ErrorCode::DatabaseLocked
                | rusqlite::ErrorCode::NotADatabase => {
                    FixtureError::ResourceUnavailable(e.to_string())
                }
                _ => FixtureError::Storage(e.to_string()),
            },
            _ => FixtureError::Storage(e.to_string()),
        }
    }
}

impl From<redis::RedisError> for FixtureError {
    fn from(e: redis::RedisError) -> Self {
        if e.is_connection_refusal() || e.is_connection_dropped() || e.is_io_error() {
            FixtureError::ResourceUnavailable(e.to_string())
        } else {
            FixtureError::Cache(e.to_string())
        }
    }
}
