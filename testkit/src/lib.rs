//! Test-environment fixture reset for the agent platform backend.
//!
//! Brings the relational store and the key-value cache to an empty baseline
//! before a test suite runs, and releases held connections afterward. All
//! resource handles are passed in explicitly; the crate keeps no globals.

pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod fixtures;
pub mod models;

pub use cache::CacheStore;
pub use db::Database;
pub use error::FixtureError;
pub use fixtures::{FIXTURE_TABLES, FixtureReset};
