//! Seed helpers - extends Database with typed inserts per table group
//!
//! Each module adds `impl Database` blocks with methods for a specific table group.

mod accounts; // users, api_keys, refresh_tokens
mod agents; // agents, posts
mod telemetry; // metrics, alerts
