//! Account seed helpers: users, api_keys, refresh_tokens

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use super::super::Database;
use crate::error::FixtureError;
use crate::models::{ApiKey, RefreshToken, User};

impl Database {
    /// Insert a user row
    pub fn insert_user(&self, username: &str, email: &str) -> Result<User, FixtureError> {
        let guard = self.conn.lock().unwrap();
        let conn = guard.as_ref().ok_or_else(Database::closed)?;
        let now = Utc::now();

        conn.execute(
            "INSERT INTO users (username, email, created_at) VALUES (?1, ?2, ?3)",
            [username, email, &now.to_rfc3339()],
        )?;

        Ok(User {
            id: conn.last_insert_rowid(),
            username: username.to_string(),
            email: email.to_string(),
            created_at: now,
        })
    }

    /// List all users
    pub fn list_users(&self) -> Result<Vec<User>, FixtureError> {
        let guard = self.conn.lock().unwrap();
        let conn = guard.as_ref().ok_or_else(Database::closed)?;

        let mut stmt =
            conn.prepare("SELECT id, username, email, created_at FROM users ORDER BY username")?;
        let users = stmt
            .query_map([], |row| {
                let created_at_str: String = row.get(3)?;
                Ok(User {
                    id: row.get(0)?,
                    username: row.get(1)?,
                    email: row.get(2)?,
                    created_at: DateTime::parse_from_rfc3339(&created_at_str)
                        .unwrap()
                        .with_timezone(&Utc),
                })
            })?
            .filter_map(|r| r.ok())
            .collect();

        Ok(users)
    }

    /// Insert an API key for a user; the token value is generated
    pub fn insert_api_key(&self, user_id: i64, label: &str) -> Result<ApiKey, FixtureError> {
        let guard = self.conn.lock().unwrap();
        let conn = guard.as_ref().ok_or_else(Database::closed)?;
        let now = Utc::now();
        let token = Uuid::new_v4().to_string();

        conn.execute(
            "INSERT INTO api_keys (user_id, token, label, created_at) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![user_id, token, label, now.to_rfc3339()],
        )?;

        Ok(ApiKey {
            id: conn.last_insert_rowid(),
            user_id,
            token,
            label: label.to_string(),
            created_at: now,
        })
    }

    /// Insert a refresh token expiring `ttl_days` from now
    pub fn insert_refresh_token(
        &self,
        user_id: i64,
        ttl_days: i64,
    ) -> Result<RefreshToken, FixtureError> {
        let guard = self.conn.lock().unwrap();
        let conn = guard.as_ref().ok_or_else(Database::closed)?;
        let now = Utc::now();
        let expires_at = now + Duration::days(ttl_days);
        let token = Uuid::new_v4().to_string();

        conn.execute(
            "INSERT INTO refresh_tokens (user_id, token, expires_at, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![user_id, token, expires_at.to_rfc3339(), now.to_rfc3339()],
        )?;

        Ok(RefreshToken {
            id: conn.last_insert_rowid(),
            user_id,
            token,
            expires_at,
            created_at: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::db::Database;
    use crate::error::FixtureError;

    #[test]
    fn test_insert_and_list_users() {
        let db = Database::open_in_memory().unwrap();
        db.insert_user("bob", "bob@example.com").unwrap();
        db.insert_user("alice", "alice@example.com").unwrap();

        let users = db.list_users().unwrap();
        assert_eq!(users.len(), 2);
        // Ordered by username
        assert_eq!(users[0].username, "alice");
        assert_eq!(users[1].username, "bob");
    }

    #[test]
    fn test_duplicate_username_rejected() {
        let db = Database::open_in_memory().unwrap();
        db.insert_user("bob", "bob@example.com").unwrap();
        match db.insert_user("bob", "other@example.com") {
            Err(FixtureError::Storage(_)) => {}
            _ => panic!("expected Storage error for duplicate username"),
        }
    }

    #[test]
    fn test_api_key_tokens_are_unique() {
        let db = Database::open_in_memory().unwrap();
        let user = db.insert_user("bob", "bob@example.com").unwrap();
        let a = db.insert_api_key(user.id, "ci").unwrap();
        let b = db.insert_api_key(user.id, "local").unwrap();
        assert_ne!(a.token, b.token);
        assert_eq!(db.row_count("api_keys").unwrap(), 2);
    }

    #[test]
    fn test_refresh_token_expiry_is_in_the_future() {
        let db = Database::open_in_memory().unwrap();
        let user = db.insert_user("bob", "bob@example.com").unwrap();
        let token = db.insert_refresh_token(user.id, 30).unwrap();
        assert!(token.expires_at > token.created_at);
    }

    #[test]
    fn test_api_key_requires_existing_user() {
        let db = Database::open_in_memory().unwrap();
        match db.insert_api_key(999, "orphan") {
            Err(FixtureError::Storage(_)) => {}
            _ => panic!("expected foreign key violation"),
        }
    }
}
