//! Agent seed helpers: agents, posts

use chrono::{DateTime, Utc};

use super::super::Database;
use crate::error::FixtureError;
use crate::models::{Agent, Post};

impl Database {
    /// Insert an agent owned by a user
    pub fn insert_agent(
        &self,
        owner_id: i64,
        name: &str,
        persona: &str,
    ) -> Result<Agent, FixtureError> {
        let guard = self.conn.lock().unwrap();
        let conn = guard.as_ref().ok_or_else(Database::closed)?;
        let now = Utc::now();

        conn.execute(
            "INSERT INTO agents (owner_id, name, persona, created_at) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![owner_id, name, persona, now.to_rfc3339()],
        )?;

        Ok(Agent {
            id: conn.last_insert_rowid(),
            owner_id,
            name: name.to_string(),
            persona: persona.to_string(),
            created_at: now,
        })
    }

    /// List all agents
    pub fn list_agents(&self) -> Result<Vec<Agent>, FixtureError> {
        let guard = self.conn.lock().unwrap();
        let conn = guard.as_ref().ok_or_else(Database::closed)?;

        let mut stmt = conn
            .prepare("SELECT id, owner_id, name, persona, created_at FROM agents ORDER BY name")?;
        let agents = stmt
            .query_map([], |row| {
                let created_at_str: String = row.get(4)?;
                Ok(Agent {
                    id: row.get(0)?,
                    owner_id: row.get(1)?,
                    name: row.get(2)?,
                    persona: row.get(3)?,
                    created_at: DateTime::parse_from_rfc3339(&created_at_str)
                        .unwrap()
                        .with_timezone(&Utc),
                })
            })?
            .filter_map(|r| r.ok())
            .collect();

        Ok(agents)
    }

    /// Insert a post authored by an agent
    pub fn insert_post(&self, agent_id: i64, body: &str) -> Result<Post, FixtureError> {
        let guard = self.conn.lock().unwrap();
        let conn = guard.as_ref().ok_or_else(Database::closed)?;
        let now = Utc::now();

        conn.execute(
            "INSERT INTO posts (agent_id, body, created_at) VALUES (?1, ?2, ?3)",
            rusqlite::params![agent_id, body, now.to_rfc3339()],
        )?;

        Ok(Post {
            id: conn.last_insert_rowid(),
            agent_id,
            body: body.to_string(),
            created_at: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::db::Database;

    #[test]
    fn test_insert_agent_and_posts() {
        let db = Database::open_in_memory().unwrap();
        let user = db.insert_user("ada", "ada@example.com").unwrap();
        let agent = db.insert_agent(user.id, "scout", "curious").unwrap();
        db.insert_post(agent.id, "first").unwrap();
        db.insert_post(agent.id, "second").unwrap();

        assert_eq!(db.row_count("posts").unwrap(), 2);
        let agents = db.list_agents().unwrap();
        assert_eq!(agents.len(), 1);
        assert_eq!(agents[0].owner_id, user.id);
    }
}
