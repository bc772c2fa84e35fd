//! Telemetry seed helpers: metrics, alerts

use chrono::{DateTime, Utc};

use super::super::Database;
use crate::error::FixtureError;
use crate::models::{Alert, Metric};

impl Database {
    /// Record a metric sample for an agent
    pub fn record_metric(
        &self,
        agent_id: i64,
        name: &str,
        value: f64,
    ) -> Result<Metric, FixtureError> {
        let guard = self.conn.lock().unwrap();
        let conn = guard.as_ref().ok_or_else(Database::closed)?;
        let now = Utc::now();

        conn.execute(
            "INSERT INTO metrics (agent_id, name, value, recorded_at) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![agent_id, name, value, now.to_rfc3339()],
        )?;

        Ok(Metric {
            id: conn.last_insert_rowid(),
            agent_id,
            name: name.to_string(),
            value,
            recorded_at: now,
        })
    }

    /// Raise an alert for an agent, with an optional JSON detail payload
    pub fn raise_alert(
        &self,
        agent_id: i64,
        severity: &str,
        message: &str,
        detail: Option<serde_json::Value>,
    ) -> Result<Alert, FixtureError> {
        let guard = self.conn.lock().unwrap();
        let conn = guard.as_ref().ok_or_else(Database::closed)?;
        let now = Utc::now();
        let detail_text = detail.as_ref().map(|v| v.to_string());

        conn.execute(
            "INSERT INTO alerts (agent_id, severity, message, detail, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![agent_id, severity, message, detail_text, now.to_rfc3339()],
        )?;

        Ok(Alert {
            id: conn.last_insert_rowid(),
            agent_id,
            severity: severity.to_string(),
            message: message.to_string(),
            detail,
            created_at: now,
        })
    }

    /// List all alerts, newest first
    pub fn list_alerts(&self) -> Result<Vec<Alert>, FixtureError> {
        let guard = self.conn.lock().unwrap();
        let conn = guard.as_ref().ok_or_else(Database::closed)?;

        let mut stmt = conn.prepare(
            "SELECT id, agent_id, severity, message, detail, created_at
             FROM alerts ORDER BY created_at DESC",
        )?;
        let alerts = stmt
            .query_map([], |row| {
                let detail_text: Option<String> = row.get(4)?;
                let created_at_str: String = row.get(5)?;
                Ok(Alert {
                    id: row.get(0)?,
                    agent_id: row.get(1)?,
                    severity: row.get(2)?,
                    message: row.get(3)?,
                    detail: detail_text.and_then(|s| serde_json::from_str(&s).ok()),
                    created_at: DateTime::parse_from_rfc3339(&created_at_str)
                        .unwrap()
                        .with_timezone(&Utc),
                })
            })?
            .filter_map(|r| r.ok())
            .collect();

        Ok(alerts)
    }
}
