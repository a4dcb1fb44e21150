//! SQLite-based session log and settings.
//!
//! Provides persistent storage for:
//! - Finished breathing sessions (append-only)
//! - Per-user preference flags
//! - Key-value store for application state

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

use super::data_dir;
use super::migrations;
use crate::error::{CoreError, DatabaseError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: i64,
    pub user_id: Option<String>,
    pub exercise_id: String,
    pub duration_secs: u64,
    pub completed: bool,
    pub cycles: u64,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
}

/// A session about to be logged.
#[derive(Debug, Clone)]
pub struct NewSession<'a> {
    pub user_id: Option<&'a str>,
    pub exercise_id: &'a str,
    pub duration_secs: u64,
    pub completed: bool,
    pub cycles: u64,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Stats {
    pub total_sessions: u64,
    pub completed_sessions: u64,
    pub total_minutes: u64,
    pub today_sessions: u64,
    pub by_exercise: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSettings {
    pub voice_guidance: bool,
    pub driving_detection: bool,
    pub dark_mode: bool,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            voice_guidance: true,
            driving_detection: true,
            dark_mode: false,
        }
    }
}

/// SQLite database for the session log.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `~/.config/calmdrive/calmdrive.db`.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, CoreError> {
        Ok(Self::open_at(&data_dir()?.join("calmdrive.db"))?)
    }

    pub fn open_at(path: &Path) -> Result<Self, DatabaseError> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::with_connection(conn)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self, DatabaseError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, DatabaseError> {
        migrations::migrate(&conn).map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(Self { conn })
    }

    /// Register a user id if it is not known yet.
    pub fn ensure_user(&self, user_id: &str) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT OR IGNORE INTO users (id, created_at) VALUES (?1, ?2)",
            params![user_id, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    /// Append a finished session to the log.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub fn record_session(&self, session: &NewSession<'_>) -> Result<i64, DatabaseError> {
        if let Some(user_id) = session.user_id {
            self.ensure_user(user_id)?;
        }
        self.conn.execute(
            "INSERT INTO sessions (user_id, exercise_id, duration_secs, completed, cycles, started_at, ended_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                session.user_id,
                session.exercise_id,
                session.duration_secs,
                session.completed,
                session.cycles,
                session.started_at.to_rfc3339(),
                session.ended_at.to_rfc3339(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Most recent sessions first.
    pub fn recent_sessions(&self, limit: usize) -> Result<Vec<SessionRecord>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, exercise_id, duration_secs, completed, cycles, started_at, ended_at
             FROM sessions
             ORDER BY ended_at DESC, id DESC
             LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok(SessionRecord {
                id: row.get(0)?,
                user_id: row.get(1)?,
                exercise_id: row.get(2)?,
                duration_secs: row.get(3)?,
                completed: row.get(4)?,
                cycles: row.get(5)?,
                started_at: parse_timestamp(row.get::<_, String>(6)?, 6)?,
                ended_at: parse_timestamp(row.get::<_, String>(7)?, 7)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn stats(&self) -> Result<Stats, DatabaseError> {
        let mut stats = Stats::default();

        let (total, completed, seconds) = self.conn.query_row(
            "SELECT COUNT(*),
                    COALESCE(SUM(completed), 0),
                    COALESCE(SUM(CASE WHEN completed = 1 THEN duration_secs ELSE 0 END), 0)
             FROM sessions",
            [],
            |row| Ok((row.get::<_, u64>(0)?, row.get::<_, u64>(1)?, row.get::<_, u64>(2)?)),
        )?;
        stats.total_sessions = total;
        stats.completed_sessions = completed;
        stats.total_minutes = seconds / 60;

        let today = Utc::now().format("%Y-%m-%d").to_string();
        stats.today_sessions = self.conn.query_row(
            "SELECT COUNT(*) FROM sessions WHERE ended_at >= ?1",
            params![format!("{today}T00:00:00+00:00")],
            |row| row.get::<_, u64>(0),
        )?;

        let mut stmt = self
            .conn
            .prepare("SELECT exercise_id, COUNT(*) FROM sessions GROUP BY exercise_id")?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, u64>(1)?)))?;
        for row in rows {
            let (exercise, count) = row?;
            stats.by_exercise.insert(exercise, count);
        }
        Ok(stats)
    }

    /// Stored settings for `user_id`, or defaults if none were saved.
    pub fn settings(&self, user_id: &str) -> Result<UserSettings, DatabaseError> {
        let settings = self
            .conn
            .query_row(
                "SELECT voice_guidance, driving_detection, dark_mode
                 FROM user_settings WHERE user_id = ?1",
                params![user_id],
                |row| {
                    Ok(UserSettings {
                        voice_guidance: row.get(0)?,
                        driving_detection: row.get(1)?,
                        dark_mode: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(settings.unwrap_or_default())
    }

    pub fn save_settings(&self, user_id: &str, settings: &UserSettings) -> Result<(), DatabaseError> {
        self.ensure_user(user_id)?;
        self.conn.execute(
            "INSERT OR REPLACE INTO user_settings
                (user_id, voice_guidance, driving_detection, dark_mode, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                user_id,
                settings.voice_guidance,
                settings.driving_detection,
                settings.dark_mode,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }
}

fn parse_timestamp(raw: String, column: usize) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Text, Box::new(e))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn session<'a>(exercise_id: &'a str, completed: bool, ended_at: DateTime<Utc>) -> NewSession<'a> {
        NewSession {
            user_id: Some("driver-1"),
            exercise_id,
            duration_secs: 120,
            completed,
            cycles: 10,
            started_at: ended_at - Duration::seconds(120),
            ended_at,
        }
    }

    #[test]
    fn record_and_query() {
        let db = Database::open_memory().unwrap();
        let now = Utc::now();
        db.record_session(&session("quick-calm", true, now)).unwrap();
        db.record_session(&session("deep-focus", false, now)).unwrap();

        let stats = db.stats().unwrap();
        assert_eq!(stats.total_sessions, 2);
        assert_eq!(stats.completed_sessions, 1);
        assert_eq!(stats.total_minutes, 2);
        assert_eq!(stats.today_sessions, 2);
        assert_eq!(stats.by_exercise.get("quick-calm"), Some(&1));
    }

    #[test]
    fn recent_sessions_newest_first() {
        let db = Database::open_memory().unwrap();
        let now = Utc::now();
        db.record_session(&session("quick-calm", true, now - Duration::hours(1)))
            .unwrap();
        db.record_session(&session("deep-focus", true, now)).unwrap();

        let recent = db.recent_sessions(10).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].exercise_id, "deep-focus");
        assert_eq!(recent[0].user_id.as_deref(), Some("driver-1"));
        assert!(recent[0].completed);
        assert_eq!(db.recent_sessions(1).unwrap().len(), 1);
    }

    #[test]
    fn settings_default_then_upsert() {
        let db = Database::open_memory().unwrap();
        assert_eq!(db.settings("driver-1").unwrap(), UserSettings::default());

        let custom = UserSettings {
            voice_guidance: false,
            driving_detection: true,
            dark_mode: true,
        };
        db.save_settings("driver-1", &custom).unwrap();
        db.save_settings("driver-1", &custom).unwrap();
        assert_eq!(db.settings("driver-1").unwrap(), custom);
    }

    #[test]
    fn kv_store() {
        let db = Database::open_memory().unwrap();
        assert!(db.kv_get("test").unwrap().is_none());
        db.kv_set("test", "hello").unwrap();
        assert_eq!(db.kv_get("test").unwrap().unwrap(), "hello");
    }
}
