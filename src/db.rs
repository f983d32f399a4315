//! Database module for the clinic bot
//!
//! Provides persistence for conversation history.

mod schema;

pub use schema::*;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Arc, Mutex};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("No conversation history for user: {0}")]
    HistoryNotFound(String),
}

pub type DbResult<T> = Result<T, DbError>;

/// Thread-safe database handle
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open or create database at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    /// Open an in-memory database (for testing)
    #[allow(dead_code)] // Used in tests
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    fn run_migrations(&self) -> DbResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    // ==================== History Operations ====================

    /// Record one turn of a user's conversation
    pub fn add_record(
        &self,
        user_id: &str,
        user_message: &str,
        bot_response: &str,
    ) -> DbResult<ConversationRecord> {
        let conn = self.conn.lock().unwrap();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO conversation_history (user_id, user_message, bot_response, timestamp)
             VALUES (?1, ?2, ?3, ?4)",
            params![user_id, user_message, bot_response, now.to_rfc3339()],
        )?;

        Ok(ConversationRecord {
            id: conn.last_insert_rowid(),
            user_id: user_id.to_string(),
            user_message: user_message.to_string(),
            bot_response: bot_response.to_string(),
            timestamp: now,
        })
    }

    /// All recorded turns for a user, oldest first.
    /// A user with no turns is an error so callers can answer 404.
    pub fn get_history(&self, user_id: &str) -> DbResult<Vec<ConversationRecord>> {
        let records = self.get_recent_history(user_id, None)?;
        if records.is_empty() {
            return Err(DbError::HistoryNotFound(user_id.to_string()));
        }
        Ok(records)
    }

    /// The most recent `limit` turns (or all), oldest first
    pub fn get_recent_history(
        &self,
        user_id: &str,
        limit: Option<usize>,
    ) -> DbResult<Vec<ConversationRecord>> {
        let conn = self.conn.lock().unwrap();
        let limit = limit.map_or(-1, |l| i64::try_from(l).unwrap_or(i64::MAX));
        let mut stmt = conn.prepare(
            "SELECT id, user_id, user_message, bot_response, timestamp FROM (
                SELECT * FROM conversation_history WHERE user_id = ?1
                ORDER BY id DESC LIMIT ?2
             ) ORDER BY id ASC",
        )?;

        let rows = stmt.query_map(params![user_id, limit], parse_record_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
    }
}

fn parse_record_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ConversationRecord> {
    Ok(ConversationRecord {
        id: row.get(0)?,
        user_id: row.get(1)?,
        user_message: row.get(2)?,
        bot_response: row.get(3)?,
        timestamp: parse_datetime(&row.get::<_, String>(4)?),
    })
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).map_or_else(|_| Utc::now(), |dt| dt.with_timezone(&Utc))
}
