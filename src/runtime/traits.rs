//! Trait abstractions for collaborator I/O
//!
//! These traits enable testing the runtime with mock implementations.

use crate::db::{ConversationRecord, Database};
use crate::state_machine::{Department, GeoPoint, InfoType};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// A medical facility returned by the places provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facility {
    pub name: String,
    pub address: String,
    pub phone: Option<String>,
    pub website: Option<String>,
    /// One line per weekday, as the provider formats them
    pub opening_hours: Option<Vec<String>>,
}

/// Failure of an external collaborator call
#[derive(Debug, Error)]
pub enum CollaboratorError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Unexpected status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Provider error: {0}")]
    Provider(String),
    #[error("Malformed response: {0}")]
    Parse(String),
    #[error("Timed out after {0:?}")]
    Timeout(Duration),
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Geocoded places lookup
#[async_trait]
pub trait FacilitySearch: Send + Sync {
    /// Facilities near `location` matching the department keyword.
    /// Provider outages return an empty list; only unexpected failures error.
    async fn search(
        &self,
        location: GeoPoint,
        department: Department,
    ) -> Result<Vec<Facility>, CollaboratorError>;
}

/// Drug information scraper
#[async_trait]
pub trait DrugLookup: Send + Sync {
    /// Never fails: problems come back as an apology string
    async fn lookup(&self, drug_name: &str, info_type: InfoType, source_url: &str) -> String;

    /// Where the record for `drug_name` is fetched from
    fn source_url(&self, drug_name: &str) -> String;
}

/// Natural-language recommendation over facility candidates
#[async_trait]
pub trait SummaryGenerator: Send + Sync {
    /// Never fails: problems come back as an apology string
    async fn summarize(&self, candidates: &[Facility], history: &[ConversationRecord]) -> String;
}

/// Conversation history persistence
#[async_trait]
pub trait ConversationLog: Send + Sync {
    async fn record_turn(
        &self,
        user_id: &str,
        user_message: &str,
        bot_response: &str,
    ) -> Result<(), CollaboratorError>;

    /// Recent turns for a user, oldest first; empty when none exist
    async fn history(&self, user_id: &str) -> Result<Vec<ConversationRecord>, CollaboratorError>;
}

// ============================================================================
// Production Adapters
// ============================================================================

/// Turns of history handed to the summary generator
const HISTORY_CONTEXT_TURNS: usize = 10;

/// Adapter to use Database as `ConversationLog`
#[derive(Clone)]
pub struct DatabaseLog {
    db: Database,
}

impl DatabaseLog {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ConversationLog for DatabaseLog {
    async fn record_turn(
        &self,
        user_id: &str,
        user_message: &str,
        bot_response: &str,
    ) -> Result<(), CollaboratorError> {
        self.db
            .add_record(user_id, user_message, bot_response)
            .map(|_| ())
            .map_err(|e| CollaboratorError::Storage(e.to_string()))
    }

    async fn history(&self, user_id: &str) -> Result<Vec<ConversationRecord>, CollaboratorError> {
        self.db
            .get_recent_history(user_id, Some(HISTORY_CONTEXT_TURNS))
            .map_err(|e| CollaboratorError::Storage(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn database_log_records_and_reads_back() {
        let log = DatabaseLog::new(Database::open_in_memory().unwrap());
        assert!(log.history("U1").await.unwrap().is_empty());

        log.record_turn("U1", "内科", "位置情報を送信してください。")
            .await
            .unwrap();

        let history = log.history("U1").await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].bot_response, "位置情報を送信してください。");
    }

    #[tokio::test]
    async fn database_log_limits_context() {
        let log = DatabaseLog::new(Database::open_in_memory().unwrap());
        for i in 0..15 {
            log.record_turn("U1", &format!("q{i}"), "a").await.unwrap();
        }
        let history = log.history("U1").await.unwrap();
        assert_eq!(history.len(), HISTORY_CONTEXT_TURNS);
        assert_eq!(history.last().unwrap().user_message, "q14");
    }
}
