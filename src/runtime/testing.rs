//! Mock implementations for testing
//!
//! These mocks enable runtime and router tests without network or disk I/O.

use super::traits::*;
use crate::db::ConversationRecord;
use crate::state_machine::{Department, GeoPoint, InfoType};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// A facility with only a name and address
pub fn facility(name: &str) -> Facility {
    Facility {
        name: name.to_string(),
        address: "釧路市幸町1-1".to_string(),
        phone: None,
        website: None,
        opening_hours: None,
    }
}

// ============================================================================
// Mock Facility Search
// ============================================================================

/// Returns queued results in order, then empty lists
#[allow(dead_code)]
pub struct MockFacilitySearch {
    results: Mutex<VecDeque<Result<Vec<Facility>, CollaboratorError>>>,
    delay: Mutex<Option<Duration>>,
    panic: AtomicBool,
    /// Record of all searches made
    pub calls: Mutex<Vec<(GeoPoint, Department)>>,
}

#[allow(dead_code)]
impl MockFacilitySearch {
    pub fn new() -> Self {
        Self {
            results: Mutex::new(VecDeque::new()),
            delay: Mutex::new(None),
            panic: AtomicBool::new(false),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn queue_result(&self, result: Result<Vec<Facility>, CollaboratorError>) {
        self.results.lock().unwrap().push_back(result);
    }

    /// Sleep this long before answering each search
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    /// Make every later search panic
    pub fn panic_on_search(&self) {
        self.panic.store(true, Ordering::SeqCst);
    }

    pub fn recorded_calls(&self) -> Vec<(GeoPoint, Department)> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for MockFacilitySearch {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FacilitySearch for MockFacilitySearch {
    async fn search(
        &self,
        location: GeoPoint,
        department: Department,
    ) -> Result<Vec<Facility>, CollaboratorError> {
        self.calls.lock().unwrap().push((location, department));
        assert!(
            !self.panic.load(Ordering::SeqCst),
            "facility search crashed"
        );
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

// ============================================================================
// Mock Drug Lookup
// ============================================================================

/// Answers "<name>の<info type>について: mock"
#[allow(dead_code)]
pub struct MockDrugLookup {
    delay: Mutex<Option<Duration>>,
    /// Record of lookups: drug name, info type, source url
    pub calls: Mutex<Vec<(String, InfoType, String)>>,
}

#[allow(dead_code)]
impl MockDrugLookup {
    pub fn new() -> Self {
        Self {
            delay: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn recorded_calls(&self) -> Vec<(String, InfoType, String)> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for MockDrugLookup {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DrugLookup for MockDrugLookup {
    async fn lookup(&self, drug_name: &str, info_type: InfoType, source_url: &str) -> String {
        self.calls.lock().unwrap().push((
            drug_name.to_string(),
            info_type,
            source_url.to_string(),
        ));
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        format!("{drug_name}の{info_type}について: mock")
    }

    fn source_url(&self, drug_name: &str) -> String {
        format!("mock://drugs/{drug_name}")
    }
}

// ============================================================================
// Mock Summary Generator
// ============================================================================

/// Always answers with a fixed text
#[allow(dead_code)]
pub struct MockSummary {
    text: String,
    /// Record of candidates and history passed in
    pub calls: Mutex<Vec<(Vec<Facility>, Vec<ConversationRecord>)>>,
}

#[allow(dead_code)]
impl MockSummary {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn recorded_calls(&self) -> Vec<(Vec<Facility>, Vec<ConversationRecord>)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SummaryGenerator for MockSummary {
    async fn summarize(&self, candidates: &[Facility], history: &[ConversationRecord]) -> String {
        self.calls
            .lock()
            .unwrap()
            .push((candidates.to_vec(), history.to_vec()));
        self.text.clone()
    }
}

// ============================================================================
// Mock Conversation Log
// ============================================================================

/// In-memory conversation log
#[allow(dead_code)]
pub struct MockConversationLog {
    /// Recorded turns: user id, user message, bot response
    pub records: Mutex<Vec<(String, String, String)>>,
    fail_writes: AtomicBool,
}

#[allow(dead_code)]
impl MockConversationLog {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Make every later `record_turn` fail
    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }

    /// Insert a prior turn directly
    pub fn seed(&self, user_id: &str, user_message: &str, bot_response: &str) {
        self.records.lock().unwrap().push((
            user_id.to_string(),
            user_message.to_string(),
            bot_response.to_string(),
        ));
    }

    pub fn recorded(&self) -> Vec<(String, String, String)> {
        self.records.lock().unwrap().clone()
    }

    /// Turns are written from a spawned task; wait until `count` have landed
    pub async fn wait_for_records(&self, count: usize) -> Vec<(String, String, String)> {
        for _ in 0..100 {
            let records = self.recorded();
            if records.len() >= count {
                return records;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        self.recorded()
    }
}

impl Default for MockConversationLog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConversationLog for MockConversationLog {
    async fn record_turn(
        &self,
        user_id: &str,
        user_message: &str,
        bot_response: &str,
    ) -> Result<(), CollaboratorError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(CollaboratorError::Storage("disk full".to_string()));
        }
        self.seed(user_id, user_message, bot_response);
        Ok(())
    }

    async fn history(&self, user_id: &str) -> Result<Vec<ConversationRecord>, CollaboratorError> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|(user, _, _)| user == user_id)
            .enumerate()
            .map(|(i, (user, message, response))| ConversationRecord {
                id: i64::try_from(i).unwrap_or(i64::MAX) + 1,
                user_id: user.clone(),
                user_message: message.clone(),
                bot_response: response.clone(),
                timestamp: Utc::now(),
            })
            .collect())
    }
}
