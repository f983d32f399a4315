//! In-memory session store
//!
//! One slot per user id. Holding a slot's guard serializes every event for
//! that user; different users lock different slots and run in parallel.
//! A slot is dropped again once its user is back to Idle and nobody waits on it.

use crate::state_machine::{DialogueState, Session};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type Slot = Arc<AsyncMutex<DialogueState>>;

/// Thread-safe per-user session map
#[derive(Clone, Default)]
pub struct SessionStore {
    slots: Arc<Mutex<HashMap<String, Slot>>>,
}

/// Exclusive access to one user's session for the duration of an event
pub struct SessionGuard {
    user_id: String,
    state: OwnedMutexGuard<DialogueState>,
    slots: Arc<Mutex<HashMap<String, Slot>>>,
}

impl SessionGuard {
    /// Snapshot of the current session
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn session(&self) -> Session {
        Session::with_state(self.user_id.clone(), self.state.clone())
    }

    /// Replace the stored state; the only way a session mutates
    pub fn commit(&mut self, session: Session) {
        debug_assert_eq!(session.user_id, self.user_id);
        *self.state = session.state;
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        if !self.state.is_idle() {
            return;
        }
        let mut slots = self
            .slots
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        // Two owners: the map and this guard. Waiters clone under the map lock.
        let unshared = slots
            .get(&self.user_id)
            .is_some_and(|slot| Arc::strong_count(slot) == 2);
        if unshared {
            slots.remove(&self.user_id);
        }
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, user_id: &str) -> Slot {
        let mut slots = self
            .slots
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        slots
            .entry(user_id.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(DialogueState::Idle)))
            .clone()
    }

    /// Wait for exclusive access to a user's session, creating it as Idle
    pub async fn lock(&self, user_id: &str) -> SessionGuard {
        let slot = self.slot(user_id);
        SessionGuard {
            user_id: user_id.to_string(),
            state: slot.lock_owned().await,
            slots: Arc::clone(&self.slots),
        }
    }

    /// Current state without taking the user lock for long.
    /// Unknown users are Idle.
    #[allow(dead_code)] // Used by tests and diagnostics
    pub async fn current(&self, user_id: &str) -> DialogueState {
        let slot = {
            let slots = self
                .slots
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            slots.get(user_id).cloned()
        };
        match slot {
            Some(slot) => slot.lock().await.clone(),
            None => DialogueState::Idle,
        }
    }

    /// Number of users with a live slot
    #[allow(dead_code)] // Used by tests and diagnostics
    pub fn user_count(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }
}
