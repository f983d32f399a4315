//! Dialogue runtime executor

use super::traits::{
    CollaboratorError, ConversationLog, DrugLookup, Facility, FacilitySearch, SummaryGenerator,
};
use crate::reply::format_facilities;
use crate::session::{SessionGuard, SessionStore};
use crate::state_machine::messages::{
    DRUG_LOOKUP_FAILED, GENERIC_APOLOGY, NO_FACILITIES, SEARCH_FAILED,
};
use crate::state_machine::{
    transition, Department, GeoPoint, InboundEvent, InfoType, QuickActions, Reply, SideEffect,
};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// External services the runtime resolves side effects against
#[derive(Clone)]
pub struct Collaborators {
    pub facilities: Arc<dyn FacilitySearch>,
    pub drugs: Arc<dyn DrugLookup>,
    /// When present, facility results are summarized instead of listed
    pub summary: Option<Arc<dyn SummaryGenerator>>,
    pub log: Arc<dyn ConversationLog>,
}

/// Final reply for one inbound event
#[derive(Debug, Clone, PartialEq)]
pub struct BotReply {
    pub text: String,
    pub quick_actions: QuickActions,
}

impl BotReply {
    pub(crate) fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            quick_actions: QuickActions::None,
        }
    }
}

/// Drives the state machine for every user
pub struct DialogueRuntime {
    sessions: SessionStore,
    collaborators: Collaborators,
    collaborator_timeout: Duration,
}

impl DialogueRuntime {
    pub fn new(collaborators: Collaborators, collaborator_timeout: Duration) -> Self {
        Self {
            sessions: SessionStore::new(),
            collaborators,
            collaborator_timeout,
        }
    }

    #[allow(dead_code)] // Used by tests and diagnostics
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Handle one event end to end and produce the reply to send.
    ///
    /// The user's session stays locked until the side effect has resolved, so
    /// a second event from the same user observes the committed state.
    pub async fn handle(&self, event: InboundEvent) -> BotReply {
        let user_id = event.user_id().to_string();
        let user_message = event.describe();

        let mut guard = self.sessions.lock(&user_id).await;
        let reply = self.handle_locked(&mut guard, event).await;
        drop(guard);

        self.persist_turn(user_id, user_message, reply.text.clone());
        reply
    }

    /// Run one event against a session that is already locked
    async fn handle_locked(&self, guard: &mut SessionGuard, event: InboundEvent) -> BotReply {
        let user_id = guard.user_id().to_string();
        let session = guard.session();

        let result = match transition(&session, event) {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(user_id = %user_id, error = %e, "Transition failed");
                return BotReply::plain(GENERIC_APOLOGY);
            }
        };

        tracing::info!(
            user_id = %user_id,
            from = session.state.name(),
            to = result.session.state.name(),
            "Dialogue transition"
        );
        guard.commit(result.session);

        let text = match result.action.reply {
            Reply::Text(text) => text,
            Reply::FromSideEffect(effect) => self.resolve(&user_id, effect).await,
        };

        BotReply {
            text,
            quick_actions: result.action.quick_actions,
        }
    }

    async fn resolve(&self, user_id: &str, effect: SideEffect) -> String {
        match effect {
            SideEffect::SearchFacilities {
                location,
                department,
            } => self.search_facilities(user_id, location, department).await,
            SideEffect::LookupDrug {
                drug_name,
                info_type,
            } => self.lookup_drug(&drug_name, info_type).await,
        }
    }

    async fn search_facilities(
        &self,
        user_id: &str,
        location: GeoPoint,
        department: Department,
    ) -> String {
        let search = self.collaborators.facilities.search(location, department);
        let facilities = match self.bounded(search).await {
            Ok(facilities) => facilities,
            Err(e) => {
                tracing::error!(
                    user_id = %user_id,
                    department = %department,
                    error = %e,
                    "Facility search failed"
                );
                return SEARCH_FAILED.to_string();
            }
        };

        tracing::info!(
            user_id = %user_id,
            department = %department,
            count = facilities.len(),
            "Facility search completed"
        );

        if facilities.is_empty() {
            return NO_FACILITIES.to_string();
        }

        match &self.collaborators.summary {
            Some(summary) => self.summarize(summary.as_ref(), user_id, &facilities).await,
            None => format_facilities(&facilities),
        }
    }

    async fn summarize(
        &self,
        summary: &dyn SummaryGenerator,
        user_id: &str,
        facilities: &[Facility],
    ) -> String {
        let history = match self.bounded(self.collaborators.log.history(user_id)).await {
            Ok(history) => history,
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "History unavailable for summary");
                Vec::new()
            }
        };

        match tokio::time::timeout(
            self.collaborator_timeout,
            summary.summarize(facilities, &history),
        )
        .await
        {
            Ok(text) => text,
            Err(_) => {
                tracing::warn!(user_id = %user_id, "Summary timed out, sending plain list");
                format_facilities(facilities)
            }
        }
    }

    async fn lookup_drug(&self, drug_name: &str, info_type: InfoType) -> String {
        let drugs = &self.collaborators.drugs;
        let source_url = drugs.source_url(drug_name);
        match tokio::time::timeout(
            self.collaborator_timeout,
            drugs.lookup(drug_name, info_type, &source_url),
        )
        .await
        {
            Ok(text) => text,
            Err(_) => {
                tracing::error!(drug_name, info_type = %info_type, "Drug lookup timed out");
                DRUG_LOOKUP_FAILED.to_string()
            }
        }
    }

    /// Await a fallible collaborator call, failing with `Timeout` past the bound
    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, CollaboratorError>>,
    ) -> Result<T, CollaboratorError> {
        tokio::time::timeout(self.collaborator_timeout, call)
            .await
            .unwrap_or(Err(CollaboratorError::Timeout(self.collaborator_timeout)))
    }

    /// Record the turn in the background; failures never reach the user
    fn persist_turn(&self, user_id: String, user_message: String, bot_response: String) {
        let log = Arc::clone(&self.collaborators.log);
        let timeout = self.collaborator_timeout;
        tokio::spawn(async move {
            let write = log.record_turn(&user_id, &user_message, &bot_response);
            match tokio::time::timeout(timeout, write).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    tracing::warn!(user_id = %user_id, error = %e, "Failed to record conversation turn");
                }
                Err(_) => {
                    tracing::warn!(user_id = %user_id, "Recording conversation turn timed out");
                }
            }
        });
    }
}
