//! Pure state transition function
//!
//! Rows are checked in a fixed order and the first match wins: the top-level
//! trigger literals and department names are recognized in every state,
//! before any state-dependent free-text capture.

use super::effect::{OutboundAction, QuickActions, SideEffect};
use super::event::{GeoPoint, InboundEvent};
use super::messages::{
    ask_location, ASK_DEPARTMENT, ASK_DRUG_NAME, ASK_INFO_TYPE, DEFAULT_MENU, DRUG_TRIGGER,
    FACILITY_TRIGGER, INVALID_SELECTION, NO_DEPARTMENT,
};
use super::state::{Department, DialogueState, InfoType, Session};
use thiserror::Error;

/// Result of a state transition
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionResult {
    pub session: Session,
    pub action: OutboundAction,
}

impl TransitionResult {
    fn new(user_id: &str, state: DialogueState, action: OutboundAction) -> Self {
        Self {
            session: Session::with_state(user_id, state),
            action,
        }
    }
}

/// Errors that can occur during transition
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Event for user {event_user} delivered to session of {session_user}")]
    UserMismatch {
        session_user: String,
        event_user: String,
    },
}

/// Text classified against the literal triggers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Utterance<'a> {
    FacilityRequest,
    Department(Department),
    DrugRequest,
    Free(&'a str),
}

impl<'a> Utterance<'a> {
    fn classify(text: &'a str) -> Self {
        if text == FACILITY_TRIGGER {
            return Utterance::FacilityRequest;
        }
        if let Some(department) = Department::from_label(text) {
            return Utterance::Department(department);
        }
        if text == DRUG_TRIGGER {
            return Utterance::DrugRequest;
        }
        Utterance::Free(text)
    }
}

/// Pure transition function
///
/// Given the same session and event it always produces the same result. The
/// side effect it may request is executed by the runtime; its outcome only
/// affects reply text, never the next state.
pub fn transition(
    session: &Session,
    event: InboundEvent,
) -> Result<TransitionResult, TransitionError> {
    if event.user_id() != session.user_id {
        return Err(TransitionError::UserMismatch {
            session_user: session.user_id.clone(),
            event_user: event.user_id().to_string(),
        });
    }

    let user_id = session.user_id.as_str();

    let (state, action) = match event {
        InboundEvent::Text { text, .. } => on_text(&session.state, text.trim()),

        InboundEvent::Location {
            latitude,
            longitude,
            ..
        } => match &session.state {
            DialogueState::AwaitingLocation { department } => (
                DialogueState::Idle,
                OutboundAction::side_effect(SideEffect::SearchFacilities {
                    location: GeoPoint::new(latitude, longitude),
                    department: *department,
                }),
            ),
            // No department recorded: nothing to search for
            other => (other.clone(), OutboundAction::text(NO_DEPARTMENT)),
        },
    };

    Ok(TransitionResult::new(user_id, state, action))
}

fn on_text(state: &DialogueState, text: &str) -> (DialogueState, OutboundAction) {
    match (state, Utterance::classify(text)) {
        // ============================================================
        // Top-level triggers (any state)
        // ============================================================
        (_, Utterance::FacilityRequest) => (
            DialogueState::AwaitingDepartment,
            OutboundAction::text(ASK_DEPARTMENT).with_quick_actions(QuickActions::department_menu()),
        ),

        (_, Utterance::Department(department)) => (
            DialogueState::AwaitingLocation { department },
            OutboundAction::text(ask_location(department.label()))
                .with_quick_actions(QuickActions::send_location()),
        ),

        (_, Utterance::DrugRequest) => (
            DialogueState::AwaitingDrugName,
            OutboundAction::text(ASK_DRUG_NAME),
        ),

        // ============================================================
        // Drug flow free-text capture
        // ============================================================
        (DialogueState::AwaitingDrugName, Utterance::Free(drug_name)) if !drug_name.is_empty() => (
            DialogueState::AwaitingInfoType {
                drug_name: drug_name.to_string(),
            },
            OutboundAction::text(ASK_INFO_TYPE).with_quick_actions(QuickActions::info_type_menu()),
        ),

        (DialogueState::AwaitingInfoType { drug_name }, Utterance::Free(choice)) => {
            match InfoType::from_label(choice) {
                Some(info_type) => (
                    DialogueState::Idle,
                    OutboundAction::side_effect(SideEffect::LookupDrug {
                        drug_name: drug_name.clone(),
                        info_type,
                    }),
                ),
                None => (DialogueState::Idle, OutboundAction::text(INVALID_SELECTION)),
            }
        }

        // ============================================================
        // Anything else falls back to the menu
        // ============================================================
        (_, Utterance::Free(_)) => (
            DialogueState::Idle,
            OutboundAction::text(DEFAULT_MENU).with_quick_actions(QuickActions::top_level_menu()),
        ),
    }
}
