//! Actions produced by state transitions

use super::event::GeoPoint;
use super::messages::{DRUG_TRIGGER, FACILITY_TRIGGER, SEND_LOCATION_LABEL};
use super::state::{Department, InfoType};

/// A suggested reply; selecting it sends `text` as if typed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuickAction {
    pub label: String,
    pub text: String,
}

impl QuickAction {
    /// Quick action whose label and sent text are the same literal
    pub fn literal(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            label: text.clone(),
            text,
        }
    }
}

/// Quick actions attached to a reply
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum QuickActions {
    #[default]
    None,
    Options(Vec<QuickAction>),
    /// Ask the client to share its location
    SendLocation { label: String },
}

impl QuickActions {
    pub fn top_level_menu() -> Self {
        QuickActions::Options(vec![
            QuickAction::literal(FACILITY_TRIGGER),
            QuickAction::literal(DRUG_TRIGGER),
        ])
    }

    pub fn department_menu() -> Self {
        QuickActions::Options(
            Department::ALL
                .iter()
                .map(|d| QuickAction::literal(d.label()))
                .collect(),
        )
    }

    pub fn info_type_menu() -> Self {
        QuickActions::Options(
            InfoType::ALL
                .iter()
                .map(|t| QuickAction::literal(t.label()))
                .collect(),
        )
    }

    pub fn send_location() -> Self {
        QuickActions::SendLocation {
            label: SEND_LOCATION_LABEL.to_string(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            QuickActions::None => true,
            QuickActions::Options(options) => options.is_empty(),
            QuickActions::SendLocation { .. } => false,
        }
    }
}

/// Collaborator request whose outcome becomes the reply text
#[derive(Debug, Clone, PartialEq)]
pub enum SideEffect {
    SearchFacilities {
        location: GeoPoint,
        department: Department,
    },
    LookupDrug {
        drug_name: String,
        info_type: InfoType,
    },
}

/// Reply body: known now, or known once the side effect has run
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Text(String),
    FromSideEffect(SideEffect),
}

/// Everything the runtime needs to answer one event
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundAction {
    pub reply: Reply,
    pub quick_actions: QuickActions,
}

impl OutboundAction {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            reply: Reply::Text(text.into()),
            quick_actions: QuickActions::None,
        }
    }

    pub fn side_effect(effect: SideEffect) -> Self {
        Self {
            reply: Reply::FromSideEffect(effect),
            quick_actions: QuickActions::None,
        }
    }

    pub fn with_quick_actions(mut self, quick_actions: QuickActions) -> Self {
        self.quick_actions = quick_actions;
        self
    }

    pub fn side_effect_request(&self) -> Option<&SideEffect> {
        match &self.reply {
            Reply::FromSideEffect(effect) => Some(effect),
            Reply::Text(_) => None,
        }
    }

    /// Static reply text, if the reply does not depend on a side effect
    pub fn static_text(&self) -> Option<&str> {
        match &self.reply {
            Reply::Text(text) => Some(text),
            Reply::FromSideEffect(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quick_action_text_matches_label() {
        let QuickActions::Options(options) = QuickActions::department_menu() else {
            panic!("expected options");
        };
        assert_eq!(options.len(), Department::ALL.len());
        assert!(options.iter().all(|o| o.label == o.text));
    }

    #[test]
    fn send_location_is_not_empty() {
        assert!(!QuickActions::send_location().is_empty());
        assert!(QuickActions::None.is_empty());
        assert!(QuickActions::Options(vec![]).is_empty());
    }
}
