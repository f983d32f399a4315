//! Dialogue state types

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Fixed vocabularies
// ============================================================================

/// Clinical departments offered in the facility menu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Department {
    InternalMedicine,
    Orthopedics,
    Otolaryngology,
    Ophthalmology,
    Dermatology,
    Gynecology,
    Urology,
    Psychiatry,
}

impl Department {
    /// Menu order
    pub const ALL: [Department; 8] = [
        Department::InternalMedicine,
        Department::Orthopedics,
        Department::Otolaryngology,
        Department::Ophthalmology,
        Department::Dermatology,
        Department::Gynecology,
        Department::Urology,
        Department::Psychiatry,
    ];

    /// The literal the user sends (or selects) to pick this department.
    /// Also used as the places search keyword.
    pub fn label(self) -> &'static str {
        match self {
            Department::InternalMedicine => "内科",
            Department::Orthopedics => "整形外科",
            Department::Otolaryngology => "耳鼻科",
            Department::Ophthalmology => "眼科",
            Department::Dermatology => "皮膚科",
            Department::Gynecology => "婦人科",
            Department::Urology => "泌尿器科",
            Department::Psychiatry => "精神科",
        }
    }

    pub fn from_label(text: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.label() == text)
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What the user wants to know about a drug
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InfoType {
    SideEffects,
    Usage,
}

impl InfoType {
    pub const ALL: [InfoType; 2] = [InfoType::SideEffects, InfoType::Usage];

    pub fn label(self) -> &'static str {
        match self {
            InfoType::SideEffects => "副作用",
            InfoType::Usage => "使い方",
        }
    }

    pub fn from_label(text: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.label() == text)
    }
}

impl fmt::Display for InfoType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// Dialogue State
// ============================================================================

/// Where a user currently is in the dialogue
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DialogueState {
    /// No flow in progress
    #[default]
    Idle,

    /// Department menu shown, waiting for a pick
    AwaitingDepartment,

    /// Department chosen, waiting for a location message
    AwaitingLocation { department: Department },

    /// Drug flow started, waiting for free-typed drug name
    AwaitingDrugName,

    /// Drug name captured, waiting for side effects / usage
    AwaitingInfoType { drug_name: String },
}

impl DialogueState {
    /// Short name used in log fields
    pub fn name(&self) -> &'static str {
        match self {
            DialogueState::Idle => "idle",
            DialogueState::AwaitingDepartment => "awaiting_department",
            DialogueState::AwaitingLocation { .. } => "awaiting_location",
            DialogueState::AwaitingDrugName => "awaiting_drug_name",
            DialogueState::AwaitingInfoType { .. } => "awaiting_info_type",
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, DialogueState::Idle)
    }

    /// Department recorded for a pending facility search, if any
    pub fn department(&self) -> Option<Department> {
        match self {
            DialogueState::AwaitingLocation { department } => Some(*department),
            _ => None,
        }
    }
}

/// Per-user conversation record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub state: DialogueState,
}

impl Session {
    /// A fresh session; equivalent to having no session at all
    pub fn idle(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            state: DialogueState::Idle,
        }
    }

    pub fn with_state(user_id: impl Into<String>, state: DialogueState) -> Self {
        Self {
            user_id: user_id.into(),
            state,
        }
    }
}
