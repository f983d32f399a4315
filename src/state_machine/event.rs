//! Inbound events that drive the dialogue

/// A geographic point as sent by a location message
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Events that trigger state transitions
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    /// Free-typed text, or a quick action the user selected
    Text { user_id: String, text: String },

    /// Location shared by the user
    Location {
        user_id: String,
        latitude: f64,
        longitude: f64,
    },
}

impl InboundEvent {
    pub fn text(user_id: impl Into<String>, text: impl Into<String>) -> Self {
        InboundEvent::Text {
            user_id: user_id.into(),
            text: text.into(),
        }
    }

    pub fn location(user_id: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        InboundEvent::Location {
            user_id: user_id.into(),
            latitude,
            longitude,
        }
    }

    pub fn user_id(&self) -> &str {
        match self {
            InboundEvent::Text { user_id, .. } | InboundEvent::Location { user_id, .. } => user_id,
        }
    }

    /// What the user "said", for conversation history
    pub fn describe(&self) -> String {
        match self {
            InboundEvent::Text { text, .. } => text.clone(),
            InboundEvent::Location {
                latitude,
                longitude,
                ..
            } => format!("位置情報: {latitude}, {longitude}"),
        }
    }
}
