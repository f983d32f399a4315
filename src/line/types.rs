//! LINE Messaging API wire types

use serde::{Deserialize, Serialize};

// ============================================================================
// Webhook (inbound)
// ============================================================================

/// Body of a webhook delivery
#[derive(Debug, Deserialize)]
pub struct WebhookBody {
    #[allow(dead_code)] // Part of the payload, not needed for routing
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub events: Vec<WebhookEvent>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WebhookEvent {
    Message(MessageEvent),
    /// Follow, unfollow, postback and anything newer
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageEvent {
    pub reply_token: Option<String>,
    pub source: EventSource,
    pub message: MessageContent,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSource {
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageContent {
    Text {
        text: String,
    },
    Location {
        latitude: f64,
        longitude: f64,
    },
    /// Stickers, images, audio, ...
    #[serde(other)]
    Unsupported,
}

// ============================================================================
// Reply (outbound)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyRequest {
    pub reply_token: String,
    pub messages: Vec<ReplyMessage>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReplyMessage {
    #[serde(rename_all = "camelCase")]
    Text {
        text: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        quick_reply: Option<QuickReply>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuickReply {
    pub items: Vec<QuickReplyItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuickReplyItem {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub action: QuickReplyAction,
}

impl QuickReplyItem {
    pub fn new(action: QuickReplyAction) -> Self {
        Self {
            kind: "action",
            action,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuickReplyAction {
    /// Sends `text` as a user message when tapped
    Message { label: String, text: String },
    /// Opens the location picker
    Location { label: String },
}
