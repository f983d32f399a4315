//! Outbound action builder
//!
//! Turns a resolved reply into LINE reply messages. Message quick actions send
//! their literal text back, which re-enters the state machine as a text event.

use crate::line::types::{QuickReply, QuickReplyAction, QuickReplyItem, ReplyMessage};
use crate::runtime::{BotReply, Facility};
use crate::state_machine::messages::{FACILITIES_HEADER, NOT_AVAILABLE};
use crate::state_machine::QuickActions;

/// Platform limit on a text message, in characters
pub const MAX_TEXT_CHARS: usize = 5000;
/// Platform limit on quick reply items
pub const MAX_QUICK_REPLY_ITEMS: usize = 13;
/// Platform limit on an action label, in characters
const MAX_LABEL_CHARS: usize = 20;

/// Render a reply as the messages sent with one reply token
pub fn render(reply: &BotReply) -> Vec<ReplyMessage> {
    vec![ReplyMessage::Text {
        text: truncate_chars(&reply.text, MAX_TEXT_CHARS),
        quick_reply: quick_reply(&reply.quick_actions),
    }]
}

fn quick_reply(actions: &QuickActions) -> Option<QuickReply> {
    let items: Vec<QuickReplyItem> = match actions {
        QuickActions::None => return None,
        QuickActions::Options(options) => options
            .iter()
            .take(MAX_QUICK_REPLY_ITEMS)
            .map(|option| {
                QuickReplyItem::new(QuickReplyAction::Message {
                    label: truncate_chars(&option.label, MAX_LABEL_CHARS),
                    text: option.text.clone(),
                })
            })
            .collect(),
        QuickActions::SendLocation { label } => vec![QuickReplyItem::new(QuickReplyAction::Location {
            label: truncate_chars(label, MAX_LABEL_CHARS),
        })],
    };

    if items.is_empty() {
        None
    } else {
        Some(QuickReply { items })
    }
}

/// Plain-text list of search results
pub fn format_facilities(facilities: &[Facility]) -> String {
    let entries: Vec<String> = facilities
        .iter()
        .map(|f| {
            format!(
                "{}\n住所: {}\n電話番号: {}\nウェブサイト: {}",
                f.name,
                f.address,
                f.phone.as_deref().unwrap_or(NOT_AVAILABLE),
                f.website.as_deref().unwrap_or(NOT_AVAILABLE),
            )
        })
        .collect();
    format!("{FACILITIES_HEADER}\n\n{}", entries.join("\n\n"))
}

fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(max.saturating_sub(1)).collect();
    truncated.push('…');
    truncated
}
