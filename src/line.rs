//! LINE Messaging API transport
//!
//! Webhook payloads, signature verification and the reply client.

mod client;
mod signature;
pub mod types;

pub use client::{LineClient, LineError, LoggingReplySender, ReplySender};
pub use signature::{SignatureError, SignatureVerifier, SIGNATURE_HEADER};
