//! HTTP API for the clinic bot
//!
//! Webhook callback plus the conversation history endpoints.

mod handlers;
mod types;

pub use handlers::create_router;
#[allow(unused_imports)] // Public API re-exports
pub use types::*;

use crate::db::Database;
use crate::line::{ReplySender, SignatureVerifier};
use crate::runtime::DialogueRuntime;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub runtime: Arc<DialogueRuntime>,
    pub verifier: SignatureVerifier,
    pub replies: Arc<dyn ReplySender>,
    pub db: Database,
}

impl AppState {
    pub fn new(
        runtime: DialogueRuntime,
        verifier: SignatureVerifier,
        replies: Arc<dyn ReplySender>,
        db: Database,
    ) -> Self {
        Self {
            runtime: Arc::new(runtime),
            verifier,
            replies,
            db,
        }
    }
}
