//! Runtime for processing dialogue events
//!
//! Owns the session store and the collaborators. Each event locks its user's
//! session, runs the pure transition, executes the requested side effect and
//! records the turn.

mod executor;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use executor::{BotReply, Collaborators, DialogueRuntime};
pub use traits::*;
