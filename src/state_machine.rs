//! Per-user dialogue state machine
//!
//! Implements the Elm Architecture pattern with pure state transitions.

mod effect;
pub mod event;
pub mod messages;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

#[allow(unused_imports)] // Public API re-exports
pub use effect::{OutboundAction, QuickAction, QuickActions, Reply, SideEffect};
pub use event::{GeoPoint, InboundEvent};
pub use state::{Department, DialogueState, InfoType, Session};
#[allow(unused_imports)]
pub use transition::{transition, TransitionError, TransitionResult};
