//! Topic-based event bus for runtime events.
//!
//! This module is the engine-owned trigger seam: hosts publish
//! [`TriggerEvent`]s instead of wiring framework-specific listeners, and the
//! runtime subscribes to the trigger topic itself. Script lifecycle events
//! flow out over the same bus.

mod bus;
mod types;

pub use bus::{Event, EventBus, Topic};
pub use types::{ScriptEvent, TriggerEvent};
