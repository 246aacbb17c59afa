//! # Event Listeners
//!
//! Named listeners for gateway events, dispatched through the event
//! registry by event name.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.0.0: ready and guild_create listeners

mod guild_create;
mod ready;

use std::sync::Arc;

use crate::interactions::EventListener;

pub use guild_create::GuildCreateListener;
pub use ready::ReadyListener;

/// Every built-in event listener
pub fn listeners() -> Vec<Arc<dyn EventListener>> {
    vec![Arc::new(ReadyListener), Arc::new(GuildCreateListener)]
}
