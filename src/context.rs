//! Shared context for interaction handlers
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.0.0: Initial implementation with verification and guild settings

use dashmap::DashMap;
use serenity::model::id::{ChannelId, GuildId};

use crate::verification::VerificationManager;

/// Per-guild settings adjusted through `/config set`
#[derive(Debug, Clone, Default)]
pub struct GuildSettings {
    /// Channel whose threads host verification tickets
    pub verification_channel: Option<ChannelId>,
    /// Message posted into a freshly opened ticket thread
    pub welcome_message: Option<String>,
}

/// Shared state handed to every handler's `run`.
///
/// Owned by the session object and passed explicitly; there are no
/// process-wide singletons. Everything here is safe to share across
/// concurrently dispatched events.
pub struct BotContext {
    pub verification: VerificationManager,
    settings: DashMap<u64, GuildSettings>,
    pub started_at: std::time::Instant,
}

impl BotContext {
    pub fn new() -> Self {
        Self {
            verification: VerificationManager::new(),
            settings: DashMap::new(),
            started_at: std::time::Instant::now(),
        }
    }

    /// Current settings for a guild (defaults when never configured)
    pub fn guild_settings(&self, guild_id: GuildId) -> GuildSettings {
        self.settings
            .get(&guild_id.0)
            .map(|s| s.clone())
            .unwrap_or_default()
    }

    pub fn set_verification_channel(&self, guild_id: GuildId, channel: ChannelId) {
        self.settings
            .entry(guild_id.0)
            .or_default()
            .verification_channel = Some(channel);
    }

    pub fn set_welcome_message(&self, guild_id: GuildId, message: &str) {
        self.settings.entry(guild_id.0).or_default().welcome_message = Some(message.to_string());
    }
}

impl Default for BotContext {
    fn default() -> Self {
        Self::new()
    }
}
