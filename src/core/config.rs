//! # Configuration
//!
//! Environment-driven startup configuration.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.0.0: Initial environment-variable configuration surface

use anyhow::{Context, Result};

/// Startup configuration, read once from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// Discord bot token (required)
    pub discord_token: String,
    /// Default log filter when RUST_LOG is unset
    pub log_level: String,
    /// Optional guild to scope command registration to; global when unset
    pub discord_guild_id: Option<String>,
    /// Replace the remote command set with the declared one on startup
    pub register_commands: bool,
    /// Delete all remotely registered commands before registering
    pub clean_commands: bool,
    /// Upper bound for the load phase and each command-sync step
    pub startup_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let discord_token = std::env::var("DISCORD_TOKEN")
            .context("DISCORD_TOKEN must be set (see https://discord.com/developers/applications)")?;

        let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let discord_guild_id = std::env::var("DISCORD_GUILD_ID").ok().filter(|v| !v.is_empty());

        let register_commands = parse_bool(
            std::env::var("REGISTER_COMMANDS").ok().as_deref(),
            false,
        );
        let clean_commands = parse_bool(std::env::var("CLEAN_COMMANDS").ok().as_deref(), false);

        let startup_timeout_secs = std::env::var("STARTUP_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(60);

        Ok(Config {
            discord_token,
            log_level,
            discord_guild_id,
            register_commands,
            clean_commands,
            startup_timeout_secs,
        })
    }
}

fn parse_bool(value: Option<&str>, default: bool) -> bool {
    match value {
        Some(v) => matches!(v.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes"),
        None => default,
    }
}
