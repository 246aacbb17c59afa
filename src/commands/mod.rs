//! # Command Definitions
//!
//! Slash commands, subcommands and context menu commands shipped with the
//! bot. The loader instantiates these into the dispatch registries; the
//! synchronizer registers their specs with Discord.
//!
//! - **Version**: 1.1.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.1.0: Add the Review Verification context menu
//! - 1.0.0: Initial ping and config commands

mod config;
mod ping;
mod review;

use std::sync::Arc;

use anyhow::Result;
use serenity::model::application::interaction::application_command::{
    ApplicationCommandInteraction, CommandDataOption,
};
use serenity::model::application::interaction::InteractionResponseType;
use serenity::prelude::Context;

use crate::interactions::{ContextMenuCommand, SlashCommand, Subcommand};

pub use config::{Config, ConfigSet, ConfigShow};
pub use ping::Ping;
pub use review::ReviewVerification;

/// Every built-in slash command
pub fn slash_commands() -> Vec<Arc<dyn SlashCommand>> {
    vec![Arc::new(Ping), Arc::new(Config)]
}

/// Every built-in subcommand; attached to parents by the loader's second
/// phase
pub fn subcommands() -> Vec<Arc<dyn Subcommand>> {
    vec![Arc::new(ConfigSet), Arc::new(ConfigShow)]
}

/// Every built-in context menu command
pub fn context_menus() -> Vec<Arc<dyn ContextMenuCommand>> {
    vec![Arc::new(ReviewVerification)]
}

/// Utility function to get a string option from a command's option list
pub fn get_string_option(options: &[CommandDataOption], name: &str) -> Option<String> {
    options
        .iter()
        .find(|opt| opt.name == name)
        .and_then(|opt| opt.value.as_ref())
        .and_then(|val| val.as_str())
        .map(|s| s.to_string())
}

/// Reply to a command interaction with an ephemeral message
pub async fn ephemeral_reply(
    serenity_ctx: &Context,
    command: &ApplicationCommandInteraction,
    content: &str,
) -> Result<()> {
    command
        .create_interaction_response(&serenity_ctx.http, |response| {
            response
                .kind(InteractionResponseType::ChannelMessageWithSource)
                .interaction_response_data(|message| message.content(content).ephemeral(true))
        })
        .await?;
    Ok(())
}
