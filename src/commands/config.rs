//! The /config command and its subcommands
//!
//! The parent command carries no options of its own; the `set` and `show`
//! subcommands are attached by the loader and merged into the registration
//! spec from their own definitions.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use log::info;
use serenity::builder::{CreateApplicationCommand, CreateApplicationCommandOption};
use serenity::model::application::command::CommandOptionType;
use serenity::model::application::interaction::application_command::{
    ApplicationCommandInteraction, CommandDataOption,
};
use serenity::model::id::ChannelId;
use serenity::model::Permissions;
use serenity::prelude::Context;

use crate::context::BotContext;
use crate::interactions::{SlashCommand, Subcommand};

use super::{ephemeral_reply, get_string_option};

pub struct Config;

#[async_trait]
impl SlashCommand for Config {
    fn name(&self) -> &'static str {
        "config"
    }

    fn register_spec(&self) -> CreateApplicationCommand {
        CreateApplicationCommand::default()
            .name("config")
            .description("Configure verification for this server")
            .default_member_permissions(Permissions::MANAGE_GUILD)
            .dm_permission(false)
            .to_owned()
    }

    async fn run(
        &self,
        _ctx: Arc<BotContext>,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        // Only reachable when the platform sends no subcommand option,
        // which it does not once subcommands are registered.
        ephemeral_reply(
            serenity_ctx,
            command,
            "Use `/config set` or `/config show`.",
        )
        .await
    }
}

pub struct ConfigSet;

#[async_trait]
impl Subcommand for ConfigSet {
    fn name(&self) -> &'static str {
        "set"
    }

    fn parent(&self) -> &'static str {
        "config"
    }

    fn register_spec(&self) -> CreateApplicationCommandOption {
        CreateApplicationCommandOption::default()
            .kind(CommandOptionType::SubCommand)
            .name("set")
            .description("Change a verification setting")
            .create_sub_option(|option| {
                option
                    .kind(CommandOptionType::String)
                    .name("setting")
                    .description("The setting to change")
                    .required(true)
                    .add_string_choice("verification_channel", "verification_channel")
                    .add_string_choice("welcome_message", "welcome_message")
            })
            .create_sub_option(|option| {
                option
                    .kind(CommandOptionType::String)
                    .name("value")
                    .description("Channel id or message text")
                    .required(true)
            })
            .to_owned()
    }

    async fn run(
        &self,
        ctx: Arc<BotContext>,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
        options: &[CommandDataOption],
    ) -> Result<()> {
        let Some(guild_id) = command.guild_id else {
            return ephemeral_reply(
                serenity_ctx,
                command,
                "This command can only be used in a server.",
            )
            .await;
        };

        let setting = get_string_option(options, "setting").unwrap_or_default();
        let value = get_string_option(options, "value").unwrap_or_default();

        let reply = match setting.as_str() {
            "verification_channel" => match value.trim().parse::<u64>() {
                Ok(id) => {
                    ctx.set_verification_channel(guild_id, ChannelId(id));
                    info!("Guild {guild_id}: verification channel set to {id}");
                    format!("Verification channel set to <#{id}>.")
                }
                Err(_) => "`verification_channel` expects a channel id.".to_string(),
            },
            "welcome_message" => {
                ctx.set_welcome_message(guild_id, &value);
                info!("Guild {guild_id}: welcome message updated");
                "Welcome message updated.".to_string()
            }
            other => format!("Unknown setting `{other}`."),
        };

        ephemeral_reply(serenity_ctx, command, &reply).await
    }
}

pub struct ConfigShow;

#[async_trait]
impl Subcommand for ConfigShow {
    fn name(&self) -> &'static str {
        "show"
    }

    fn parent(&self) -> &'static str {
        "config"
    }

    fn register_spec(&self) -> CreateApplicationCommandOption {
        CreateApplicationCommandOption::default()
            .kind(CommandOptionType::SubCommand)
            .name("show")
            .description("Show the current verification settings")
            .to_owned()
    }

    async fn run(
        &self,
        ctx: Arc<BotContext>,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
        _options: &[CommandDataOption],
    ) -> Result<()> {
        let Some(guild_id) = command.guild_id else {
            return ephemeral_reply(
                serenity_ctx,
                command,
                "This command can only be used in a server.",
            )
            .await;
        };

        let settings = ctx.guild_settings(guild_id);
        let channel = settings
            .verification_channel
            .map(|c| format!("<#{c}>"))
            .unwrap_or_else(|| "not set".to_string());
        let welcome = settings
            .welcome_message
            .unwrap_or_else(|| "default".to_string());

        let reply = format!(
            "**Verification settings**\nChannel: {channel}\nWelcome message: {welcome}\nOpen tickets: {}",
            ctx.verification.open_count()
        );
        ephemeral_reply(serenity_ctx, command, &reply).await
    }
}
