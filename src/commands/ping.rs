//! The /ping liveness check

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serenity::builder::CreateApplicationCommand;
use serenity::model::application::interaction::application_command::ApplicationCommandInteraction;
use serenity::model::application::interaction::InteractionResponseType;
use serenity::prelude::Context;

use crate::context::BotContext;
use crate::interactions::SlashCommand;

pub struct Ping;

#[async_trait]
impl SlashCommand for Ping {
    fn name(&self) -> &'static str {
        "ping"
    }

    fn register_spec(&self) -> CreateApplicationCommand {
        CreateApplicationCommand::default()
            .name("ping")
            .description("Check that the bot is alive")
            .to_owned()
    }

    async fn run(
        &self,
        ctx: Arc<BotContext>,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        let uptime = ctx.started_at.elapsed().as_secs();
        command
            .create_interaction_response(&serenity_ctx.http, |response| {
                response
                    .kind(InteractionResponseType::ChannelMessageWithSource)
                    .interaction_response_data(|message| {
                        message.content(format!("🏓 Pong! Up for {uptime}s."))
                    })
            })
            .await?;
        Ok(())
    }
}
