//! Handler for the startVerification button. Puts a user into the
//! verification process.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use log::{info, warn};
use serenity::model::application::component::ButtonStyle;
use serenity::model::application::interaction::message_component::MessageComponentInteraction;
use serenity::model::application::interaction::InteractionResponseType;
use serenity::prelude::Context;

use crate::context::BotContext;
use crate::interactions::Button;
use crate::verification::VerificationError;

use super::{
    component_reply, OPEN_APPLICATION, REFERRAL_CHOICES, START_VERIFICATION, VERIFY_REFERRAL,
};

pub struct StartVerification;

#[async_trait]
impl Button for StartVerification {
    fn custom_id(&self) -> &'static str {
        START_VERIFICATION
    }

    async fn run(
        &self,
        ctx: Arc<BotContext>,
        serenity_ctx: &Context,
        interaction: &MessageComponentInteraction,
    ) -> Result<()> {
        let user = &interaction.user;
        info!(
            "Request to start verification in channel {} for {} ({})",
            interaction.channel_id,
            user.tag(),
            user.id
        );

        let Some(guild_id) = interaction.guild_id else {
            return component_reply(
                serenity_ctx,
                interaction,
                "Verification can only be started in a server.",
            )
            .await;
        };

        let settings = ctx.guild_settings(guild_id);
        let Some(verification_channel) = settings.verification_channel else {
            warn!("Verification requested in guild {guild_id} but no channel is configured");
            return component_reply(
                serenity_ctx,
                interaction,
                &VerificationError::NotConfigured.to_string(),
            )
            .await;
        };

        let ticket = match ctx
            .verification
            .open_ticket(
                &serenity_ctx.http,
                guild_id,
                verification_channel,
                user.id,
                &user.tag(),
            )
            .await
        {
            Ok(ticket) => ticket,
            Err(e) => {
                warn!(
                    "Failed to start verification for {} ({}): {e}",
                    user.tag(),
                    user.id
                );
                return component_reply(serenity_ctx, interaction, &e.to_string()).await;
            }
        };

        // Mentioning the member in the private thread pulls them into it
        let welcome = settings
            .welcome_message
            .unwrap_or_else(|| "A staff member will be with you shortly.".to_string());
        ticket
            .thread_id
            .say(
                &serenity_ctx.http,
                format!("Welcome <@{}>! {welcome}", user.id),
            )
            .await?;

        let thread_url = ticket.thread_url();
        interaction
            .create_interaction_response(&serenity_ctx.http, |response| {
                response
                    .kind(InteractionResponseType::ChannelMessageWithSource)
                    .interaction_response_data(|message| {
                        message
                            .content(
                                "Your verification thread is ready. Tell us how you found us, \
                                 then fill out the application.",
                            )
                            .ephemeral(true)
                            .components(|components| {
                                components
                                    .create_action_row(|row| {
                                        row.create_select_menu(|menu| {
                                            menu.custom_id(VERIFY_REFERRAL)
                                                .placeholder("How did you find us?")
                                                .options(|options| {
                                                    for (value, label) in REFERRAL_CHOICES {
                                                        options.create_option(|option| {
                                                            option.label(*label).value(*value)
                                                        });
                                                    }
                                                    options
                                                })
                                        })
                                    })
                                    .create_action_row(|row| {
                                        row.create_button(|button| {
                                            button
                                                .custom_id(OPEN_APPLICATION)
                                                .label("Fill out application")
                                                .style(ButtonStyle::Primary)
                                        })
                                        .create_button(|button| {
                                            button
                                                .label("View Thread")
                                                .style(ButtonStyle::Link)
                                                .url(&thread_url)
                                        })
                                    })
                            })
                    })
            })
            .await?;

        info!(
            "Created ticket {} for {} ({})",
            ticket.thread_id,
            user.tag(),
            user.id
        );
        Ok(())
    }
}
