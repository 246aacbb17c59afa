//! Handler for the openApplication button: presents the application modal

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serenity::model::application::component::InputTextStyle;
use serenity::model::application::interaction::message_component::MessageComponentInteraction;
use serenity::model::application::interaction::InteractionResponseType;
use serenity::prelude::Context;

use crate::context::BotContext;
use crate::interactions::Button;

use super::{component_reply, OPEN_APPLICATION, VERIFY_APPLICATION};

pub struct OpenApplication;

#[async_trait]
impl Button for OpenApplication {
    fn custom_id(&self) -> &'static str {
        OPEN_APPLICATION
    }

    async fn run(
        &self,
        ctx: Arc<BotContext>,
        serenity_ctx: &Context,
        interaction: &MessageComponentInteraction,
    ) -> Result<()> {
        if ctx.verification.ticket_for(interaction.user.id).is_none() {
            return component_reply(
                serenity_ctx,
                interaction,
                "Press **Start Verification** first to open a ticket.",
            )
            .await;
        }

        interaction
            .create_interaction_response(&serenity_ctx.http, |response| {
                response
                    .kind(InteractionResponseType::Modal)
                    .interaction_response_data(|modal| {
                        modal
                            .custom_id(VERIFY_APPLICATION)
                            .title("Verification Application")
                            .components(|components| {
                                components
                                    .create_action_row(|row| {
                                        row.create_input_text(|input| {
                                            input
                                                .custom_id("age")
                                                .label("How old are you?")
                                                .style(InputTextStyle::Short)
                                                .required(true)
                                                .min_length(1)
                                                .max_length(3)
                                        })
                                    })
                                    .create_action_row(|row| {
                                        row.create_input_text(|input| {
                                            input
                                                .custom_id("reason")
                                                .label("Why do you want to join?")
                                                .style(InputTextStyle::Paragraph)
                                                .required(true)
                                                .max_length(1000)
                                        })
                                    })
                            })
                    })
            })
            .await?;
        Ok(())
    }
}
