//! Handler for the verifyReferral select menu

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use log::info;
use serenity::model::application::interaction::message_component::MessageComponentInteraction;
use serenity::prelude::Context;

use crate::context::BotContext;
use crate::interactions::SelectMenu;

use super::{component_reply, VERIFY_REFERRAL};

pub struct VerifyReferral;

#[async_trait]
impl SelectMenu for VerifyReferral {
    fn custom_id(&self) -> &'static str {
        VERIFY_REFERRAL
    }

    async fn run(
        &self,
        ctx: Arc<BotContext>,
        serenity_ctx: &Context,
        interaction: &MessageComponentInteraction,
    ) -> Result<()> {
        let Some(choice) = interaction.data.values.first() else {
            return component_reply(serenity_ctx, interaction, "Nothing selected.").await;
        };

        match ctx.verification.record_referral(interaction.user.id, choice) {
            Ok(()) => {
                info!(
                    "Recorded referral '{choice}' for {} ({})",
                    interaction.user.tag(),
                    interaction.user.id
                );
                component_reply(serenity_ctx, interaction, "Thanks, noted!").await
            }
            Err(e) => component_reply(serenity_ctx, interaction, &e.to_string()).await,
        }
    }
}
