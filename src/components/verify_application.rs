//! Handler for the verifyApplication modal submit

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use log::info;
use serenity::model::application::interaction::modal::ModalSubmitInteraction;
use serenity::prelude::Context;

use crate::context::BotContext;
use crate::core::truncate_for_message;
use crate::interactions::Modal;

use super::{modal_input, modal_reply, VERIFY_APPLICATION};

pub struct VerifyApplication;

/// Ages are free-text input; accept plain numbers only
pub(super) fn valid_age(value: &str) -> bool {
    match regex::Regex::new(r"^[0-9]{1,3}$") {
        Ok(re) => re.is_match(value.trim()),
        Err(_) => false,
    }
}

#[async_trait]
impl Modal for VerifyApplication {
    fn custom_id(&self) -> &'static str {
        VERIFY_APPLICATION
    }

    async fn run(
        &self,
        ctx: Arc<BotContext>,
        serenity_ctx: &Context,
        interaction: &ModalSubmitInteraction,
    ) -> Result<()> {
        let age = modal_input(interaction, "age").unwrap_or_default();
        let reason = modal_input(interaction, "reason").unwrap_or_default();

        if !valid_age(&age) {
            return modal_reply(
                serenity_ctx,
                interaction,
                "Age must be a plain number. Please try again.",
            )
            .await;
        }

        let ticket = match ctx.verification.submit_application(interaction.user.id) {
            Ok(ticket) => ticket,
            Err(e) => return modal_reply(serenity_ctx, interaction, &e.to_string()).await,
        };

        let summary = truncate_for_message(&format!(
            "Application from <@{}>:\n**Age:** {}\n**Reason:** {}",
            interaction.user.id,
            age.trim(),
            reason.trim()
        ));
        ticket.thread_id.say(&serenity_ctx.http, summary).await?;

        info!(
            "Application submitted for ticket {} by {} ({})",
            ticket.thread_id,
            interaction.user.tag(),
            interaction.user.id
        );
        modal_reply(
            serenity_ctx,
            interaction,
            "Application submitted! A staff member will review it in your thread.",
        )
        .await
    }
}
