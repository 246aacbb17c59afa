//! The "Review Verification" user context menu command
//!
//! Staff-facing: right-click a member to see where their verification
//! ticket stands.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serenity::builder::CreateApplicationCommand;
use serenity::model::application::command::CommandType;
use serenity::model::application::interaction::application_command::ApplicationCommandInteraction;
use serenity::model::Permissions;
use serenity::prelude::Context;

use crate::context::BotContext;
use crate::interactions::ContextMenuCommand;

use super::ephemeral_reply;

pub struct ReviewVerification;

#[async_trait]
impl ContextMenuCommand for ReviewVerification {
    fn name(&self) -> &'static str {
        "Review Verification"
    }

    fn register_spec(&self) -> CreateApplicationCommand {
        // Context menu commands carry no description
        CreateApplicationCommand::default()
            .name("Review Verification")
            .kind(CommandType::User)
            .default_member_permissions(Permissions::MANAGE_GUILD)
            .dm_permission(false)
            .to_owned()
    }

    async fn run(
        &self,
        ctx: Arc<BotContext>,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        let Some(target) = command.data.target_id.map(|t| t.to_user_id()) else {
            return ephemeral_reply(serenity_ctx, command, "No target user on this command.").await;
        };

        let reply = match ctx.verification.ticket_for(target) {
            Some(ticket) => {
                let referral = ticket.referral.as_deref().unwrap_or("not answered");
                format!(
                    "Ticket for <@{target}>: {}\nOpened: {}\nReferral: {referral}\nThread: {}",
                    ticket.state,
                    ticket.opened_at.format("%Y-%m-%d %H:%M UTC"),
                    ticket.thread_url()
                )
            }
            None => format!("<@{target}> has no open verification ticket."),
        };

        ephemeral_reply(serenity_ctx, command, &reply).await
    }
}
