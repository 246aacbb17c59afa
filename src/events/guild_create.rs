//! Listener for guild availability

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use log::info;
use serenity::prelude::Context;

use crate::context::BotContext;
use crate::interactions::{EventListener, GatewayEvent};

pub struct GuildCreateListener;

#[async_trait]
impl EventListener for GuildCreateListener {
    fn event_name(&self) -> &'static str {
        "guild_create"
    }

    async fn run(
        &self,
        ctx: Arc<BotContext>,
        _serenity_ctx: &Context,
        event: &GatewayEvent,
    ) -> Result<()> {
        let GatewayEvent::GuildCreate(guild) = event else {
            return Ok(());
        };

        let configured = ctx
            .guild_settings(guild.id)
            .verification_channel
            .is_some();
        info!(
            "📥 Guild available: {} ({}) - verification {}",
            guild.name,
            guild.id,
            if configured { "configured" } else { "not configured" }
        );
        Ok(())
    }
}
