//! Listener for the gateway ready event

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use log::info;
use serenity::prelude::Context;

use crate::context::BotContext;
use crate::interactions::{EventListener, GatewayEvent};

pub struct ReadyListener;

#[async_trait]
impl EventListener for ReadyListener {
    fn event_name(&self) -> &'static str {
        "ready"
    }

    async fn run(
        &self,
        _ctx: Arc<BotContext>,
        _serenity_ctx: &Context,
        event: &GatewayEvent,
    ) -> Result<()> {
        let GatewayEvent::Ready(ready) = event else {
            return Ok(());
        };

        info!("🎉 {} is connected and ready!", ready.user.name);
        info!("📡 Connected to {} guilds", ready.guilds.len());
        info!("🤖 Bot ID: {}", ready.user.id);
        if let Some(shard) = ready.shard {
            info!("⚡ Shard: {}/{}", shard[0] + 1, shard[1]);
        }
        Ok(())
    }
}
