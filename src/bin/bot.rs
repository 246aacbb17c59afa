use std::time::Duration;

use anyhow::Result;
use dotenvy::dotenv;
use log::info;
use serenity::model::id::GuildId;

use gatekeeper::interactions::Catalog;
use gatekeeper::{Bot, Config, StartOptions};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    let config = Config::from_env()?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    info!("Starting Gatekeeper verification bot...");

    // Guild scope for development (instant command updates), global for
    // production
    let guild_id = config
        .discord_guild_id
        .as_ref()
        .and_then(|id| id.parse::<u64>().ok())
        .map(GuildId);
    match guild_id {
        Some(guild_id) => {
            info!("🔧 Development mode: commands scoped to guild {guild_id}");
        }
        None => {
            info!("🌍 Production mode: global commands (may take up to 1 hour to propagate)");
        }
    }

    let startup_timeout = Duration::from_secs(config.startup_timeout_secs);
    let bot = Bot::load(Catalog::builtin(), startup_timeout).await?;

    bot.start(
        &config.discord_token,
        StartOptions {
            register_commands: config.register_commands,
            clean: config.clean_commands,
            guild_id,
            startup_timeout,
        },
    )
    .await
}
