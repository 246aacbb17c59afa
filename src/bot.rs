//! # Session Object and Dispatcher
//!
//! `Bot` owns one frozen registry per interaction category and drives the
//! session lifecycle: load -> optional clean -> optional register ->
//! gateway authentication. Construction through [`Bot::load`] guarantees a
//! session can only connect with a complete handler set; there is no path
//! back to the load phase without a process restart.
//!
//! - **Version**: 1.2.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.2.0: Startup timeout applied to load and each sync step
//! - 1.1.0: Typed lookup errors with known-name snapshots
//! - 1.0.0: Initial session lifecycle and dispatch loop

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use log::{debug, error, info, warn};
use serenity::async_trait;
use serenity::model::application::command::{CommandOptionType, CommandType};
use serenity::model::application::component::ComponentType;
use serenity::model::application::interaction::application_command::ApplicationCommandInteraction;
use serenity::model::application::interaction::message_component::MessageComponentInteraction;
use serenity::model::application::interaction::modal::ModalSubmitInteraction;
use serenity::model::application::interaction::{Interaction, InteractionResponseType};
use serenity::model::gateway::Ready;
use serenity::model::guild::Guild;
use serenity::model::id::GuildId;
use serenity::prelude::{Client, Context, EventHandler, GatewayIntents};
use uuid::Uuid;

use crate::context::BotContext;
use crate::interactions::{
    load_all, Button, Catalog, CommandScope, CommandSynchronizer, ContextMenuCommand,
    EventListener, GatewayEvent, HttpBackend, LoadError, LookupError, Modal, Registries,
    SelectMenu, SlashEntry, Subcommand, SyncError,
};

/// Options for [`Bot::start`]
#[derive(Debug, Clone)]
pub struct StartOptions {
    /// Replace the remote command set with the declared one
    pub register_commands: bool,
    /// Delete all remotely registered commands first
    pub clean: bool,
    /// Scope commands to one guild; global when `None`
    pub guild_id: Option<GuildId>,
    /// Upper bound for each command-sync step
    pub startup_timeout: Duration,
}

impl Default for StartOptions {
    fn default() -> Self {
        Self {
            register_commands: false,
            clean: false,
            guild_id: None,
            startup_timeout: Duration::from_secs(60),
        }
    }
}

/// The long-lived session object. Exclusively owns every handler registry;
/// nothing else in the process holds mutable handler state.
pub struct Bot {
    registries: Arc<Registries>,
    context: Arc<BotContext>,
}

impl Bot {
    /// Run the load phase: populate and freeze every registry from the
    /// catalog. Fails fast on duplicate names, orphaned subcommands or a
    /// load that outruns `timeout` - no partially loaded bot is ever
    /// handed back.
    pub async fn load(catalog: Catalog, timeout: Duration) -> Result<Self, LoadError> {
        let registries = tokio::time::timeout(timeout, load_all(catalog))
            .await
            .map_err(|_| LoadError::Timeout {
                seconds: timeout.as_secs(),
            })??;

        Ok(Self {
            registries: Arc::new(registries),
            context: Arc::new(BotContext::new()),
        })
    }

    /// Optionally reconcile the remote command set, then authenticate and
    /// serve events until the gateway connection ends.
    ///
    /// When both are requested, cleaning completes before registration
    /// begins, so the remote state goes empty -> fully replaced. Any
    /// failure here aborts before the gateway connect.
    pub async fn start(self, token: &str, options: StartOptions) -> Result<()> {
        info!("Starting client");

        let intents = GatewayIntents::GUILDS;
        let dispatcher = Dispatcher {
            registries: Arc::clone(&self.registries),
            context: Arc::clone(&self.context),
        };

        let mut client = Client::builder(token, intents)
            .event_handler(dispatcher)
            .await
            .map_err(|e| anyhow::anyhow!("Client creation failed: {}", e))?;

        let scope = options
            .guild_id
            .map(CommandScope::Guild)
            .unwrap_or(CommandScope::Global);
        let timeout_secs = options.startup_timeout.as_secs();
        let sync = CommandSynchronizer::new(Arc::new(HttpBackend::new(
            client.cache_and_http.http.clone(),
        )));

        if options.clean {
            tokio::time::timeout(options.startup_timeout, sync.clean_all(scope))
                .await
                .map_err(|_| SyncError::Timeout {
                    seconds: timeout_secs,
                })??;
        }
        if options.register_commands {
            tokio::time::timeout(
                options.startup_timeout,
                sync.register_all(&self.registries, scope),
            )
            .await
            .map_err(|_| SyncError::Timeout {
                seconds: timeout_secs,
            })??;
        }

        info!("Logging in to Discord...");
        client
            .start()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to establish gateway connection: {}", e))?;
        Ok(())
    }

    /// Shared handler context (verification tickets, guild settings)
    pub fn context(&self) -> Arc<BotContext> {
        Arc::clone(&self.context)
    }

    /// Retrieves the slash command entry matching the given name
    pub fn get_slash_command(&self, name: &str) -> Result<&SlashEntry, LookupError> {
        self.registries.slash_commands.get(name)
    }

    /// Retrieves a subcommand through its parent's child registry
    pub fn get_subcommand(
        &self,
        parent: &str,
        name: &str,
    ) -> Result<&Arc<dyn Subcommand>, LookupError> {
        self.get_slash_command(parent)?.subcommand(name)
    }

    /// Retrieves the button matching the given customId
    pub fn get_button(&self, name: &str) -> Result<&Arc<dyn Button>, LookupError> {
        self.registries.buttons.get(name)
    }

    /// Retrieves the select menu matching the given customId
    pub fn get_select_menu(&self, name: &str) -> Result<&Arc<dyn SelectMenu>, LookupError> {
        self.registries.select_menus.get(name)
    }

    /// Retrieves the modal matching the given customId
    pub fn get_modal(&self, name: &str) -> Result<&Arc<dyn Modal>, LookupError> {
        self.registries.modals.get(name)
    }

    /// Retrieves the context menu command matching the given name
    pub fn get_context_menu(
        &self,
        name: &str,
    ) -> Result<&Arc<dyn ContextMenuCommand>, LookupError> {
        self.registries.context_menus.get(name)
    }

    /// Retrieves the event listener registered for the given event name
    pub fn get_event_listener(&self, name: &str) -> Result<&Arc<dyn EventListener>, LookupError> {
        self.registries.events.get(name)
    }
}

/// Serenity event handler that routes every inbound event through the
/// registries. One lookup per event; misses and handler failures are
/// isolated here so a single bad event can never take down the session.
struct Dispatcher {
    registries: Arc<Registries>,
    context: Arc<BotContext>,
}

impl Dispatcher {
    async fn run_slash(
        &self,
        ctx: &Context,
        command: &ApplicationCommandInteraction,
        request_id: Uuid,
    ) -> Result<()> {
        let name = &command.data.name;
        let entry = match self.registries.slash_commands.get(name) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("[{request_id}] {e} (try re-registering commands to drop stale ones)");
                return self.reply_unknown_command(ctx, command).await;
            }
        };

        // A subcommand invocation arrives as the first (and only) option
        // of kind SubCommand; resolve it through the parent's children.
        let sub_option = command
            .data
            .options
            .iter()
            .find(|o| o.kind == CommandOptionType::SubCommand);
        match sub_option {
            Some(option) => match entry.subcommand(&option.name) {
                Ok(sub) => {
                    debug!("[{request_id}] Dispatching /{name} {}", option.name);
                    sub.run(Arc::clone(&self.context), ctx, command, &option.options)
                        .await
                }
                Err(e) => {
                    warn!("[{request_id}] {e}");
                    self.reply_unknown_command(ctx, command).await
                }
            },
            None => {
                debug!("[{request_id}] Dispatching /{name}");
                entry.command().run(Arc::clone(&self.context), ctx, command).await
            }
        }
    }

    async fn run_context_menu(
        &self,
        ctx: &Context,
        command: &ApplicationCommandInteraction,
        request_id: Uuid,
    ) -> Result<()> {
        match self.registries.context_menus.get(&command.data.name) {
            Ok(handler) => {
                debug!("[{request_id}] Dispatching context menu '{}'", command.data.name);
                handler.run(Arc::clone(&self.context), ctx, command).await
            }
            Err(e) => {
                warn!("[{request_id}] {e}");
                self.reply_unknown_command(ctx, command).await
            }
        }
    }

    async fn dispatch_event(&self, ctx: &Context, event: GatewayEvent) {
        let name = event.name();
        match self.registries.events.get(name) {
            Ok(listener) => {
                if let Err(e) = listener.run(Arc::clone(&self.context), ctx, &event).await {
                    error!("Error in '{name}' listener: {e:#}");
                }
            }
            // Not every gateway event needs a listener; this is the one
            // category where a miss is not a fault.
            Err(_) => debug!("No listener registered for gateway event '{name}'"),
        }
    }

    async fn reply_unknown_command(
        &self,
        ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        command
            .create_interaction_response(&ctx.http, |response| {
                response
                    .kind(InteractionResponseType::ChannelMessageWithSource)
                    .interaction_response_data(|message| {
                        message
                            .content("Unknown command. It may have been removed; try `/ping` to check the bot is alive.")
                            .ephemeral(true)
                    })
            })
            .await?;
        Ok(())
    }

    async fn reply_component_error(
        &self,
        ctx: &Context,
        interaction: &MessageComponentInteraction,
        content: &str,
    ) {
        if let Err(e) = interaction
            .create_interaction_response(&ctx.http, |response| {
                response
                    .kind(InteractionResponseType::ChannelMessageWithSource)
                    .interaction_response_data(|message| message.content(content).ephemeral(true))
            })
            .await
        {
            error!("Failed to send component error response: {e}");
        }
    }

    async fn reply_modal_error(
        &self,
        ctx: &Context,
        interaction: &ModalSubmitInteraction,
        content: &str,
    ) {
        if let Err(e) = interaction
            .create_interaction_response(&ctx.http, |response| {
                response
                    .kind(InteractionResponseType::ChannelMessageWithSource)
                    .interaction_response_data(|message| message.content(content).ephemeral(true))
            })
            .await
        {
            error!("Failed to send modal error response: {e}");
        }
    }
}

#[async_trait]
impl EventHandler for Dispatcher {
    async fn ready(&self, ctx: Context, ready: Ready) {
        self.dispatch_event(&ctx, GatewayEvent::Ready(ready)).await;
    }

    async fn guild_create(&self, ctx: Context, guild: Guild, _is_new: bool) {
        self.dispatch_event(&ctx, GatewayEvent::GuildCreate(guild))
            .await;
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        let request_id = Uuid::new_v4();
        match interaction {
            Interaction::ApplicationCommand(command) => {
                info!(
                    "[{}] 📥 Command received | Name: {} | User: {}",
                    request_id, command.data.name, command.user.id
                );
                let result = match command.data.kind {
                    CommandType::ChatInput => self.run_slash(&ctx, &command, request_id).await,
                    CommandType::User | CommandType::Message => {
                        self.run_context_menu(&ctx, &command, request_id).await
                    }
                    _ => Ok(()),
                };
                if let Err(e) = result {
                    error!(
                        "[{}] Error handling command '{}': {:#}",
                        request_id, command.data.name, e
                    );
                    let _ = command
                        .create_interaction_response(&ctx.http, |response| {
                            response
                                .kind(InteractionResponseType::ChannelMessageWithSource)
                                .interaction_response_data(|message| {
                                    message
                                        .content("❌ Sorry, something went wrong processing that command.")
                                        .ephemeral(true)
                                })
                        })
                        .await;
                }
            }
            Interaction::MessageComponent(component) => {
                let custom_id = component.data.custom_id.clone();
                info!(
                    "[{}] 📥 Component interaction | Id: {} | User: {}",
                    request_id, custom_id, component.user.id
                );
                let result = match component.data.component_type {
                    ComponentType::Button => match self.registries.buttons.get(&custom_id) {
                        Ok(button) => {
                            button
                                .run(Arc::clone(&self.context), &ctx, &component)
                                .await
                        }
                        Err(e) => {
                            warn!("[{request_id}] {e}");
                            self.reply_component_error(&ctx, &component, "Unknown component interaction.")
                                .await;
                            Ok(())
                        }
                    },
                    ComponentType::SelectMenu => match self.registries.select_menus.get(&custom_id)
                    {
                        Ok(menu) => {
                            menu.run(Arc::clone(&self.context), &ctx, &component).await
                        }
                        Err(e) => {
                            warn!("[{request_id}] {e}");
                            self.reply_component_error(&ctx, &component, "Unknown component interaction.")
                                .await;
                            Ok(())
                        }
                    },
                    _ => Ok(()),
                };
                if let Err(e) = result {
                    error!("[{request_id}] Error handling component '{custom_id}': {e:#}");
                    self.reply_component_error(
                        &ctx,
                        &component,
                        "❌ Sorry, something went wrong processing that interaction.",
                    )
                    .await;
                }
            }
            Interaction::ModalSubmit(modal) => {
                let custom_id = modal.data.custom_id.clone();
                info!(
                    "[{}] 📥 Modal submit | Id: {} | User: {}",
                    request_id, custom_id, modal.user.id
                );
                let result = match self.registries.modals.get(&custom_id) {
                    Ok(handler) => handler.run(Arc::clone(&self.context), &ctx, &modal).await,
                    Err(e) => {
                        warn!("[{request_id}] {e}");
                        self.reply_modal_error(&ctx, &modal, "Unknown modal submission.")
                            .await;
                        Ok(())
                    }
                };
                if let Err(e) = result {
                    error!("[{request_id}] Error handling modal '{custom_id}': {e:#}");
                    self.reply_modal_error(
                        &ctx,
                        &modal,
                        "❌ Sorry, something went wrong processing your submission.",
                    )
                    .await;
                }
            }
            Interaction::Autocomplete(autocomplete) => {
                debug!(
                    "[{}] Autocomplete for '{}' ignored (none registered)",
                    request_id, autocomplete.data.name
                );
            }
            Interaction::Ping(_) => {
                debug!("[{request_id}] Ping interaction - platform health check");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interactions::Category;

    async fn builtin_bot() -> Bot {
        Bot::load(Catalog::builtin(), Duration::from_secs(5))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_builtin_catalog_loads() {
        // regression guard: a duplicate name anywhere in the shipped
        // catalog must fail this
        let bot = builtin_bot().await;
        assert!(bot.get_slash_command("ping").is_ok());
        assert!(bot.get_slash_command("config").is_ok());
        assert!(bot.get_button("startVerification").is_ok());
        assert!(bot.get_button("openApplication").is_ok());
        assert!(bot.get_select_menu("verifyReferral").is_ok());
        assert!(bot.get_modal("verifyApplication").is_ok());
        assert!(bot.get_context_menu("Review Verification").is_ok());
        assert!(bot.get_event_listener("ready").is_ok());
    }

    #[tokio::test]
    async fn test_unknown_slash_command_lookup_fails() {
        let bot = builtin_bot().await;
        let err = bot.get_slash_command("pong").unwrap_err();
        assert_eq!(err.category, Category::SlashCommand);
        assert_eq!(err.name, "pong");
        assert!(err.known.contains(&"ping".to_string()));
    }

    #[tokio::test]
    async fn test_unknown_button_lookup_names_category_and_key() {
        let bot = builtin_bot().await;
        let err = bot.get_button("nope").unwrap_err();
        assert_eq!(err.category, Category::Button);
        assert_eq!(err.name, "nope");
    }

    #[tokio::test]
    async fn test_config_subcommands_reachable_through_parent() {
        let bot = builtin_bot().await;
        let entry = bot.get_slash_command("config").unwrap();
        assert!(entry.subcommand("set").is_ok());
        assert!(entry.subcommand("show").is_ok());
        assert!(entry.subcommand("frobnicate").is_err());

        assert!(bot.get_subcommand("config", "set").is_ok());
        let err = bot.get_subcommand("config", "unset").unwrap_err();
        assert_eq!(err.category, Category::Subcommand);
    }

    #[tokio::test]
    async fn test_load_timeout_is_reported() {
        // a zero timeout elapses before the load future gets polled to
        // completion on a busy executor; accept either outcome but never a
        // partially loaded bot
        match Bot::load(Catalog::builtin(), Duration::from_secs(0)).await {
            Ok(bot) => assert!(bot.get_slash_command("ping").is_ok()),
            Err(e) => assert!(matches!(e, LoadError::Timeout { seconds: 0 })),
        }
    }

    #[test]
    fn test_start_options_defaults() {
        let options = StartOptions::default();
        assert!(!options.register_commands);
        assert!(!options.clean);
        assert!(options.guild_id.is_none());
    }
}
