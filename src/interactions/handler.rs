//! Handler traits for every interaction category
//!
//! - **Version**: 1.1.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.1.0: Subcommands receive their nested options directly
//! - 1.0.0: Initial trait set for modular interaction handling

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serenity::builder::{CreateApplicationCommand, CreateApplicationCommandOption};
use serenity::model::application::interaction::application_command::{
    ApplicationCommandInteraction, CommandDataOption,
};
use serenity::model::application::interaction::message_component::MessageComponentInteraction;
use serenity::model::application::interaction::modal::ModalSubmitInteraction;
use serenity::model::gateway::Ready;
use serenity::model::guild::Guild;
use serenity::prelude::Context;

use crate::context::BotContext;

use super::error::{LookupError, RegistryError};
use super::registry::{Category, HandlerRegistry};

/// Trait for top-level slash command handlers
///
/// Each handler processes exactly one command name. Handlers are registered
/// with a `HandlerRegistry` and dispatched by command name.
///
/// # Example
///
/// ```ignore
/// pub struct Ping;
///
/// #[async_trait]
/// impl SlashCommand for Ping {
///     fn name(&self) -> &'static str {
///         "ping"
///     }
///
///     fn register_spec(&self) -> CreateApplicationCommand {
///         CreateApplicationCommand::default()
///             .name("ping")
///             .description("Check that the bot is alive")
///             .to_owned()
///     }
///
///     async fn run(
///         &self,
///         ctx: Arc<BotContext>,
///         serenity_ctx: &Context,
///         command: &ApplicationCommandInteraction,
///     ) -> Result<()> {
///         // respond here
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait SlashCommand: Send + Sync {
    /// Unique command name, used as the dispatch key
    fn name(&self) -> &'static str;

    /// The schema registered with the platform for this command.
    ///
    /// Subcommand options are not part of this spec; they are attached by
    /// the loader from the subcommand definitions that declare this command
    /// as their parent.
    fn register_spec(&self) -> CreateApplicationCommand;

    async fn run(
        &self,
        ctx: Arc<BotContext>,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()>;
}

/// Trait for subcommands of a slash command
///
/// Loaded in a second phase after all parents are registered; a subcommand
/// naming an unknown parent fails the load.
#[async_trait]
pub trait Subcommand: Send + Sync {
    /// Subcommand name, unique among its parent's children
    fn name(&self) -> &'static str;

    /// Name of the parent slash command this attaches to
    fn parent(&self) -> &'static str;

    /// The subcommand option merged into the parent's registration spec
    fn register_spec(&self) -> CreateApplicationCommandOption;

    /// Handle the subcommand. `options` are the nested options of the
    /// subcommand itself, not the parent's option list.
    async fn run(
        &self,
        ctx: Arc<BotContext>,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
        options: &[CommandDataOption],
    ) -> Result<()>;
}

/// Trait for button handlers, keyed by the button's customId
#[async_trait]
pub trait Button: Send + Sync {
    fn custom_id(&self) -> &'static str;

    async fn run(
        &self,
        ctx: Arc<BotContext>,
        serenity_ctx: &Context,
        interaction: &MessageComponentInteraction,
    ) -> Result<()>;
}

/// Trait for select menu handlers, keyed by the menu's customId.
/// Selected values arrive on `interaction.data.values`.
#[async_trait]
pub trait SelectMenu: Send + Sync {
    fn custom_id(&self) -> &'static str;

    async fn run(
        &self,
        ctx: Arc<BotContext>,
        serenity_ctx: &Context,
        interaction: &MessageComponentInteraction,
    ) -> Result<()>;
}

/// Trait for modal submit handlers, keyed by the modal's customId
#[async_trait]
pub trait Modal: Send + Sync {
    fn custom_id(&self) -> &'static str;

    async fn run(
        &self,
        ctx: Arc<BotContext>,
        serenity_ctx: &Context,
        interaction: &ModalSubmitInteraction,
    ) -> Result<()>;
}

/// Trait for context menu commands (user or message commands)
#[async_trait]
pub trait ContextMenuCommand: Send + Sync {
    /// Display name, used as the dispatch key (e.g. "Review Verification")
    fn name(&self) -> &'static str;

    /// The schema registered with the platform for this command
    fn register_spec(&self) -> CreateApplicationCommand;

    async fn run(
        &self,
        ctx: Arc<BotContext>,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()>;
}

/// Gateway events that listeners can subscribe to by name
#[derive(Debug, Clone)]
pub enum GatewayEvent {
    Ready(Ready),
    GuildCreate(Guild),
}

impl GatewayEvent {
    /// The name a listener registers under to receive this event
    pub fn name(&self) -> &'static str {
        match self {
            GatewayEvent::Ready(_) => "ready",
            GatewayEvent::GuildCreate(_) => "guild_create",
        }
    }
}

/// Trait for gateway event listeners, keyed by event name
#[async_trait]
pub trait EventListener: Send + Sync {
    fn event_name(&self) -> &'static str;

    async fn run(
        &self,
        ctx: Arc<BotContext>,
        serenity_ctx: &Context,
        event: &GatewayEvent,
    ) -> Result<()>;
}

/// Slash registry entry: the parent handler plus its child subcommand
/// registry. Children are attached by the loader's second phase and frozen
/// together with the parent registry.
pub struct SlashEntry {
    command: Arc<dyn SlashCommand>,
    children: HandlerRegistry<Arc<dyn Subcommand>>,
}

impl SlashEntry {
    pub fn new(command: Arc<dyn SlashCommand>) -> Self {
        Self {
            command,
            children: HandlerRegistry::new(Category::Subcommand),
        }
    }

    pub fn command(&self) -> &Arc<dyn SlashCommand> {
        &self.command
    }

    pub fn children(&self) -> &HandlerRegistry<Arc<dyn Subcommand>> {
        &self.children
    }

    /// Look up a child subcommand by name
    pub fn subcommand(&self, name: &str) -> Result<&Arc<dyn Subcommand>, LookupError> {
        self.children.get(name)
    }

    pub(crate) fn attach(&mut self, sub: Arc<dyn Subcommand>) -> Result<(), RegistryError> {
        self.children.register(sub.name(), sub)
    }

    pub(crate) fn freeze_children(&mut self) {
        self.children.freeze();
    }

    /// The platform-facing spec: the parent's registration spec with every
    /// attached subcommand merged in as an option, in insertion order.
    pub fn remote_spec(&self) -> CreateApplicationCommand {
        let mut spec = self.command.register_spec();
        for (_, sub) in self.children.iter() {
            spec.add_option(sub.register_spec());
        }
        spec
    }
}

impl std::fmt::Debug for SlashEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlashEntry")
            .field("command", &self.command.name())
            .finish_non_exhaustive()
    }
}

impl std::fmt::Debug for dyn Button {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Button")
            .field("custom_id", &self.custom_id())
            .finish()
    }
}

impl std::fmt::Debug for dyn Subcommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subcommand")
            .field("name", &self.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serenity::model::application::command::CommandOptionType;

    // The dispatch tables hold trait objects, so every trait must stay
    // object-safe.
    fn _assert_object_safe(
        _: &dyn SlashCommand,
        _: &dyn Subcommand,
        _: &dyn Button,
        _: &dyn SelectMenu,
        _: &dyn Modal,
        _: &dyn ContextMenuCommand,
        _: &dyn EventListener,
    ) {
    }

    struct MockParent;

    #[async_trait]
    impl SlashCommand for MockParent {
        fn name(&self) -> &'static str {
            "config"
        }

        fn register_spec(&self) -> CreateApplicationCommand {
            CreateApplicationCommand::default()
                .name("config")
                .description("Configure the bot")
                .to_owned()
        }

        async fn run(
            &self,
            _ctx: Arc<BotContext>,
            _serenity_ctx: &Context,
            _command: &ApplicationCommandInteraction,
        ) -> Result<()> {
            Ok(())
        }
    }

    struct MockChild;

    #[async_trait]
    impl Subcommand for MockChild {
        fn name(&self) -> &'static str {
            "set"
        }

        fn parent(&self) -> &'static str {
            "config"
        }

        fn register_spec(&self) -> CreateApplicationCommandOption {
            CreateApplicationCommandOption::default()
                .kind(CommandOptionType::SubCommand)
                .name("set")
                .description("Set a value")
                .to_owned()
        }

        async fn run(
            &self,
            _ctx: Arc<BotContext>,
            _serenity_ctx: &Context,
            _command: &ApplicationCommandInteraction,
            _options: &[CommandDataOption],
        ) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_slash_entry_merges_children_into_remote_spec() {
        let mut entry = SlashEntry::new(Arc::new(MockParent));
        entry.attach(Arc::new(MockChild)).unwrap();

        let spec = entry.remote_spec();
        let options = spec.0.get("options").and_then(|v| v.as_array()).unwrap();
        assert_eq!(options.len(), 1);
        assert_eq!(
            options[0].get("name").and_then(|v| v.as_str()),
            Some("set")
        );
    }

    #[test]
    fn test_slash_entry_subcommand_lookup() {
        let mut entry = SlashEntry::new(Arc::new(MockParent));
        entry.attach(Arc::new(MockChild)).unwrap();

        assert!(entry.subcommand("set").is_ok());
        let err = entry.subcommand("unset").unwrap_err();
        assert_eq!(err.category, Category::Subcommand);
    }
}
