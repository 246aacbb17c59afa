//! Handler catalog and load-phase orchestration
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.0.0: Concurrent category loads with a dependent subcommand phase

use std::sync::Arc;

use log::{debug, info};
use serde_json::Value;
use serenity::builder::CreateApplicationCommand;

use super::error::{CategoryFailure, LoadError};
use super::handler::{
    Button, ContextMenuCommand, EventListener, Modal, SelectMenu, SlashCommand, SlashEntry,
    Subcommand,
};
use super::registry::{Category, HandlerRegistry};

/// The enumerable handler definition sets, one per category.
///
/// Filesystem discovery is out of scope; the built-in catalog is assembled
/// from the `commands`, `components` and `events` modules.
#[derive(Default)]
pub struct Catalog {
    pub slash_commands: Vec<Arc<dyn SlashCommand>>,
    pub subcommands: Vec<Arc<dyn Subcommand>>,
    pub buttons: Vec<Arc<dyn Button>>,
    pub select_menus: Vec<Arc<dyn SelectMenu>>,
    pub modals: Vec<Arc<dyn Modal>>,
    pub context_menus: Vec<Arc<dyn ContextMenuCommand>>,
    pub events: Vec<Arc<dyn EventListener>>,
}

impl Catalog {
    /// Every handler this binary ships with
    pub fn builtin() -> Self {
        Self {
            slash_commands: crate::commands::slash_commands(),
            subcommands: crate::commands::subcommands(),
            buttons: crate::components::buttons(),
            select_menus: crate::components::select_menus(),
            modals: crate::components::modals(),
            context_menus: crate::commands::context_menus(),
            events: crate::events::listeners(),
        }
    }
}

/// The frozen output of a successful load phase. One registry per
/// category; subcommands live inside their parent's `SlashEntry`.
pub struct Registries {
    pub slash_commands: HandlerRegistry<SlashEntry>,
    pub buttons: HandlerRegistry<Arc<dyn Button>>,
    pub select_menus: HandlerRegistry<Arc<dyn SelectMenu>>,
    pub modals: HandlerRegistry<Arc<dyn Modal>>,
    pub context_menus: HandlerRegistry<Arc<dyn ContextMenuCommand>>,
    pub events: HandlerRegistry<Arc<dyn EventListener>>,
}

impl std::fmt::Debug for Registries {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registries").finish_non_exhaustive()
    }
}

impl Registries {
    /// The full platform-facing command set: every slash command (with its
    /// subcommand options merged in) plus every context menu command, in
    /// registration order. This is what `register_all` bulk-replaces the
    /// remote set with.
    pub fn remote_specs(&self) -> Vec<Value> {
        let mut specs = Vec::new();
        for (_, entry) in self.slash_commands.iter() {
            specs.push(command_to_value(entry.remote_spec()));
        }
        for (_, command) in self.context_menus.iter() {
            specs.push(command_to_value(command.register_spec()));
        }
        specs
    }
}

fn command_to_value(spec: CreateApplicationCommand) -> Value {
    Value::Object(spec.0.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
}

/// Populate every registry from the catalog.
///
/// The six category loads are independent and issued concurrently; the
/// barrier lets every sibling settle and collects all failures rather than
/// aborting mid-flight. The subcommand phase runs only once the
/// slash-command registry is fully populated, because it attaches children
/// to parents looked up by name. All registries are frozen before this
/// returns.
pub async fn load_all(catalog: Catalog) -> Result<Registries, LoadError> {
    info!("----------- Loading handlers -----------");

    let Catalog {
        slash_commands,
        subcommands,
        buttons,
        select_menus,
        modals,
        context_menus,
        events,
    } = catalog;

    let (
        (mut slash, slash_failures),
        (buttons, button_failures),
        (select_menus, select_failures),
        (modals, modal_failures),
        (context_menus, menu_failures),
        (events, event_failures),
    ) = tokio::join!(
        load_slash_commands(slash_commands),
        load_category(Category::Button, buttons, |b| b.custom_id()),
        load_category(Category::SelectMenu, select_menus, |m| m.custom_id()),
        load_category(Category::Modal, modals, |m| m.custom_id()),
        load_category(Category::ContextMenuCommand, context_menus, |c| c.name()),
        load_category(Category::Event, events, |e| e.event_name()),
    );

    let mut failures = slash_failures;
    failures.extend(button_failures);
    failures.extend(select_failures);
    failures.extend(modal_failures);
    failures.extend(menu_failures);
    failures.extend(event_failures);
    if !failures.is_empty() {
        return Err(LoadError::Categories(failures));
    }

    // Dependent phase: attach subcommands to their parents. Runs strictly
    // after the slash barrier so a parent missing here is a real orphan,
    // not a race.
    for sub in subcommands {
        let parent = sub.parent();
        let name = sub.name();
        match slash.get_mut(parent) {
            Some(entry) => {
                entry.attach(sub).map_err(|e| {
                    LoadError::Categories(vec![CategoryFailure {
                        category: Category::Subcommand,
                        detail: e.to_string(),
                    }])
                })?;
                debug!("Attached subcommand '{name}' to '{parent}'");
            }
            None => {
                return Err(LoadError::OrphanSubcommand {
                    parent: parent.to_string(),
                    subcommand: name.to_string(),
                });
            }
        }
    }

    let parent_names: Vec<String> = slash.names().map(str::to_string).collect();
    for name in &parent_names {
        if let Some(entry) = slash.get_mut(name) {
            entry.freeze_children();
        }
    }
    slash.freeze();

    let mut registries = Registries {
        slash_commands: slash,
        buttons,
        select_menus,
        modals,
        context_menus,
        events,
    };
    registries.buttons.freeze();
    registries.select_menus.freeze();
    registries.modals.freeze();
    registries.context_menus.freeze();
    registries.events.freeze();

    info!(
        "--------- Done loading handlers ({} slash, {} button, {} select menu, {} modal, {} context menu, {} event) --------",
        registries.slash_commands.len(),
        registries.buttons.len(),
        registries.select_menus.len(),
        registries.modals.len(),
        registries.context_menus.len(),
        registries.events.len(),
    );

    Ok(registries)
}

async fn load_slash_commands(
    defs: Vec<Arc<dyn SlashCommand>>,
) -> (HandlerRegistry<SlashEntry>, Vec<CategoryFailure>) {
    let mut registry = HandlerRegistry::new(Category::SlashCommand);
    let mut failures = Vec::new();
    for def in defs {
        let name = def.name();
        if let Err(e) = registry.register(name, SlashEntry::new(def)) {
            failures.push(CategoryFailure {
                category: Category::SlashCommand,
                detail: e.to_string(),
            });
        } else {
            debug!("Loaded slash command '{name}'");
        }
    }
    (registry, failures)
}

async fn load_category<V>(
    category: Category,
    defs: Vec<V>,
    name_of: fn(&V) -> &'static str,
) -> (HandlerRegistry<V>, Vec<CategoryFailure>) {
    let mut registry = HandlerRegistry::new(category);
    let mut failures = Vec::new();
    for def in defs {
        let name = name_of(&def);
        if let Err(e) = registry.register(name, def) {
            failures.push(CategoryFailure {
                category,
                detail: e.to_string(),
            });
        } else {
            debug!("Loaded {category} '{name}'");
        }
    }
    (registry, failures)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::BotContext;
    use anyhow::Result;
    use async_trait::async_trait;
    use serenity::builder::CreateApplicationCommandOption;
    use serenity::model::application::command::CommandOptionType;
    use serenity::model::application::interaction::application_command::{
        ApplicationCommandInteraction, CommandDataOption,
    };
    use serenity::model::application::interaction::message_component::MessageComponentInteraction;
    use serenity::prelude::Context;

    struct TestSlash(&'static str);

    #[async_trait]
    impl SlashCommand for TestSlash {
        fn name(&self) -> &'static str {
            self.0
        }

        fn register_spec(&self) -> CreateApplicationCommand {
            CreateApplicationCommand::default()
                .name(self.0)
                .description("test command")
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

    struct TestSub {
        name: &'static str,
        parent: &'static str,
    }

    #[async_trait]
    impl Subcommand for TestSub {
        fn name(&self) -> &'static str {
            self.name
        }

        fn parent(&self) -> &'static str {
            self.parent
        }

        fn register_spec(&self) -> CreateApplicationCommandOption {
            CreateApplicationCommandOption::default()
                .kind(CommandOptionType::SubCommand)
                .name(self.name)
                .description("test subcommand")
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

    struct TestButton(&'static str);

    #[async_trait]
    impl Button for TestButton {
        fn custom_id(&self) -> &'static str {
            self.0
        }

        async fn run(
            &self,
            _ctx: Arc<BotContext>,
            _serenity_ctx: &Context,
            _interaction: &MessageComponentInteraction,
        ) -> Result<()> {
            Ok(())
        }
    }

    fn catalog_with(
        slash: Vec<Arc<dyn SlashCommand>>,
        subs: Vec<Arc<dyn Subcommand>>,
        buttons: Vec<Arc<dyn Button>>,
    ) -> Catalog {
        Catalog {
            slash_commands: slash,
            subcommands: subs,
            buttons,
            ..Catalog::default()
        }
    }

    #[tokio::test]
    async fn test_load_resolves_every_declared_name() {
        let catalog = catalog_with(
            vec![Arc::new(TestSlash("ping"))],
            vec![],
            vec![Arc::new(TestButton("startVerification"))],
        );

        let registries = load_all(catalog).await.unwrap();

        assert!(registries.slash_commands.get("ping").is_ok());
        assert!(registries.buttons.get("startVerification").is_ok());

        let err = registries.slash_commands.get("pong").unwrap_err();
        assert_eq!(err.category, Category::SlashCommand);
        assert_eq!(err.known, vec!["ping".to_string()]);
    }

    #[tokio::test]
    async fn test_subcommand_reachable_through_parent() {
        let catalog = catalog_with(
            vec![Arc::new(TestSlash("config"))],
            vec![Arc::new(TestSub {
                name: "set",
                parent: "config",
            })],
            vec![],
        );

        let registries = load_all(catalog).await.unwrap();
        let entry = registries.slash_commands.get("config").unwrap();
        assert!(entry.subcommand("set").is_ok());
        assert!(entry.children().is_frozen());
    }

    #[tokio::test]
    async fn test_orphan_subcommand_fails_load() {
        let catalog = catalog_with(
            // parent omitted on purpose
            vec![Arc::new(TestSlash("ping"))],
            vec![Arc::new(TestSub {
                name: "set",
                parent: "config",
            })],
            vec![],
        );

        let err = load_all(catalog).await.unwrap_err();
        assert!(matches!(
            err,
            LoadError::OrphanSubcommand { ref parent, ref subcommand }
                if parent == "config" && subcommand == "set"
        ));
    }

    #[tokio::test]
    async fn test_duplicate_names_collected_not_overwritten() {
        let catalog = catalog_with(
            vec![Arc::new(TestSlash("ping")), Arc::new(TestSlash("ping"))],
            vec![],
            vec![
                Arc::new(TestButton("startVerification")),
                Arc::new(TestButton("startVerification")),
            ],
        );

        let err = load_all(catalog).await.unwrap_err();
        match err {
            LoadError::Categories(failures) => {
                // both categories report, siblings were not aborted mid-flight
                assert_eq!(failures.len(), 2);
                assert!(failures
                    .iter()
                    .any(|f| f.category == Category::SlashCommand));
                assert!(failures.iter().any(|f| f.category == Category::Button));
            }
            other => panic!("expected Categories, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_registries_frozen_after_load() {
        let catalog = catalog_with(vec![Arc::new(TestSlash("ping"))], vec![], vec![]);
        let registries = load_all(catalog).await.unwrap();
        assert!(registries.slash_commands.is_frozen());
        assert!(registries.buttons.is_frozen());
        assert!(registries.events.is_frozen());
    }

    #[tokio::test]
    async fn test_remote_specs_cover_slash_union() {
        let catalog = catalog_with(
            vec![Arc::new(TestSlash("ping")), Arc::new(TestSlash("config"))],
            vec![Arc::new(TestSub {
                name: "set",
                parent: "config",
            })],
            vec![],
        );

        let registries = load_all(catalog).await.unwrap();
        let specs = registries.remote_specs();
        assert_eq!(specs.len(), 2);

        let names: Vec<&str> = specs
            .iter()
            .filter_map(|s| s.get("name").and_then(|v| v.as_str()))
            .collect();
        assert_eq!(names, vec!["ping", "config"]);

        let config = &specs[1];
        let sub_names: Vec<&str> = config
            .get("options")
            .and_then(|v| v.as_array())
            .map(|opts| {
                opts.iter()
                    .filter_map(|o| o.get("name").and_then(|v| v.as_str()))
                    .collect()
            })
            .unwrap_or_default();
        assert_eq!(sub_names, vec!["set"]);
    }
}
