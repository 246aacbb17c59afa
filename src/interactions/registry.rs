//! Name-keyed handler registry
//!
//! - **Version**: 2.0.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 2.0.0: Reject duplicate names instead of overwriting; freeze after load
//! - 1.0.0: Initial implementation for handler dispatch

use std::collections::HashMap;
use std::fmt;

use super::error::{LookupError, RegistryError};

/// Handler category. Every registry, and every registry error, names one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    SlashCommand,
    Subcommand,
    Button,
    SelectMenu,
    Modal,
    ContextMenuCommand,
    Event,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::SlashCommand => "slash command",
            Category::Subcommand => "subcommand",
            Category::Button => "button",
            Category::SelectMenu => "select menu",
            Category::Modal => "modal",
            Category::ContextMenuCommand => "context menu command",
            Category::Event => "event",
        };
        f.write_str(name)
    }
}

/// Registry mapping handler names to handler instances for one category.
///
/// Populated once during the load phase, then frozen. Lookups after the
/// load phase are read-only, so a frozen registry can be shared across
/// concurrently dispatched events without locking. Iteration order is
/// insertion order, which keeps registration payloads and diagnostics
/// stable across runs.
///
/// # Example
///
/// ```ignore
/// let mut registry = HandlerRegistry::new(Category::Button);
/// registry.register("startVerification", button)?;
/// registry.freeze();
///
/// let handler = registry.get("startVerification")?;
/// ```
pub struct HandlerRegistry<T> {
    category: Category,
    entries: HashMap<String, T>,
    order: Vec<String>,
    frozen: bool,
}

impl<T> HandlerRegistry<T> {
    /// Create a new empty registry for the given category
    pub fn new(category: Category) -> Self {
        Self {
            category,
            entries: HashMap::new(),
            order: Vec::new(),
            frozen: false,
        }
    }

    /// The category this registry holds handlers for
    pub fn category(&self) -> Category {
        self.category
    }

    /// Register a handler under a unique name
    ///
    /// Fails with `RegistryError::DuplicateName` if the name is taken (the
    /// first registration stays in place) and `RegistryError::Frozen` once
    /// the load phase has completed.
    pub fn register(&mut self, name: impl Into<String>, handler: T) -> Result<(), RegistryError> {
        let name = name.into();
        if self.frozen {
            return Err(RegistryError::Frozen {
                category: self.category,
                name,
            });
        }
        if self.entries.contains_key(&name) {
            return Err(RegistryError::DuplicateName {
                category: self.category,
                name,
            });
        }
        self.order.push(name.clone());
        self.entries.insert(name, handler);
        Ok(())
    }

    /// Look up a handler by name
    ///
    /// Never hands back a placeholder; a miss is a `LookupError` carrying
    /// the known-name snapshot for diagnostics.
    pub fn get(&self, name: &str) -> Result<&T, LookupError> {
        self.entries.get(name).ok_or_else(|| LookupError {
            category: self.category,
            name: name.to_string(),
            known: self.order.clone(),
        })
    }

    /// Mutable lookup, only valid during the load phase (the subcommand
    /// attachment pass). Not exposed outside the crate.
    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut T> {
        debug_assert!(!self.frozen);
        self.entries.get_mut(name)
    }

    /// Whether a handler is registered under the given name
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered names in insertion order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Handlers in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.order
            .iter()
            .filter_map(|name| self.entries.get(name).map(|h| (name.as_str(), h)))
    }

    /// Number of registered handlers
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if registry is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// End the load phase. One-way: there is no unfreeze.
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_new_is_empty() {
        let registry: HandlerRegistry<u32> = HandlerRegistry::new(Category::Button);
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
        assert!(!registry.is_frozen());
    }

    #[test]
    fn test_register_and_get() {
        let mut registry = HandlerRegistry::new(Category::SlashCommand);
        registry.register("ping", 1u32).unwrap();

        assert_eq!(registry.len(), 1);
        assert!(registry.contains("ping"));
        assert_eq!(*registry.get("ping").unwrap(), 1);
    }

    #[test]
    fn test_get_missing_reports_category_and_known_names() {
        let mut registry = HandlerRegistry::new(Category::SlashCommand);
        registry.register("ping", 1u32).unwrap();

        let err = registry.get("pong").unwrap_err();
        assert_eq!(err.category, Category::SlashCommand);
        assert_eq!(err.name, "pong");
        assert_eq!(err.known, vec!["ping".to_string()]);
    }

    #[test]
    fn test_duplicate_name_is_rejected_and_first_wins() {
        let mut registry = HandlerRegistry::new(Category::Button);
        registry.register("startVerification", 1u32).unwrap();

        let err = registry.register("startVerification", 2u32).unwrap_err();
        assert!(matches!(
            err,
            RegistryError::DuplicateName { category: Category::Button, ref name }
                if name == "startVerification"
        ));

        // first registration must survive
        assert_eq!(*registry.get("startVerification").unwrap(), 1);
    }

    #[test]
    fn test_register_after_freeze_fails() {
        let mut registry = HandlerRegistry::new(Category::Modal);
        registry.register("a", 1u32).unwrap();
        registry.freeze();

        let err = registry.register("b", 2u32).unwrap_err();
        assert!(matches!(err, RegistryError::Frozen { .. }));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_names_keep_insertion_order() {
        let mut registry = HandlerRegistry::new(Category::Event);
        registry.register("ready", 0u32).unwrap();
        registry.register("guild_create", 1u32).unwrap();
        registry.register("message", 2u32).unwrap();

        let names: Vec<&str> = registry.names().collect();
        assert_eq!(names, vec!["ready", "guild_create", "message"]);
    }
}
