//! # Interaction System
//!
//! Handler registries, load-phase orchestration and remote command
//! synchronization. Everything the dispatcher needs to turn an inbound
//! gateway interaction into exactly one handler invocation.
//!
//! - **Version**: 1.2.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.2.0: Jittered backoff for rate-limited sync calls
//! - 1.1.0: Duplicate handler names fail the load instead of overwriting
//! - 1.0.0: Initial registry/loader/sync subsystem

pub mod error;
pub mod handler;
pub mod loader;
pub mod registry;
pub mod sync;

pub use error::{CategoryFailure, LoadError, LookupError, RegistryError, SyncError};
pub use handler::{
    Button, ContextMenuCommand, EventListener, GatewayEvent, Modal, SelectMenu, SlashCommand,
    SlashEntry, Subcommand,
};
pub use loader::{load_all, Catalog, Registries};
pub use registry::{Category, HandlerRegistry};
pub use sync::{CommandScope, CommandSynchronizer, CommandsBackend, HttpBackend, RemoteCommand};
