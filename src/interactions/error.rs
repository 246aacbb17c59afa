//! Error types for the registry, loader and command synchronizer
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.0.0: Initial taxonomy for registry/dispatch/sync failures

use thiserror::Error;

use super::registry::Category;

/// Load-time registry mutation failures.
///
/// Duplicate names are rejected loudly. The old behavior of silently
/// overwriting the previous handler made stale registrations undetectable,
/// so `DuplicateName` is a hard startup error.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("duplicate {category} handler name '{name}'")]
    DuplicateName { category: Category, name: String },

    /// Registration attempted after the load phase completed.
    #[error("{category} registry is frozen; cannot register '{name}'")]
    Frozen { category: Category, name: String },
}

/// A lookup against a registry found no handler for the given key.
///
/// Carries the known-name snapshot so an operator can spot a stale or
/// missing registration straight from the log line.
#[derive(Debug, Error)]
#[error("no {category} handler named '{name}' (known: {known:?})")]
pub struct LookupError {
    pub category: Category,
    pub name: String,
    pub known: Vec<String>,
}

/// One category load that could not complete.
#[derive(Debug)]
pub struct CategoryFailure {
    pub category: Category,
    pub detail: String,
}

impl std::fmt::Display for CategoryFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.category, self.detail)
    }
}

/// Startup load-phase failures. All of these abort startup before any
/// gateway authentication happens.
#[derive(Debug, Error)]
pub enum LoadError {
    /// One or more category loads failed. Sibling loads were allowed to
    /// settle first; every failure is listed.
    #[error("{} category load(s) failed: {}", .0.len(), format_failures(.0))]
    Categories(Vec<CategoryFailure>),

    /// A subcommand declared a parent that is not in the slash-command
    /// registry. Dropping it silently would leave a dead definition, so
    /// this is a hard error.
    #[error("subcommand '{subcommand}' declares unknown parent '{parent}'")]
    OrphanSubcommand { parent: String, subcommand: String },

    #[error("load phase did not complete within {seconds}s")]
    Timeout { seconds: u64 },
}

fn format_failures(failures: &[CategoryFailure]) -> String {
    failures
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Remote command synchronization failures.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The remote command was already gone. `clean_all` treats this as a
    /// successful delete.
    #[error("remote command {id} not found")]
    NotFound { id: u64 },

    /// Throttled by the platform. Retried with backoff, not fatal on its
    /// own.
    #[error("rate limited by the platform")]
    RateLimited,

    /// The platform rejected a command spec. Fatal to the sync step.
    #[error("command spec rejected: {0}")]
    Validation(String),

    /// Some deletes succeeded, some failed. Reported with the failures so
    /// just those can be retried.
    #[error("cleaned {deleted} command(s) but {} delete(s) failed: {failed:?}", .failed.len())]
    PartialClean {
        deleted: usize,
        failed: Vec<(String, String)>,
    },

    #[error("command sync did not complete within {seconds}s")]
    Timeout { seconds: u64 },

    /// Transport or other platform-side failure.
    #[error("platform error: {0}")]
    Platform(String),
}
