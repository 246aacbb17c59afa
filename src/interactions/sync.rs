//! Remote application-command synchronization
//!
//! - **Version**: 1.2.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.2.0: Retry rate-limited calls with jittered exponential backoff
//! - 1.1.0: Backend trait so sync is testable against an in-memory fake
//! - 1.0.0: Initial clean + bulk-replace registration

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::{info, warn};
use rand::Rng;
use serde_json::Value;
use serenity::http::{Http, HttpError};
use serenity::model::id::GuildId;

use super::error::SyncError;
use super::loader::Registries;

/// One entry of the platform's authoritative command list. Always a fresh
/// snapshot; never cached or diffed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteCommand {
    pub id: u64,
    pub name: String,
}

/// Where a command set lives: registered globally or for one guild.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandScope {
    Global,
    Guild(GuildId),
}

impl std::fmt::Display for CommandScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandScope::Global => f.write_str("globally"),
            CommandScope::Guild(id) => write!(f, "for guild {id}"),
        }
    }
}

/// The platform's application-command endpoints, narrowed to what the
/// synchronizer needs. Production uses [`HttpBackend`]; tests use an
/// in-memory fake.
#[async_trait]
pub trait CommandsBackend: Send + Sync {
    /// Fetch the complete remote command list for a scope
    async fn fetch(&self, scope: CommandScope) -> Result<Vec<RemoteCommand>, SyncError>;

    /// Delete one remote command. A command that is already gone surfaces
    /// as `SyncError::NotFound`.
    async fn delete(&self, id: u64, scope: CommandScope) -> Result<(), SyncError>;

    /// Bulk-overwrite the remote command set with the given specs. Not a
    /// diff: afterwards the remote set is exactly `specs`.
    async fn bulk_put(&self, specs: &[Value], scope: CommandScope) -> Result<(), SyncError>;
}

/// Backend talking to Discord through serenity's HTTP client
pub struct HttpBackend {
    http: Arc<Http>,
}

impl HttpBackend {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl CommandsBackend for HttpBackend {
    async fn fetch(&self, scope: CommandScope) -> Result<Vec<RemoteCommand>, SyncError> {
        let commands = match scope {
            CommandScope::Global => self.http.get_global_application_commands().await,
            CommandScope::Guild(guild_id) => {
                self.http.get_guild_application_commands(guild_id.0).await
            }
        }
        .map_err(platform_error)?;

        Ok(commands
            .into_iter()
            .map(|c| RemoteCommand {
                id: c.id.0,
                name: c.name,
            })
            .collect())
    }

    async fn delete(&self, id: u64, scope: CommandScope) -> Result<(), SyncError> {
        match scope {
            CommandScope::Global => self.http.delete_global_application_command(id).await,
            CommandScope::Guild(guild_id) => {
                self.http
                    .delete_guild_application_command(guild_id.0, id)
                    .await
            }
        }
        .map_err(|e| match status_of(&e) {
            Some(404) => SyncError::NotFound { id },
            _ => platform_error(e),
        })
    }

    async fn bulk_put(&self, specs: &[Value], scope: CommandScope) -> Result<(), SyncError> {
        let body = Value::Array(specs.to_vec());
        match scope {
            CommandScope::Global => self
                .http
                .create_global_application_commands(&body)
                .await
                .map(|_| ()),
            CommandScope::Guild(guild_id) => self
                .http
                .create_guild_application_commands(guild_id.0, &body)
                .await
                .map(|_| ()),
        }
        .map_err(platform_error)
    }
}

fn status_of(err: &serenity::Error) -> Option<u16> {
    if let serenity::Error::Http(http) = err {
        if let HttpError::UnsuccessfulRequest(resp) = http.as_ref() {
            return Some(resp.status_code.as_u16());
        }
    }
    None
}

fn platform_error(err: serenity::Error) -> SyncError {
    match status_of(&err) {
        Some(429) => SyncError::RateLimited,
        Some(400) => SyncError::Validation(err.to_string()),
        _ => SyncError::Platform(err.to_string()),
    }
}

/// Reconciles the remote command list with the locally declared set.
///
/// Both operations are idempotent. When a startup requests both, `clean_all`
/// runs to completion before `register_all` starts, so the remote state an
/// operator observes goes empty -> fully replaced, never a mix of stale and
/// fresh commands.
pub struct CommandSynchronizer {
    backend: Arc<dyn CommandsBackend>,
    max_attempts: u32,
    base_delay: Duration,
}

impl CommandSynchronizer {
    pub fn new(backend: Arc<dyn CommandsBackend>) -> Self {
        Self {
            backend,
            max_attempts: 4,
            base_delay: Duration::from_millis(500),
        }
    }

    /// Override the rate-limit retry policy (mostly for tests)
    pub fn with_retry_policy(mut self, max_attempts: u32, base_delay: Duration) -> Self {
        self.max_attempts = max_attempts.max(1);
        self.base_delay = base_delay;
        self
    }

    /// Delete every remotely registered command in scope.
    ///
    /// An already-empty remote set is a no-op success. A command deleted
    /// out from under us counts as deleted. Any other per-item failure is
    /// collected into `SyncError::PartialClean` with the successes counted,
    /// so just the failures can be retried.
    pub async fn clean_all(&self, scope: CommandScope) -> Result<usize, SyncError> {
        let remote = self.with_retry(|| self.backend.fetch(scope)).await?;
        if remote.is_empty() {
            info!("No application commands registered {scope}; nothing to clean");
            return Ok(0);
        }

        info!("Cleaning {} application command(s) {scope}", remote.len());
        let mut deleted = 0;
        let mut failed = Vec::new();
        for command in remote {
            match self
                .with_retry(|| self.backend.delete(command.id, scope))
                .await
            {
                Ok(()) => deleted += 1,
                Err(SyncError::NotFound { .. }) => deleted += 1,
                Err(e) => failed.push((command.name, e.to_string())),
            }
        }

        if failed.is_empty() {
            info!("Cleaned {deleted} application command(s) {scope}");
            Ok(deleted)
        } else {
            Err(SyncError::PartialClean { deleted, failed })
        }
    }

    /// Bulk-replace the remote command set with the declared one: every
    /// slash command (subcommands merged into the parent spec) plus every
    /// context menu command. Anything registered remotely but not declared
    /// locally stops being routable after this call, by design.
    pub async fn register_all(
        &self,
        registries: &Registries,
        scope: CommandScope,
    ) -> Result<usize, SyncError> {
        let specs = registries.remote_specs();
        let count = specs.len();
        self.with_retry(|| self.backend.bulk_put(&specs, scope))
            .await?;
        info!("Registered {count} application command(s) {scope}");
        Ok(count)
    }

    /// Run one backend call, retrying rate-limited attempts with jittered
    /// exponential backoff. Every other error returns immediately.
    async fn with_retry<T, F, Fut>(&self, mut op: F) -> Result<T, SyncError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, SyncError>>,
    {
        let mut delay = self.base_delay;
        let mut attempt = 1;
        loop {
            match op().await {
                Err(SyncError::RateLimited) if attempt < self.max_attempts => {
                    let jitter = Duration::from_millis(rand::rng().random_range(0..=250));
                    warn!(
                        "Rate limited (attempt {attempt}/{}), retrying in {:?}",
                        self.max_attempts,
                        delay + jitter
                    );
                    tokio::time::sleep(delay + jitter).await;
                    delay *= 2;
                    attempt += 1;
                }
                other => return other,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::BotContext;
    use crate::interactions::loader::{load_all, Catalog};
    use anyhow::Result;
    use serenity::builder::CreateApplicationCommand;
    use serenity::model::application::interaction::application_command::ApplicationCommandInteraction;
    use serenity::prelude::Context;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
    use std::sync::Mutex;

    /// In-memory stand-in for the platform's command endpoints
    #[derive(Default)]
    struct FakeBackend {
        commands: Mutex<Vec<RemoteCommand>>,
        next_id: AtomicU64,
        failing_deletes: Mutex<HashSet<u64>>,
        rate_limited_puts: AtomicU32,
    }

    impl FakeBackend {
        fn seed(&self, names: &[&str]) {
            let mut commands = self.commands.lock().unwrap();
            for name in names {
                let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
                commands.push(RemoteCommand {
                    id,
                    name: name.to_string(),
                });
            }
        }

        fn names(&self) -> HashSet<String> {
            self.commands
                .lock()
                .unwrap()
                .iter()
                .map(|c| c.name.clone())
                .collect()
        }

        fn fail_delete_of(&self, name: &str) {
            let commands = self.commands.lock().unwrap();
            let id = commands.iter().find(|c| c.name == name).unwrap().id;
            self.failing_deletes.lock().unwrap().insert(id);
        }
    }

    #[async_trait]
    impl CommandsBackend for FakeBackend {
        async fn fetch(&self, _scope: CommandScope) -> Result<Vec<RemoteCommand>, SyncError> {
            Ok(self.commands.lock().unwrap().clone())
        }

        async fn delete(&self, id: u64, _scope: CommandScope) -> Result<(), SyncError> {
            if self.failing_deletes.lock().unwrap().contains(&id) {
                return Err(SyncError::Platform("boom".to_string()));
            }
            let mut commands = self.commands.lock().unwrap();
            let before = commands.len();
            commands.retain(|c| c.id != id);
            if commands.len() == before {
                return Err(SyncError::NotFound { id });
            }
            Ok(())
        }

        async fn bulk_put(&self, specs: &[Value], _scope: CommandScope) -> Result<(), SyncError> {
            if self.rate_limited_puts.load(Ordering::SeqCst) > 0 {
                self.rate_limited_puts.fetch_sub(1, Ordering::SeqCst);
                return Err(SyncError::RateLimited);
            }
            let mut commands = self.commands.lock().unwrap();
            commands.clear();
            for spec in specs {
                let name = spec
                    .get("name")
                    .and_then(|v| v.as_str())
                    .ok_or_else(|| SyncError::Validation("spec missing name".to_string()))?;
                let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
                commands.push(RemoteCommand {
                    id,
                    name: name.to_string(),
                });
            }
            Ok(())
        }
    }

    struct DeclaredCommand(&'static str);

    #[async_trait]
    impl crate::interactions::handler::SlashCommand for DeclaredCommand {
        fn name(&self) -> &'static str {
            self.0
        }

        fn register_spec(&self) -> CreateApplicationCommand {
            CreateApplicationCommand::default()
                .name(self.0)
                .description("declared command")
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

    async fn declared_registries(names: &[&'static str]) -> Registries {
        let catalog = Catalog {
            slash_commands: names
                .iter()
                .map(|n| Arc::new(DeclaredCommand(n)) as Arc<dyn crate::interactions::handler::SlashCommand>)
                .collect(),
            ..Catalog::default()
        };
        load_all(catalog).await.unwrap()
    }

    fn synchronizer(backend: Arc<FakeBackend>) -> CommandSynchronizer {
        CommandSynchronizer::new(backend).with_retry_policy(3, Duration::from_millis(1))
    }

    #[tokio::test]
    async fn test_clean_then_register_leaves_exactly_declared_set() {
        let backend = Arc::new(FakeBackend::default());
        backend.seed(&["stale_one", "stale_two"]);
        let sync = synchronizer(backend.clone());
        let registries = declared_registries(&["ping", "config"]).await;

        let deleted = sync.clean_all(CommandScope::Global).await.unwrap();
        assert_eq!(deleted, 2);

        let registered = sync
            .register_all(&registries, CommandScope::Global)
            .await
            .unwrap();
        assert_eq!(registered, 2);

        let expected: HashSet<String> =
            ["ping", "config"].iter().map(|s| s.to_string()).collect();
        assert_eq!(backend.names(), expected);
    }

    #[tokio::test]
    async fn test_clean_on_empty_remote_set_is_noop() {
        let backend = Arc::new(FakeBackend::default());
        let sync = synchronizer(backend.clone());

        let deleted = sync.clean_all(CommandScope::Global).await.unwrap();
        assert_eq!(deleted, 0);

        // idempotent: a second clean is still a no-op success
        let deleted = sync.clean_all(CommandScope::Global).await.unwrap();
        assert_eq!(deleted, 0);
    }

    #[tokio::test]
    async fn test_partial_clean_reports_failures_and_successes() {
        let backend = Arc::new(FakeBackend::default());
        backend.seed(&["good", "bad", "also_good"]);
        backend.fail_delete_of("bad");
        let sync = synchronizer(backend.clone());

        let err = sync.clean_all(CommandScope::Global).await.unwrap_err();
        match err {
            SyncError::PartialClean { deleted, failed } => {
                assert_eq!(deleted, 2);
                assert_eq!(failed.len(), 1);
                assert_eq!(failed[0].0, "bad");
            }
            other => panic!("expected PartialClean, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_rate_limited_bulk_put_is_retried() {
        let backend = Arc::new(FakeBackend::default());
        backend.rate_limited_puts.store(2, Ordering::SeqCst);
        let sync = synchronizer(backend.clone());
        let registries = declared_registries(&["ping"]).await;

        let registered = sync
            .register_all(&registries, CommandScope::Global)
            .await
            .unwrap();
        assert_eq!(registered, 1);
        assert_eq!(backend.names().len(), 1);
    }

    #[tokio::test]
    async fn test_rate_limit_exhaustion_surfaces() {
        let backend = Arc::new(FakeBackend::default());
        backend.rate_limited_puts.store(10, Ordering::SeqCst);
        let sync = synchronizer(backend.clone());
        let registries = declared_registries(&["ping"]).await;

        let err = sync
            .register_all(&registries, CommandScope::Global)
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::RateLimited));
    }

    #[tokio::test]
    async fn test_register_on_guild_scope_passes_through() {
        let backend = Arc::new(FakeBackend::default());
        let sync = synchronizer(backend.clone());
        let registries = declared_registries(&["ping"]).await;

        let scope = CommandScope::Guild(GuildId(42));
        sync.register_all(&registries, scope).await.unwrap();
        assert!(backend.names().contains("ping"));
    }
}
