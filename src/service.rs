//! Search service: owns the published index and answers queries against it.
//!
//! The service holds at most one published [`IndexStore`]. Building happens off to
//! the side and the finished store is swapped in under a short write lock, so
//! readers always see either the previous complete index or the new one. Queries
//! clone the `Arc` and search without holding any lock.

use crate::config::Config;
use crate::error::{Result, SearchError};
use crate::search::{IndexStats, IndexStore, QueryEngine, SearchToken, SymbolRecord};
use crate::snapshot::{self, Snapshot};
use crate::source::{self, SourceFile};
use anyhow::Context;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;

/// What a load produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadReport {
    pub tokens: usize,
    pub records: usize,
    pub source_files: usize,
    pub source_digest: u64,
    /// Whether the table came from the snapshot instead of the sources
    pub from_snapshot: bool,
    pub elapsed: Duration,
}

/// The currently published index.
#[derive(Debug, Clone)]
struct Published {
    store: Arc<IndexStore>,
    digest: u64,
}

/// Results for one query, with suggestions when nothing matched.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub records: Vec<SymbolRecord>,
    pub suggestions: Vec<String>,
}

/// Shared owner of the published index.
pub struct SearchService {
    config: Config,
    published: RwLock<Option<Published>>,
}

impl std::fmt::Debug for SearchService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchService")
            .field("sources", &self.config.sources)
            .field("match_mode", &self.config.match_mode)
            .field("loaded", &self.published.try_read().is_ok_and(|p| p.is_some()))
            .finish()
    }
}

impl SearchService {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            published: RwLock::new(None),
        }
    }

    /// Creates a service with an already built store published.
    pub fn with_store(config: Config, store: IndexStore) -> Self {
        Self {
            config,
            published: RwLock::new(Some(Published {
                store: Arc::new(store),
                digest: 0,
            })),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Reads the configured sources, builds an index, and publishes it.
    ///
    /// On failure nothing is published and the previous index, if any, stays live.
    pub async fn load(&self) -> Result<LoadReport> {
        let files = self.read_sources().await?;
        let (store, report) = self.build(files).await?;
        self.publish(store, report.source_digest).await;
        Ok(report)
    }

    /// Rebuilds only when the sources' digest differs from the published one.
    pub async fn reload_if_changed(&self) -> Result<Option<LoadReport>> {
        let files = self.read_sources().await?;
        let digest = source::source_digest(&files);

        let current = self.published.read().await.as_ref().map(|p| p.digest);
        if current == Some(digest) {
            tracing::trace!("Index sources unchanged ({:016x})", digest);
            return Ok(None);
        }

        tracing::info!("Index sources changed, rebuilding");
        let (store, report) = self.build(files).await?;
        self.publish(store, report.source_digest).await;
        Ok(Some(report))
    }

    /// Swaps in a new store.
    pub async fn publish(&self, store: IndexStore, digest: u64) {
        let store = Arc::new(store);
        tracing::info!(
            "Published symbol index: {} tokens, {} records",
            store.token_count(),
            store.record_count()
        );
        *self.published.write().await = Some(Published { store, digest });
    }

    /// Drops the published index; queries fail with `IndexUnavailable` afterwards.
    pub async fn unload(&self) {
        *self.published.write().await = None;
    }

    pub async fn is_loaded(&self) -> bool {
        self.published.read().await.is_some()
    }

    /// The published store.
    pub async fn store(&self) -> std::result::Result<Arc<IndexStore>, SearchError> {
        self.published
            .read()
            .await
            .as_ref()
            .map(|p| Arc::clone(&p.store))
            .ok_or(SearchError::IndexUnavailable)
    }

    /// Searches the published index with the configured match mode.
    pub async fn search(&self, fragment: &str) -> std::result::Result<SearchOutcome, SearchError> {
        let store = self.store().await?;
        let engine = QueryEngine::new(&store).with_mode(self.config.match_mode);

        let records: Vec<SymbolRecord> = engine.search(fragment).into_iter().cloned().collect();
        let suggestions = if records.is_empty() {
            engine
                .suggest(fragment, self.config.suggestion_limit)
                .into_iter()
                .map(|s| s.token.to_string())
                .collect()
        } else {
            vec![]
        };

        Ok(SearchOutcome {
            records,
            suggestions,
        })
    }

    /// Matching tokens with their records, in ascending token order.
    pub async fn search_grouped(
        &self,
        fragment: &str,
    ) -> std::result::Result<Vec<(SearchToken, Vec<SymbolRecord>)>, SearchError> {
        let store = self.store().await?;
        let engine = QueryEngine::new(&store).with_mode(self.config.match_mode);
        Ok(engine
            .search_grouped(fragment)
            .into_iter()
            .map(|group| (group.token.clone(), group.records.to_vec()))
            .collect())
    }

    /// Tokens similar to `fragment`, best first.
    pub async fn suggest(
        &self,
        fragment: &str,
        limit: usize,
    ) -> std::result::Result<Vec<String>, SearchError> {
        let store = self.store().await?;
        Ok(QueryEngine::new(&store)
            .suggest(fragment, limit)
            .into_iter()
            .map(|s| s.token.to_string())
            .collect())
    }

    /// Exact entry lookup on the published index.
    pub async fn lookup(&self, token: &str) -> std::result::Result<Vec<SymbolRecord>, SearchError> {
        Ok(self.store().await?.lookup(token).to_vec())
    }

    pub async fn stats(&self) -> std::result::Result<IndexStats, SearchError> {
        Ok(self.store().await?.stats())
    }

    async fn read_sources(&self) -> Result<Vec<SourceFile>> {
        let paths = self.config.sources.clone();
        let options = self.config.discovery_options();

        tokio::task::spawn_blocking(move || {
            let files = source::discover(&paths, &options)?;
            source::read_sources(&files, options.format)
        })
        .await
        .context("Source reading task panicked")?
        .context("Failed to read index sources")
    }

    async fn build(&self, files: Vec<SourceFile>) -> Result<(IndexStore, LoadReport)> {
        let start = Instant::now();
        let digest = source::source_digest(&files);
        let source_files = files.len();

        if let Some(path) = &self.config.snapshot
            && let Some(table) = snapshot::load(path, digest).await
        {
            // Snapshot tables are revalidated off the async runtime like fresh builds
            let rebuilt = tokio::task::spawn_blocking(move || IndexStore::build(table))
                .await
                .context("Snapshot index build task panicked")?;
            match rebuilt {
                Ok(store) => {
                    let report = LoadReport {
                        tokens: store.token_count(),
                        records: store.record_count(),
                        source_files,
                        source_digest: digest,
                        from_snapshot: true,
                        elapsed: start.elapsed(),
                    };
                    return Ok((store, report));
                }
                Err(e) => {
                    tracing::warn!("Snapshot at {} is malformed ({}), rebuilding", path.display(), e);
                    let _ = tokio::fs::remove_file(path).await;
                }
            }
        }

        // Parse and validate in spawn_blocking since it's CPU intensive
        let store = tokio::task::spawn_blocking(move || -> Result<IndexStore> {
            let table = source::assemble_table(&files)?;
            Ok(IndexStore::build(table)?)
        })
        .await
        .context("Index build task panicked")?
        .context("Failed to build symbol index")?;

        if let Some(path) = &self.config.snapshot {
            snapshot::store(path, Snapshot::new(digest, store.to_table())).await;
        }

        let report = LoadReport {
            tokens: store.token_count(),
            records: store.record_count(),
            source_files,
            source_digest: digest,
            from_snapshot: false,
            elapsed: start.elapsed(),
        };
        Ok((store, report))
    }
}

/// Spawns a task that polls for regenerated sources every `period`.
///
/// Failed rebuilds are logged and leave the published index in place. The task
/// ends when `cancel` fires.
pub fn spawn_reload_worker(
    service: Arc<SearchService>,
    period: Duration,
    cancel: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately; the index was just loaded.
        ticker.tick().await;

        loop {
            tokio::select! {
                () = cancel.cancelled() => {
                    tracing::debug!("Reload worker stopped");
                    return;
                }
                _ = ticker.tick() => {
                    match service.reload_if_changed().await {
                        Ok(Some(report)) => tracing::info!(
                            "Reloaded symbol index: {} tokens, {} records",
                            report.tokens,
                            report.records
                        ),
                        Ok(None) => {}
                        Err(e) => tracing::warn!("Symbol index reload failed: {:#}", e),
                    }
                }
            }
        }
    })
}
