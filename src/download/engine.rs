//! Batch orchestrator: resolve each page, apply the overwrite and skip
//! policy, then hand the media link to the configured transfer backend.
//!
//! Items are isolated from one another. Any failure is recorded in that
//! item's [`TransferResult`] and the batch carries on; the returned
//! [`BatchReport`] holds one entry per input URL in input order.
//!
//! # Concurrency Model
//!
//! - A semaphore permit is acquired before each item is spawned, so with
//!   `jobs = 1` items run strictly one after another
//! - Each item builds its own [`HttpSession`] (fresh cookie jar)
//! - Results land in slots indexed by input position
//! - The backend is shared read-only through an `Arc`
//!
//! # Cancellation
//!
//! When the [`CancellationToken`] fires, in-flight resolution and transfers
//! are dropped (external processes are killed), partial files are removed,
//! and every unfinished item is reported as [`ItemError::Cancelled`].
//!
//! # Example
//!
//! ```no_run
//! use einthusan_core::download::{BackendSelection, DownloadEngine};
//! use einthusan_core::{RunConfig, SessionConfig};
//! use tokio_util::sync::CancellationToken;
//! use url::Url;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let backend = BackendSelection::Streaming.build()?;
//! let engine = DownloadEngine::new(RunConfig::default(), SessionConfig::default(), backend)?;
//! let pages = vec![Url::parse("https://einthusan.tv/movie/watch/9aEx/?lang=tamil")?];
//! let report = engine.run(&pages, &CancellationToken::new()).await;
//! println!("completed: {}, failed: {}", report.completed(), report.failed());
//! # Ok(())
//! # }
//! ```

mod task;

pub use task::DownloadTask;

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::backend::{TransferBackend, discard_partial};
use super::report::{BatchReport, ItemError, SkipReason, TransferOutcome, TransferResult};
use crate::config::{ConfigError, RunConfig};
use crate::resolver::{HttpSession, SessionConfig, resolve};

/// Runs batches of page URLs through resolution and transfer.
#[derive(Clone)]
pub struct DownloadEngine {
    config: Arc<RunConfig>,
    session_config: SessionConfig,
    backend: Arc<dyn TransferBackend>,
}

impl fmt::Debug for DownloadEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DownloadEngine")
            .field("config", &self.config)
            .field("session_config", &self.session_config)
            .field("backend", &self.backend.name())
            .finish()
    }
}

impl DownloadEngine {
    /// Creates an engine after validating the run configuration.
    ///
    /// A throwaway session is built so that a bad session configuration is
    /// reported here, before any item runs.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidJobs`] for an out-of-range worker count
    /// and [`ConfigError::HttpClient`] when no session can be built.
    #[instrument(level = "debug", skip(session_config, backend))]
    pub fn new(
        config: RunConfig,
        session_config: SessionConfig,
        backend: Arc<dyn TransferBackend>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        HttpSession::new(session_config.clone())?;

        debug!(
            jobs = config.jobs,
            backend = backend.name(),
            overwrite = config.overwrite,
            skip_transfer = config.skip_transfer,
            "creating download engine"
        );

        Ok(Self {
            config: Arc::new(config),
            session_config,
            backend,
        })
    }

    /// Returns the run configuration.
    #[must_use]
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Processes every page URL and reports one result per URL, in order.
    ///
    /// Never fails as a whole: per-item errors are recorded in the report.
    #[instrument(skip(self, page_urls, cancel), fields(items = page_urls.len(), jobs = self.config.jobs))]
    pub async fn run(&self, page_urls: &[Url], cancel: &CancellationToken) -> BatchReport {
        let semaphore = Arc::new(Semaphore::new(self.config.jobs));
        let mut handles = Vec::with_capacity(page_urls.len());

        info!("starting batch");

        for (index, page_url) in page_urls.iter().enumerate() {
            let permit = tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                permit = Arc::clone(&semaphore).acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
            };

            let item = ItemContext {
                config: Arc::clone(&self.config),
                session_config: self.session_config.clone(),
                backend: Arc::clone(&self.backend),
                cancel: cancel.clone(),
            };
            let page_url = page_url.clone();

            handles.push((
                index,
                tokio::spawn(async move {
                    let _permit = permit;
                    item.process(page_url).await
                }),
            ));
        }

        let mut slots: Vec<Option<TransferResult>> = page_urls.iter().map(|_| None).collect();
        for (index, handle) in handles {
            let result = match handle.await {
                Ok(result) => result,
                Err(e) => {
                    warn!(index, error = %e, "download task panicked");
                    TransferResult::failed(
                        page_urls[index].clone(),
                        ItemError::TaskFailed {
                            reason: e.to_string(),
                        },
                    )
                }
            };
            if let Some(slot) = slots.get_mut(index) {
                *slot = Some(result);
            }
        }

        let results = slots
            .into_iter()
            .zip(page_urls)
            .map(|(slot, page_url)| {
                slot.unwrap_or_else(|| TransferResult::failed(page_url.clone(), ItemError::Cancelled))
            })
            .collect();
        let report = BatchReport::new(results);

        info!(
            completed = report.completed(),
            skipped = report.skipped(),
            failed = report.failed(),
            total = report.len(),
            "batch complete"
        );
        report
    }
}

/// Owned state one spawned item needs.
struct ItemContext {
    config: Arc<RunConfig>,
    session_config: SessionConfig,
    backend: Arc<dyn TransferBackend>,
    cancel: CancellationToken,
}

impl ItemContext {
    #[instrument(skip(self), fields(page_url = %page_url))]
    async fn process(self, page_url: Url) -> TransferResult {
        let started = Instant::now();
        let mut task = None;

        let outcome = match self.attempt(&page_url, &mut task).await {
            Ok(outcome) => outcome,
            Err(error) => {
                warn!(page_url = %page_url, stage = error.stage(), error = %error, "item failed");
                TransferOutcome::Failed(error)
            }
        };

        TransferResult {
            page_url,
            task,
            outcome,
            elapsed: started.elapsed(),
        }
    }

    async fn attempt(
        &self,
        page_url: &Url,
        task_slot: &mut Option<DownloadTask>,
    ) -> Result<TransferOutcome, ItemError> {
        if self.cancel.is_cancelled() {
            return Err(ItemError::Cancelled);
        }

        let session = HttpSession::new(self.session_config.clone())
            .map_err(|source| ItemError::Session { source })?;

        let resolved = tokio::select! {
            biased;
            () = self.cancel.cancelled() => return Err(ItemError::Cancelled),
            resolved = resolve(&session, page_url) => resolved?,
        };

        let task = task_slot.insert(DownloadTask::new(page_url.clone(), resolved, &self.config)?);
        let file = task.destination_file.as_path();

        // create_dir_all treats an existing directory as success.
        tokio::fs::create_dir_all(&task.destination_dir)
            .await
            .map_err(|source| ItemError::Filesystem {
                path: task.destination_dir.clone(),
                source,
            })?;

        let exists = tokio::fs::try_exists(file)
            .await
            .map_err(|source| ItemError::Filesystem {
                path: file.to_path_buf(),
                source,
            })?;

        if exists && !task.overwrite {
            info!(path = %file.display(), "file already exists, skipping");
            return Ok(TransferOutcome::Skipped(SkipReason::AlreadyExists));
        }
        if task.skip_transfer {
            info!(
                title = %task.resolved.title,
                media_url = %task.resolved.media_url,
                path = %file.display(),
                "transfer disabled, skipping"
            );
            return Ok(TransferOutcome::Skipped(SkipReason::DebugSkip));
        }
        if exists {
            info!(path = %file.display(), "overwriting existing file");
        }

        info!(
            title = %task.resolved.title,
            backend = self.backend.name(),
            path = %file.display(),
            "starting transfer"
        );
        let started = Instant::now();
        let transfer = tokio::select! {
            biased;
            () = self.cancel.cancelled() => None,
            result = self.backend.download(&session, &task.resolved.media_url, file) => Some(result),
        };

        match transfer {
            Some(result) => {
                if let Err(e) = result {
                    discard_partial(file).await;
                    return Err(e.into());
                }
                info!(
                    path = %file.display(),
                    elapsed_secs = started.elapsed().as_secs_f64(),
                    "transfer complete"
                );
                Ok(TransferOutcome::Completed)
            }
            None => {
                discard_partial(file).await;
                Err(ItemError::Cancelled)
            }
        }
    }
}
