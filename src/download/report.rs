//! Per-item outcomes and the batch report.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use super::engine::DownloadTask;
use super::error::TransferError;
use crate::config::ConfigError;
use crate::resolver::ResolutionError;

/// Why an item finished without a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Destination file exists and overwriting is off.
    AlreadyExists,
    /// Transfers are disabled for this run.
    DebugSkip,
}

impl SkipReason {
    /// Stable label for logs and summaries.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AlreadyExists => "already exists",
            Self::DebugSkip => "transfer disabled",
        }
    }
}

/// Errors confined to a single batch item.
#[derive(Debug, Error)]
pub enum ItemError {
    /// The page could not be resolved.
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    /// The backend failed to store the media.
    #[error(transparent)]
    Transfer(#[from] TransferError),

    /// The destination directory could not be prepared.
    #[error("cannot prepare {path}: {source}")]
    Filesystem {
        /// Path being created or inspected.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The title has no characters usable in a file name.
    #[error("title {title:?} cannot be used as a file name")]
    UnsafeTitle {
        /// Title as resolved.
        title: String,
    },

    /// The item's HTTP session could not be built.
    #[error("cannot build HTTP session: {source}")]
    Session {
        /// Underlying configuration error.
        #[source]
        source: ConfigError,
    },

    /// The worker task ended abnormally.
    #[error("worker task failed: {reason}")]
    TaskFailed {
        /// Join error description.
        reason: String,
    },

    /// The batch was cancelled before this item finished.
    #[error("cancelled")]
    Cancelled,
}

impl ItemError {
    /// Coarse label for the stage that failed.
    #[must_use]
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Resolution(e) => e.stage().as_str(),
            Self::Transfer(_) => "transfer",
            Self::Filesystem { .. } => "filesystem",
            Self::UnsafeTitle { .. } => "unsafe_title",
            Self::Session { .. } => "session",
            Self::TaskFailed { .. } => "task_failed",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Final state of one batch item.
#[derive(Debug)]
pub enum TransferOutcome {
    /// Media stored at the task's destination.
    Completed,
    /// Finished without transferring.
    Skipped(SkipReason),
    /// Failed at the given stage.
    Failed(ItemError),
}

/// One item's result, in input order within a [`BatchReport`].
#[derive(Debug)]
pub struct TransferResult {
    /// Landing page as given.
    pub page_url: Url,
    /// Resolved task, absent when resolution never finished.
    pub task: Option<DownloadTask>,
    /// What happened.
    pub outcome: TransferOutcome,
    /// Wall time spent on the item.
    pub elapsed: Duration,
}

impl TransferResult {
    pub(crate) fn failed(page_url: Url, error: ItemError) -> Self {
        Self {
            page_url,
            task: None,
            outcome: TransferOutcome::Failed(error),
            elapsed: Duration::ZERO,
        }
    }

    /// Returns the error when the item failed.
    #[must_use]
    pub fn error(&self) -> Option<&ItemError> {
        match &self.outcome {
            TransferOutcome::Failed(e) => Some(e),
            _ => None,
        }
    }
}

/// Results of one batch, one entry per input URL, in input order.
#[derive(Debug, Default)]
pub struct BatchReport {
    results: Vec<TransferResult>,
}

impl BatchReport {
    pub(crate) fn new(results: Vec<TransferResult>) -> Self {
        Self { results }
    }

    /// Number of items whose media was stored.
    #[must_use]
    pub fn completed(&self) -> usize {
        self.count(|o| matches!(o, TransferOutcome::Completed))
    }

    /// Number of items skipped for any reason.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, TransferOutcome::Skipped(_)))
    }

    /// Number of failed items.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, TransferOutcome::Failed(_)))
    }

    /// True when no item failed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// True for an empty batch.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Iterates results in input order.
    pub fn iter(&self) -> impl Iterator<Item = &TransferResult> {
        self.results.iter()
    }

    /// Iterates failed items only.
    pub fn failures(&self) -> impl Iterator<Item = (&Url, &ItemError)> {
        self.results
            .iter()
            .filter_map(|r| r.error().map(|e| (&r.page_url, e)))
    }

    fn count(&self, predicate: impl Fn(&TransferOutcome) -> bool) -> usize {
        self.results.iter().filter(|r| predicate(&r.outcome)).count()
    }
}
