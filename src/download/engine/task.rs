//! Destination derivation for one resolved page.

use std::path::PathBuf;

use url::Url;

use super::super::filename::{destination_for, sanitize_title};
use super::super::report::ItemError;
use crate::config::RunConfig;
use crate::resolver::ResolvedMedia;

/// Everything needed to store one resolved page, derived from the resolved
/// media and run-wide policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTask {
    /// Landing page the media was resolved from.
    pub page_url: Url,
    /// Title and media link.
    pub resolved: ResolvedMedia,
    /// Per-title directory under the destination root.
    pub destination_dir: PathBuf,
    /// `<destination_dir>/<title>.mp4`.
    pub destination_file: PathBuf,
    /// Replace an existing file.
    pub overwrite: bool,
    /// Never invoke a transfer backend.
    pub skip_transfer: bool,
}

impl DownloadTask {
    /// Derives the task for `resolved` under `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ItemError::UnsafeTitle`] when the title sanitizes to nothing.
    pub fn new(page_url: Url, resolved: ResolvedMedia, config: &RunConfig) -> Result<Self, ItemError> {
        let safe_title = sanitize_title(&resolved.title).ok_or_else(|| ItemError::UnsafeTitle {
            title: resolved.title.clone(),
        })?;
        let (destination_dir, destination_file) =
            destination_for(&config.destination_root, &safe_title);

        Ok(Self {
            page_url,
            resolved,
            destination_dir,
            destination_file,
            overwrite: config.overwrite,
            skip_transfer: config.skip_transfer,
        })
    }
}
