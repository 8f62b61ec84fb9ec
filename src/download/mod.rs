//! Transfer backends and the batch download engine.
//!
//! This module moves resolved media onto local storage.
//!
//! # Features
//!
//! - Interchangeable backends behind [`TransferBackend`]: in-process
//!   streaming, or an external `wget` / `curl` process
//! - One directory per title, `<root>/<title>/<title>.mp4`
//! - Skip-if-exists, overwrite and transfer-disabled policies
//! - Per-item failure isolation with an ordered [`BatchReport`]
//! - Bounded concurrency and cooperative cancellation
//!
//! # Example
//!
//! ```no_run
//! use einthusan_core::download::{StreamingBackend, TransferBackend};
//! use einthusan_core::{HttpSession, SessionConfig};
//! use std::path::Path;
//! use url::Url;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let session = HttpSession::new(SessionConfig::default())?;
//! let media = Url::parse("https://cdn.example/movie.mp4")?;
//! StreamingBackend::new()
//!     .download(&session, &media, Path::new("./movie.mp4"))
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod backend;
mod engine;
mod error;
mod external;
pub mod filename;
mod report;
mod streaming;

pub use backend::{BackendSelection, TransferBackend};
pub use engine::{DownloadEngine, DownloadTask};
pub use error::TransferError;
pub use external::{ExternalProcessBackend, ExternalTool};
pub use report::{BatchReport, ItemError, SkipReason, TransferOutcome, TransferResult};
pub use streaming::StreamingBackend;
