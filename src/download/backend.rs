//! Transfer backend abstraction and run-time backend selection.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};
use url::Url;

use super::error::TransferError;
use super::external::{ExternalProcessBackend, ExternalTool};
use super::streaming::StreamingBackend;
use crate::config::ConfigError;
use crate::resolver::HttpSession;

/// Moves the bytes behind a media URL into a destination file.
///
/// Implementations create or truncate `destination`; the parent directory
/// already exists when this is called. A backend never decides whether a
/// transfer should happen, only how.
#[async_trait]
pub trait TransferBackend: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Downloads `media_url` into `destination`.
    ///
    /// # Errors
    ///
    /// Returns a [`TransferError`] describing the network, process or
    /// filesystem failure.
    async fn download(
        &self,
        session: &HttpSession,
        media_url: &Url,
        destination: &Path,
    ) -> Result<(), TransferError>;
}

/// Which backend a run uses, as requested on the command line.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BackendSelection {
    /// Stream through the HTTP session.
    #[default]
    Streaming,
    /// Run `wget`, optionally from a custom path.
    Wget {
        /// Program name or path.
        program: String,
    },
    /// Run `curl`, optionally from a custom path.
    Curl {
        /// Program name or path.
        program: String,
    },
}

impl BackendSelection {
    /// Builds a selection from the mutually exclusive `--wget` / `--curl`
    /// flags. An empty program string means the tool's default name.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ConflictingBackends`] when both are given.
    pub fn from_flags(wget: Option<String>, curl: Option<String>) -> Result<Self, ConfigError> {
        match (wget, curl) {
            (Some(_), Some(_)) => Err(ConfigError::ConflictingBackends {
                first: "wget",
                second: "curl",
            }),
            (Some(program), None) => Ok(Self::Wget {
                program: or_default(program, ExternalTool::Wget),
            }),
            (None, Some(program)) => Ok(Self::Curl {
                program: or_default(program, ExternalTool::Curl),
            }),
            (None, None) => Ok(Self::Streaming),
        }
    }

    /// Instantiates the selected backend.
    ///
    /// External programs are located up front so a missing executable
    /// aborts the run before any page is fetched.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ExecutableNotFound`] when the program cannot
    /// be located.
    pub fn build(&self) -> Result<Arc<dyn TransferBackend>, ConfigError> {
        match self {
            Self::Streaming => Ok(Arc::new(StreamingBackend::new())),
            Self::Wget { program } => external(ExternalTool::Wget, program),
            Self::Curl { program } => external(ExternalTool::Curl, program),
        }
    }
}

fn or_default(program: String, tool: ExternalTool) -> String {
    if program.trim().is_empty() {
        tool.default_program().to_string()
    } else {
        program
    }
}

fn external(tool: ExternalTool, program: &str) -> Result<Arc<dyn TransferBackend>, ConfigError> {
    let path = locate(program)?;
    debug!(tool = tool.default_program(), path = %path.display(), "using external transfer program");
    Ok(Arc::new(ExternalProcessBackend::new(tool, path)))
}

fn locate(program: &str) -> Result<PathBuf, ConfigError> {
    which::which(program).map_err(|e| ConfigError::ExecutableNotFound {
        program: program.to_string(),
        reason: e.to_string(),
    })
}

/// Removes a partially written destination file; a missing file is fine.
pub(crate) async fn discard_partial(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => debug!(path = %path.display(), "removed partial file"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "failed to remove partial file"),
    }
}
