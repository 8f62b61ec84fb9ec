//! External-process backends that delegate the transfer to `wget` or `curl`.
//!
//! The executable location is configuration; the tool flavour only decides
//! which flags name the output file and user agent. Child processes are
//! killed when the transfer future is dropped, so cancelling a batch aborts
//! an in-flight download.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, instrument};
use url::Url;

use super::backend::TransferBackend;
use super::error::TransferError;
use crate::resolver::HttpSession;

/// Longest stderr tail kept in a failure message.
const STDERR_TAIL_CHARS: usize = 2000;

/// Supported download utilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExternalTool {
    /// GNU Wget.
    Wget,
    /// curl.
    Curl,
}

impl ExternalTool {
    /// Default executable name looked up on `PATH`.
    #[must_use]
    pub fn default_program(self) -> &'static str {
        match self {
            Self::Wget => "wget",
            Self::Curl => "curl",
        }
    }

    /// Command-line arguments for one transfer.
    #[must_use]
    pub fn args(self, media_url: &Url, destination: &Path, user_agent: &str) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![media_url.as_str().into()];
        match self {
            Self::Wget => {
                args.push("--output-document".into());
                args.push(destination.as_os_str().to_owned());
                args.push("--user-agent".into());
                args.push(user_agent.into());
                args.push("--no-verbose".into());
            }
            Self::Curl => {
                args.push("--output".into());
                args.push(destination.as_os_str().to_owned());
                args.push("--user-agent".into());
                args.push(user_agent.into());
                args.push("--location".into());
                args.push("--fail".into());
                args.push("--silent".into());
                args.push("--show-error".into());
            }
        }
        args
    }
}

/// Runs a download utility as a child process.
#[derive(Debug, Clone)]
pub struct ExternalProcessBackend {
    tool: ExternalTool,
    program: PathBuf,
}

impl ExternalProcessBackend {
    /// Creates a backend running `program` with `tool`'s flag set.
    #[must_use]
    pub fn new(tool: ExternalTool, program: impl Into<PathBuf>) -> Self {
        Self {
            tool,
            program: program.into(),
        }
    }
}

#[async_trait]
impl TransferBackend for ExternalProcessBackend {
    fn name(&self) -> &'static str {
        self.tool.default_program()
    }

    #[instrument(skip(self, session), fields(backend = self.name(), url = %media_url))]
    async fn download(
        &self,
        session: &HttpSession,
        media_url: &Url,
        destination: &Path,
    ) -> Result<(), TransferError> {
        let program = self.program.display().to_string();
        let args = self
            .tool
            .args(media_url, destination, &session.config().user_agent);
        debug!(program = %program, ?args, "spawning transfer process");

        let output = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| TransferError::spawn(program.clone(), e))?;

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        Err(TransferError::process_exit(
            program,
            output.status.code(),
            stderr_tail(&stderr),
        ))
    }
}

fn stderr_tail(stderr: &str) -> &str {
    let trimmed = stderr.trim_end();
    let count = trimmed.chars().count();
    if count <= STDERR_TAIL_CHARS {
        return trimmed;
    }
    let skip = count - STDERR_TAIL_CHARS;
    trimmed
        .char_indices()
        .nth(skip)
        .map_or(trimmed, |(index, _)| &trimmed[index..])
}
