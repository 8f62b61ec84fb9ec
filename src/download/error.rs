//! Error types for transfer backends.
//!
//! Variants carry the URL, path or program involved so a failure can be
//! diagnosed from one log line.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while moving media bytes to disk.
#[derive(Debug, Error)]
pub enum TransferError {
    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error downloading {url}: {source}")]
    Network {
        /// The URL that failed to download.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// The connection stalled longer than the read timeout.
    #[error("timeout downloading {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// HTTP error response (4xx client errors, 5xx server errors).
    #[error("HTTP {status} downloading {url}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// An external transfer program exited unsuccessfully.
    #[error("{program} exited with {}: {stderr}", exit_label(.code))]
    ProcessExitNonZero {
        /// Program that was run.
        program: String,
        /// Exit code, `None` when terminated by a signal.
        code: Option<i32>,
        /// Captured standard error, trimmed.
        stderr: String,
    },

    /// An external transfer program could not be started.
    #[error("failed to start {program}: {source}")]
    Spawn {
        /// Program that was run.
        program: String,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// File system error during download (create file, write, etc.)
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

fn exit_label(code: &Option<i32>) -> String {
    code.map_or_else(|| "signal".to_string(), |code| format!("exit code {code}"))
}

impl TransferError {
    /// Creates a network error from a reqwest error, promoting timeouts.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::Timeout { url: url.into() }
        } else {
            Self::Network {
                url: url.into(),
                source,
            }
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates a non-zero exit error.
    pub fn process_exit(program: impl Into<String>, code: Option<i32>, stderr: &str) -> Self {
        Self::ProcessExitNonZero {
            program: program.into(),
            code,
            stderr: stderr.trim().to_string(),
        }
    }

    /// Creates a spawn error.
    pub fn spawn(program: impl Into<String>, source: std::io::Error) -> Self {
        Self::Spawn {
            program: program.into(),
            source,
        }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transfer_error_http_status_display() {
        let error = TransferError::http_status("https://cdn.example/m.mp4", 404);
        let msg = error.to_string();
        assert!(msg.contains("404"), "Expected '404' in: {msg}");
        assert!(msg.contains("https://cdn.example/m.mp4"), "Expected URL in: {msg}");
    }

    #[test]
    fn test_transfer_error_process_exit_display() {
        let error = TransferError::process_exit("wget", Some(8), "  ERROR 404: Not Found.\n");
        let msg = error.to_string();
        assert_eq!(msg, "wget exited with exit code 8: ERROR 404: Not Found.");
    }

    #[test]
    fn test_transfer_error_process_killed_by_signal() {
        let error = TransferError::process_exit("curl", None, "");
        assert!(error.to_string().contains("signal"));
    }

    #[test]
    fn test_transfer_error_io_display() {
        let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let error = TransferError::io(PathBuf::from("/tmp/movie/movie.mp4"), io_error);
        let msg = error.to_string();
        assert!(msg.contains("/tmp/movie/movie.mp4"), "Expected path in: {msg}");
    }
}
