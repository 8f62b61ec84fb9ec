//! CLI entry point for the einthusan downloader.

use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use einthusan_core::{
    BackendSelection, BatchReport, DownloadEngine, RunConfig, SessionConfig, TransferOutcome,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

mod app_config;
mod cli;

use app_config::{FileConfig, load_default_file_config};
use cli::Args;

/// Process outcome mapped to an exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProcessExit {
    /// Every item completed or was skipped.
    Success,
    /// Some items failed, others completed.
    Partial,
    /// Nothing completed and at least one item failed, or the run could not start.
    Failure,
}

impl ProcessExit {
    fn code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::Partial => 1,
            Self::Failure => 2,
        }
    }
}

impl From<ProcessExit> for ExitCode {
    fn from(value: ProcessExit) -> Self {
        Self::from(value.code())
    }
}

/// Maps a batch report to the process exit outcome.
fn determine_exit_outcome(report: &BatchReport) -> ProcessExit {
    if report.is_success() {
        ProcessExit::Success
    } else if report.completed() + report.skipped() > 0 {
        ProcessExit::Partial
    } else {
        ProcessExit::Failure
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    if let Err(e) = init_tracing(&args) {
        eprintln!("Error: {e:#}");
        return ProcessExit::Failure.into();
    }

    match run(args).await {
        Ok(outcome) => outcome.into(),
        Err(e) => {
            eprintln!("Error: {e:#}");
            ProcessExit::Failure.into()
        }
    }
}

/// Installs the global subscriber.
///
/// Priority: `RUST_LOG` env var > quiet flag > debug/verbose flags > info.
fn init_tracing(args: &Args) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.default_log_level()));

    match &args.log {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create log file '{}'", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

async fn run(args: Args) -> Result<ProcessExit> {
    debug!(?args, "CLI arguments parsed");

    let file_config = load_default_file_config()?.unwrap_or_default();
    let (run_config, session_config) = merge_config(&args, &file_config);

    // Configuration problems abort before any network traffic.
    let backend = BackendSelection::from_flags(args.wget.clone(), args.curl.clone())?.build()?;
    let engine = DownloadEngine::new(run_config, session_config, backend)?;

    let cancel = CancellationToken::new();
    let cancel_on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, cancelling remaining downloads");
            cancel_on_signal.cancel();
        }
    });

    info!(pages = args.urls.len(), "einthusan-dl starting");
    let report = engine.run(&args.urls, &cancel).await;

    print_summary(&report);
    Ok(determine_exit_outcome(&report))
}

/// Merges CLI values over file values over built-in defaults.
fn merge_config(args: &Args, file: &FileConfig) -> (RunConfig, SessionConfig) {
    let defaults = SessionConfig::default();
    let session = SessionConfig {
        user_agent: args
            .user_agent
            .clone()
            .or_else(|| file.user_agent.clone())
            .unwrap_or(defaults.user_agent),
        request_timeout: args
            .timeout
            .or(file.timeout_secs)
            .map_or(defaults.request_timeout, Duration::from_secs),
        ..defaults
    };

    let run = RunConfig {
        destination_root: args
            .path
            .clone()
            .or_else(|| file.path.clone())
            .unwrap_or_else(|| PathBuf::from(".")),
        overwrite: args.overwrite,
        skip_transfer: args.skip_download,
        jobs: args
            .jobs
            .map(usize::from)
            .or(file.jobs)
            .unwrap_or(RunConfig::default().jobs),
    };

    (run, session)
}

fn print_summary(report: &BatchReport) {
    for result in report.iter() {
        match &result.outcome {
            TransferOutcome::Completed => {
                if let Some(task) = &result.task {
                    println!("done     {}", task.destination_file.display());
                }
            }
            TransferOutcome::Skipped(reason) => {
                println!("skipped  {} ({})", result.page_url, reason.as_str());
            }
            TransferOutcome::Failed(error) => {
                println!("failed   {} [{}]: {error}", result.page_url, error.stage());
            }
        }
    }
    println!(
        "{} completed, {} skipped, {} failed",
        report.completed(),
        report.skipped(),
        report.failed()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = "https://einthusan.tv/movie/watch/9aEx/?lang=tamil";

    #[test]
    fn test_process_exit_codes() {
        assert_eq!(ProcessExit::Success.code(), 0);
        assert_eq!(ProcessExit::Partial.code(), 1);
        assert_eq!(ProcessExit::Failure.code(), 2);
    }

    #[test]
    fn test_empty_report_is_success() {
        assert_eq!(
            determine_exit_outcome(&BatchReport::default()),
            ProcessExit::Success
        );
    }

    #[test]
    fn test_merge_config_cli_wins_over_file() {
        let args = Args::try_parse_from([
            "einthusan-dl",
            "--path",
            "/cli",
            "-j",
            "3",
            "--timeout",
            "7",
            "--user-agent",
            "cli-agent",
            PAGE,
        ])
        .unwrap();
        let file = FileConfig {
            path: Some(PathBuf::from("/file")),
            user_agent: Some("file-agent".to_string()),
            timeout_secs: Some(60),
            jobs: Some(8),
        };
        let (run, session) = merge_config(&args, &file);
        assert_eq!(run.destination_root, PathBuf::from("/cli"));
        assert_eq!(run.jobs, 3);
        assert_eq!(session.user_agent, "cli-agent");
        assert_eq!(session.request_timeout, Duration::from_secs(7));
        assert_eq!(session.connect_timeout, SessionConfig::default().connect_timeout);
    }

    #[test]
    fn test_merge_config_defaults_without_file() {
        let args = Args::try_parse_from(["einthusan-dl", "-o", PAGE]).unwrap();
        let (run, session) = merge_config(&args, &FileConfig::default());
        assert_eq!(run.destination_root, PathBuf::from("."));
        assert_eq!(run.jobs, 1);
        assert!(run.overwrite);
        assert!(!run.skip_transfer);
        assert_eq!(session, SessionConfig::default());
    }
}
