//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;
use url::Url;

/// Download movies from einthusan landing pages.
///
/// Each page URL is resolved to its direct media link and stored as
/// `<path>/<title>/<title>.mp4`.
#[derive(Parser, Debug)]
#[command(name = "einthusan-dl")]
#[command(author, version, about)]
pub struct Args {
    /// Movie page URLs to download
    #[arg(required = true, value_name = "URL", value_parser = parse_page_url)]
    pub urls: Vec<Url>,

    /// Overwrite files that already exist
    #[arg(short, long)]
    pub overwrite: bool,

    /// Download with wget, optionally from the given executable
    #[arg(long, value_name = "BIN", num_args = 0..=1, default_missing_value = "")]
    pub wget: Option<String>,

    /// Download with curl, optionally from the given executable
    #[arg(long, value_name = "BIN", num_args = 0..=1, default_missing_value = "")]
    pub curl: Option<String>,

    /// Resolve and log media links without downloading anything
    #[arg(long)]
    pub skip_download: bool,

    /// Destination root directory [default: .]
    #[arg(long, value_name = "DIR")]
    pub path: Option<PathBuf>,

    /// Write log output to FILE instead of stderr
    #[arg(short, long, value_name = "FILE")]
    pub log: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Number of pages processed at once (1-16) [default: 1]
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=16))]
    pub jobs: Option<u8>,

    /// Per-request timeout in seconds for page fetches (1-3600)
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub timeout: Option<u64>,

    /// User agent sent with every request
    #[arg(long, value_name = "UA")]
    pub user_agent: Option<String>,
}

impl Args {
    /// Default log level implied by the verbosity flags.
    ///
    /// Priority: quiet > debug/verbose > default (info).
    #[must_use]
    pub fn default_log_level(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match (self.debug, self.verbose) {
            (_, 2..) => "trace",
            (true, _) | (false, 1) => "debug",
            (false, 0) => "info",
        }
    }
}

fn parse_page_url(raw: &str) -> Result<Url, String> {
    let url = Url::parse(raw).map_err(|e| format!("invalid URL '{raw}': {e}"))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(format!("unsupported URL scheme '{other}': expected http or https")),
    }
}
