//! Einthusan Downloader Core Library
//!
//! This library turns movie landing page URLs into direct media links and
//! moves the media onto local storage.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`resolver`] - HTTP session, page probing and the site's link schemes
//! - [`download`] - Transfer backends and the batch download engine
//! - [`config`] - Run-wide configuration and fatal configuration errors

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod download;
pub mod resolver;
mod user_agent;

// Re-export commonly used types
pub use config::{ConfigError, RunConfig};
pub use download::{
    BackendSelection, BatchReport, DownloadEngine, DownloadTask, ItemError, SkipReason,
    TransferBackend, TransferError, TransferOutcome, TransferResult,
};
pub use resolver::{HttpSession, ResolutionError, ResolvedMedia, SessionConfig, resolve};
pub use user_agent::DEFAULT_USER_AGENT;
