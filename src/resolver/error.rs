//! Error types for link resolution.
//!
//! Every variant names the page URL it was resolving so a single log line is
//! enough to diagnose the failure without re-running at higher verbosity.

use std::fmt;

use thiserror::Error;

/// Coarse resolution stage, used as a structured log field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionStage {
    /// Non-2xx answer from the page, lookup or POST endpoint.
    HttpStatus,
    /// Connection, TLS or timeout failure before a status was received.
    Transport,
    /// Page looked like the player-config scheme but no script matched.
    NoPlayerScript,
    /// None of the known scheme markers were present.
    UnrecognizedPage,
    /// Encoded link or object literal could not be decoded.
    DecodeFailure,
    /// A required attribute, element or JSON field was absent.
    MissingField,
    /// The resolved link was not a usable absolute http(s) URL.
    InvalidMediaUrl,
}

impl ResolutionStage {
    /// Stable label for logs and summaries.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::HttpStatus => "http_status",
            Self::Transport => "transport",
            Self::NoPlayerScript => "no_player_script",
            Self::UnrecognizedPage => "unrecognized_page",
            Self::DecodeFailure => "decode_failure",
            Self::MissingField => "missing_field",
            Self::InvalidMediaUrl => "invalid_media_url",
        }
    }
}

impl fmt::Display for ResolutionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur while turning a page URL into a media URL.
#[derive(Debug, Error)]
pub enum ResolutionError {
    /// A request completed with a non-success status.
    #[error("HTTP {status} fetching {url}")]
    HttpStatus {
        /// The URL that answered with an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// A request failed before any status was received.
    #[error("network error fetching {url}: {source}")]
    Transport {
        /// The URL being fetched.
        url: String,
        /// The underlying client error.
        #[source]
        source: reqwest::Error,
    },

    /// No inline script begins with the player initialization call.
    #[error("no player setup script found on {page_url}")]
    NoPlayerScript {
        /// The page being resolved.
        page_url: String,
    },

    /// The page carries none of the known scheme markers.
    #[error(
        "unrecognized page layout at {page_url}\n  Suggestion: the site markup may have changed; check the URL opens a movie page"
    )]
    UnrecognizedPage {
        /// The page being resolved.
        page_url: String,
    },

    /// An encoded payload could not be decoded.
    #[error("cannot decode {what} from {page_url}: {reason}")]
    DecodeFailure {
        /// The page being resolved.
        page_url: String,
        /// What was being decoded.
        what: &'static str,
        /// Why decoding failed.
        reason: String,
    },

    /// A required field was not present.
    #[error("missing {field} on {page_url}")]
    MissingField {
        /// The page being resolved.
        page_url: String,
        /// Name of the absent field.
        field: &'static str,
    },

    /// The resolved link cannot be downloaded.
    #[error("resolved media URL '{media_url}' for {page_url} is unusable: {reason}")]
    InvalidMediaUrl {
        /// The page being resolved.
        page_url: String,
        /// The offending link as resolved.
        media_url: String,
        /// Why it was rejected.
        reason: &'static str,
    },
}

impl ResolutionError {
    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates a transport error from a client error.
    pub fn transport(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Transport {
            url: url.into(),
            source,
        }
    }

    /// Creates a missing-player-script error.
    pub fn no_player_script(page_url: impl Into<String>) -> Self {
        Self::NoPlayerScript {
            page_url: page_url.into(),
        }
    }

    /// Creates an unrecognized-page error.
    pub fn unrecognized_page(page_url: impl Into<String>) -> Self {
        Self::UnrecognizedPage {
            page_url: page_url.into(),
        }
    }

    /// Creates a decode error.
    pub fn decode(page_url: impl Into<String>, what: &'static str, reason: impl fmt::Display) -> Self {
        Self::DecodeFailure {
            page_url: page_url.into(),
            what,
            reason: reason.to_string(),
        }
    }

    /// Creates a missing-field error.
    pub fn missing_field(page_url: impl Into<String>, field: &'static str) -> Self {
        Self::MissingField {
            page_url: page_url.into(),
            field,
        }
    }

    /// Creates an invalid media URL error.
    pub fn invalid_media_url(
        page_url: impl Into<String>,
        media_url: impl Into<String>,
        reason: &'static str,
    ) -> Self {
        Self::InvalidMediaUrl {
            page_url: page_url.into(),
            media_url: media_url.into(),
            reason,
        }
    }

    /// Returns the stage tag for this error.
    #[must_use]
    pub fn stage(&self) -> ResolutionStage {
        match self {
            Self::HttpStatus { .. } => ResolutionStage::HttpStatus,
            Self::Transport { .. } => ResolutionStage::Transport,
            Self::NoPlayerScript { .. } => ResolutionStage::NoPlayerScript,
            Self::UnrecognizedPage { .. } => ResolutionStage::UnrecognizedPage,
            Self::DecodeFailure { .. } => ResolutionStage::DecodeFailure,
            Self::MissingField { .. } => ResolutionStage::MissingField,
            Self::InvalidMediaUrl { .. } => ResolutionStage::InvalidMediaUrl,
        }
    }
}
