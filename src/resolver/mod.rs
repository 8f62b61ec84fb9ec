//! Link resolution: landing page URL in, direct media URL and title out.
//!
//! The site has exposed its media links through three different mechanisms
//! over time. A fetched page is probed for each mechanism's markers and the
//! matching [`Scheme`] finishes the job, issuing at most one follow-up
//! request.
//!
//! # Architecture
//!
//! - [`HttpSession`] / [`SessionConfig`] - cookie-carrying page fetcher
//! - [`Scheme`] - closed set of link schemes, selected by [`probe`]
//! - [`resolve`] - fetch, probe, complete, validate
//! - [`ResolvedMedia`] - validated (title, media URL) pair
//!
//! # Example
//!
//! ```no_run
//! use einthusan_core::resolver::{HttpSession, SessionConfig, resolve};
//! use url::Url;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let session = HttpSession::new(SessionConfig::default())?;
//! let page = Url::parse("https://einthusan.tv/movie/watch/9aEx/?lang=tamil")?;
//! let media = resolve(&session, &page).await?;
//! println!("{} -> {}", media.title, media.media_url);
//! # Ok(())
//! # }
//! ```

mod error;
mod http_client;
mod indirect;
mod object_literal;
mod page;
mod signed_payload;

pub use error::{ResolutionError, ResolutionStage};
pub use http_client::{HttpSession, SessionConfig};
pub use indirect::lookup_url;
pub use object_literal::parse_object_literal;
pub use page::{Scheme, probe};
pub use signed_payload::{ajax_url, decode_links};

use tracing::{debug, info, instrument};
use url::Url;

/// A validated media link and the title it will be stored under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMedia {
    /// Display title as found on the page.
    pub title: String,
    /// Absolute http(s) link to the media file.
    pub media_url: Url,
}

impl ResolvedMedia {
    /// Validates a raw link found for `page_url`.
    ///
    /// Relative links are joined onto the page URL.
    ///
    /// # Errors
    ///
    /// Returns [`ResolutionError::InvalidMediaUrl`] when the link does not
    /// parse, is not http(s), or points back at the landing page, and
    /// [`ResolutionError::MissingField`] for a blank title.
    pub fn new(page_url: &Url, title: &str, raw_media_url: &str) -> Result<Self, ResolutionError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ResolutionError::missing_field(page_url.as_str(), "title"));
        }

        let raw = raw_media_url.trim();
        let media_url = match Url::parse(raw) {
            Ok(url) => url,
            Err(url::ParseError::RelativeUrlWithoutBase) => page_url.join(raw).map_err(|_| {
                ResolutionError::invalid_media_url(page_url.as_str(), raw, "not a valid URL")
            })?,
            Err(_) => {
                return Err(ResolutionError::invalid_media_url(
                    page_url.as_str(),
                    raw,
                    "not a valid URL",
                ));
            }
        };

        if !matches!(media_url.scheme(), "http" | "https") {
            return Err(ResolutionError::invalid_media_url(
                page_url.as_str(),
                raw,
                "scheme must be http or https",
            ));
        }
        if media_url == *page_url {
            return Err(ResolutionError::invalid_media_url(
                page_url.as_str(),
                raw,
                "link points back at the landing page",
            ));
        }

        Ok(Self {
            title: title.to_string(),
            media_url,
        })
    }
}

/// Resolves a landing page into its media link and title.
///
/// # Errors
///
/// Returns a [`ResolutionError`] naming the failing stage. When the page
/// carries no known scheme marker, no request beyond the page fetch is made.
#[instrument(skip(session), fields(page_url = %page_url))]
pub async fn resolve(session: &HttpSession, page_url: &Url) -> Result<ResolvedMedia, ResolutionError> {
    let html = session.get_text(page_url).await?;
    let scheme = probe(&html, page_url)?;
    debug!(scheme = scheme.name(), "page scheme detected");

    let (title, raw_link) = match scheme {
        Scheme::SignedPayload {
            page_id,
            outcomes,
            title,
        } => {
            let link =
                signed_payload::fetch_media_link(session, page_url, &page_id, &outcomes).await?;
            (title, link)
        }
        Scheme::PlayerConfig { media_url, title } => (title, media_url),
        Scheme::IndirectLookup { media_id, title } => {
            let link = indirect::fetch_media_link(session, page_url, &media_id).await?;
            (title, link)
        }
    };

    let media = ResolvedMedia::new(page_url, &title, &raw_link)?;
    info!(title = %media.title, media_url = %media.media_url, "resolved media link");
    Ok(media)
}
