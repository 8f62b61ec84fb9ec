//! HTTP session used for page fetches, follow-up lookups and media streaming.
//!
//! Session settings are an explicit [`SessionConfig`] value handed to
//! [`HttpSession::new`]; nothing here reads or writes process-wide state.
//! Each session owns its own cookie store, so sessions are never shared
//! between concurrently running batch items.

use std::time::Duration;

use reqwest::Client;
use reqwest::header::ACCEPT;
use tracing::{debug, info, instrument};
use url::Url;

use crate::config::ConfigError;
use crate::user_agent::DEFAULT_USER_AGENT;

use super::ResolutionError;

const CONNECT_TIMEOUT_SECS: u64 = 10;
const REQUEST_TIMEOUT_SECS: u64 = 30;
const READ_TIMEOUT_SECS: u64 = 300;

const HTML_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Connection policy for one [`HttpSession`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// User-Agent header sent on every request.
    pub user_agent: String,
    /// Upper bound for establishing a connection.
    pub connect_timeout: Duration,
    /// Upper bound for a whole page, lookup or POST exchange.
    pub request_timeout: Duration,
    /// Longest allowed pause between body chunks while streaming media.
    pub read_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            connect_timeout: Duration::from_secs(CONNECT_TIMEOUT_SECS),
            request_timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            read_timeout: Duration::from_secs(READ_TIMEOUT_SECS),
        }
    }
}

/// A cookie-carrying HTTP session.
#[derive(Debug, Clone)]
pub struct HttpSession {
    client: Client,
    config: SessionConfig,
}

impl HttpSession {
    /// Builds a session with a fresh cookie store.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::HttpClient`] when the client cannot be built.
    pub fn new(config: SessionConfig) -> Result<Self, ConfigError> {
        let client = Client::builder()
            .cookie_store(true)
            .connect_timeout(config.connect_timeout)
            .read_timeout(config.read_timeout)
            .user_agent(config.user_agent.clone())
            .gzip(true)
            .build()
            .map_err(|source| ConfigError::HttpClient { source })?;
        Ok(Self { client, config })
    }

    /// Returns the settings this session was built with.
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Returns the underlying client for streaming transfers.
    #[must_use]
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Fetches `url` and returns its body as text.
    ///
    /// # Errors
    ///
    /// Returns [`ResolutionError::HttpStatus`] for non-2xx answers and
    /// [`ResolutionError::Transport`] for connection or timeout failures.
    #[instrument(level = "debug", skip(self), fields(url = %url))]
    pub async fn get_text(&self, url: &Url) -> Result<String, ResolutionError> {
        let response = self
            .client
            .get(url.clone())
            .header(ACCEPT, HTML_ACCEPT)
            .timeout(self.config.request_timeout)
            .send()
            .await
            .map_err(|e| ResolutionError::transport(url.as_str(), e))?;
        let body = read_success_body(url, response).await?;
        info!(url = %url, bytes = body.len(), "fetched page");
        Ok(body)
    }

    /// Posts a url-encoded form to `url` and returns the response body.
    ///
    /// # Errors
    ///
    /// Same as [`get_text`](Self::get_text).
    #[instrument(level = "debug", skip(self, form), fields(url = %url))]
    pub async fn post_form(
        &self,
        url: &Url,
        form: &[(&str, &str)],
    ) -> Result<String, ResolutionError> {
        let response = self
            .client
            .post(url.clone())
            .form(form)
            .timeout(self.config.request_timeout)
            .send()
            .await
            .map_err(|e| ResolutionError::transport(url.as_str(), e))?;
        let body = read_success_body(url, response).await?;
        debug!(bytes = body.len(), "form post answered");
        Ok(body)
    }
}

async fn read_success_body(
    url: &Url,
    response: reqwest::Response,
) -> Result<String, ResolutionError> {
    let status = response.status();
    if !status.is_success() {
        return Err(ResolutionError::http_status(url.as_str(), status.as_u16()));
    }
    response
        .text()
        .await
        .map_err(|e| ResolutionError::transport(url.as_str(), e))
}
