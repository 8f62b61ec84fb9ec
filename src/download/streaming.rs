//! In-process streaming backend.
//!
//! Issues a GET on the batch item's own session and streams the body
//! straight into the destination file, which is created or truncated first.

use std::path::Path;

use async_trait::async_trait;
use futures_util::StreamExt;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{info, instrument};
use url::Url;

use super::backend::{TransferBackend, discard_partial};
use super::error::TransferError;
use crate::resolver::HttpSession;

/// Streams media bytes through the shared HTTP session.
#[derive(Debug, Default, Clone, Copy)]
pub struct StreamingBackend;

impl StreamingBackend {
    /// Creates the streaming backend.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TransferBackend for StreamingBackend {
    fn name(&self) -> &'static str {
        "stream"
    }

    #[instrument(skip(self, session), fields(backend = "stream", url = %media_url))]
    async fn download(
        &self,
        session: &HttpSession,
        media_url: &Url,
        destination: &Path,
    ) -> Result<(), TransferError> {
        let response = session
            .client()
            .get(media_url.clone())
            .send()
            .await
            .map_err(|e| TransferError::network(media_url.as_str(), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransferError::http_status(media_url.as_str(), status.as_u16()));
        }

        let mut file = File::create(destination)
            .await
            .map_err(|e| TransferError::io(destination, e))?;

        let stream_result = stream_to_file(&mut file, response, media_url, destination).await;
        if stream_result.is_err() {
            drop(file);
            discard_partial(destination).await;
        }
        let bytes = stream_result?;

        info!(path = %destination.display(), bytes, "stream complete");
        Ok(())
    }
}

/// Streams response body to file, returning bytes written.
async fn stream_to_file(
    file: &mut File,
    response: reqwest::Response,
    url: &Url,
    file_path: &Path,
) -> Result<u64, TransferError> {
    let mut writer = BufWriter::new(file);
    let mut stream = response.bytes_stream();
    let mut bytes_written: u64 = 0;

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(|e| TransferError::network(url.as_str(), e))?;
        writer
            .write_all(&chunk)
            .await
            .map_err(|e| TransferError::io(file_path, e))?;
        bytes_written += chunk.len() as u64;
    }

    writer
        .flush()
        .await
        .map_err(|e| TransferError::io(file_path, e))?;

    Ok(bytes_written)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::resolver::SessionConfig;
    use tempfile::TempDir;
    use wiremock::matchers::{header_regex, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn session() -> HttpSession {
        HttpSession::new(SessionConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_streaming_backend_writes_body() {
        let server = MockServer::start().await;
        let body: Vec<u8> = (0..=255u8).cycle().take(256 * 1024).collect();
        Mock::given(method("GET"))
            .and(path("/media/movie.mp4"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(body.clone()))
            .mount(&server)
            .await;

        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("movie.mp4");
        let url = Url::parse(&format!("{}/media/movie.mp4", server.uri())).unwrap();
        StreamingBackend::new()
            .download(&session(), &url, &dest)
            .await
            .unwrap();
        assert_eq!(std::fs::read(&dest).unwrap(), body);
    }

    #[tokio::test]
    async fn test_streaming_backend_truncates_existing_file() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/short.mp4"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"new".to_vec()))
            .mount(&server)
            .await;

        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("short.mp4");
        std::fs::write(&dest, b"old content that is longer").unwrap();
        let url = Url::parse(&format!("{}/short.mp4", server.uri())).unwrap();
        StreamingBackend::new()
            .download(&session(), &url, &dest)
            .await
            .unwrap();
        assert_eq!(std::fs::read(&dest).unwrap(), b"new");
    }

    #[tokio::test]
    async fn test_streaming_backend_http_error_leaves_no_file() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing.mp4"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("missing.mp4");
        let url = Url::parse(&format!("{}/missing.mp4", server.uri())).unwrap();
        let err = StreamingBackend::new()
            .download(&session(), &url, &dest)
            .await
            .unwrap_err();
        assert!(matches!(err, TransferError::HttpStatus { status: 404, .. }), "got {err:?}");
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn test_streaming_backend_sends_session_user_agent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ua.mp4"))
            .and(header_regex("user-agent", "Chrome"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"ok".to_vec()))
            .expect(1)
            .mount(&server)
            .await;

        let temp = TempDir::new().unwrap();
        let url = Url::parse(&format!("{}/ua.mp4", server.uri())).unwrap();
        StreamingBackend::new()
            .download(&session(), &url, &temp.path().join("ua.mp4"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_streaming_backend_missing_directory_is_io_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"x".to_vec()))
            .mount(&server)
            .await;

        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("no-such-dir").join("m.mp4");
        let url = Url::parse(&format!("{}/m.mp4", server.uri())).unwrap();
        let err = StreamingBackend::new()
            .download(&session(), &url, &dest)
            .await
            .unwrap_err();
        assert!(matches!(err, TransferError::Io { .. }), "got {err:?}");
    }
}
