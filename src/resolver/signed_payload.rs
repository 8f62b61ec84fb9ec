//! Signed-payload scheme: the page id and outcomes token are posted to the
//! ajax twin of the page, which answers with an obfuscated base64 blob
//! wrapping the media link.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;
use url::Url;

use super::{HttpSession, ResolutionError};

const PING_EVENT: &str = "UIVideoPlayer.PingOutcome";

/// Length of the header kept verbatim in front of the relocated character.
const HEADER_LEN: usize = 10;

/// Characters of junk that follow the header in the encoded form.
const JUNK_LEN: usize = 2;

#[derive(Debug, Deserialize)]
struct PingResponse {
    #[serde(rename = "Data")]
    data: Option<PingData>,
}

#[derive(Debug, Deserialize)]
struct PingData {
    #[serde(rename = "EJLinks")]
    ej_links: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DecodedLinks {
    #[serde(rename = "MP4Link")]
    mp4_link: Option<String>,
}

/// Builds the ajax endpoint for `page_url` by prefixing its path with `/ajax`.
#[must_use]
pub fn ajax_url(page_url: &Url) -> Url {
    let mut url = page_url.clone();
    let path = format!("/ajax{}", page_url.path());
    url.set_path(&path);
    url.set_fragment(None);
    url
}

/// Posts the ping payload and returns the decoded `MP4Link`.
pub(crate) async fn fetch_media_link(
    session: &HttpSession,
    page_url: &Url,
    page_id: &str,
    outcomes: &str,
) -> Result<String, ResolutionError> {
    let endpoint = ajax_url(page_url);
    let x_json = json!({ "EJOutcomes": outcomes, "NativeHLS": false }).to_string();
    let form = [
        ("xEvent", PING_EVENT),
        ("xJson", x_json.as_str()),
        ("gorilla.csrf.Token", page_id),
    ];
    debug!(endpoint = %endpoint, "posting ping outcome");
    let body = session.post_form(&endpoint, &form).await?;

    let response: PingResponse = serde_json::from_str(&body)
        .map_err(|e| ResolutionError::decode(page_url.as_str(), "ping response", e))?;
    let encoded = response
        .data
        .and_then(|data| data.ej_links)
        .ok_or_else(|| ResolutionError::missing_field(page_url.as_str(), "Data.EJLinks"))?;

    let decoded = decode_links(&encoded)
        .map_err(|reason| ResolutionError::decode(page_url.as_str(), "EJLinks", reason))?;
    let links: DecodedLinks = serde_json::from_slice(&decoded)
        .map_err(|e| ResolutionError::decode(page_url.as_str(), "EJLinks", e))?;
    links
        .mp4_link
        .filter(|link| !link.trim().is_empty())
        .ok_or_else(|| ResolutionError::missing_field(page_url.as_str(), "MP4Link"))
}

/// Undoes the link obfuscation and returns the base64-decoded bytes.
///
/// The encoded form is the real base64 text with its character at offset
/// 10 moved to the very end and two junk characters inserted at offset 10:
/// `encoded[..10] + encoded[last] + encoded[12..last]` restores it.
///
/// # Errors
///
/// Returns a reason string when the value is too short, not ASCII, or not
/// valid base64 after restoration.
pub fn decode_links(encoded: &str) -> Result<Vec<u8>, String> {
    let encoded = encoded.trim();
    if !encoded.is_ascii() {
        return Err("encoded link contains non-ASCII characters".to_string());
    }
    if encoded.len() <= HEADER_LEN + JUNK_LEN {
        return Err(format!("encoded link too short ({} chars)", encoded.len()));
    }
    let last = encoded.len() - 1;
    let mut restored = String::with_capacity(encoded.len() - JUNK_LEN);
    restored.push_str(&encoded[..HEADER_LEN]);
    restored.push_str(&encoded[last..]);
    restored.push_str(&encoded[HEADER_LEN + JUNK_LEN..last]);
    STANDARD.decode(restored).map_err(|e| e.to_string())
}
