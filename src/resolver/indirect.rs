//! Indirect-lookup scheme: an internal movie id is substituted into a fixed
//! lookup endpoint whose response body is the media link itself.

use url::Url;

use super::{HttpSession, ResolutionError};

/// Lookup endpoint path, relative to the page's origin.
const LOOKUP_PATH: &str = "/webservice/filevideo.php";

/// Builds the lookup URL for `media_id` on the page's origin.
///
/// # Errors
///
/// Returns [`ResolutionError::DecodeFailure`] when the page URL cannot serve
/// as a base (for example `data:` URLs).
pub fn lookup_url(page_url: &Url, media_id: &str) -> Result<Url, ResolutionError> {
    let mut url = page_url
        .join(LOOKUP_PATH)
        .map_err(|e| ResolutionError::decode(page_url.as_str(), "lookup URL", e))?;
    url.query_pairs_mut()
        .clear()
        .append_pair("id", media_id)
        .append_pair("type", "hd");
    Ok(url)
}

/// Fetches the lookup endpoint; its trimmed body is the media link.
pub(crate) async fn fetch_media_link(
    session: &HttpSession,
    page_url: &Url,
    media_id: &str,
) -> Result<String, ResolutionError> {
    let endpoint = lookup_url(page_url, media_id)?;
    let body = session.get_text(&endpoint).await?;
    let link = body.trim();
    if link.is_empty() {
        return Err(ResolutionError::missing_field(page_url.as_str(), "lookup body"));
    }
    Ok(link.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_url_substitutes_id_on_page_origin() {
        let page = Url::parse("http://site.example/movies/watch.php?lang=tamil&id=1").unwrap();
        let url = lookup_url(&page, "2417").unwrap();
        assert_eq!(
            url.as_str(),
            "http://site.example/webservice/filevideo.php?id=2417&type=hd"
        );
    }

    #[test]
    fn test_lookup_url_encodes_id() {
        let page = Url::parse("http://site.example/").unwrap();
        let url = lookup_url(&page, "a b&c").unwrap();
        assert_eq!(url.query(), Some("id=a+b%26c&type=hd"));
    }
}
