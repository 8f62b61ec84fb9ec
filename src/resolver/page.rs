//! Landing page probing: detects which link scheme a page uses and pulls the
//! values that scheme needs out of the markup.
//!
//! Parsing is synchronous and the DOM is dropped before any follow-up
//! request, so nothing non-`Send` is held across an await point.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use super::ResolutionError;
use super::object_literal::{literal_len, parse_object_literal};

/// Compiles a CSS selector at static init; panics on invalid pattern.
fn compile_static_selector(pattern: &str) -> Selector {
    Selector::parse(pattern).unwrap_or_else(|e| panic!("invalid static selector '{pattern}': {e}"))
}

/// Compiles a regex at static init; panics on invalid pattern.
fn compile_static_regex(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid static regex '{pattern}': {e}"))
}

static PAGE_ID: LazyLock<Selector> = LazyLock::new(|| compile_static_selector("html[data-pageid]"));
static PINGABLES: LazyLock<Selector> =
    LazyLock::new(|| compile_static_selector("section#UIVideoPlayer[data-ejpingables]"));
static TITLE_HEADING: LazyLock<Selector> =
    LazyLock::new(|| compile_static_selector("a.title h3"));
static MEDIA_ID: LazyLock<Selector> = LazyLock::new(|| compile_static_selector("[data-movieid]"));
static MOVIE_TITLE_ANCHOR: LazyLock<Selector> =
    LazyLock::new(|| compile_static_selector("a.movie-title"));
static INLINE_SCRIPT: LazyLock<Selector> =
    LazyLock::new(|| compile_static_selector("script:not([src])"));
static PLAYER_HOST: LazyLock<Selector> = LazyLock::new(|| {
    compile_static_selector("script[src*=\"jwplayer\"], div#mediaplayer")
});

/// Matches the player setup call a config script starts with.
static PLAYER_SETUP_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile_static_regex(r#"^\s*jwplayer\(\s*["'][^"']*["']\s*\)\s*\.\s*setup\s*\("#)
});

/// Suffix appended to the `lang` query value to form the title parameter name.
const TITLE_KEY_SUFFIX: &str = "moviesonline";

/// A link scheme detected on a landing page, with the values it needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scheme {
    /// Page id and outcomes token are posted back to the ajax endpoint.
    SignedPayload {
        /// `data-pageid` of the document, sent as the CSRF token.
        page_id: String,
        /// `data-ejpingables` of the player section.
        outcomes: String,
        /// Display title.
        title: String,
    },
    /// Media link sits in an inline player setup script.
    PlayerConfig {
        /// Raw `file` value of the player config.
        media_url: String,
        /// Display title from the page query string.
        title: String,
    },
    /// An internal id is looked up through a secondary endpoint.
    IndirectLookup {
        /// `data-movieid` attribute value.
        media_id: String,
        /// Display title.
        title: String,
    },
}

impl Scheme {
    /// Short scheme name for logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::SignedPayload { .. } => "signed_payload",
            Self::PlayerConfig { .. } => "player_config",
            Self::IndirectLookup { .. } => "indirect_lookup",
        }
    }
}

/// Inspects page markers and extracts the selected scheme's inputs.
///
/// Markers are checked in order: outcomes token, player host or setup
/// script, media id.
///
/// # Errors
///
/// - [`ResolutionError::UnrecognizedPage`] when no marker is present
/// - [`ResolutionError::NoPlayerScript`] when the player is present but no
///   setup script matches
/// - [`ResolutionError::MissingField`] / [`ResolutionError::DecodeFailure`]
///   when the selected scheme's values are absent or malformed
pub fn probe(html: &str, page_url: &Url) -> Result<Scheme, ResolutionError> {
    let document = Html::parse_document(html);

    if let Some(section) = document.select(&PINGABLES).next() {
        return signed_payload_inputs(&document, section, page_url);
    }
    if document.select(&PLAYER_HOST).next().is_some() || has_setup_script(&document) {
        return player_config_inputs(&document, page_url);
    }
    if let Some(element) = document.select(&MEDIA_ID).next() {
        return indirect_lookup_inputs(&document, element, page_url);
    }
    Err(ResolutionError::unrecognized_page(page_url.as_str()))
}

fn signed_payload_inputs(
    document: &Html,
    section: ElementRef<'_>,
    page_url: &Url,
) -> Result<Scheme, ResolutionError> {
    let outcomes = non_empty_attr(section, "data-ejpingables")
        .ok_or_else(|| ResolutionError::missing_field(page_url.as_str(), "data-ejpingables"))?;
    let page_id = document
        .select(&PAGE_ID)
        .next()
        .and_then(|html| non_empty_attr(html, "data-pageid"))
        .ok_or_else(|| ResolutionError::missing_field(page_url.as_str(), "data-pageid"))?;
    let title = document
        .select(&TITLE_HEADING)
        .next()
        .map(element_text)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ResolutionError::missing_field(page_url.as_str(), "title"))?;
    Ok(Scheme::SignedPayload {
        page_id,
        outcomes,
        title,
    })
}

fn player_config_inputs(document: &Html, page_url: &Url) -> Result<Scheme, ResolutionError> {
    let literal = document
        .select(&INLINE_SCRIPT)
        .map(|script| script.text().collect::<String>())
        .find_map(|text| setup_literal(&text).map(str::to_string))
        .ok_or_else(|| ResolutionError::no_player_script(page_url.as_str()))?;

    let config = parse_object_literal(&literal)
        .map_err(|e| ResolutionError::decode(page_url.as_str(), "player config", e))?;
    let media_url = config
        .get("file")
        .and_then(serde_json::Value::as_str)
        .map(str::trim)
        .filter(|file| !file.is_empty())
        .ok_or_else(|| ResolutionError::missing_field(page_url.as_str(), "file"))?
        .to_string();

    let title = title_from_query(page_url)?;
    Ok(Scheme::PlayerConfig { media_url, title })
}

fn indirect_lookup_inputs(
    document: &Html,
    element: ElementRef<'_>,
    page_url: &Url,
) -> Result<Scheme, ResolutionError> {
    let media_id = non_empty_attr(element, "data-movieid")
        .ok_or_else(|| ResolutionError::missing_field(page_url.as_str(), "data-movieid"))?;
    let title = document
        .select(&MOVIE_TITLE_ANCHOR)
        .next()
        .and_then(|anchor| {
            non_empty_attr(anchor, "title").or_else(|| {
                let text = element_text(anchor);
                (!text.is_empty()).then_some(text)
            })
        })
        .ok_or_else(|| ResolutionError::missing_field(page_url.as_str(), "title"))?;
    Ok(Scheme::IndirectLookup { media_id, title })
}

/// Returns the object literal passed to the player setup call, if `script`
/// starts with one.
pub(crate) fn setup_literal(script: &str) -> Option<&str> {
    let prefix = PLAYER_SETUP_RE.find(script)?;
    let rest = script[prefix.end()..].trim_start();
    let len = literal_len(rest)?;
    Some(&rest[..len])
}

fn has_setup_script(document: &Html) -> bool {
    document
        .select(&INLINE_SCRIPT)
        .any(|script| PLAYER_SETUP_RE.is_match(&script.text().collect::<String>()))
}

/// Reads the display title from `query[lang + "moviesonline"]`.
pub(crate) fn title_from_query(page_url: &Url) -> Result<String, ResolutionError> {
    let lang = page_url
        .query_pairs()
        .find(|(key, _)| key == "lang")
        .map(|(_, value)| value.into_owned())
        .filter(|lang| !lang.is_empty())
        .ok_or_else(|| ResolutionError::missing_field(page_url.as_str(), "lang"))?;
    let key = format!("{lang}{TITLE_KEY_SUFFIX}");
    page_url
        .query_pairs()
        .find(|(k, _)| *k == key)
        .map(|(_, value)| value.trim().to_string())
        .filter(|title| !title.is_empty())
        .ok_or_else(|| ResolutionError::missing_field(page_url.as_str(), "title"))
}

fn non_empty_attr(element: ElementRef<'_>, name: &str) -> Option<String> {
    element
        .value()
        .attr(name)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::resolver::error::ResolutionStage;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_probe_signed_payload_markers() {
        let html = r#"<html data-pageid="tok123"><body>
            <a class="title" href="/movie/watch/abc/"><h3>Kaaki  Sattai</h3></a>
            <section id="UIVideoPlayer" data-ejpingables="outcome-xyz"></section>
        </body></html>"#;
        let scheme = probe(html, &url("https://site.example/movie/watch/abc/")).unwrap();
        assert_eq!(
            scheme,
            Scheme::SignedPayload {
                page_id: "tok123".to_string(),
                outcomes: "outcome-xyz".to_string(),
                title: "Kaaki Sattai".to_string(),
            }
        );
    }

    #[test]
    fn test_probe_signed_payload_without_page_id_is_missing_field() {
        let html = r#"<html><body><a class="title"><h3>X</h3></a>
            <section id="UIVideoPlayer" data-ejpingables="o"></section></body></html>"#;
        let err = probe(html, &url("https://site.example/movie/watch/abc/")).unwrap_err();
        assert!(
            matches!(err, ResolutionError::MissingField { field: "data-pageid", .. }),
            "got {err:?}"
        );
    }

    #[test]
    fn test_probe_player_without_setup_script_is_no_player_script() {
        let html = r#"<html><head><script src="/js/jwplayer.js"></script>
            <script>var unrelated = 1;</script></head><body></body></html>"#;
        let err = probe(html, &url("https://site.example/watch.php?lang=tamil")).unwrap_err();
        assert_eq!(err.stage(), ResolutionStage::NoPlayerScript);
    }

    #[test]
    fn test_probe_indirect_lookup_prefers_title_attribute() {
        let html = r#"<html><body>
            <div id="player" data-movieid="2417"></div>
            <a class="movie-title" title="Anniyan" href="/x">Anniyan (2005)</a>
        </body></html>"#;
        let scheme = probe(html, &url("https://site.example/watch.php?id=2417")).unwrap();
        assert_eq!(
            scheme,
            Scheme::IndirectLookup {
                media_id: "2417".to_string(),
                title: "Anniyan".to_string(),
            }
        );
    }

    #[test]
    fn test_probe_plain_page_is_unrecognized() {
        let html = "<html><body><p>Nothing to see</p></body></html>";
        let err = probe(html, &url("https://site.example/")).unwrap_err();
        assert_eq!(err.stage(), ResolutionStage::UnrecognizedPage);
    }

    #[test]
    fn test_setup_literal_strips_call_wrapper() {
        let script = "jwplayer(\"mediaplayer\").setup({file: 'http://a/b.mp4', width: 640});";
        assert_eq!(
            setup_literal(script),
            Some("{file: 'http://a/b.mp4', width: 640}")
        );
        assert_eq!(setup_literal("console.log(1)"), None);
    }

    #[test]
    fn test_setup_literal_ignores_statements_after_the_call() {
        let script = "jwplayer(\"mediaplayer\").setup({file: 'http://a/b.mp4', title: 'x (y)'});\n\
                      jwplayer(\"mediaplayer\").onReady(function(){ log('ready'); });";
        assert_eq!(
            setup_literal(script),
            Some("{file: 'http://a/b.mp4', title: 'x (y)'}")
        );
    }

    #[test]
    fn test_inline_setup_script_alone_selects_player_config() {
        let html = r#"<html><body>
            <script>jwplayer("player").setup({file: "http://cdn.example/a.mp4"});
            jwplayer("player").on('ready', function () { track({id: 1}); });</script>
        </body></html>"#;
        let page = url("https://site.example/watch.php?lang=tamil&tamilmoviesonline=Kaaki%20Sattai");
        assert_eq!(
            probe(html, &page).unwrap(),
            Scheme::PlayerConfig {
                media_url: "http://cdn.example/a.mp4".to_string(),
                title: "Kaaki Sattai".to_string(),
            }
        );
    }

    #[test]
    fn test_title_from_query_uses_lang_templated_key() {
        let page = url(
            "https://site.example/watch.php?lang=hindi&hindimoviesonline=Sholay%20(1975)&id=9",
        );
        assert_eq!(title_from_query(&page).unwrap(), "Sholay (1975)");
    }

    #[test]
    fn test_title_from_query_without_lang_is_missing_field() {
        let page = url("https://site.example/watch.php?hindimoviesonline=Sholay");
        let err = title_from_query(&page).unwrap_err();
        assert!(matches!(err, ResolutionError::MissingField { field: "lang", .. }));
    }
}
