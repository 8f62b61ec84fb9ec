//! Literal landing pages for each link scheme, plus mock mounting helpers.

#![allow(dead_code)]

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Page carrying the signed-payload markers.
pub fn signed_payload_page(page_id: &str, outcomes: &str, title: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en" data-pageid="{page_id}">
<head><title>Watch {title}</title></head>
<body>
  <div class="block1">
    <a class="title" href="/movie/watch/9aEx/"><h3>{title}</h3></a>
  </div>
  <section id="UIVideoPlayer" data-ejpingables="{outcomes}" data-content-type="movie">
    <video></video>
  </section>
</body>
</html>"#
    )
}

/// Page carrying an inline player setup script.
pub fn player_config_page(file: &str) -> String {
    format!(
        r#"<html>
<head>
  <script type="text/javascript" src="/jwplayer/jwplayer.js"></script>
  <script>var _gaq = _gaq || [];</script>
</head>
<body>
  <div id="mediaplayer"></div>
  <script type="text/javascript">
    jwplayer("mediaplayer").setup({{
      flashplayer: "/jwplayer/player.swf",
      // primary stream
      file: '{file}',
      width: 720,
      height: 405,
      autostart: true,
    }});
  </script>
</body>
</html>"#
    )
}

/// Player host without any setup script.
pub fn player_without_script_page() -> String {
    r#"<html><head><script src="/jwplayer/jwplayer.js"></script></head>
<body><div id="mediaplayer"></div><script>console.log("ready");</script></body></html>"#
        .to_string()
}

/// Page carrying an internal media id.
pub fn indirect_lookup_page(media_id: &str, title: &str) -> String {
    format!(
        r#"<html>
<body>
  <div class="movie-info">
    <a class="movie-title" href="/movies/watch.php?id={media_id}" title="{title}">{title}</a>
  </div>
  <div id="player" data-movieid="{media_id}"></div>
</body>
</html>"#
    )
}

/// Page with none of the scheme markers.
pub fn unrecognized_page() -> String {
    "<html><body><h1>Browse movies</h1><a href=\"/movie/watch/1/\">One</a></body></html>"
        .to_string()
}

/// Obfuscates a media link the way the ajax endpoint does.
pub fn encoded_links(mp4_link: &str) -> String {
    let plain = STANDARD.encode(format!(r#"{{"MP4Link":"{mp4_link}"}}"#));
    format!("{}ZZ{}{}", &plain[..10], &plain[11..], &plain[10..11])
}

/// Serves an indirect-lookup page at `page_path` whose lookup answers `media_url`.
pub async fn mount_indirect_page(
    server: &MockServer,
    page_path: &str,
    media_id: &str,
    title: &str,
    media_url: &str,
) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(indirect_lookup_page(media_id, title)),
        )
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/webservice/filevideo.php"))
        .and(query_param("id", media_id))
        .and(query_param("type", "hd"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!("{media_url}\n")))
        .mount(server)
        .await;
}

/// Serves `body` as a media file at `media_path`.
pub async fn mount_media(server: &MockServer, media_path: &str, body: &[u8]) {
    Mock::given(method("GET"))
        .and(path(media_path))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.to_vec()))
        .mount(server)
        .await;
}
