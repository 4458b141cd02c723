//! Embedded video discovery.

use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use url::Url;

use super::VideoExtractor;

static PLAYER_OPTION: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".DagPlayOpt, .play-btn, .dooplay_player_option").unwrap());
static IFRAME: Lazy<Selector> = Lazy::new(|| Selector::parse("iframe[src]").unwrap());
static PEMBED_IFRAME: Lazy<Selector> = Lazy::new(|| Selector::parse("#pembed iframe").unwrap());

/// Hosts that serve the file directly or through a usable player.
const DIRECT_HOSTS: &[&str] = &["drive.google.com", "ok.ru", "mediafire"];

/// Iframes from these hosts are never the player.
const IFRAME_DENYLIST: &[&str] = &["facebook", "twitter"];

/// Collect `data-embed` (or `data-src`) values of the player option buttons.
pub(crate) fn player_options(document: &Html, selector: &Selector) -> Vec<String> {
    document
        .select(selector)
        .filter_map(|el| {
            let attrs = el.value();
            attrs.attr("data-embed").or_else(|| attrs.attr("data-src"))
        })
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Unwrap a player wrapper URL whose `src` or `url` query parameter points
/// at an `.mp4` file.
pub(crate) fn unwrap_direct_mp4(option: &str) -> Option<String> {
    let parsed = Url::parse(option).ok()?;
    let inner = parsed
        .query_pairs()
        .find(|(k, _)| k == "src")
        .or_else(|| parsed.query_pairs().find(|(k, _)| k == "url"))
        .map(|(_, v)| v.into_owned())?;
    // query_pairs already decodes once; some wrappers double-encode.
    let decoded = urlencoding::decode(&inner)
        .map(|s| s.into_owned())
        .unwrap_or(inner);
    decoded.contains(".mp4").then_some(decoded)
}

/// Generic player lookup used for on-demand resolution.
///
/// Priority: an option linking an `.mp4` or a known direct host, then any
/// iframe that looks like a player, then the `#pembed` frame.
#[derive(Debug, Clone, Default)]
pub struct EmbedVideoExtractor;

impl EmbedVideoExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl VideoExtractor for EmbedVideoExtractor {
    fn extract_video(&self, document: &str, _source_url: &str) -> Option<String> {
        let html = Html::parse_document(document);

        let options = player_options(&html, &PLAYER_OPTION);
        if let Some(opt) = options
            .iter()
            .find(|o| o.contains(".mp4") || DIRECT_HOSTS.iter().any(|h| o.contains(h)))
        {
            return Some(opt.clone());
        }

        let iframe = html
            .select(&IFRAME)
            .filter_map(|el| el.value().attr("src"))
            .find(|src| {
                (src.contains("video") || src.contains("embed") || src.contains("player"))
                    && !IFRAME_DENYLIST.iter().any(|d| src.contains(d))
            });
        if let Some(src) = iframe {
            return Some(src.to_string());
        }

        html.select(&PEMBED_IFRAME)
            .next()
            .and_then(|el| el.value().attr("src"))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(html: &str) -> Option<String> {
        EmbedVideoExtractor::new().extract_video(html, "https://site.test/movie.html")
    }

    #[test]
    fn test_mp4_option_wins() {
        let html = r#"
            <div class="dooplay_player_option" data-embed="https://stream.test/embed/1"></div>
            <div class="play-btn" data-src="https://cdn.test/movie.mp4"></div>
            <iframe src="https://player.test/embed/2"></iframe>
        "#;
        assert_eq!(extract(html), Some("https://cdn.test/movie.mp4".to_string()));
    }

    #[test]
    fn test_direct_host_option() {
        let html = r#"<div class="DagPlayOpt" data-embed="https://ok.ru/videoembed/77"></div>"#;
        assert_eq!(extract(html), Some("https://ok.ru/videoembed/77".to_string()));
    }

    #[test]
    fn test_player_iframe_skips_social() {
        let html = r#"
            <iframe src="https://www.facebook.com/plugins/video.php"></iframe>
            <iframe src="https://ads.test/banner"></iframe>
            <iframe src="https://player.test/embed/9"></iframe>
        "#;
        assert_eq!(extract(html), Some("https://player.test/embed/9".to_string()));
    }

    #[test]
    fn test_pembed_fallback() {
        let html = r#"<div id="pembed"><iframe src="https://host.test/x"></iframe></div>"#;
        assert_eq!(extract(html), Some("https://host.test/x".to_string()));
    }

    #[test]
    fn test_no_video() {
        assert_eq!(extract("<html><body><p>Trailer soon</p></body></html>"), None);
    }

    #[test]
    fn test_unwrap_direct_mp4() {
        let opt = "https://www.khaanfilms.com/player.html?src=https%3A%2F%2Fcdn.test%2Fa.mp4";
        assert_eq!(
            unwrap_direct_mp4(opt),
            Some("https://cdn.test/a.mp4".to_string())
        );

        let opt = "https://www.khaanfilms.com/player.html?url=https%253A%252F%252Fcdn.test%252Fb.mp4";
        assert_eq!(
            unwrap_direct_mp4(opt),
            Some("https://cdn.test/b.mp4".to_string())
        );

        assert_eq!(
            unwrap_direct_mp4("https://www.khaanfilms.com/player.html?src=https%3A%2F%2Fx.test%2Fpage"),
            None
        );
        assert_eq!(unwrap_direct_mp4("not a url"), None);
    }
}
