//! Detail-document extractor for the sitemap source.

use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use url::Url;

use crate::movie::{Category, Field, MovieDraft};

use super::normalize::{clean_genres, collapse_whitespace, detect_year, normalize_thumbnail};
use super::video::{player_options, unwrap_direct_mp4};
use super::{DocumentExtractor, Extraction, SkipReason};

static HEADING: Lazy<Selector> = Lazy::new(|| Selector::parse("h1.title").unwrap());
static TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse("title").unwrap());
static OG_IMAGE: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"meta[property="og:image"]"#).unwrap());
static INFO_THUMB: Lazy<Selector> = Lazy::new(|| Selector::parse("#info .thumb img").unwrap());
static SYNOPSIS: Lazy<Selector> = Lazy::new(|| Selector::parse("#synopsis").unwrap());
static META_DESCRIPTION: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"meta[name="description"]"#).unwrap());
static PUBLISHED: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"meta[property="article:published_time"]"#).unwrap());
static TAGS: Lazy<Selector> = Lazy::new(|| Selector::parse(r#".meta a[rel="tag"]"#).unwrap());
static PLAYER_OPTION: Lazy<Selector> = Lazy::new(|| Selector::parse(".DagPlayOpt").unwrap());
static PEMBED_IFRAME: Lazy<Selector> = Lazy::new(|| Selector::parse("#pembed iframe").unwrap());

/// Suffix the site appends to every `<title>`.
const TITLE_SUFFIX: &str = "- cimraan khaan films";

/// Host of the site's own player wrapper.
const WRAPPER_HOST: &str = "khaanfilms.com";

/// Mirror host whose embeds never play outside the site.
const BLOCKED_MIRROR: &str = "soomflare";

/// Extracts one movie per detail document.
#[derive(Debug, Clone)]
pub struct KhaanFilmsExtractor {
    source_name: String,
}

impl KhaanFilmsExtractor {
    pub fn new(source_name: impl Into<String>) -> Self {
        Self {
            source_name: source_name.into(),
        }
    }

    fn title(html: &Html) -> String {
        let heading = html
            .select(&HEADING)
            .next()
            .map(|el| collapse_whitespace(&el.text().collect::<String>()))
            .unwrap_or_default();
        if !heading.is_empty() {
            return heading;
        }

        html.select(&TITLE)
            .next()
            .map(|el| {
                let raw = el.text().collect::<String>().replace(TITLE_SUFFIX, "");
                collapse_whitespace(&raw)
            })
            .unwrap_or_default()
    }

    /// Pick the playable link from the document's player options.
    fn video(html: &Html) -> Option<String> {
        let options = player_options(html, &PLAYER_OPTION);

        let deep = options
            .iter()
            .filter(|o| o.contains(WRAPPER_HOST) && o.contains("src="))
            .find_map(|o| unwrap_direct_mp4(o));
        if deep.is_some() {
            return deep;
        }

        if let Some(drive) = options.iter().find(|o| o.contains("drive.google.com")) {
            return Some(drive.clone());
        }

        if let Some(wrapper) = options
            .iter()
            .find(|o| o.contains(WRAPPER_HOST) && !o.contains(BLOCKED_MIRROR))
        {
            return Some(wrapper.clone());
        }

        html.select(&PEMBED_IFRAME)
            .next()
            .and_then(|el| el.value().attr("src"))
            .map(str::trim)
            .filter(|src| !src.is_empty() && !src.contains(BLOCKED_MIRROR))
            .map(str::to_string)
    }
}

impl Default for KhaanFilmsExtractor {
    fn default() -> Self {
        Self::new("khaanfilms.com")
    }
}

impl DocumentExtractor for KhaanFilmsExtractor {
    fn source_name(&self) -> &str {
        &self.source_name
    }

    fn accepts(&self, url: &str) -> bool {
        url.contains(".html") && !url.contains("/p/") && !url.contains("/search")
    }

    fn extract(&self, document: &str, source_url: &str) -> Extraction {
        let html = Html::parse_document(document);

        let title = Self::title(&html);
        if title.is_empty() {
            return Extraction::Skip(SkipReason::NoTitle);
        }

        let image = html
            .select(&OG_IMAGE)
            .next()
            .and_then(|el| el.value().attr("content"))
            .filter(|s| !s.trim().is_empty())
            .or_else(|| {
                html.select(&INFO_THUMB)
                    .next()
                    .and_then(|el| el.value().attr("src"))
            });
        let origin = Url::parse(source_url)
            .map(|u| u.origin().ascii_serialization())
            .unwrap_or_default();

        let synopsis = html
            .select(&SYNOPSIS)
            .next()
            .map(|el| collapse_whitespace(&el.text().collect::<String>()))
            .filter(|s| !s.is_empty())
            .or_else(|| {
                html.select(&META_DESCRIPTION)
                    .next()
                    .and_then(|el| el.value().attr("content"))
                    .map(collapse_whitespace)
                    .filter(|s| !s.is_empty())
            });

        let published = html
            .select(&PUBLISHED)
            .next()
            .and_then(|el| el.value().attr("content"));

        let genres = clean_genres(
            html.select(&TAGS)
                .map(|el| el.text().collect::<String>()),
        );

        let mut draft = MovieDraft::new(title, source_url, self.source_name.clone());
        draft.thumbnail = normalize_thumbnail(image, &origin);
        draft.description = Field::from_option(synopsis, String::new());
        draft.year = detect_year(published, &draft.title);
        draft.category = Category::resolve(&draft.title, &draft.link, &genres);
        draft.genres = genres;
        draft.video_url = Self::video(&html);

        Extraction::Movie(draft)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::movie::DEFAULT_YEAR;

    const URL: &str = "https://www.khaanfilms.test/2024/05/qalbi.html";

    fn extract(html: &str) -> Extraction {
        KhaanFilmsExtractor::default().extract(html, URL)
    }

    #[test]
    fn test_accepts_only_movie_documents() {
        let ex = KhaanFilmsExtractor::default();
        assert!(ex.accepts("https://www.khaanfilms.test/2024/05/qalbi.html"));
        assert!(!ex.accepts("https://www.khaanfilms.test/p/about.html"));
        assert!(!ex.accepts("https://www.khaanfilms.test/search/label/Action"));
        assert!(!ex.accepts("https://www.khaanfilms.test/2024/05/"));
    }

    #[test]
    fn test_full_document() {
        let html = r##"
            <html><head>
              <title>Qalbi Turki - cimraan khaan films</title>
              <meta property="og:image" content="https://bp.test/s72-c/qalbi.jpg">
              <meta property="article:published_time" content="2025-02-10T08:00:00+03:00">
            </head><body>
              <h1 class="title"> Qalbi </h1>
              <div id="synopsis"> A  story   of love. </div>
              <div class="meta">
                <a rel="tag" href="#">Movie</a><a rel="tag" href="#">Romance</a><a rel="tag" href="#">India</a>
              </div>
              <div class="DagPlayOpt" data-embed="https://soomflare.xyz/e/1"></div>
              <div class="DagPlayOpt" data-embed="https://www.khaanfilms.com/player.html?src=https%3A%2F%2Fcdn.test%2Fq.mp4"></div>
            </body></html>
        "##;

        let draft = extract(html).into_movie().unwrap();

        assert_eq!(draft.title, "Qalbi");
        assert_eq!(draft.link, URL);
        assert_eq!(draft.source, "khaanfilms.com");
        assert_eq!(
            draft.thumbnail,
            Field::Found("https://bp.test/w500-h750-c/qalbi.jpg".to_string())
        );
        assert_eq!(draft.description, Field::Found("A story of love.".to_string()));
        assert_eq!(draft.year, Field::Found(2025));
        assert_eq!(draft.genres, vec!["Romance"]);
        assert_eq!(draft.category, Field::Found(Category::Romance));
        assert_eq!(draft.video_url.as_deref(), Some("https://cdn.test/q.mp4"));
    }

    #[test]
    fn test_title_from_head_and_defaults() {
        let html = r#"<html><head><title>Dhiig Cas 2019 - cimraan khaan films</title></head>
            <body></body></html>"#;

        let draft = extract(html).into_movie().unwrap();

        assert_eq!(draft.title, "Dhiig Cas 2019");
        assert_eq!(draft.year, Field::Found(2019));
        assert!(draft.thumbnail.is_defaulted());
        assert_eq!(draft.description, Field::Defaulted(String::new()));
        assert_eq!(draft.category, Field::Defaulted(Category::Movies));
        assert_eq!(draft.video_url, None);
    }

    #[test]
    fn test_meta_description_and_info_thumb() {
        let html = r#"<html><head>
              <meta name="description" content="Short blurb">
            </head><body>
              <h1 class="title">Plain</h1>
              <div id="info"><div class="thumb"><img src="/img/plain.jpg"></div></div>
            </body></html>"#;

        let draft = extract(html).into_movie().unwrap();

        assert_eq!(draft.description, Field::Found("Short blurb".to_string()));
        assert_eq!(
            draft.thumbnail,
            Field::Found("https://www.khaanfilms.test/img/plain.jpg".to_string())
        );
        assert_eq!(draft.year, Field::Defaulted(DEFAULT_YEAR));
    }

    #[test]
    fn test_empty_title_is_skipped() {
        let html = r#"<html><head><title> - cimraan khaan films</title></head><body></body></html>"#;
        assert_eq!(extract(html), Extraction::Skip(SkipReason::NoTitle));
    }

    #[test]
    fn test_video_priority() {
        let drive = r#"<h1 class="title">X</h1>
            <div class="DagPlayOpt" data-embed="https://www.khaanfilms.com/player.html?id=3"></div>
            <div class="DagPlayOpt" data-embed="https://drive.google.com/file/d/abc/preview"></div>"#;
        assert_eq!(
            extract(drive).into_movie().unwrap().video_url.as_deref(),
            Some("https://drive.google.com/file/d/abc/preview")
        );

        let wrapper = r#"<h1 class="title">X</h1>
            <div class="DagPlayOpt" data-embed="https://www.khaanfilms.com/soomflare/7"></div>
            <div class="DagPlayOpt" data-embed="https://www.khaanfilms.com/player.html?id=3"></div>"#;
        assert_eq!(
            extract(wrapper).into_movie().unwrap().video_url.as_deref(),
            Some("https://www.khaanfilms.com/player.html?id=3")
        );

        let blocked_frame = r#"<h1 class="title">X</h1>
            <div id="pembed"><iframe src="https://soomflare.xyz/e/2"></iframe></div>"#;
        assert_eq!(extract(blocked_frame).into_movie().unwrap().video_url, None);

        let frame = r#"<h1 class="title">X</h1>
            <div id="pembed"><iframe src="https://player.test/e/2"></iframe></div>"#;
        assert_eq!(
            extract(frame).into_movie().unwrap().video_url.as_deref(),
            Some("https://player.test/e/2")
        );
    }
}
