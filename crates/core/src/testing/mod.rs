//! Testing utilities and mock implementations.
//!
//! The mock fetcher lets scanner, orchestrator and server tests run the full
//! pipeline against canned pages without touching the network.
//!
//! # Example
//!
//! ```rust,ignore
//! use hashistream_core::testing::{fixtures, MockFetcher};
//!
//! let fetcher = MockFetcher::new();
//! fetcher
//!     .set_page(
//!         "https://listing.test/page/1/",
//!         fixtures::listing_page(&[("Alpha", "https://listing.test/movies/alpha/")]),
//!     )
//!     .await;
//! ```

mod mock_fetcher;

pub use mock_fetcher::MockFetcher;

/// Test fixtures and helper functions.
pub mod fixtures {
    /// Render a listing page with one card per `(title, link)`.
    pub fn listing_page(cards: &[(&str, &str)]) -> String {
        let cards: String = cards
            .iter()
            .map(|(title, link)| {
                format!(
                    r#"<article class="item movies">
  <div class="poster"><img data-src="/wp-content/uploads/{slug}-300x300.jpg"></div>
  <div class="data"><h3><a href="{link}">{title}</a></h3><span class="year">2024</span></div>
  <div class="genres"><a>Action</a></div>
</article>
"#,
                    slug = slug(title),
                    link = link,
                    title = title,
                )
            })
            .collect();
        format!("<html><body><div class=\"items\">\n{}</div></body></html>", cards)
    }

    /// Render a detail document with the given title and genre tags.
    pub fn movie_document(title: &str, genres: &[&str]) -> String {
        let tags: String = genres
            .iter()
            .map(|g| format!(r#"<a rel="tag" href="/search/label/{g}">{g}</a>"#, g = g))
            .collect();
        format!(
            r#"<html><head>
<title>{title} - cimraan khaan films</title>
<meta property="og:image" content="https://img.test/s72-c/{slug}.jpg">
<meta property="article:published_time" content="2025-01-15T10:00:00+03:00">
</head><body>
<h1 class="title">{title}</h1>
<div id="synopsis">{title} synopsis.</div>
<div class="meta">{tags}</div>
<div class="DagPlayOpt" data-embed="https://drive.google.com/file/d/{slug}/preview"></div>
</body></html>"#,
            title = title,
            slug = slug(title),
            tags = tags,
        )
    }

    /// Render a document that carries no title anywhere.
    pub fn untitled_document() -> String {
        "<html><head></head><body><p>Removed</p></body></html>".to_string()
    }

    /// Render a sitemap `urlset` listing `urls`.
    pub fn sitemap_xml(urls: &[String]) -> String {
        let entries: String = urls
            .iter()
            .map(|u| format!("  <url><loc>{}</loc></url>\n", u))
            .collect();
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n{}</urlset>",
            entries
        )
    }

    fn slug(title: &str) -> String {
        title
            .to_lowercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("-")
    }
}
