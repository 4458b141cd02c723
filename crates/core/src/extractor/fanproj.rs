//! Listing-page extractor for the paginated source.

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::movie::{Category, Field, MovieDraft};

use super::normalize::{clean_genres, collapse_whitespace, detect_year, normalize_thumbnail};
use super::{Extraction, ListingExtractor, SkipReason};

static CARD: Lazy<Selector> = Lazy::new(|| Selector::parse("article, div.item").unwrap());
static TITLE_LINK: Lazy<Selector> =
    Lazy::new(|| Selector::parse("h2 a, .data h3 a, h3 a, a.tip, .title a").unwrap());
static TITLE_TEXT: Lazy<Selector> = Lazy::new(|| Selector::parse("h2, h3, .title").unwrap());
static ANY_LINK: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());
static IMAGE: Lazy<Selector> = Lazy::new(|| Selector::parse("img").unwrap());
static YEAR: Lazy<Selector> = Lazy::new(|| Selector::parse(".year, .date").unwrap());
static GENRE: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(
        ".genres a, .sgeneros a, .category a, a[rel=\"category tag\"], [class*=\"genre\"] a",
    )
    .unwrap()
});

/// Extracts movie cards from a paginated listing page.
#[derive(Debug, Clone)]
pub struct FanprojListingExtractor {
    source_name: String,
}

impl FanprojListingExtractor {
    pub fn new(source_name: impl Into<String>) -> Self {
        Self {
            source_name: source_name.into(),
        }
    }

    fn extract_card(&self, card: ElementRef<'_>, base: Option<&Url>) -> Extraction {
        let title_link = card.select(&TITLE_LINK).next();

        let mut title = title_link.map(element_text).unwrap_or_default();
        if title.is_empty() {
            title = card
                .select(&TITLE_TEXT)
                .next()
                .map(element_text)
                .unwrap_or_default();
        }
        if title.is_empty() {
            title = title_link
                .and_then(|a| a.value().attr("title"))
                .map(collapse_whitespace)
                .unwrap_or_default();
        }
        if title.is_empty() {
            return Extraction::Skip(SkipReason::NoTitle);
        }

        let href = title_link
            .and_then(|a| a.value().attr("href"))
            .or_else(|| card.select(&ANY_LINK).next().and_then(|a| a.value().attr("href")));
        let Some(link) = href.and_then(|h| resolve_link(h, base)) else {
            return Extraction::Skip(SkipReason::NoLink);
        };

        let image = card.select(&IMAGE).next().and_then(|img| {
            let attrs = img.value();
            attrs
                .attr("data-original")
                .or_else(|| attrs.attr("data-src"))
                .or_else(|| attrs.attr("src"))
        });
        let origin = base
            .map(|u| u.origin().ascii_serialization())
            .unwrap_or_default();

        let genres = clean_genres(card.select(&GENRE).map(element_text));

        let year_text = card
            .select(&YEAR)
            .map(element_text)
            .find(|t| !t.is_empty())
            .unwrap_or_default();
        let year = match detect_year(None, &year_text) {
            Field::Found(year) => Field::Found(year),
            Field::Defaulted(_) => detect_year(None, &title),
        };

        let mut draft = MovieDraft::new(title, link, self.source_name.clone());
        draft.thumbnail = normalize_thumbnail(image, &origin);
        draft.year = year;
        draft.category = Category::resolve(&draft.title, &draft.link, &genres);
        draft.genres = genres;

        Extraction::Movie(draft)
    }
}

impl Default for FanprojListingExtractor {
    fn default() -> Self {
        Self::new("fanproj.net")
    }
}

impl ListingExtractor for FanprojListingExtractor {
    fn source_name(&self) -> &str {
        &self.source_name
    }

    fn extract_page(&self, page: &str, page_url: &str) -> Vec<Extraction> {
        let document = Html::parse_document(page);
        let base = Url::parse(page_url).ok();
        document
            .select(&CARD)
            .map(|card| self.extract_card(card, base.as_ref()))
            .collect()
    }
}

fn element_text(el: ElementRef<'_>) -> String {
    collapse_whitespace(&el.text().collect::<String>())
}

fn resolve_link(href: &str, base: Option<&Url>) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }
    match base {
        Some(base) => base.join(href).ok().map(|u| u.to_string()),
        None => Url::parse(href).ok().map(|u| u.to_string()),
    }
}
