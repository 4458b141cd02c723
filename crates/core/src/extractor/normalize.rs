//! Field normalization shared by every extractor.

use chrono::{DateTime, Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex_lite::Regex;

use crate::movie::{Field, DEFAULT_YEAR, PLACEHOLDER_THUMBNAIL};

static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(?:19|20)\d{2}\b").unwrap());

/// Tags that describe the post rather than the film.
const STOP_TAGS: &[&str] = &["Movie", "Completed", "India"];

/// Thumbnail size variants rewritten to a poster-sized image.
const THUMBNAIL_UPGRADES: &[(&str, &str)] = &[
    ("-150x150", ""),
    ("-300x300", ""),
    ("w185", "w500"),
    ("/s72-c/", "/w500-h750-c/"),
    ("/w1200/", "/w500/"),
];

/// Collapse runs of whitespace into single spaces and trim.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Trim tags, drop empties and stop tags, and remove duplicates in order.
pub fn clean_genres<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut genres: Vec<String> = Vec::new();
    for tag in tags {
        let tag = collapse_whitespace(tag.as_ref());
        if tag.is_empty() || STOP_TAGS.contains(&tag.as_str()) || genres.contains(&tag) {
            continue;
        }
        genres.push(tag);
    }
    genres
}

/// Resolve a release year.
///
/// Tries the published timestamp first, then the first plausible year in
/// `text`, and falls back to `DEFAULT_YEAR`.
pub fn detect_year(published: Option<&str>, text: &str) -> Field<i32> {
    if let Some(year) = published.and_then(parse_published_year) {
        return Field::Found(year);
    }

    YEAR_RE
        .find(text)
        .and_then(|m| m.as_str().parse().ok())
        .map(Field::Found)
        .unwrap_or(Field::Defaulted(DEFAULT_YEAR))
}

fn parse_published_year(raw: &str) -> Option<i32> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.year());
    }
    raw.get(..10)
        .and_then(|date| NaiveDate::parse_from_str(date, "%Y-%m-%d").ok())
        .map(|d| d.year())
}

/// Absolutize a thumbnail URL against `origin` and upgrade its size.
///
/// A missing or blank thumbnail becomes the placeholder image.
pub fn normalize_thumbnail(raw: Option<&str>, origin: &str) -> Field<String> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Field::Defaulted(PLACEHOLDER_THUMBNAIL.to_string());
    };

    let mut url = if let Some(rest) = raw.strip_prefix("//") {
        format!("https://{}", rest)
    } else if raw.starts_with('/') {
        format!("{}{}", origin.trim_end_matches('/'), raw)
    } else {
        raw.to_string()
    };

    for (from, to) in THUMBNAIL_UPGRADES {
        url = url.replace(from, to);
    }

    Field::Found(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  The \n  Movie\t2024 "), "The Movie 2024");
        assert_eq!(collapse_whitespace("   "), "");
    }

    #[test]
    fn test_clean_genres_dedups_in_order() {
        let genres = clean_genres(["Action", " Drama ", "Action", "", "Movie", "Completed"]);
        assert_eq!(genres, vec!["Action", "Drama"]);
    }

    #[test]
    fn test_year_from_published_time() {
        assert_eq!(
            detect_year(Some("2023-05-01T10:00:00+03:00"), "Title 2019"),
            Field::Found(2023)
        );
        assert_eq!(detect_year(Some("2022-11-30"), ""), Field::Found(2022));
    }

    #[test]
    fn test_year_from_text() {
        assert_eq!(detect_year(None, "Film Cusub 2025 HD"), Field::Found(2025));
        assert_eq!(detect_year(Some("garbage"), "Old 1998"), Field::Found(1998));
    }

    #[test]
    fn test_year_ignores_embedded_digits() {
        assert_eq!(detect_year(None, "Agent 120245"), Field::Defaulted(DEFAULT_YEAR));
    }

    #[test]
    fn test_year_default() {
        assert_eq!(detect_year(None, "No year here"), Field::Defaulted(DEFAULT_YEAR));
    }

    #[test]
    fn test_thumbnail_placeholder() {
        assert_eq!(
            normalize_thumbnail(None, "https://site.test"),
            Field::Defaulted(PLACEHOLDER_THUMBNAIL.to_string())
        );
        assert!(normalize_thumbnail(Some("  "), "https://site.test").is_defaulted());
    }

    #[test]
    fn test_thumbnail_absolutized() {
        assert_eq!(
            normalize_thumbnail(Some("//cdn.test/a.jpg"), "https://site.test"),
            Field::Found("https://cdn.test/a.jpg".to_string())
        );
        assert_eq!(
            normalize_thumbnail(Some("/img/a.jpg"), "https://site.test/"),
            Field::Found("https://site.test/img/a.jpg".to_string())
        );
    }

    #[test]
    fn test_thumbnail_upgraded() {
        assert_eq!(
            normalize_thumbnail(Some("https://c.test/p-150x150.jpg"), "https://site.test"),
            Field::Found("https://c.test/p.jpg".to_string())
        );
        assert_eq!(
            normalize_thumbnail(Some("https://img.test/t/p/w185/x.jpg"), "https://site.test"),
            Field::Found("https://img.test/t/p/w500/x.jpg".to_string())
        );
        assert_eq!(
            normalize_thumbnail(Some("https://bp.test/s72-c/x.jpg"), "https://site.test"),
            Field::Found("https://bp.test/w500-h750-c/x.jpg".to_string())
        );
    }
}
