//! Extractor contracts.

use std::fmt;

use crate::movie::MovieDraft;

/// Why a document contributed no record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No usable title could be resolved.
    NoTitle,
    /// A listing card had no link to its detail page.
    NoLink,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::NoTitle => "no_title",
            SkipReason::NoLink => "no_link",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of extracting one document (or one listing card).
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    Movie(MovieDraft),
    Skip(SkipReason),
}

impl Extraction {
    pub fn into_movie(self) -> Option<MovieDraft> {
        match self {
            Extraction::Movie(draft) => Some(draft),
            Extraction::Skip(_) => None,
        }
    }
}

/// Extracts one movie from one detail document.
pub trait DocumentExtractor: Send + Sync {
    /// Name recorded as `source` on every draft.
    fn source_name(&self) -> &str;

    /// Whether a URL found in a sitemap points at a movie document.
    fn accepts(&self, _url: &str) -> bool {
        true
    }

    fn extract(&self, document: &str, source_url: &str) -> Extraction;
}

/// Extracts every movie card from one listing page.
pub trait ListingExtractor: Send + Sync {
    /// Name recorded as `source` on every draft.
    fn source_name(&self) -> &str;

    fn extract_page(&self, page: &str, page_url: &str) -> Vec<Extraction>;
}

/// Finds the playable video link in one detail document.
pub trait VideoExtractor: Send + Sync {
    fn extract_video(&self, document: &str, source_url: &str) -> Option<String>;
}
