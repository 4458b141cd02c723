//! Movie record types.

use serde::{Deserialize, Serialize};

use super::Category;

/// Year assumed when a document carries no usable date.
pub const DEFAULT_YEAR: i32 = 2024;

/// Rating assigned to every scraped title (the sources publish none).
pub const DEFAULT_RATING: f64 = 4.5;

/// Quality label assigned when the source does not state one.
pub const DEFAULT_QUALITY: &str = "HD";

/// Thumbnail used when a document has no poster image.
pub const PLACEHOLDER_THUMBNAIL: &str = "https://via.placeholder.com/300x450?text=No+Image";

/// Titles from this year onward are flagged as new releases.
pub const NEW_RELEASE_YEAR: i32 = 2025;

/// A best-effort extracted value.
///
/// Extractors never fail on a missing optional field; they fall back to a
/// documented default and record that they did so.
#[derive(Debug, Clone, PartialEq)]
pub enum Field<T> {
    /// The value was read from the document.
    Found(T),
    /// The document had nothing usable; this is the default.
    Defaulted(T),
}

impl<T> Field<T> {
    /// Borrow the value regardless of provenance.
    pub fn value(&self) -> &T {
        match self {
            Field::Found(v) | Field::Defaulted(v) => v,
        }
    }

    /// Take the value regardless of provenance.
    pub fn into_value(self) -> T {
        match self {
            Field::Found(v) | Field::Defaulted(v) => v,
        }
    }

    pub fn is_defaulted(&self) -> bool {
        matches!(self, Field::Defaulted(_))
    }

    /// `Found(v)` when present, otherwise `Defaulted(default)`.
    pub fn from_option(value: Option<T>, default: T) -> Self {
        match value {
            Some(v) => Field::Found(v),
            None => Field::Defaulted(default),
        }
    }
}

/// A movie extracted from a source document, not yet admitted to the cache.
#[derive(Debug, Clone, PartialEq)]
pub struct MovieDraft {
    /// Canonical identity key: the source document URL.
    pub link: String,
    /// Non-empty, whitespace-normalized title.
    pub title: String,
    /// Name of the source that produced this draft.
    pub source: String,
    pub thumbnail: Field<String>,
    pub year: Field<i32>,
    pub category: Field<Category>,
    /// Genre tags in source order, without duplicates.
    pub genres: Vec<String>,
    pub rating: Field<f64>,
    pub description: Field<String>,
    pub quality: Field<String>,
    pub video_url: Option<String>,
}

impl MovieDraft {
    /// Create a draft with every best-effort field defaulted.
    pub fn new(
        title: impl Into<String>,
        link: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            link: link.into(),
            title: title.into(),
            source: source.into(),
            thumbnail: Field::Defaulted(PLACEHOLDER_THUMBNAIL.to_string()),
            year: Field::Defaulted(DEFAULT_YEAR),
            category: Field::Defaulted(Category::Movies),
            genres: Vec::new(),
            rating: Field::Defaulted(DEFAULT_RATING),
            description: Field::Defaulted(String::new()),
            quality: Field::Defaulted(DEFAULT_QUALITY.to_string()),
            video_url: None,
        }
    }

    /// The key used for cache-wide deduplication.
    pub fn identity_key(&self) -> &str {
        &self.link
    }

    /// Turn this draft into an admitted record with the given id.
    pub fn admit(self, id: u64) -> MovieRecord {
        let year = self.year.into_value();
        MovieRecord {
            id,
            title: self.title,
            identity_key: self.link,
            thumbnail_url: self.thumbnail.into_value(),
            year,
            category: self.category.into_value(),
            genres: self.genres,
            rating: self.rating.into_value(),
            imdb_rating: None,
            description: self.description.into_value(),
            quality: self.quality.into_value(),
            duration: None,
            is_new: year >= NEW_RELEASE_YEAR,
            source_name: self.source,
            video_url: self.video_url,
        }
    }
}

/// One admitted title. Immutable once it is in the cache.
///
/// Serialized with the field names the front-end and the snapshot file use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieRecord {
    pub id: u64,
    pub title: String,
    /// Source document URL; unique across the cache.
    #[serde(rename = "link")]
    pub identity_key: String,
    #[serde(rename = "thumbnail", default)]
    pub thumbnail_url: String,
    pub year: i32,
    pub category: Category,
    #[serde(default)]
    pub genres: Vec<String>,
    pub rating: f64,
    #[serde(default)]
    pub imdb_rating: Option<f64>,
    #[serde(default)]
    pub description: String,
    pub quality: String,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub is_new: bool,
    #[serde(rename = "source")]
    pub source_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
}

impl MovieRecord {
    /// Recompute derived fields after loading from an external file.
    pub fn normalize(mut self) -> Self {
        self.is_new = self.year >= NEW_RELEASE_YEAR;
        self
    }
}
