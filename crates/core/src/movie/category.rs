//! Closed category set and keyword-based resolution.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::Field;

/// Front-end shelf a title is filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Movies,
    Drama,
    Action,
    Horror,
    Comedy,
    Romance,
    Thriller,
    Adventure,
    #[serde(rename = "Sci-Fi")]
    SciFi,
    Family,
    #[serde(rename = "TV Series")]
    TvSeries,
    #[serde(rename = "Turkish Drama")]
    TurkishDrama,
}

/// Genre keyword rows, checked in order. First row with a hit wins.
const GENRE_KEYWORDS: &[(Category, &[&str])] = &[
    (Category::Drama, &["drama"]),
    (Category::Action, &["action"]),
    (Category::Horror, &["horror", "scary"]),
    (Category::Comedy, &["comedy", "funny"]),
    (Category::Romance, &["romance", "love"]),
    (Category::Thriller, &["thriller", "crime", "mystery"]),
    (Category::Adventure, &["adventure"]),
    (Category::SciFi, &["sci-fi", "fantasy"]),
    (Category::Family, &["family", "animation", "cartoon"]),
];

impl Category {
    pub const ALL: [Category; 12] = [
        Category::Movies,
        Category::Drama,
        Category::Action,
        Category::Horror,
        Category::Comedy,
        Category::Romance,
        Category::Thriller,
        Category::Adventure,
        Category::SciFi,
        Category::Family,
        Category::TvSeries,
        Category::TurkishDrama,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Movies => "Movies",
            Category::Drama => "Drama",
            Category::Action => "Action",
            Category::Horror => "Horror",
            Category::Comedy => "Comedy",
            Category::Romance => "Romance",
            Category::Thriller => "Thriller",
            Category::Adventure => "Adventure",
            Category::SciFi => "Sci-Fi",
            Category::Family => "Family",
            Category::TvSeries => "TV Series",
            Category::TurkishDrama => "Turkish Drama",
        }
    }

    /// Match genre tags against the keyword table.
    ///
    /// Returns `Defaulted(Movies)` when nothing matches.
    pub fn from_genres(genres: &[String]) -> Field<Category> {
        let text = genres.join(" ").to_lowercase();
        GENRE_KEYWORDS
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| text.contains(k)))
            .map(|(category, _)| Field::Found(*category))
            .unwrap_or(Field::Defaulted(Category::Movies))
    }

    /// Full resolution: series and Turkish hints take precedence over genres.
    pub fn resolve(title: &str, link: &str, genres: &[String]) -> Field<Category> {
        let title_lower = title.to_lowercase();
        let genre_text = genres.join(" ").to_lowercase();

        let is_series = title_lower.contains("musalsal")
            || title.contains("Season")
            || title_lower.split(|c: char| !c.is_alphanumeric()).any(|w| w == "tv")
            || link.contains("tvshows")
            || genre_text.contains("series");
        if is_series {
            return Field::Found(Category::TvSeries);
        }

        if genre_text.contains("turkish") || title_lower.contains("turki") {
            return Field::Found(Category::TurkishDrama);
        }

        Self::from_genres(genres)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
