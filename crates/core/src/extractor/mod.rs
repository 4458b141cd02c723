//! Source-specific extraction behind source-agnostic traits.
//!
//! The scanners only see `Extraction` values; how a site's markup maps to a
//! `MovieDraft` stays inside the implementations here. Every implementation
//! follows the same policy: no title means `Skip`, anything else that is
//! missing degrades to a default recorded as `Field::Defaulted`.

mod fanproj;
mod khaanfilms;
mod normalize;
mod types;
mod video;

pub use fanproj::FanprojListingExtractor;
pub use khaanfilms::KhaanFilmsExtractor;
pub use normalize::{clean_genres, collapse_whitespace, detect_year, normalize_thumbnail};
pub use types::{DocumentExtractor, Extraction, ListingExtractor, SkipReason, VideoExtractor};
pub use video::EmbedVideoExtractor;
