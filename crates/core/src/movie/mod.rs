//! Movie records and their category taxonomy.
//!
//! A `MovieDraft` is what an extractor produces: every best-effort field
//! remembers whether it was found in the document or filled with a default.
//! The merge engine turns a draft into an immutable `MovieRecord` by giving
//! it an id.

mod category;
mod types;

pub use category::Category;
pub use types::{
    Field, MovieDraft, MovieRecord, DEFAULT_QUALITY, DEFAULT_RATING, DEFAULT_YEAR,
    NEW_RELEASE_YEAR, PLACEHOLDER_THUMBNAIL,
};
