//! Shared utility functions.
//!
//! - `fs`: atomic file replacement
//! - `slug`: URL-safe identifiers and URL cleaning for imported records
//! - `text`: character-safe truncation and whitespace folding

mod fs;
mod slug;
mod text;

pub use fs::write_atomic;
pub use slug::{clean_url, create_slug, MAX_SLUG_CHARS};
pub use text::{collapse_whitespace, truncate_chars, truncate_with_ellipsis};
