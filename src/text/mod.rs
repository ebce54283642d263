//! Name normalization and slugs.

mod normalize;
mod slug;

pub use normalize::{normalize_name, repair_spaced_words, titleize};
pub use slug::{child_path, slugify};
