//! Locale trees, their on-disk store, and missing-key detection.
//!
//! - `tree`: recursive `LocaleTree` / `LocaleNode` model addressed by `KeyPath`
//! - `store`: loading and saving `<locale>.json` files
//! - `differ`: which base keys a target locale still lacks

mod differ;
mod store;
mod tree;

pub use differ::{expand_to_leaves, find_missing};
pub use store::{JsonFileStorage, LocaleStorage, LocaleStore};
pub use tree::{KeyPath, LocaleNode, LocaleTree, PATH_SEPARATOR};
