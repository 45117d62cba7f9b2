//! Disambiguation context sent to the translator alongside each string.

use crate::locale::{KeyPath, LocaleTree};
use tracing::debug;

/// Produces context for the base-locale string at `path`.
pub trait ContextStrategy: Send + Sync {
    fn context_for(&self, base: &LocaleTree, path: &KeyPath) -> Option<String>;
}

/// Serialises the parent object of the key to JSON, so the model sees the
/// sibling strings of the same UI section. Top-level keys get the whole root.
#[derive(Debug, Default, Clone, Copy)]
pub struct ParentJsonContext;

impl ContextStrategy for ParentJsonContext {
    fn context_for(&self, base: &LocaleTree, path: &KeyPath) -> Option<String> {
        let parent = base.parent_of(path)?;
        match serde_json::to_string(parent) {
            Ok(json) => Some(json),
            Err(e) => {
                debug!("Could not serialise context for '{}': {}", path, e);
                None
            }
        }
    }
}

/// Sends every string without context.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoContext;

impl ContextStrategy for NoContext {
    fn context_for(&self, _base: &LocaleTree, _path: &KeyPath) -> Option<String> {
        None
    }
}
