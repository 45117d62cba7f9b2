//! Locale file store: the durable state of a sync run.

use super::tree::LocaleTree;
use crate::error::StoreError;
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Persistence seam for locale trees.
pub trait LocaleStorage: Send + Sync {
    /// Read a locale. `Ok(None)` means the locale has no file yet.
    fn read(&self, locale: &str) -> Result<Option<LocaleTree>, StoreError>;

    /// Replace the stored locale with `tree`.
    fn write(&self, locale: &str, tree: &LocaleTree) -> Result<(), StoreError>;
}

/// One `<locale>.json` file per locale inside a directory.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    dir: PathBuf,
}

impl JsonFileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, locale: &str) -> PathBuf {
        self.dir.join(format!("{}.json", locale))
    }
}

/// Pretty-print with 4-space indentation and a trailing newline.
pub fn to_locale_json(locale: &str, tree: &LocaleTree) -> Result<Vec<u8>, StoreError> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    tree.serialize(&mut ser).map_err(|source| StoreError::Serialize {
        locale: locale.to_string(),
        source,
    })?;
    buf.push(b'\n');
    Ok(buf)
}

impl LocaleStorage for JsonFileStorage {
    fn read(&self, locale: &str) -> Result<Option<LocaleTree>, StoreError> {
        let path = self.path_for(locale);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(StoreError::Read { path, source }),
        };
        let tree = serde_json::from_str(&content).map_err(|source| StoreError::Parse {
            path: path.clone(),
            source,
        })?;
        Ok(Some(tree))
    }

    fn write(&self, locale: &str, tree: &LocaleTree) -> Result<(), StoreError> {
        let path = self.path_for(locale);
        std::fs::create_dir_all(&self.dir).map_err(|source| StoreError::Write {
            path: self.dir.clone(),
            source,
        })?;
        let bytes = to_locale_json(locale, tree)?;
        std::fs::write(&path, bytes).map_err(|source| StoreError::Write { path, source })
    }
}

/// In-memory base and target trees plus the storage they were loaded from.
pub struct LocaleStore {
    storage: Arc<dyn LocaleStorage>,
    base_locale: String,
    target_locales: Vec<String>,
    base: LocaleTree,
    targets: HashMap<String, LocaleTree>,
}

impl LocaleStore {
    /// Load the base locale and every target locale.
    ///
    /// A missing base file is created empty. An unreadable or malformed base file
    /// is an error. Missing or unreadable target files fall back to empty trees.
    pub fn load(
        storage: Arc<dyn LocaleStorage>,
        base_locale: &str,
        target_locales: &[String],
    ) -> Result<Self, StoreError> {
        let base = match storage.read(base_locale)? {
            Some(tree) => tree,
            None => {
                warn!(
                    "Base locale '{}' has no file yet, creating an empty one",
                    base_locale
                );
                let empty = LocaleTree::new();
                storage.write(base_locale, &empty)?;
                empty
            }
        };
        info!(
            "Loaded base locale '{}' ({} leaf keys)",
            base_locale,
            base.leaf_paths().len()
        );

        let mut targets = HashMap::new();
        for locale in target_locales {
            let tree = match storage.read(locale) {
                Ok(Some(tree)) => {
                    debug!("Loaded target locale '{}'", locale);
                    tree
                }
                Ok(None) => {
                    warn!("Locale '{}' has no file yet, starting from empty", locale);
                    LocaleTree::new()
                }
                Err(e) => {
                    warn!(
                        "Could not load locale '{}', starting from empty: {:#}",
                        locale,
                        anyhow::Error::from(e)
                    );
                    LocaleTree::new()
                }
            };
            targets.insert(locale.clone(), tree);
        }

        Ok(Self {
            storage,
            base_locale: base_locale.to_string(),
            target_locales: target_locales.to_vec(),
            base,
            targets,
        })
    }

    pub fn target_locales(&self) -> &[String] {
        &self.target_locales
    }

    pub fn base(&self) -> &LocaleTree {
        &self.base
    }

    /// Tree of any loaded locale, base included.
    pub fn tree(&self, locale: &str) -> Option<&LocaleTree> {
        if locale == self.base_locale {
            Some(&self.base)
        } else {
            self.targets.get(locale)
        }
    }

    /// Mutable tree of a target locale. The base locale is read-only.
    pub fn tree_mut(&mut self, locale: &str) -> Option<&mut LocaleTree> {
        self.targets.get_mut(locale)
    }

    /// Write the in-memory tree of `locale` back to storage.
    pub fn save(&self, locale: &str) -> Result<(), StoreError> {
        let tree = self
            .tree(locale)
            .ok_or_else(|| StoreError::UnknownLocale(locale.to_string()))?;
        self.storage.write(locale, tree)?;
        info!("Saved locale '{}'", locale);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn targets(codes: &[&str]) -> Vec<String> {
        codes.iter().map(|c| c.to_string()).collect()
    }

    fn storage(dir: &TempDir) -> Arc<JsonFileStorage> {
        Arc::new(JsonFileStorage::new(dir.path()))
    }

    #[test]
    fn test_load_creates_missing_base_file() {
        let dir = TempDir::new().unwrap();
        let store = LocaleStore::load(storage(&dir), "en", &targets(&["ru"])).unwrap();

        assert!(store.base().is_empty());
        let written = std::fs::read_to_string(dir.path().join("en.json")).unwrap();
        assert_eq!(written, "{}\n");
    }

    #[test]
    fn test_load_reads_existing_files() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("en.json"), r#"{"a": "Hello"}"#).unwrap();
        std::fs::write(dir.path().join("ru.json"), r#"{"a": "Privet"}"#).unwrap();

        let store = LocaleStore::load(storage(&dir), "en", &targets(&["ru"])).unwrap();
        assert_eq!(store.base().leaf_paths(), vec!["a"]);
        assert_eq!(
            store.tree("ru").unwrap().get("a").and_then(|n| n.as_str()),
            Some("Privet")
        );
    }

    #[test]
    fn test_load_fails_on_malformed_base() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("en.json"), "{ not json").unwrap();

        let result = LocaleStore::load(storage(&dir), "en", &targets(&["ru"]));
        assert!(matches!(result, Err(StoreError::Parse { .. })));
    }

    #[test]
    fn test_load_defaults_malformed_target_to_empty() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("en.json"), r#"{"a": "Hello"}"#).unwrap();
        std::fs::write(dir.path().join("de.json"), "[1, 2").unwrap();

        let store = LocaleStore::load(storage(&dir), "en", &targets(&["de", "fr"])).unwrap();
        assert!(store.tree("de").unwrap().is_empty());
        assert!(store.tree("fr").unwrap().is_empty());
        // Missing target files are not created on load
        assert!(!dir.path().join("fr.json").exists());
    }

    #[test]
    fn test_save_writes_four_space_indented_json() {
        let dir = TempDir::new().unwrap();
        let mut store = LocaleStore::load(storage(&dir), "en", &targets(&["ru"])).unwrap();
        store.tree_mut("ru").unwrap().set_path(&"a.b".into(), "Privet");
        store.save("ru").unwrap();

        let written = std::fs::read_to_string(dir.path().join("ru.json")).unwrap();
        assert_eq!(
            written,
            "{\n    \"a\": {\n        \"b\": \"Privet\"\n    }\n}\n"
        );
    }

    #[test]
    fn test_save_unknown_locale_fails() {
        let dir = TempDir::new().unwrap();
        let store = LocaleStore::load(storage(&dir), "en", &targets(&["ru"])).unwrap();
        assert!(matches!(store.save("xx"), Err(StoreError::UnknownLocale(_))));
    }

    #[test]
    fn test_save_creates_missing_directory() {
        let dir = TempDir::new().unwrap();
        let nested = JsonFileStorage::new(dir.path().join("nested/locales"));
        nested.write("en", &LocaleTree::new()).unwrap();
        assert!(dir.path().join("nested/locales/en.json").exists());
    }

    #[test]
    fn test_unicode_is_written_verbatim() {
        let dir = TempDir::new().unwrap();
        let files = JsonFileStorage::new(dir.path());
        let mut tree = LocaleTree::new();
        tree.set_path(&"greeting".into(), "Привет");
        files.write("ru", &tree).unwrap();

        let written = std::fs::read_to_string(files.path_for("ru")).unwrap();
        assert!(written.contains("Привет"));
        assert_eq!(files.read("ru").unwrap(), Some(tree));
    }
}
