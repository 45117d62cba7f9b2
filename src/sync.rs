//! Fills every target locale with translations of the base keys it lacks.

use crate::config::{Config, LocaleSettings};
use crate::context::{ContextStrategy, ParentJsonContext};
use crate::error::{StoreError, TranslationError};
use crate::locale::{
    expand_to_leaves, find_missing, JsonFileStorage, KeyPath, LocaleNode, LocaleStorage, LocaleStore,
};
use crate::openai::TranslationBackend;
use crate::translation::{TranslationManager, TranslationOptions};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// How one target locale ended.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LocaleStatus {
    /// All missing strings translated and the file written.
    Completed,
    /// A string could not be translated; nothing was written for this locale.
    Failed { key: String, error: String },
    /// Translation finished but the file could not be written.
    SaveFailed { error: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct LocaleOutcome {
    pub locale: String,
    /// Missing leaf keys found before the run
    pub missing: usize,
    pub translated: usize,
    #[serde(flatten)]
    pub status: LocaleStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub locales: Vec<LocaleOutcome>,
}

impl SyncReport {
    pub fn has_failures(&self) -> bool {
        self.locales
            .iter()
            .any(|outcome| outcome.status != LocaleStatus::Completed)
    }

    pub fn translated_total(&self) -> usize {
        self.locales.iter().map(|outcome| outcome.translated).sum()
    }
}

/// Orchestrates store, differ and translator for one set of locales.
pub struct LocaleSync {
    store: LocaleStore,
    translator: TranslationManager,
    context: Box<dyn ContextStrategy>,
}

impl LocaleSync {
    /// Load the locale files named by `config` and start the cache sweeper.
    ///
    /// Must be called inside a tokio runtime.
    pub fn new(config: &Config, backend: Arc<dyn TranslationBackend>) -> Result<Self, StoreError> {
        let storage = Arc::new(JsonFileStorage::new(&config.locales.locales_dir));
        Self::with_storage(
            storage,
            &config.locales,
            TranslationOptions::from_config(config),
            backend,
        )
    }

    pub fn with_storage(
        storage: Arc<dyn LocaleStorage>,
        locales: &LocaleSettings,
        options: TranslationOptions,
        backend: Arc<dyn TranslationBackend>,
    ) -> Result<Self, StoreError> {
        let store = LocaleStore::load(storage, &locales.base_locale, &locales.target_locales)?;
        let mut translator = TranslationManager::new(options, backend);
        translator.start();
        Ok(Self {
            store,
            translator,
            context: Box::new(ParentJsonContext),
        })
    }

    pub fn with_context_strategy(mut self, strategy: Box<dyn ContextStrategy>) -> Self {
        self.context = strategy;
        self
    }

    pub fn store(&self) -> &LocaleStore {
        &self.store
    }

    pub fn translator(&self) -> &TranslationManager {
        &self.translator
    }

    /// Stop background work. The instance stays usable for reads.
    pub fn shutdown(&mut self) {
        self.translator.stop();
    }

    /// Missing leaf keys of every target locale, in configured order.
    ///
    /// Subtrees the target lacks entirely are expanded to their leaves.
    pub fn find_missing_translations(&self) -> Vec<(String, Vec<KeyPath>)> {
        let base = self.store.base();
        self.store
            .target_locales()
            .iter()
            .map(|locale| {
                let missing = match self.store.tree(locale) {
                    Some(target) => expand_to_leaves(base, &find_missing(base, target)),
                    None => base.leaf_paths(),
                };
                (locale.clone(), missing)
            })
            .collect()
    }

    /// Translate every missing key of every target locale and save each locale once.
    ///
    /// Locales are independent: a failed locale is left unsaved and the run
    /// moves on to the next one.
    pub async fn translate_missing(&mut self) -> SyncReport {
        let started_at = Utc::now();
        let mut outcomes = Vec::new();

        for (locale, missing) in self.find_missing_translations() {
            info!("Locale '{}': {} missing keys", locale, missing.len());

            let outcome = match self.translate_locale(&locale, &missing).await {
                Ok(translated) => {
                    let status = match self.store.save(&locale) {
                        Ok(()) => LocaleStatus::Completed,
                        Err(e) => {
                            let e = anyhow::Error::from(e);
                            error!("Failed to save locale '{}': {:#}", locale, e);
                            LocaleStatus::SaveFailed {
                                error: format!("{:#}", e),
                            }
                        }
                    };
                    LocaleOutcome {
                        locale,
                        missing: missing.len(),
                        translated,
                        status,
                    }
                }
                Err((translated, key, e)) => {
                    error!(
                        "Locale '{}' stopped at key '{}' after {} translations: {}",
                        locale, key, translated, e
                    );
                    LocaleOutcome {
                        locale,
                        missing: missing.len(),
                        translated,
                        status: LocaleStatus::Failed {
                            key,
                            error: e.to_string(),
                        },
                    }
                }
            };
            outcomes.push(outcome);
        }

        SyncReport {
            started_at,
            finished_at: Utc::now(),
            locales: outcomes,
        }
    }

    async fn translate_locale(
        &mut self,
        locale: &str,
        missing: &[KeyPath],
    ) -> Result<usize, (usize, String, TranslationError)> {
        let mut translated = 0;
        for path in missing {
            let base = self.store.base();
            let key = path.to_string();
            let text = match base.get_path(path) {
                Some(LocaleNode::Leaf(text)) => text.clone(),
                Some(_) => {
                    debug!("Skipping non-string value at '{}'", key);
                    continue;
                }
                None => {
                    warn!("Key '{}' is not in the base locale, skipping", key);
                    continue;
                }
            };
            let context = self.context.context_for(base, path);

            let value = self
                .translator
                .translate_with_retry(&key, &text, context.as_deref(), locale)
                .await
                .map_err(|e| (translated, key.clone(), e))?;

            if let Some(target) = self.store.tree_mut(locale) {
                target.set_path(path, value);
                translated += 1;
                debug!("Translated '{}' ({})", key, locale);
            }
        }
        Ok(translated)
    }
}
