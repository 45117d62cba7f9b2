use crate::i18n::ValidationResult;
use std::path::PathBuf;
use thiserror::Error;

/// Failure to obtain an acceptable translation for a single string.
#[derive(Error, Debug)]
pub enum TranslationError {
    /// The translation API call failed (network, timeout, non-2xx, bad body).
    ///
    /// The cause chain is rendered into the message, so it is not also exposed
    /// through `source()`.
    #[error("Translation of {text:?} to '{locale}' failed: {cause:#}")]
    Api {
        text: String,
        locale: String,
        cause: anyhow::Error,
    },

    /// The API answered, but the answer did not pass validation.
    #[error("Translation for key '{key}' ({locale}) failed validation: {}", .result.summary())]
    Validation {
        key: String,
        locale: String,
        result: ValidationResult,
    },
}

impl TranslationError {
    /// Target locale the failed translation was meant for
    pub fn locale(&self) -> &str {
        match self {
            TranslationError::Api { locale, .. } | TranslationError::Validation { locale, .. } => {
                locale
            }
        }
    }
}

/// Locale file I/O failures.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to read locale file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse locale file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write locale file {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize locale '{locale}'")]
    Serialize {
        locale: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Locale '{0}' is not loaded")]
    UnknownLocale(String),

    #[error("Locale file {0} does not exist")]
    NotFound(PathBuf),
}
