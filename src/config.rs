use crate::cache::CacheOptions;
use crate::i18n::{ValidationRules, ValidationRulesOverrides};
use crate::openai::{OpenAiSettings, DEFAULT_BASE_URL, DEFAULT_MODEL};
use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Where the locale files live and which locales take part.
#[derive(Debug, Clone)]
pub struct LocaleSettings {
    pub locales_dir: PathBuf,
    pub base_locale: String,
    pub target_locales: Vec<String>,
}

impl LocaleSettings {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            locales_dir: std::env::var("LOCALES_DIR")
                .unwrap_or_else(|_| "locales".to_string())
                .into(),
            base_locale: std::env::var("BASE_LOCALE").unwrap_or_else(|_| "en".to_string()),
            target_locales: parse_locale_list(
                &std::env::var("TARGET_LOCALES").unwrap_or_else(|_| "ru".to_string()),
            ),
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.base_locale.trim().is_empty() {
            bail!("BASE_LOCALE must not be empty");
        }
        if self.target_locales.is_empty() {
            bail!("TARGET_LOCALES must name at least one locale");
        }
        if self.target_locales.contains(&self.base_locale) {
            bail!(
                "TARGET_LOCALES must not contain the base locale '{}'",
                self.base_locale
            );
        }
        Ok(())
    }
}

/// Translation API settings.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub retry_attempts: u32,
    /// Calls per second
    pub rate_limit: u32,
    pub timeout: Duration,
}

impl ApiConfig {
    pub fn openai_settings(&self) -> OpenAiSettings {
        OpenAiSettings {
            api_key: self.api_key.clone(),
            base_url: self.base_url.clone(),
            model: self.model.clone(),
            timeout: self.timeout,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub locales: LocaleSettings,
    pub api: ApiConfig,
    pub cache: CacheOptions,
    pub validation_rules: ValidationRules,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let validation_rules = match std::env::var("VALIDATION_RULES_FILE") {
            Ok(path) if !path.trim().is_empty() => load_validation_rules(Path::new(&path))?,
            _ => ValidationRules::default(),
        };

        Ok(Self {
            locales: LocaleSettings::from_env()?,

            // OpenAI
            api: ApiConfig {
                api_key: std::env::var("OPENAI_API_KEY").context("OPENAI_API_KEY not set")?,
                base_url: std::env::var("OPENAI_BASE_URL")
                    .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
                model: std::env::var("OPENAI_MODEL")
                    .unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
                retry_attempts: env_or("TRANSLATION_RETRY_ATTEMPTS", 3)?,
                rate_limit: env_or("TRANSLATION_RATE_LIMIT", 10)?,
                timeout: Duration::from_millis(env_or("TRANSLATION_TIMEOUT_MS", 5000)?),
            },

            // Cache
            cache: CacheOptions {
                max_size: env_or("CACHE_MAX_SIZE", 1000)?,
                ttl: Duration::from_millis(env_or("CACHE_TTL_MS", 3_600_000)?),
            },

            validation_rules,
        })
    }

    pub fn validate(&self) -> Result<()> {
        self.locales.validate()?;
        if self.api.api_key.trim().is_empty() {
            bail!("OPENAI_API_KEY must not be empty");
        }
        if self.api.retry_attempts == 0 {
            bail!("TRANSLATION_RETRY_ATTEMPTS must be at least 1");
        }
        if self.api.rate_limit == 0 {
            bail!("TRANSLATION_RATE_LIMIT must be at least 1");
        }
        if self.cache.max_size == 0 {
            bail!("CACHE_MAX_SIZE must be at least 1");
        }
        if self.cache.ttl.is_zero() {
            bail!("CACHE_TTL_MS must be greater than 0");
        }
        Ok(())
    }
}

/// Read a JSON overrides file and merge it onto the default rules.
pub fn load_validation_rules(path: &Path) -> Result<ValidationRules> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read validation rules file {}", path.display()))?;
    let overrides: ValidationRulesOverrides = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse validation rules file {}", path.display()))?;
    ValidationRules::default().with_overrides(overrides)
}

/// Comma-separated locale codes; blanks and duplicates dropped, order kept.
pub fn parse_locale_list(raw: &str) -> Vec<String> {
    let mut locales: Vec<String> = Vec::new();
    for code in raw.split(',').map(str::trim).filter(|c| !c.is_empty()) {
        if !locales.iter().any(|l| l == code) {
            locales.push(code.to_string());
        }
    }
    locales
}

/// Parse an optional variable, falling back to `default` when unset.
fn env_or<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .with_context(|| format!("{} has an invalid value: {:?}", name, value)),
        Err(_) => Ok(default),
    }
}
