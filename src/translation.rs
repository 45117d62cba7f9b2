use crate::cache::{CacheOptions, SweeperHandle, TranslationCache};
use crate::config::Config;
use crate::error::TranslationError;
use crate::i18n::{TranslationMetrics, ValidationRules, Validator};
use crate::openai::{TranslationBackend, TranslationPrompt};
use crate::rate_limit::RateLimiter;
use crate::retry::{with_retry, RetryConfig};
use std::sync::Arc;
use tracing::{debug, warn};

/// Tunables for a [`TranslationManager`].
#[derive(Debug, Clone)]
pub struct TranslationOptions {
    pub source_locale: String,
    pub retry_attempts: u32,
    pub rate_limit: u32,
    pub cache: CacheOptions,
    pub validation_rules: ValidationRules,
}

impl TranslationOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            source_locale: config.locales.base_locale.clone(),
            retry_attempts: config.api.retry_attempts,
            rate_limit: config.api.rate_limit,
            cache: config.cache,
            validation_rules: config.validation_rules.clone(),
        }
    }
}

/// Translates single strings: cache, rate limit, API call, validation, retry.
///
/// Each manager owns its own cache, limiter and counters.
pub struct TranslationManager {
    source_locale: String,
    backend: Arc<dyn TranslationBackend>,
    cache: Arc<TranslationCache>,
    limiter: RateLimiter,
    retry: RetryConfig,
    validator: Validator,
    metrics: TranslationMetrics,
    sweeper: Option<SweeperHandle>,
}

impl TranslationManager {
    pub fn new(options: TranslationOptions, backend: Arc<dyn TranslationBackend>) -> Self {
        Self {
            source_locale: options.source_locale,
            backend,
            cache: Arc::new(TranslationCache::new(options.cache)),
            limiter: RateLimiter::new(options.rate_limit),
            retry: RetryConfig::translation(options.retry_attempts),
            validator: Validator::new(options.validation_rules),
            metrics: TranslationMetrics::new(),
            sweeper: None,
        }
    }

    /// Start the periodic cache sweep. Must be called inside a tokio runtime.
    pub fn start(&mut self) {
        if self.sweeper.is_none() {
            self.sweeper = Some(TranslationCache::spawn_sweeper(&self.cache));
        }
    }

    /// Stop the periodic cache sweep.
    pub fn stop(&mut self) {
        if let Some(sweeper) = self.sweeper.take() {
            sweeper.stop();
        }
    }

    pub fn is_running(&self) -> bool {
        self.sweeper.is_some()
    }

    pub fn cache(&self) -> &TranslationCache {
        &self.cache
    }

    pub fn metrics(&self) -> &TranslationMetrics {
        &self.metrics
    }

    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    /// Translate `text` into `locale`, serving fresh cache entries first.
    ///
    /// An empty or missing completion falls back to the source text.
    pub async fn translate_text(
        &self,
        text: &str,
        context: Option<&str>,
        locale: &str,
    ) -> Result<String, TranslationError> {
        if let Some(cached) = self.cache.get(locale, text, context) {
            self.metrics.record_cache_hit();
            debug!("Cache hit for {:?} ({})", text, locale);
            return Ok(cached);
        }
        self.metrics.record_cache_miss();

        let prompt = TranslationPrompt {
            source_locale: self.source_locale.clone(),
            target_locale: locale.to_string(),
            text: text.to_string(),
            context: context.map(str::to_string),
        };

        self.metrics.record_api_call();
        let completion = self.backend.complete(&prompt).await.map_err(|cause| {
            self.metrics.record_api_failure();
            TranslationError::Api {
                text: text.to_string(),
                locale: locale.to_string(),
                cause,
            }
        })?;

        let translated = match completion.as_deref().map(str::trim) {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => {
                warn!(
                    "Empty completion for {:?} ({}), keeping source text",
                    text, locale
                );
                text.to_string()
            }
        };

        self.cache.put(locale, text, context, translated.as_str());
        Ok(translated)
    }

    /// Translate and validate, retrying with exponential backoff.
    ///
    /// Every attempt waits for the rate limiter first. A rejected translation
    /// is evicted from the cache so the next attempt asks the API again.
    pub async fn translate_with_retry(
        &self,
        key: &str,
        text: &str,
        context: Option<&str>,
        locale: &str,
    ) -> Result<String, TranslationError> {
        let operation_name = format!("Translate '{}' to {}", key, locale);
        with_retry(&self.retry, &operation_name, |_attempt| async move {
            self.limiter.acquire().await;
            let translated = self.translate_text(text, context, locale).await?;

            let result = self.validator.validate_translation(key, text, &translated);
            for warning in result.warnings() {
                debug!("Validation warning for {} ({}): {}", key, locale, warning);
            }
            if !result.is_valid() {
                self.metrics.record_validation_failure();
                self.cache.remove(locale, text, context);
                return Err(TranslationError::Validation {
                    key: key.to_string(),
                    locale: locale.to_string(),
                    result,
                });
            }

            Ok(translated)
        })
        .await
    }
}

impl Drop for TranslationManager {
    fn drop(&mut self) {
        self.stop();
    }
}
