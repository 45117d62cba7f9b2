//! Internationalization (i18n) support module.
//!
//! - `validator`: translation quality checks and cross-locale consistency
//! - `metrics`: translation observability counters
//! - `language`: English names for locale codes, used in prompts

mod language;
mod metrics;
mod validator;

pub use language::{language_name, lookup as lookup_language, LanguageInfo};
pub use metrics::{MetricsReport, TranslationMetrics};
pub use validator::{
    extract_variables, validate_locale_consistency, NamedPattern, Severity, ValidationIssue,
    ValidationResult, ValidationRules, ValidationRulesOverrides, Validator, DEFAULT_MAX_LENGTH,
};
