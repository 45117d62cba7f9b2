//! Read-only audit of target locale files against the base locale.

use crate::error::StoreError;
use crate::i18n::{validate_locale_consistency, ValidationIssue};
use crate::locale::{
    expand_to_leaves, find_missing, JsonFileStorage, KeyPath, LocaleStorage, LocaleTree,
};
use tracing::warn;

/// What one target locale still lacks or gets wrong.
#[derive(Debug, Clone)]
pub struct LocaleAudit {
    pub locale: String,
    /// Base leaves the target does not have
    pub missing: Vec<KeyPath>,
    /// Consistency errors on keys the target does have
    pub mismatches: Vec<ValidationIssue>,
}

impl LocaleAudit {
    pub fn problem_count(&self) -> usize {
        self.missing.len() + self.mismatches.len()
    }
}

/// Compare every target locale in `storage` with the base locale.
///
/// Nothing is written. A missing base file is an error; a missing or
/// unreadable target file is audited as an empty locale.
pub fn audit_locales(
    storage: &JsonFileStorage,
    base_locale: &str,
    target_locales: &[String],
) -> Result<Vec<LocaleAudit>, StoreError> {
    let base = storage
        .read(base_locale)?
        .ok_or_else(|| StoreError::NotFound(storage.path_for(base_locale)))?;

    let mut audits = Vec::with_capacity(target_locales.len());
    for locale in target_locales {
        let target = match storage.read(locale) {
            Ok(Some(tree)) => tree,
            Ok(None) => LocaleTree::new(),
            Err(e) => {
                warn!(
                    "Could not read locale '{}', auditing as empty: {:#}",
                    locale,
                    anyhow::Error::from(e)
                );
                LocaleTree::new()
            }
        };
        audits.push(audit_locale(locale, &base, &target));
    }
    Ok(audits)
}

fn audit_locale(locale: &str, base: &LocaleTree, target: &LocaleTree) -> LocaleAudit {
    let missing = expand_to_leaves(base, &find_missing(base, target));
    let missing_keys: Vec<String> = missing.iter().map(ToString::to_string).collect();
    // Missing keys are reported by the consistency check too
    let mismatches = validate_locale_consistency(base, target)
        .failures()
        .filter(|issue| !missing_keys.contains(&issue.key))
        .cloned()
        .collect();

    LocaleAudit {
        locale: locale.to_string(),
        missing,
        mismatches,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &TempDir, locale: &str, json: &str) {
        std::fs::write(dir.path().join(format!("{}.json", locale)), json).unwrap();
    }

    fn targets(codes: &[&str]) -> Vec<String> {
        codes.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_missing_base_is_an_error_and_not_created() {
        let dir = TempDir::new().unwrap();
        let storage = JsonFileStorage::new(dir.path());

        let result = audit_locales(&storage, "en", &targets(&["ru"]));

        assert!(matches!(result, Err(StoreError::NotFound(_))));
        assert!(!dir.path().join("en.json").exists());
    }

    #[test]
    fn test_missing_target_is_audited_as_empty_without_writing() {
        let dir = TempDir::new().unwrap();
        write(&dir, "en", r#"{"nav": {"home": "Home"}, "title": "App"}"#);
        let storage = JsonFileStorage::new(dir.path());

        let audits = audit_locales(&storage, "en", &targets(&["ru"])).unwrap();

        assert_eq!(audits[0].missing, vec!["nav.home", "title"]);
        assert!(audits[0].mismatches.is_empty());
        assert!(!dir.path().join("ru.json").exists());
    }

    #[test]
    fn test_variable_drift_is_reported_once_per_key() {
        let dir = TempDir::new().unwrap();
        write(&dir, "en", r#"{"greet": "Hi {name}", "bye": "Bye"}"#);
        write(&dir, "fr", r#"{"greet": "Salut"}"#);
        let storage = JsonFileStorage::new(dir.path());

        let audits = audit_locales(&storage, "en", &targets(&["fr"])).unwrap();
        let fr = &audits[0];

        assert_eq!(fr.missing, vec!["bye"]);
        assert_eq!(fr.mismatches.len(), 1);
        assert_eq!(fr.mismatches[0].key, "greet");
        assert_eq!(fr.problem_count(), 2);
    }

    #[test]
    fn test_complete_locale_has_no_problems() {
        let dir = TempDir::new().unwrap();
        write(&dir, "en", r#"{"greet": "Hi {name}"}"#);
        write(&dir, "de", r#"{"greet": "Hallo {name}"}"#);
        let storage = JsonFileStorage::new(dir.path());

        let audits = audit_locales(&storage, "en", &targets(&["de"])).unwrap();
        assert_eq!(audits[0].problem_count(), 0);
    }
}
