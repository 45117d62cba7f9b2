//! Offline locale audit - reports untranslated keys and placeholder mismatches
//!
//! Usage:
//!   cargo run --bin locale-check
//!
//! No API key is needed and nothing is written. Reads:
//! - LOCALES_DIR (defaults to locales)
//! - BASE_LOCALE (defaults to en)
//! - TARGET_LOCALES (defaults to ru)
//!
//! Exits with status 1 when any target locale is incomplete or inconsistent.

use anyhow::{Context, Result};
use locale_sync::audit::audit_locales;
use locale_sync::config::LocaleSettings;
use locale_sync::locale::JsonFileStorage;
use tracing::{info, warn};

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("locale_sync=info".parse()?)
                .add_directive("locale_check=info".parse()?),
        )
        .init();

    let settings = LocaleSettings::from_env()?;
    settings.validate()?;

    let storage = JsonFileStorage::new(&settings.locales_dir);
    let audits = audit_locales(&storage, &settings.base_locale, &settings.target_locales)
        .context("Failed to load base locale")?;

    let mut problems = 0;
    for audit in &audits {
        if audit.problem_count() == 0 {
            info!("{}: complete and consistent", audit.locale);
            continue;
        }
        for key in &audit.missing {
            warn!("{}: missing '{}'", audit.locale, key);
        }
        for issue in &audit.mismatches {
            warn!("{}: {}", audit.locale, issue);
        }
        problems += audit.problem_count();
    }

    if problems > 0 {
        warn!("{} problems found", problems);
        std::process::exit(1);
    }

    info!("All locales complete");
    Ok(())
}
