use anyhow::{Context, Result};
use locale_sync::config::Config;
use locale_sync::openai::OpenAiBackend;
use locale_sync::sync::{LocaleStatus, LocaleSync};
use std::sync::Arc;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in CI)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("locale_sync=info".parse()?),
        )
        .init();

    info!("Starting locale sync");

    // Load configuration from environment
    let config = Config::from_env()?;
    config.validate()?;
    info!(
        "Base locale '{}', targets {:?}, directory {}",
        config.locales.base_locale,
        config.locales.target_locales,
        config.locales.locales_dir.display()
    );

    let backend = Arc::new(OpenAiBackend::new(config.api.openai_settings())?);
    let mut sync = LocaleSync::new(&config, backend).context("Failed to load locale files")?;

    let report = sync.translate_missing().await;
    sync.shutdown();

    for outcome in &report.locales {
        match &outcome.status {
            LocaleStatus::Completed => info!(
                "{}: {}/{} missing keys translated",
                outcome.locale, outcome.translated, outcome.missing
            ),
            LocaleStatus::Failed { key, error } => {
                error!("{}: failed at '{}': {}", outcome.locale, key, error)
            }
            LocaleStatus::SaveFailed { error } => {
                error!("{}: translated but not saved: {}", outcome.locale, error)
            }
        }
    }

    let metrics = sync.translator().metrics().report();
    info!("Metrics: {}", serde_json::to_string(&metrics)?);
    info!("Report: {}", serde_json::to_string(&report)?);

    if report.has_failures() {
        warn!("Locale sync finished with failures");
        std::process::exit(1);
    }

    info!(
        "Locale sync finished: {} strings translated",
        report.translated_total()
    );
    Ok(())
}
