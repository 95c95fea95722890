//! Scripted harness: runs the authoritative worker against the sandbox world
//! with an owning observer and a spectator attached.
mod scenario;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use action_content::{ActionCatalog, ConfigLoader};
use action_runtime::RuntimeConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let _guard = setup_logging(std::env::var_os("HARNESS_LOG_DIR").map(PathBuf::from))?;

    let engine = match std::env::var_os("ACTION_ENGINE_CONFIG") {
        Some(path) => ConfigLoader::load(&PathBuf::from(path))?,
        None => ConfigLoader::embedded()?,
    };
    let catalog = match std::env::var_os("ACTION_CATALOG_DIR") {
        Some(dir) => ActionCatalog::load_dir(&PathBuf::from(dir))?,
        None => ActionCatalog::load_embedded()?,
    };
    catalog.validate(&engine)?;
    tracing::info!(actions = catalog.len(), "catalog loaded");

    let config = RuntimeConfig::from_env().with_engine(engine);
    scenario::run(config, Arc::new(catalog)).await
}

/// Logs to stderr, and additionally to `<dir>/harness.log` when a directory
/// is given. The returned guard flushes the file writer on drop.
fn setup_logging(
    log_dir: Option<PathBuf>,
) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::INFO.into());
    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let Some(dir) = log_dir else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .init();
        return Ok(None);
    };

    std::fs::create_dir_all(&dir)?;
    let file_appender = tracing_appender::rolling::never(&dir, "harness.log");
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    tracing::info!("Log file: {}/harness.log", dir.display());
    Ok(Some(guard))
}
