use std::{fs::OpenOptions, path::Path, sync::Mutex};

use color_eyre::eyre::{eyre, Result, WrapErr};
use tracing_subscriber::EnvFilter;

pub const LOG_FILE: &str = "journal.log";

/// Sends tracing output to `<dir>/journal.log`; the terminal belongs to
/// the UI. `RUST_LOG` overrides `default_level`.
pub fn init(dir: &Path, default_level: &str) -> Result<()> {
    std::fs::create_dir_all(dir)
        .wrap_err_with(|| format!("Failed to create {}", dir.display()))?;
    let path = dir.join(LOG_FILE);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .wrap_err_with(|| format!("Failed to open log file {}", path.display()))?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .wrap_err_with(|| format!("Invalid log level `{default_level}`"))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|e| eyre!("Failed to install log subscriber: {e}"))?;

    tracing::debug!(path = %path.display(), "logging initialised");
    Ok(())
}
