use std::{fs::OpenOptions, sync::Mutex};

use tracing_subscriber::EnvFilter;

use crate::{
    config::AppConfig,
    error::{AppError, Result},
};

/// The terminal is owned by the UI, so logs go to a file.
pub fn init(config: &AppConfig) -> Result<()> {
    let filter = EnvFilter::try_new(directives(&config.log_level))
        .map_err(|err| AppError::Logging(err.to_string()))?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_path)?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(true)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(|err| AppError::Logging(err.to_string()))
}

fn directives(level: &str) -> String {
    let level = level.trim();
    let level = if level.is_empty() { "info" } else { level };
    format!("expenses_tui={level},expense_client={level}")
}
