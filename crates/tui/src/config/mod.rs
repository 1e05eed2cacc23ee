use std::path::PathBuf;

use clap::Parser;
use serde::Deserialize;

use crate::error::Result;

const DEFAULT_CONFIG_PATH: &str = "config/tui.toml";
const ENV_PREFIX: &str = "EXPENSES_TUI";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    /// Prefills the login form.
    pub email: String,
    pub session_path: PathBuf,
    pub log_path: PathBuf,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            email: String::new(),
            session_path: PathBuf::from("config/session.json"),
            log_path: PathBuf::from("expenses_tui.log"),
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "expenses_tui", disable_version_flag = true)]
struct Args {
    /// Optional config file path (TOML).
    #[arg(long)]
    config: Option<String>,
    /// Override base URL (e.g. http://localhost:3000).
    #[arg(long)]
    base_url: Option<String>,
    /// Override login email (password is never read from CLI).
    #[arg(long)]
    email: Option<String>,
    /// Override where the session token is persisted.
    #[arg(long)]
    session_path: Option<PathBuf>,
    /// Override log level (trace, debug, info, warn, error).
    #[arg(long)]
    log_level: Option<String>,
}

pub fn load() -> Result<AppConfig> {
    resolve(Args::parse())
}

fn resolve(args: Args) -> Result<AppConfig> {
    let config_path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let mut builder = config::Config::builder();
    builder = builder.add_source(config::File::with_name(config_path).required(false));
    builder = builder.add_source(config::Environment::with_prefix(ENV_PREFIX));
    let mut settings: AppConfig = builder.build()?.try_deserialize()?;

    if let Some(base_url) = args.base_url {
        settings.base_url = base_url;
    }
    if let Some(email) = args.email {
        settings.email = email;
    }
    if let Some(session_path) = args.session_path {
        settings.session_path = session_path;
    }
    if let Some(log_level) = args.log_level {
        settings.log_level = log_level;
    }

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["expenses_tui", "--config", "does/not/exist.toml"];
        argv.extend_from_slice(extra);
        Args::parse_from(argv)
    }

    #[test]
    fn missing_file_yields_defaults() {
        let settings = resolve(args(&[])).unwrap();
        assert_eq!(settings.base_url, "http://localhost:3000");
        assert_eq!(settings.session_path, PathBuf::from("config/session.json"));
        assert_eq!(settings.log_level, "info");
    }

    #[test]
    fn cli_overrides_win() {
        let settings = resolve(args(&[
            "--base-url",
            "http://10.0.0.2:8080",
            "--email",
            "alice@example.com",
            "--session-path",
            "/tmp/session.json",
            "--log-level",
            "debug",
        ]))
        .unwrap();

        assert_eq!(settings.base_url, "http://10.0.0.2:8080");
        assert_eq!(settings.email, "alice@example.com");
        assert_eq!(settings.session_path, PathBuf::from("/tmp/session.json"));
        assert_eq!(settings.log_level, "debug");
    }

    #[test]
    fn password_is_not_a_flag() {
        let parsed = Args::try_parse_from(["expenses_tui", "--password", "secret"]);
        assert!(parsed.is_err());
    }
}
