//! Configuration for the kursportal course-registration service.
//!
//! TOML-based configuration with:
//! - Typed sections (`[server]`, `[content]`, `[database]`, `[mail]`,
//!   `[rate_limit]`), all optional so partial files load cleanly
//! - Environment-variable overrides for deployment secrets (admin token,
//!   mail API key, database path)
//!
//! Secrets never belong in the config file of a deployed instance; the env
//! overrides exist so operators can keep `config.toml` in version control.

mod error;
mod types;

pub use error::{ConfigError, Result};
pub use types::{
    AppConfig, ContentSection, DatabaseSection, MailSection, RateLimitSection, ServerSection,
};

use std::path::Path;

use tracing::debug;

/// Load configuration from an optional TOML file, then apply environment
/// overrides from the process environment.
///
/// A missing file is not an error: defaults apply. A file that exists but
/// fails to read or parse is.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    let mut config = match path {
        Some(p) if p.exists() => load_config_file(p)?,
        Some(p) => {
            debug!(path = %p.display(), "Config file not found, using defaults");
            AppConfig::default()
        }
        None => AppConfig::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    Ok(config)
}

/// Load and parse a single TOML config file.
pub fn load_config_file(path: &Path) -> Result<AppConfig> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: path.display().to_string(),
        source,
    })?;
    let config = toml::from_str(&raw)?;
    debug!(path = %path.display(), "Loaded config file");
    Ok(config)
}

/// Apply environment overrides through an injected lookup function.
///
/// The lookup indirection keeps this testable without mutating process env.
/// Variable names follow the original deployment: `ADMIN_TOKEN`,
/// `DATABASE_PATH`, `EMAIL_PROVIDER`, `RESEND_API_KEY`, `EMAIL_FROM`.
pub fn apply_env_overrides<F>(config: &mut AppConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(token) = lookup("ADMIN_TOKEN") {
        config.server.admin_token = Some(token);
    }
    if let Some(path) = lookup("DATABASE_PATH") {
        config.database.path = Some(path.into());
    }
    if let Some(provider) = lookup("EMAIL_PROVIDER") {
        config.mail.provider = Some(provider);
    }
    if let Some(key) = lookup("RESEND_API_KEY") {
        config.mail.api_key = Some(key);
    }
    if let Some(from) = lookup("EMAIL_FROM") {
        config.mail.from = from;
    }
}
