//! Kursportal - municipal course-registration site.
//!
//! Main entry point: loads the configuration, wires up content loading,
//! the participant database and the mailer, and runs the HTTP server.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use kursportal_config::AppConfig;
use kursportal_content::{ContentStore, LessonLibrary};
use kursportal_mailer::{Mailer, MailerConfig};
use kursportal_registry::ParticipantStore;
use kursportal_server::{AppState, Server};

/// Kursportal - municipal course-registration site
#[derive(Parser)]
#[command(name = "kursportal")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file (TOML)
    #[arg(short, long, env = "KURSPORTAL_CONFIG")]
    config: Option<PathBuf>,

    /// Bind address, overrides the configuration file
    #[arg(short, long)]
    bind: Option<SocketAddr>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Directory for rotating JSON log files
    #[arg(long, default_value = "logs")]
    log_dir: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing — console (human-readable) + rotating JSON file
    let filter = if cli.verbose {
        "kursportal=debug,kursportal_server=debug,kursportal_content=debug,kursportal_registry=debug,kursportal_mailer=debug,info"
    } else {
        "kursportal=info,kursportal_server=info,kursportal_content=info,kursportal_registry=info,kursportal_mailer=info,warn"
    };

    let file_appender = tracing_appender::rolling::daily(&cli.log_dir, "kursportal.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    use tracing_subscriber::prelude::*;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_filter(tracing_subscriber::EnvFilter::new(filter)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_filter(tracing_subscriber::EnvFilter::new(
                    "kursportal=trace,kursportal_server=trace,kursportal_content=trace,kursportal_registry=trace,kursportal_mailer=trace,info",
                )),
        )
        .init();

    let mut config =
        kursportal_config::load_config(cli.config.as_deref()).context("failed to load config")?;
    if let Some(bind) = cli.bind {
        config.server.bind = bind;
    }

    let state = build_state(config)?;
    info!("Content root: {}", state.content.root().display());

    Server::from_state(state).run().await?;
    Ok(())
}

/// Wire the application state from the configuration.
fn build_state(config: AppConfig) -> Result<AppState> {
    let content_root = config.content.root.clone();
    let content = ContentStore::new(&content_root);
    let lessons = LessonLibrary::new(content_root.join("unterlagen"));

    let mut state = AppState::new(config.clone(), content, lessons);

    match &config.database.path {
        Some(path) => {
            let store = ParticipantStore::open(path)
                .with_context(|| format!("failed to open database at {}", path.display()))?;
            state = state.with_registry(store);
        }
        None => {
            warn!("No database configured, registration endpoints will answer 503");
        }
    }

    if config.mail.is_active() {
        let mailer = Mailer::new(MailerConfig {
            api_key: config.mail.api_key.clone().unwrap_or_default(),
            api_url: config.mail.api_url.clone(),
            from: config.mail.from.clone(),
            admin_copy_to: config.mail.admin_copy_to.clone(),
        })
        .context("failed to build mail client")?;
        state = state.with_mailer(mailer);
    } else {
        warn!("No mail provider configured, confirmation emails will be skipped");
    }

    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_state_without_database_or_mail() {
        let state = build_state(AppConfig::default()).unwrap();
        assert!(state.registry.is_none());
        assert!(state.mailer.is_none());
    }

    #[test]
    fn test_build_state_with_database() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.database.path = Some(dir.path().join("teilnehmer.db"));

        let state = build_state(config).unwrap();
        assert!(state.registry.is_some());
    }

    #[test]
    fn test_build_state_with_mailer() {
        let mut config = AppConfig::default();
        config.mail.provider = Some("resend".to_string());
        config.mail.api_key = Some("re_test".to_string());

        let state = build_state(config).unwrap();
        assert!(state.mailer.is_some());
    }
}
