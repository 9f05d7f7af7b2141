//! Configuration types mapping to the TOML schema.
//!
//! ```toml
//! [server]
//! bind = "127.0.0.1:8080"
//! admin_token = "..."        # usually supplied via ADMIN_TOKEN env var
//!
//! [content]
//! root = "content"
//!
//! [database]
//! path = "kursportal.db"
//!
//! [mail]
//! provider = "resend"
//! from = "anmeldung@example.org"
//!
//! [rate_limit]
//! registration_limit = 5
//! registration_window_secs = 300
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration structure.
///
/// All sections default so a partial (or absent) config file works.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerSection,
    pub content: ContentSection,
    pub database: DatabaseSection,
    pub mail: MailSection,
    pub rate_limit: RateLimitSection,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    /// Address to bind the server to.
    pub bind: SocketAddr,

    /// Admin token gating the participant endpoints. `None` disables all
    /// admin routes (they answer 403).
    pub admin_token: Option<String>,

    /// Enable the structured request-logging middleware.
    pub request_logging: bool,

    /// Enable a permissive CORS layer (development only).
    pub cors: bool,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".parse().unwrap(),
            admin_token: None,
            request_logging: true,
            cors: false,
        }
    }
}

/// Content directory settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentSection {
    /// Root of the content tree: JSON documents live at `<root>/` and
    /// `<root>/meta/`, lesson folders under `<root>/unterlagen/<slug>/`.
    pub root: PathBuf,
}

impl Default for ContentSection {
    fn default() -> Self {
        Self {
            root: PathBuf::from("content"),
        }
    }
}

/// Participant database settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    /// SQLite file path. `None` runs the service without a participant store
    /// (registration and admin endpoints answer 503).
    pub path: Option<PathBuf>,
}

/// Transactional mail settings (Resend-compatible HTTP API).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MailSection {
    /// Mail provider name; only `"resend"` activates sending.
    pub provider: Option<String>,

    /// API key, usually supplied via `RESEND_API_KEY`.
    pub api_key: Option<String>,

    /// Base URL of the mail API.
    pub api_url: String,

    /// Sender address.
    pub from: String,

    /// Address receiving the admin copy of every registration.
    pub admin_copy_to: Option<String>,
}

impl Default for MailSection {
    fn default() -> Self {
        Self {
            provider: None,
            api_key: None,
            api_url: "https://api.resend.com".to_string(),
            from: "anmeldung@kursportal.example".to_string(),
            admin_copy_to: None,
        }
    }
}

/// Rate-limiting settings for the registration endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitSection {
    /// Maximum registrations per window per client.
    pub registration_limit: usize,

    /// Sliding-window length in seconds.
    pub registration_window_secs: u64,
}

impl Default for RateLimitSection {
    fn default() -> Self {
        Self {
            registration_limit: 5,
            registration_window_secs: 300,
        }
    }
}

impl MailSection {
    /// Whether mail sending is configured at all.
    pub fn is_active(&self) -> bool {
        self.provider.as_deref() == Some("resend") && self.api_key.is_some()
    }
}
