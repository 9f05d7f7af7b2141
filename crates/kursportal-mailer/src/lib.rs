//! Registration email delivery for the Kursportal site.
//!
//! Emails go out through the Resend HTTP API. Delivery is strictly
//! best-effort: a registration must never fail because the mail provider is
//! down or unconfigured, so the route layer calls [`Mailer::send_registration_emails`]
//! after the record is committed and only logs the outcome.

use std::time::Duration;

use chrono::Utc;
use serde_json::json;
use thiserror::Error;
use tracing::{info, warn};

/// Provider request timeout. Registration handlers await delivery, so this
/// bounds how long a slow provider can hold a response.
const SEND_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Error)]
pub enum MailError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, MailError>;

/// Provider settings, taken from the mail section of the app config.
#[derive(Debug, Clone)]
pub struct MailerConfig {
    pub api_key: String,
    pub api_url: String,
    /// Sender address, e.g. `anmeldung@kursportal.example`.
    pub from: String,
    /// Optional address that receives a copy of every confirmation.
    pub admin_copy_to: Option<String>,
}

/// Sends transactional email through Resend.
pub struct Mailer {
    client: reqwest::Client,
    config: MailerConfig,
}

impl Mailer {
    pub fn new(config: MailerConfig) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(SEND_TIMEOUT).build()?;
        Ok(Self { client, config })
    }

    fn emails_url(&self) -> String {
        format!("{}/emails", self.config.api_url.trim_end_matches('/'))
    }

    /// Send a single HTML email.
    pub async fn send(&self, to: &str, subject: &str, html: &str) -> Result<()> {
        let payload = json!({
            "from": self.config.from,
            "to": [to],
            "subject": subject,
            "html": html,
        });

        self.client
            .post(self.emails_url())
            .bearer_auth(&self.config.api_key)
            .json(&payload)
            .send()
            .await?
            .error_for_status()?;

        info!(to, subject, "Sent email");
        Ok(())
    }

    /// Send the registration confirmation to the participant and, when
    /// configured, a copy to the admin address.
    ///
    /// Failures are logged and swallowed; the registration already
    /// succeeded by the time this runs.
    pub async fn send_registration_emails(
        &self,
        participant_email: &str,
        participant_name: &str,
        course_label: &str,
    ) {
        let subject = format!("Anmeldebestätigung: {course_label}");
        let body = confirmation_body(participant_name, course_label);

        if let Err(e) = self.send(participant_email, &subject, &body).await {
            warn!(to = participant_email, error = %e, "Failed to send confirmation email");
        }

        if let Some(admin) = &self.config.admin_copy_to {
            let copy_subject = format!("[Kopie] {subject}");
            let copy_body = admin_copy_body(participant_name, participant_email, course_label);
            if let Err(e) = self.send(admin, &copy_subject, &copy_body).await {
                warn!(to = %admin, error = %e, "Failed to send admin copy");
            }
        }
    }
}

fn confirmation_body(name: &str, course_label: &str) -> String {
    format!(
        "<p>Guten Tag {name}</p>\
         <p>Vielen Dank für Ihre Anmeldung zum Kurs <strong>{course_label}</strong>.</p>\
         <p>Wir haben Ihre Anmeldung erhalten und melden uns mit den weiteren \
         Informationen zum Kursstart.</p>\
         <p>Freundliche Grüsse<br>Ihr Kursportal-Team</p>"
    )
}

fn admin_copy_body(name: &str, email: &str, course_label: &str) -> String {
    let timestamp = Utc::now().format("%d.%m.%Y %H:%M");
    format!(
        "<p>Neue Anmeldung am {timestamp} (UTC):</p>\
         <ul>\
         <li>Name: {name}</li>\
         <li>E-Mail: {email}</li>\
         <li>Kurs: {course_label}</li>\
         </ul>"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> MailerConfig {
        MailerConfig {
            api_key: "re_test".into(),
            api_url: "https://api.resend.com".into(),
            from: "anmeldung@kursportal.example".into(),
            admin_copy_to: None,
        }
    }

    #[test]
    fn emails_url_handles_trailing_slash() {
        let mailer = Mailer::new(MailerConfig {
            api_url: "https://api.resend.com/".into(),
            ..config()
        })
        .unwrap();
        assert_eq!(mailer.emails_url(), "https://api.resend.com/emails");
    }

    #[test]
    fn confirmation_mentions_name_and_course() {
        let body = confirmation_body("Anna Muster", "Python Grundkurs");
        assert!(body.contains("Anna Muster"));
        assert!(body.contains("Python Grundkurs"));
    }

    #[test]
    fn admin_copy_lists_contact_details() {
        let body = admin_copy_body("Anna Muster", "anna@example.ch", "Python Grundkurs");
        assert!(body.contains("anna@example.ch"));
        assert!(body.contains("Neue Anmeldung"));
    }

    #[tokio::test]
    async fn unreachable_provider_is_swallowed() {
        let mailer = Mailer::new(MailerConfig {
            api_url: "http://127.0.0.1:1".into(),
            admin_copy_to: Some("admin@kursportal.example".into()),
            ..config()
        })
        .unwrap();

        // Must not panic or propagate; delivery is best-effort.
        mailer
            .send_registration_emails("anna@example.ch", "Anna Muster", "Python Grundkurs")
            .await;
    }
}
