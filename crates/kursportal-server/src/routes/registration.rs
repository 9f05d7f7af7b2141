//! Public registration endpoint.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use kursportal_registry::NewParticipant;

use crate::error::{Result, ServerError};
use crate::state::AppState;
use crate::validation::{validate_email, validate_name, validate_phone};

// ── Request/Response types ──────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegistrationRequest {
    pub vorname: String,
    pub nachname: String,
    pub email: String,
    #[serde(default)]
    pub telefon: Option<String>,
    #[serde(default)]
    pub strasse: Option<String>,
    #[serde(default)]
    pub hausnummer: Option<String>,
    #[serde(default)]
    pub plz: Option<String>,
    #[serde(default)]
    pub ort: Option<String>,
    #[serde(default)]
    pub kurs_id: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RegistrationResponse {
    pub id: i64,
    pub message: String,
}

// ── Handler ─────────────────────────────────────────────────────────

/// Register a participant.
///
/// Validation failures come back as 400 with a German message, an already
/// registered email as 409, and a missing database as 503. Confirmation
/// email is best-effort after the record is committed.
#[utoipa::path(
    post,
    path = "/anmeldung",
    request_body = RegistrationRequest,
    responses(
        (status = 201, description = "Registration accepted", body = RegistrationResponse),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "Email already registered"),
        (status = 429, description = "Too many registration attempts"),
        (status = 503, description = "No database configured"),
    ),
    tag = "anmeldung"
)]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegistrationRequest>,
) -> Result<(StatusCode, Json<RegistrationResponse>)> {
    let vorname = validate_name(&request.vorname, "Vorname")?;
    let nachname = validate_name(&request.nachname, "Nachname")?;
    let email = validate_email(&request.email)?;
    let telefon = validate_phone(request.telefon.as_deref().unwrap_or_default())?;

    // The stored course name is the display label so the CSV export reads
    // well. Only visible catalog courses accept registrations.
    let kurs_label = match &request.kurs_id {
        Some(id) => Some(
            state
                .visible_course(id)
                .map_err(|_| ServerError::BadRequest(format!("Unbekannter Kurs: {id}")))?
                .label,
        ),
        None => None,
    };

    let registry = state.registry()?;
    let participant = registry.create(&NewParticipant {
        first_name: vorname.clone(),
        last_name: nachname.clone(),
        email: email.clone(),
        phone: telefon,
        street: trimmed(request.strasse),
        house_number: trimmed(request.hausnummer),
        postal_code: trimmed(request.plz),
        city: trimmed(request.ort),
        course_name: kurs_label.clone(),
    })?;

    if let Some(mailer) = &state.mailer {
        let name = format!("{} {}", vorname, nachname);
        let label = kurs_label.unwrap_or_else(|| "unserem Kurs".to_string());
        mailer.send_registration_emails(&email, &name, &label).await;
    } else {
        tracing::warn!(email = %email, "No mail provider configured, skipping confirmation email");
    }

    Ok((
        StatusCode::CREATED,
        Json(RegistrationResponse {
            id: participant.id,
            message: "Anmeldung erfolgreich".to_string(),
        }),
    ))
}

pub(crate) fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode, header},
        routing::post,
    };
    use kursportal_config::AppConfig;
    use kursportal_content::{ContentStore, LessonLibrary};
    use kursportal_registry::ParticipantStore;
    use serde_json::{Value, json};
    use std::fs;
    use tower::ServiceExt;

    fn test_app(dir: &std::path::Path, with_db: bool) -> Router {
        let mut state = AppState::new(
            AppConfig::default(),
            ContentStore::new(dir),
            LessonLibrary::new(dir.join("unterlagen")),
        );
        if with_db {
            state = state.with_registry(ParticipantStore::open_in_memory().unwrap());
        }
        Router::new()
            .route("/anmeldung", post(register))
            .with_state(state)
    }

    fn post_json(body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/anmeldung")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn valid_body() -> Value {
        json!({
            "vorname": "Anna",
            "nachname": "Muster",
            "email": "anna@example.ch",
            "telefon": "079 123 45 67",
            "ort": "Bern",
            "kurs_id": "py101"
        })
    }

    fn write_catalog(dir: &std::path::Path) {
        fs::create_dir_all(dir).unwrap();
        fs::write(
            dir.join("courses.json"),
            r#"[{"id": "py101", "label": "Python Grundkurs"},
                {"id": "geheim", "label": "Probelauf", "visible": false}]"#,
        )
        .unwrap();
    }

    #[tokio::test]
    async fn test_successful_registration() {
        let dir = tempfile::tempdir().unwrap();
        write_catalog(dir.path());

        let response = test_app(dir.path(), true)
            .oneshot(post_json(valid_body()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let parsed: Value = serde_json::from_slice(&body).unwrap();
        assert!(parsed["id"].as_i64().unwrap() > 0);
        assert_eq!(parsed["message"], "Anmeldung erfolgreich");
    }

    #[tokio::test]
    async fn test_invalid_name_is_400() {
        let dir = tempfile::tempdir().unwrap();
        write_catalog(dir.path());

        let mut body = valid_body();
        body["vorname"] = json!("A");
        let response = test_app(dir.path(), true)
            .oneshot(post_json(body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_invalid_email_is_400() {
        let dir = tempfile::tempdir().unwrap();
        write_catalog(dir.path());

        let mut body = valid_body();
        body["email"] = json!("keine-adresse");
        let response = test_app(dir.path(), true)
            .oneshot(post_json(body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_duplicate_email_is_409() {
        let dir = tempfile::tempdir().unwrap();
        write_catalog(dir.path());
        let app = test_app(dir.path(), true);

        let first = app
            .clone()
            .oneshot(post_json(valid_body()))
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::CREATED);

        let second = app.oneshot(post_json(valid_body())).await.unwrap();
        assert_eq!(second.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_no_database_is_503() {
        let dir = tempfile::tempdir().unwrap();
        write_catalog(dir.path());

        let response = test_app(dir.path(), false)
            .oneshot(post_json(valid_body()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_unknown_course_id_is_400() {
        let dir = tempfile::tempdir().unwrap();
        write_catalog(dir.path());

        let mut body = valid_body();
        body["kurs_id"] = json!("geister-kurs");
        let response = test_app(dir.path(), true)
            .oneshot(post_json(body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_hidden_course_id_is_400() {
        let dir = tempfile::tempdir().unwrap();
        write_catalog(dir.path());

        let mut body = valid_body();
        body["kurs_id"] = json!("geheim");
        let response = test_app(dir.path(), true)
            .oneshot(post_json(body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
