//! Participant endpoints.
//!
//! Everything here except the public counter sits behind the admin
//! middleware.

use axum::{
    Json,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use kursportal_content::course_label;
use kursportal_registry::{NewParticipant, Participant, RegistrationStats, export};

use crate::error::Result;
use crate::state::AppState;
use crate::validation::{validate_email, validate_name, validate_phone};

use super::registration::{RegistrationRequest, trimmed};

// ── Request/Response types ──────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ParticipantListResponse {
    pub teilnehmende: Vec<Participant>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CountResponse {
    pub count: i64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateContactRequest {
    #[serde(default)]
    pub vorname: Option<String>,
    #[serde(default)]
    pub nachname: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub telefon: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SetPaidRequest {
    pub bezahlt: bool,
}

// ── Public handlers ─────────────────────────────────────────────────

/// Public registration counter, shown on the landing page.
#[utoipa::path(
    get,
    path = "/teilnehmende/count",
    responses(
        (status = 200, description = "Number of registrations", body = CountResponse),
        (status = 503, description = "No database configured"),
    ),
    tag = "teilnehmende"
)]
pub async fn count(State(state): State<AppState>) -> Result<Json<CountResponse>> {
    let count = state.registry()?.count()?;
    Ok(Json(CountResponse { count }))
}

// ── Admin handlers ──────────────────────────────────────────────────

/// List all participants, newest first.
pub async fn list(State(state): State<AppState>) -> Result<Json<ParticipantListResponse>> {
    let teilnehmende = state.registry()?.list()?;
    Ok(Json(ParticipantListResponse { teilnehmende }))
}

/// Payment statistics.
pub async fn stats(State(state): State<AppState>) -> Result<Json<RegistrationStats>> {
    let stats = state.registry()?.stats()?;
    Ok(Json(stats))
}

/// Download the participant list as CSV.
pub async fn export_csv(State(state): State<AppState>) -> Result<Response> {
    let participants = state.registry()?.list()?;
    let csv = export::to_csv(&participants)?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"teilnehmende.csv\"",
            ),
        ],
        csv,
    )
        .into_response())
}

/// Create a participant directly, bypassing the public registration flow.
///
/// Same validation and duplicate handling as a registration, but no
/// confirmation mail and no visibility check on the course id, so staff
/// can enter registrations for courses that are not public yet.
pub async fn create(
    State(state): State<AppState>,
    Json(request): Json<RegistrationRequest>,
) -> Result<(StatusCode, Json<Participant>)> {
    let vorname = validate_name(&request.vorname, "Vorname")?;
    let nachname = validate_name(&request.nachname, "Nachname")?;
    let email = validate_email(&request.email)?;
    let telefon = validate_phone(request.telefon.as_deref().unwrap_or_default())?;

    let course_name = match &request.kurs_id {
        Some(id) => {
            let courses = state.load_courses().unwrap_or_default();
            Some(course_label(&courses, id).to_string())
        }
        None => None,
    };

    let participant = state.registry()?.create(&NewParticipant {
        first_name: vorname,
        last_name: nachname,
        email,
        phone: telefon,
        street: trimmed(request.strasse),
        house_number: trimmed(request.hausnummer),
        postal_code: trimmed(request.plz),
        city: trimmed(request.ort),
        course_name,
    })?;
    Ok((StatusCode::CREATED, Json(participant)))
}

/// Update a participant's contact fields; absent fields stay untouched.
/// Present fields run through the same validation as a registration.
pub async fn update_contact(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateContactRequest>,
) -> Result<Json<Participant>> {
    let vorname = request
        .vorname
        .as_deref()
        .map(|v| validate_name(v, "Vorname"))
        .transpose()?;
    let nachname = request
        .nachname
        .as_deref()
        .map(|v| validate_name(v, "Nachname"))
        .transpose()?;
    let email = request
        .email
        .as_deref()
        .map(validate_email)
        .transpose()?;
    let telefon = request
        .telefon
        .as_deref()
        .map(validate_phone)
        .transpose()?
        .flatten();

    let registry = state.registry()?;
    registry.update_contact(
        id,
        vorname.as_deref(),
        nachname.as_deref(),
        email.as_deref(),
        telefon.as_deref(),
    )?;
    Ok(Json(registry.get(id)?))
}

/// Flip the payment flag.
pub async fn set_paid(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<SetPaidRequest>,
) -> Result<Json<Participant>> {
    let participant = state.registry()?.set_paid(id, request.bezahlt)?;
    Ok(Json(participant))
}

/// Delete a registration.
pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> Result<StatusCode> {
    state.registry()?.delete(id)?;
    Ok(StatusCode::NO_CONTENT)
}
