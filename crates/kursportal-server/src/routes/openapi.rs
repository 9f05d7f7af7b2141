//! OpenAPI documentation configuration.

use axum::Json;
use utoipa::OpenApi;

use super::{courses, health, participants, registration};

/// OpenAPI documentation for the Kursportal API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Kursportal API",
        description = "HTTP API of the Kursportal course-registration site",
        version = "1.0.0",
        license(name = "MIT"),
    ),
    servers(
        (url = "/", description = "Local server"),
    ),
    paths(
        health::health,
        health::health_ready,
        health::health_live,
        courses::list_courses,
        courses::get_course,
        registration::register,
        participants::count,
    ),
    tags(
        (name = "health", description = "Service health"),
        (name = "kurse", description = "Course catalog"),
        (name = "anmeldung", description = "Registration"),
        (name = "teilnehmende", description = "Participants"),
    )
)]
pub struct ApiDoc;

/// Serve the OpenAPI document as JSON.
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
