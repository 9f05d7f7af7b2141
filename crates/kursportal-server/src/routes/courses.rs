//! Course catalog endpoints.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use serde_json::Value;

use kursportal_content::Course;

use crate::error::Result;
use crate::state::AppState;

// ── Response types ──────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct CourseListResponse {
    pub kurse: Vec<Course>,
}

// ── Handlers ────────────────────────────────────────────────────────

/// List the visible courses.
#[utoipa::path(
    get,
    path = "/kurse",
    responses(
        (status = 200, description = "Visible course catalog"),
    ),
    tag = "kurse"
)]
pub async fn list_courses(State(state): State<AppState>) -> Result<Json<CourseListResponse>> {
    let kurse = state.visible_courses()?;
    Ok(Json(CourseListResponse { kurse }))
}

/// The merged detail document for one course.
///
/// Hidden courses are not addressable here either.
#[utoipa::path(
    get,
    path = "/kurse/{id}",
    params(("id" = String, Path, description = "Course id")),
    responses(
        (status = 200, description = "Course detail"),
        (status = 404, description = "Unknown or hidden course"),
    ),
    tag = "kurse"
)]
pub async fn get_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let course = state.visible_course(&id)?;
    let detail = state.course_detail(&course)?;
    Ok(Json(detail))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode},
        routing::get,
    };
    use kursportal_config::AppConfig;
    use kursportal_content::{ContentStore, LessonLibrary};
    use std::fs;
    use tower::ServiceExt;

    fn test_app(dir: &std::path::Path) -> Router {
        let state = AppState::new(
            AppConfig::default(),
            ContentStore::new(dir),
            LessonLibrary::new(dir.join("unterlagen")),
        );
        Router::new()
            .route("/kurse", get(list_courses))
            .route("/kurse/{id}", get(get_course))
            .with_state(state)
    }

    fn write_catalog(dir: &std::path::Path, json: &str) {
        fs::create_dir_all(dir).unwrap();
        fs::write(dir.join("courses.json"), json).unwrap();
    }

    #[tokio::test]
    async fn test_list_hides_invisible_courses() {
        let dir = tempfile::tempdir().unwrap();
        write_catalog(
            dir.path(),
            r#"[
                {"id": "py101", "label": "Python Grundkurs"},
                {"id": "intern", "label": "Probelauf", "visible": false}
            ]"#,
        );

        let response = test_app(dir.path())
            .oneshot(Request::builder().uri("/kurse").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let parsed: Value = serde_json::from_slice(&body).unwrap();
        let kurse = parsed["kurse"].as_array().unwrap();
        assert_eq!(kurse.len(), 1);
        assert_eq!(kurse[0]["id"], "py101");
    }

    #[tokio::test]
    async fn test_detail_merges_description_document() {
        let dir = tempfile::tempdir().unwrap();
        write_catalog(
            dir.path(),
            r#"[{"id": "py101", "label": "Python Grundkurs"}]"#,
        );
        fs::write(
            dir.path().join("py101.json"),
            r#"{"dauer": "8 Wochen", "preis": 240}"#,
        )
        .unwrap();

        let response = test_app(dir.path())
            .oneshot(
                Request::builder()
                    .uri("/kurse/py101")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let parsed: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(parsed["label"], "Python Grundkurs");
        assert_eq!(parsed["dauer"], "8 Wochen");
    }

    #[tokio::test]
    async fn test_unknown_course_is_404() {
        let dir = tempfile::tempdir().unwrap();
        write_catalog(dir.path(), r#"[{"id": "py101", "label": "Python"}]"#);

        let response = test_app(dir.path())
            .oneshot(
                Request::builder()
                    .uri("/kurse/nope")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_hidden_course_detail_is_404() {
        let dir = tempfile::tempdir().unwrap();
        write_catalog(
            dir.path(),
            r#"[{"id": "intern", "label": "Probelauf", "visible": false}]"#,
        );

        let response = test_app(dir.path())
            .oneshot(
                Request::builder()
                    .uri("/kurse/intern")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
