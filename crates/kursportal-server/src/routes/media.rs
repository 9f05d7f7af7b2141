//! Lesson media serving.
//!
//! Everything the link rewriter produces lands here:
//! `/unterlagen/<slug>/media/<relpath>`. The path is resolved against the
//! course directory and the canonicalized result must stay inside it,
//! otherwise the request is rejected. This is the single traversal guard
//! for lesson assets.

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};

use crate::error::{Result, ServerError};
use crate::state::AppState;

/// Serve one lesson asset.
pub async fn get_media(
    State(state): State<AppState>,
    Path((slug, relpath)): Path<(String, String)>,
) -> Result<Response> {
    let course_dir = state
        .lessons
        .course_dir(&slug)
        .canonicalize()
        .map_err(|_| ServerError::NotFound(format!("Kurs '{}' nicht gefunden", slug)))?;

    let resolved = course_dir
        .join(&relpath)
        .canonicalize()
        .map_err(|_| ServerError::NotFound(format!("Datei '{}' nicht gefunden", relpath)))?;

    if !resolved.starts_with(&course_dir) {
        tracing::warn!(slug, path = %relpath, "Blocked media path outside course directory");
        return Err(ServerError::Forbidden("Ungültiger Pfad".to_string()));
    }
    if !resolved.is_file() {
        return Err(ServerError::NotFound(format!(
            "Datei '{}' nicht gefunden",
            relpath
        )));
    }

    let bytes = tokio::fs::read(&resolved)
        .await
        .map_err(|e| ServerError::Internal(format!("Failed to read media file: {}", e)))?;

    let content_type = content_type_for(&resolved);
    Ok(([(header::CONTENT_TYPE, content_type)], bytes).into_response())
}

/// Content type by file extension; the set lesson authors actually use.
fn content_type_for(path: &std::path::Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("webp") => "image/webp",
        Some("pdf") => "application/pdf",
        Some("html") | Some("htm") => "text/html; charset=utf-8",
        Some("css") => "text/css",
        Some("js") => "text/javascript",
        Some("json") => "application/json",
        Some("md") | Some("txt") => "text/plain; charset=utf-8",
        Some("zip") => "application/zip",
        Some("csv") => "text/csv",
        Some("mp4") => "video/mp4",
        _ => "application/octet-stream",
    }
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
            .route("/unterlagen/{slug}/media/{*path}", get(get_media))
            .with_state(state)
    }

    #[tokio::test]
    async fn test_serves_lesson_asset() {
        let dir = tempfile::tempdir().unwrap();
        let lesson_dir = dir.path().join("unterlagen/py101/L01");
        fs::create_dir_all(&lesson_dir).unwrap();
        fs::write(lesson_dir.join("pic.png"), b"\x89PNG fake").unwrap();

        let response = test_app(dir.path())
            .oneshot(
                Request::builder()
                    .uri("/unterlagen/py101/media/L01/pic.png")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "image/png"
        );
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"\x89PNG fake");
    }

    #[tokio::test]
    async fn test_traversal_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("unterlagen/py101")).unwrap();
        fs::write(dir.path().join("geheim.txt"), "secret").unwrap();

        let response = test_app(dir.path())
            .oneshot(
                Request::builder()
                    .uri("/unterlagen/py101/media/../geheim.txt")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        // Escaping paths either resolve outside (403) or fail to resolve at
        // all (404); both keep the file unreachable.
        assert!(
            response.status() == StatusCode::FORBIDDEN
                || response.status() == StatusCode::NOT_FOUND
        );
    }

    #[tokio::test]
    async fn test_missing_file_is_404() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("unterlagen/py101")).unwrap();

        let response = test_app(dir.path())
            .oneshot(
                Request::builder()
                    .uri("/unterlagen/py101/media/L01/nope.png")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unknown_course_is_404() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("unterlagen")).unwrap();

        let response = test_app(dir.path())
            .oneshot(
                Request::builder()
                    .uri("/unterlagen/nope/media/x.png")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_content_types() {
        use std::path::Path;
        assert_eq!(content_type_for(Path::new("a.PDF")), "application/pdf");
        assert_eq!(content_type_for(Path::new("a.jpeg")), "image/jpeg");
        assert_eq!(content_type_for(Path::new("a")), "application/octet-stream");
    }
}
