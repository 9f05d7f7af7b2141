//! Health, readiness and liveness endpoints.

use axum::{Json, Router, extract::State, routing::get};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{Result, ServerError};
use crate::state::AppState;

/// Health check response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Service version.
    pub version: String,
    /// Database status: `ok`, `error` or `nicht konfiguriert`.
    pub database: String,
}

/// Simple health check (no auth required).
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    ),
    tag = "health"
)]
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = match &state.registry {
        Some(registry) => match registry.ping() {
            Ok(()) => "ok".to_string(),
            Err(e) => {
                tracing::error!(error = %e, "Database ping failed");
                "error".to_string()
            }
        },
        None => "nicht konfiguriert".to_string(),
    };

    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database,
    })
}

/// Liveness probe response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LivenessResponse {
    pub status: String,
}

/// Readiness probe: not ready while a configured database is unreachable.
///
/// Without a database the site still serves its content, so an
/// unconfigured registry counts as ready.
#[utoipa::path(
    get,
    path = "/health/ready",
    responses(
        (status = 200, description = "Ready to serve traffic", body = HealthResponse),
        (status = 503, description = "Database unreachable"),
    ),
    tag = "health"
)]
pub async fn health_ready(State(state): State<AppState>) -> Result<Json<HealthResponse>> {
    let database = match &state.registry {
        Some(registry) => {
            registry.ping().map_err(|e| {
                tracing::error!(error = %e, "Database ping failed");
                ServerError::ServiceUnavailable("Datenbank nicht erreichbar".to_string())
            })?;
            "ok".to_string()
        }
        None => "nicht konfiguriert".to_string(),
    };

    Ok(Json(HealthResponse {
        status: "ready".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database,
    }))
}

/// Liveness probe: answers as long as the process serves requests.
#[utoipa::path(
    get,
    path = "/health/live",
    responses(
        (status = 200, description = "Process is alive", body = LivenessResponse),
    ),
    tag = "health"
)]
pub async fn health_live() -> Json<LivenessResponse> {
    Json(LivenessResponse {
        status: "alive".to_string(),
    })
}

/// Create health check routes.
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(health_ready))
        .route("/health/live", get(health_live))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use kursportal_config::AppConfig;
    use kursportal_content::{ContentStore, LessonLibrary};
    use kursportal_registry::ParticipantStore;
    use tower::ServiceExt;

    fn test_state() -> AppState {
        AppState::new(
            AppConfig::default(),
            ContentStore::new("content"),
            LessonLibrary::new("content/unterlagen"),
        )
    }

    #[tokio::test]
    async fn test_health_without_database() {
        let app = health_routes().with_state(test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let health: HealthResponse = serde_json::from_slice(&body).unwrap();

        assert_eq!(health.status, "ok");
        assert_eq!(health.database, "nicht konfiguriert");
        assert!(!health.version.is_empty());
    }

    #[tokio::test]
    async fn test_health_with_database() {
        let state = test_state().with_registry(ParticipantStore::open_in_memory().unwrap());
        let app = health_routes().with_state(state);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let health: HealthResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(health.database, "ok");
    }

    #[tokio::test]
    async fn test_liveness_always_answers() {
        let app = health_routes().with_state(test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health/live")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let live: LivenessResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(live.status, "alive");
    }

    #[tokio::test]
    async fn test_readiness_without_database_is_ready() {
        let app = health_routes().with_state(test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health/ready")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let ready: HealthResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(ready.status, "ready");
        assert_eq!(ready.database, "nicht konfiguriert");
    }

    #[tokio::test]
    async fn test_readiness_with_database() {
        let state = test_state().with_registry(ParticipantStore::open_in_memory().unwrap());
        let app = health_routes().with_state(state);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health/ready")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let ready: HealthResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(ready.database, "ok");
    }
}
