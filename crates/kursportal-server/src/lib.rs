//! HTTP API server for the Kursportal course-registration site.
//!
//! This crate wires the content loaders, participant registry and mailer
//! into an axum router:
//!
//! - Public: course catalog, lessons and media, registration, counters
//! - Admin: participant management and CSV export behind a shared token
//! - Registration is rate limited per client with a sliding window
//!
//! # Example
//!
//! ```ignore
//! use kursportal_config::AppConfig;
//! use kursportal_content::{ContentStore, LessonLibrary};
//! use kursportal_server::{AppState, Server};
//!
//! let config = AppConfig::default();
//! let state = AppState::new(
//!     config,
//!     ContentStore::new("content"),
//!     LessonLibrary::new("content/unterlagen"),
//! );
//! Server::from_state(state).run().await?;
//! ```

pub mod auth;
pub mod error;
pub mod ratelimit;
pub mod routes;
pub mod state;
pub mod validation;

pub use auth::{ADMIN_TOKEN_HEADER, require_admin};
pub use error::{Result, ServerError};
pub use ratelimit::{SlidingWindowLimiter, registration_rate_limit, request_logging_middleware};
pub use routes::{RegistrationRequest, RegistrationResponse};
pub use state::AppState;

use std::net::SocketAddr;

use axum::{
    Router, middleware,
    routing::{get, patch, post},
};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// The Kursportal HTTP server.
pub struct Server {
    /// Application state.
    state: AppState,
}

impl Server {
    /// Create a server from a pre-built application state.
    pub fn from_state(state: AppState) -> Self {
        Self { state }
    }

    /// Build the router with all routes and middleware.
    pub fn router(&self) -> Router {
        let mut router = Router::new()
            // Health (no auth)
            .merge(routes::health_routes())
            // Course catalog
            .route("/kurse", get(routes::list_courses))
            .route("/kurse/{id}", get(routes::get_course))
            // Course materials
            .route("/unterlagen", get(routes::list_material_courses))
            .route("/unterlagen/{slug}", get(routes::list_lessons))
            .route("/unterlagen/{slug}/{lesson}", get(routes::get_lesson))
            .route("/unterlagen/{slug}/media/{*path}", get(routes::get_media))
            // Registration, rate limited per client
            .route(
                "/anmeldung",
                post(routes::register).layer(middleware::from_fn_with_state(
                    self.state.clone(),
                    ratelimit::registration_rate_limit,
                )),
            )
            // Public counter for the landing page
            .route("/teilnehmende/count", get(routes::participants::count))
            // OpenAPI document
            .route("/api-docs/openapi.json", get(routes::openapi_json))
            // Admin endpoints
            .merge(self.admin_routes())
            // Request logging
            .layer(middleware::from_fn_with_state(
                self.state.clone(),
                ratelimit::request_logging_middleware,
            ))
            // TraceLayer for detailed HTTP tracing
            .layer(TraceLayer::new_for_http());

        if self.state.config.server.cors {
            router = router.layer(CorsLayer::permissive());
        }

        router.with_state(self.state.clone())
    }

    /// Participant management routes, all behind the admin token.
    fn admin_routes(&self) -> Router<AppState> {
        Router::new()
            .route(
                "/teilnehmende",
                get(routes::participants::list).post(routes::participants::create),
            )
            .route("/teilnehmende/stats", get(routes::participants::stats))
            .route(
                "/teilnehmende/export.csv",
                get(routes::participants::export_csv),
            )
            .route(
                "/teilnehmende/{id}",
                patch(routes::participants::update_contact).delete(routes::participants::delete),
            )
            .route(
                "/teilnehmende/{id}/bezahlt",
                post(routes::participants::set_paid),
            )
            .layer(middleware::from_fn_with_state(
                self.state.clone(),
                auth::require_admin,
            ))
    }

    /// Run the server on the configured bind address.
    pub async fn run(self) -> Result<()> {
        let addr = self.state.config.server.bind;
        self.run_on(addr).await
    }

    /// Run the server on a specific address (useful for testing).
    pub async fn run_on(self, addr: SocketAddr) -> Result<()> {
        let router = self.router();

        info!("Starting server on {}", addr);

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Internal(format!("Failed to bind: {}", e)))?;

        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .map_err(|e| ServerError::Internal(format!("Server error: {}", e)))?;

        Ok(())
    }

    /// Get the configured bind address.
    pub fn bind_address(&self) -> SocketAddr {
        self.state.config.server.bind
    }
}
