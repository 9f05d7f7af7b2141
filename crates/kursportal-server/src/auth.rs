//! Admin authentication middleware.
//!
//! Admin endpoints accept the shared token either as an `X-Admin-Token`
//! header or as an `?admin=` query parameter (the latter so the office can
//! bookmark the export link).
//!
//! # Security
//!
//! Token comparison uses constant-time comparison to prevent timing attacks.

use axum::{
    body::Body,
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use subtle::ConstantTimeEq;

use crate::error::ServerError;
use crate::state::AppState;

/// Header name carrying the admin token.
pub const ADMIN_TOKEN_HEADER: &str = "X-Admin-Token";

/// Query parameter carrying the admin token.
const ADMIN_QUERY_PARAM: &str = "admin";

/// Compare two strings in constant time.
///
/// This prevents timing attacks by ensuring the comparison takes the same
/// amount of time regardless of how many characters match.
fn constant_time_eq(a: &str, b: &str) -> bool {
    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();

    let length_matches = a_bytes.len() == b_bytes.len();

    if length_matches {
        a_bytes.ct_eq(b_bytes).into()
    } else {
        // Do a dummy comparison to maintain consistent timing
        let _ = a_bytes.ct_eq(a_bytes);
        false
    }
}

/// Middleware guarding the admin endpoints.
///
/// Rejects with 403 when no token is configured, when the request carries
/// no token, or when the token is wrong.
pub async fn require_admin(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, ServerError> {
    let Some(expected) = state.config.server.admin_token.as_deref() else {
        return Err(ServerError::Forbidden(
            "Admin-Zugang nicht konfiguriert".to_string(),
        ));
    };

    let presented = token_from_request(&request)
        .ok_or_else(|| ServerError::Forbidden("Admin-Token fehlt".to_string()))?;

    if !constant_time_eq(&presented, expected) {
        return Err(ServerError::Forbidden("Ungültiges Admin-Token".to_string()));
    }

    Ok(next.run(request).await)
}

/// Extract the presented token: header first, then query parameter.
fn token_from_request(request: &Request<Body>) -> Option<String> {
    if let Some(header) = request.headers().get(ADMIN_TOKEN_HEADER) {
        return header.to_str().ok().map(str::to_string);
    }

    let query = request.uri().query()?;
    query.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        (key == ADMIN_QUERY_PARAM).then(|| value.to_string())
    })
}
