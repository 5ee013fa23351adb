//! Admin-surface security gate.
//!
//! Token validation itself belongs to the authentication machinery fronting
//! this service; the gate only refuses unauthenticated requests. For local
//! development the gate can be disabled with `THUNDER_SKIP_SECURITY=true`,
//! the literal lowercase string and nothing else. `TRUE`, `True`, `yes`,
//! and the empty string all leave security enabled.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::warn;

/// Environment variable disabling the admin gate.
pub const SKIP_SECURITY_ENV: &str = "THUNDER_SKIP_SECURITY";

/// Whether the gate is disabled for this process.
///
/// Only the literal `true` counts; anything else keeps security on.
#[must_use]
pub fn security_disabled() -> bool {
    std::env::var(SKIP_SECURITY_ENV).is_ok_and(|value| value == "true")
}

/// Log the development-mode warning when the gate is disabled. Called once
/// at start-up.
pub fn warn_if_disabled() {
    if security_disabled() {
        warn!(
            "{SKIP_SECURITY_ENV}=true: admin surface authentication is DISABLED; \
             never run this configuration outside local development"
        );
    }
}

/// Middleware refusing requests without a bearer credential.
pub async fn require_authentication(request: Request<Body>, next: Next) -> Response {
    if security_disabled() {
        return next.run(request).await;
    }

    let authorized = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .is_some_and(|token| !token.is_empty());

    if !authorized {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "code": "SSE-UNAUTHORIZED",
                "message": "Authentication required",
                "description": "Provide a bearer credential in the Authorization header",
            })),
        )
            .into_response();
    }

    next.run(request).await
}

// Environment-variable behavior is pinned in tests/security_gate.rs, which
// runs as its own process so the variants cannot race other suites.
