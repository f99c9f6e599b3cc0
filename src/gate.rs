//! Access gate: request path classification plus session and admin enforcement.
//!
//! Every request passes through [`access_gate`] before reaching a handler.

use axum::{
    Json,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::{AppState, auth::resolve_session, error::ErrorBody};

/// RouteClass
///
/// How the gate treats a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    /// Served to anyone.
    Public,
    /// Back-office pages and the admin API: session required, admin required for API calls.
    Protected,
    /// Matched by neither set: session required, no admin check.
    Unclassified,
}

/// Pattern
///
/// `Exact` matches one path; `Prefix` matches every path starting with it, the way
/// `/admin(.*)` also covers `/admin` itself.
enum Pattern {
    Exact(&'static str),
    Prefix(&'static str),
}

impl Pattern {
    fn matches(&self, path: &str) -> bool {
        match self {
            Pattern::Exact(exact) => path == *exact,
            Pattern::Prefix(prefix) => path.starts_with(prefix),
        }
    }
}

const PUBLIC_ROUTES: &[Pattern] = &[
    Pattern::Exact("/"),
    Pattern::Exact("/login"),
    Pattern::Exact("/about"),
    Pattern::Exact("/services"),
    Pattern::Exact("/contact"),
    Pattern::Prefix("/sign-in"),
    Pattern::Prefix("/api/public"),
    // Operational endpoints.
    Pattern::Exact("/health"),
    Pattern::Prefix("/swagger-ui"),
    Pattern::Prefix("/api-docs"),
];

const PROTECTED_ROUTES: &[Pattern] = &[
    Pattern::Prefix("/api/products"),
    Pattern::Prefix("/api/content"),
    Pattern::Prefix("/api/upload"),
    Pattern::Prefix("/admin"),
];

/// Classifies a request path. The public set is checked first.
pub fn classify(path: &str) -> RouteClass {
    if PUBLIC_ROUTES.iter().any(|p| p.matches(path)) {
        RouteClass::Public
    } else if PROTECTED_ROUTES.iter().any(|p| p.matches(path)) {
        RouteClass::Protected
    } else {
        RouteClass::Unclassified
    }
}

fn is_api_path(path: &str) -> bool {
    path == "/api" || path.starts_with("/api/")
}

/// GateRejection
///
/// Responses produced by the gate itself, before any handler runs.
#[derive(Debug, PartialEq)]
pub enum GateRejection {
    /// API call without a valid session.
    Unauthorized,
    /// Page request without a valid session; carries the path and query to return to.
    SignIn(String),
    /// API call from a session outside the admin allowlist.
    Forbidden,
}

impl IntoResponse for GateRejection {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            GateRejection::SignIn(target) => {
                return Redirect::to(&sign_in_location(&target)).into_response();
            }
            GateRejection::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized"),
            GateRejection::Forbidden => (StatusCode::FORBIDDEN, "Forbidden"),
        };
        let body = ErrorBody {
            error: message.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Sign-in URL that returns to `target` (path plus query) afterwards. The target is
/// percent-encoded so its own query cannot leak into the sign-in parameters.
pub fn sign_in_location(target: &str) -> String {
    let encoded: String = form_urlencoded::byte_serialize(target.as_bytes()).collect();
    format!("/sign-in?redirect_url={}", encoded)
}

/// access_gate
///
/// Middleware applied to the whole router.
///
/// 1. Logs method and path.
/// 2. Public paths pass straight through.
/// 3. Anything else needs a session from the identity provider; without one, API
///    calls get 401 and pages are redirected to sign-in.
/// 4. Protected API paths additionally require an allowlisted admin email (403).
///    Admin pages do their own allowlist check so they can render the denial view.
///
/// On success the resolved `Session` is stored in the request extensions.
pub async fn access_gate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, GateRejection> {
    let path = request.uri().path().to_string();
    let return_to = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| path.clone());
    tracing::info!(method = %request.method(), path = %path, "access gate");

    let class = classify(&path);
    if class == RouteClass::Public {
        return Ok(next.run(request).await);
    }

    let session = resolve_session(state.identity.as_ref(), &state.config, request.headers())
        .await
        .ok_or_else(|| {
            tracing::info!(path = %path, "request without a valid session rejected");
            if is_api_path(&path) {
                GateRejection::Unauthorized
            } else {
                GateRejection::SignIn(return_to.clone())
            }
        })?;

    if class == RouteClass::Protected
        && is_api_path(&path)
        && !state.config.admin_emails.permits(session.email.as_deref())
    {
        tracing::warn!(
            path = %path,
            user_id = %session.user_id,
            "non-admin session refused on admin API"
        );
        return Err(GateRejection::Forbidden);
    }

    request.extensions_mut().insert(session);
    Ok(next.run(request).await)
}
