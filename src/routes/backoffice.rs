use crate::{AppState, pages};
use axum::{Router, routing::get};

/// Back-office Router Module
///
/// HTML pages of the admin area. The gate redirects anonymous visitors to sign-in;
/// each page then checks the admin allowlist itself.
pub fn backoffice_routes() -> Router<AppState> {
    Router::new()
        .route("/admin", get(pages::dashboard))
        .route("/admin/products", get(pages::products))
        .route("/admin/content", get(pages::content))
        .route("/admin/media", get(pages::media))
        .route("/admin/settings", get(pages::settings))
        .route("/admin/analytics", get(pages::analytics))
}
