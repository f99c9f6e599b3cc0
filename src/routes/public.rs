use crate::{AppState, handlers, pages};
use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::get,
};
use tower_http::{
    cors::{Any, CorsLayer},
    set_header::SetResponseHeaderLayer,
};

/// Public Router Module
///
/// Storefront pages plus the read-only feeds used by the storefront and by third-party
/// sites. The feeds only ever return rows whose status is "active".
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for load balancers.
        .route("/health", get(|| async { "ok" }))
        // --- Pages ---
        .route("/", get(pages::home))
        .route("/about", get(pages::about))
        .route("/services", get(pages::services))
        .route("/contact", get(pages::contact))
        .route("/login", get(pages::login))
        .route("/sign-in", get(pages::sign_in))
        .route("/sign-in/{*rest}", get(pages::sign_in))
        .merge(public_feed_routes())
}

/// Public read API.
///
/// Any origin may read these feeds; the CORS layer answers with
/// `Access-Control-Allow-Origin: *`, including on failures. The allowed methods and
/// headers are repeated on every response, not only on preflight.
pub fn public_feed_routes() -> Router<AppState> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        // GET /api/public/products
        .route(
            "/api/public/products",
            get(handlers::get_public_products).options(handlers::preflight),
        )
        // GET /api/public/content?page=...&section=...
        .route(
            "/api/public/content",
            get(handlers::get_public_content).options(handlers::preflight),
        )
        // GET /api/public/content/{page}?section=...
        .route(
            "/api/public/content/{page}",
            get(handlers::get_public_page_content).options(handlers::preflight),
        )
        .layer(cors)
        .layer(SetResponseHeaderLayer::if_not_present(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("GET, OPTIONS"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("content-type"),
        ))
}
