use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post, put},
};

/// Admin API Router Module
///
/// CRUD over products and content plus media upload signing. Every route here sits
/// under a protected prefix, so the access gate has already verified both the session
/// and the admin allowlist before a handler runs.
///
/// Content has no delete route.
pub fn admin_api_routes() -> Router<AppState> {
    Router::new()
        // GET/POST /api/products
        .route(
            "/api/products",
            get(handlers::list_products).post(handlers::create_product),
        )
        // PUT/DELETE /api/products/{id}
        .route(
            "/api/products/{id}",
            put(handlers::update_product).delete(handlers::delete_product),
        )
        // GET/POST /api/content
        .route(
            "/api/content",
            get(handlers::list_content).post(handlers::create_content),
        )
        // PUT /api/content/{id}
        .route("/api/content/{id}", put(handlers::update_content))
        // POST /api/upload
        // Presigned direct-to-bucket upload for product and content images.
        .route("/api/upload", post(handlers::create_upload))
}
