use axum::{
    Router,
    extract::FromRef,
    http::HeaderName,
    middleware,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Core application services and components.
pub mod auth;
pub mod config;
pub mod error;
pub mod gate;
pub mod models;
pub mod query;
pub mod repository;
pub mod storage;

// Request handling: JSON API, rendered pages and the markup behind them.
pub mod handlers;
pub mod pages;
pub mod views;

// Module for routing segregation (Public, Admin API, Back-office).
pub mod routes;
use routes::{admin, backoffice, public};

// --- Public Re-exports ---

pub use auth::{IdentityState, JwtIdentityProvider, MockIdentityProvider};
pub use config::AppConfig;
pub use repository::{D1Repository, RepositoryState};
pub use storage::{MockStorageService, S3StorageClient, StorageState};

/// ApiDoc
///
/// OpenAPI document for the public feeds and the admin API, served at
/// `/api-docs/openapi.json`. The rendered pages are not part of it.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::get_public_products, handlers::get_public_content,
        handlers::get_public_page_content, handlers::list_products, handlers::create_product,
        handlers::update_product, handlers::delete_product, handlers::list_content,
        handlers::create_content, handlers::update_content, handlers::create_upload
    ),
    components(
        schemas(
            models::Product, models::Content, models::NewProduct, models::ProductPatch,
            models::NewContent, models::ContentPatch, models::DeleteResponse,
            models::PresignedUrlRequest, models::PresignedUrlResponse, error::ErrorBody,
        )
    ),
    tags(
        (name = "storefront", description = "Storefront content and catalogue API")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single, immutable container of the services every request may need. Cloned per
/// request; each service sits behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Products and content, read and written through the remote query service.
    pub repo: RepositoryState,
    /// Media bucket and presigned upload URLs.
    pub storage: StorageState,
    /// Session token verification.
    pub identity: IdentityState,
    /// The loaded environment configuration.
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for StorageState {
    fn from_ref(app_state: &AppState) -> StorageState {
        app_state.storage.clone()
    }
}

impl FromRef<AppState> for IdentityState {
    fn from_ref(app_state: &AppState) -> IdentityState {
        app_state.identity.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// create_router
///
/// Assembles every route group behind the access gate, then wraps the whole app in the
/// request-id and tracing stack.
pub fn create_router(state: AppState) -> Router {
    // Header name constant for Request Correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        // Documentation: Serve the auto-generated Swagger UI.
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Storefront pages and public feeds (the feeds carry their own CORS layer).
        .merge(public::public_routes())
        // JSON admin API.
        .merge(admin::admin_api_routes())
        // Back-office pages.
        .merge(backoffice::backoffice_routes())
        // The gate sees every request, including unmatched paths, and decides from the
        // path alone whether a session and an admin email are needed.
        .layer(middleware::from_fn_with_state(
            state.clone(),
            gate::access_gate,
        ))
        .with_state(state);

    base_router.layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(trace_span_logger)
                    .on_response(
                        DefaultOnResponse::new()
                            .level(Level::INFO)
                            .latency_unit(tower_http::LatencyUnit::Millis),
                    ),
            )
            .layer(PropagateRequestIdLayer::new(x_request_id)),
    )
}

/// trace_span_logger
///
/// Opens the per-request span with the generated `x-request-id`, so every log line of a
/// request (gate decision, query dispatch, handler failure) carries the same id.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
