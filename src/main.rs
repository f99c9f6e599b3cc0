use std::sync::Arc;

use storefront::{
    AppState,
    auth::{IdentityState, JwtIdentityProvider},
    config::{AppConfig, Env},
    create_router,
    query::{ExecutorState, HttpQueryExecutor},
    repository::{D1Repository, RepositoryState},
    storage::{S3StorageClient, StorageService, StorageState},
};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Loads configuration, sets up logging, wires the query client, media storage and
/// session verification into the shared state, then serves HTTP.
#[tokio::main]
async fn main() {
    // 1. Configuration (fail-fast on missing production secrets)
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    // 2. Logging: RUST_LOG wins, otherwise the default filter below.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "storefront=debug,tower_http=info,axum=info".into());

    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);

    if config.env == Env::Local && !config.query.api_token.is_empty() {
        tracing::warn!(
            session_bypass = config.local_session_bypass,
            "running in local mode against a real query service token; set APP_ENV=production for deployments"
        );
    }

    // 3. Data access: one HTTP client shared by every query.
    let http = reqwest::Client::builder()
        .user_agent(concat!("storefront/", env!("CARGO_PKG_VERSION")))
        .build()
        .expect("FATAL: Failed to build the HTTP client.");
    let executor = HttpQueryExecutor::new(http, &config.query);
    tracing::info!(endpoint = %executor.endpoint(), "query service configured");
    let repo = Arc::new(D1Repository::new(Arc::new(executor) as ExecutorState)) as RepositoryState;

    // 4. Media storage (S3-compatible)
    let s3_client = S3StorageClient::new(
        &config.s3_endpoint,
        &config.s3_region,
        &config.s3_key,
        &config.s3_secret,
        &config.s3_bucket,
        &config.media_public_url,
    )
    .await;

    // LOCAL-ONLY: create the MinIO bucket on first start.
    if config.env == Env::Local {
        s3_client.ensure_bucket_exists().await;
    }
    let storage = Arc::new(s3_client) as StorageState;

    // 5. Session verification
    let identity = Arc::new(
        JwtIdentityProvider::from_config(&config.identity)
            .expect("FATAL: SESSION_JWT_PUBLIC_KEY is not a valid RSA public key."),
    ) as IdentityState;

    let bind_addr = config.bind_addr.clone();
    let app_state = AppState {
        repo,
        storage,
        identity,
        config,
    };

    // 6. Router and Server Startup
    let app = create_router(app_state);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .expect("FATAL: Failed to bind the HTTP listener. Check BIND_ADDR.");

    tracing::info!("Listening on {}", bind_addr);
    tracing::info!("API Documentation (Swagger UI) available at /swagger-ui");

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "HTTP server stopped");
    }
}
