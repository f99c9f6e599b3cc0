#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{HeaderMap, Request, StatusCode},
};
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};
use storefront::{
    AppState, MockIdentityProvider, MockStorageService,
    auth::IdentityState,
    config::AppConfig,
    create_router,
    error::DataError,
    models::{Content, ContentPatch, NewContent, NewProduct, Product, ProductPatch},
    repository::{Repository, RepositoryState},
    storage::StorageState,
};
use tower::ServiceExt;

pub const ADMIN_TOKEN: &str = "admin-token";
pub const MEMBER_TOKEN: &str = "member-token";
pub const NO_EMAIL_TOKEN: &str = "no-email-token";
pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const MEMBER_EMAIL: &str = "member@example.com";

// --- MOCK REPOSITORY IMPLEMENTATION ---

/// In-memory stand-in for the remote store. Every call is counted so tests can prove
/// that the gate stopped a request before any data access happened.
#[derive(Default)]
pub struct MemoryRepository {
    pub products: Vec<Product>,
    pub content: Vec<Content>,
    pub fail: bool,
    pub delete_result: bool,
    pub calls: AtomicUsize,
    pub created_product: Mutex<Option<NewProduct>>,
    pub product_patch: Mutex<Option<(i64, ProductPatch)>>,
    pub created_content: Mutex<Option<NewContent>>,
    pub content_patch: Mutex<Option<(i64, ContentPatch)>>,
}

impl MemoryRepository {
    pub fn with_rows(products: Vec<Product>, content: Vec<Content>) -> Self {
        Self {
            products,
            content,
            delete_result: true,
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn enter(&self) -> Result<(), DataError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            Err(DataError::MissingRow)
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn list_products(&self) -> Result<Vec<Product>, DataError> {
        self.enter()?;
        Ok(self.products.clone())
    }

    async fn create_product(&self, input: NewProduct) -> Result<Product, DataError> {
        self.enter()?;
        *self.created_product.lock().unwrap() = Some(input.clone());
        Ok(Product {
            id: self.products.len() as i64 + 1,
            name: input.name,
            description: input.description,
            price: input.price,
            image_url: input.image_url,
            category: input.category,
            status: Some(input.status.unwrap_or_else(|| "active".to_string())),
            created_at: Some("2025-01-01 00:00:00".to_string()),
            updated_at: Some("2025-01-01 00:00:00".to_string()),
        })
    }

    async fn update_product(&self, id: i64, patch: ProductPatch) -> Result<Product, DataError> {
        self.enter()?;
        *self.product_patch.lock().unwrap() = Some((id, patch.clone()));
        let stored = self
            .products
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or(DataError::MissingRow)?;
        Ok(Product {
            name: patch.name.unwrap_or(stored.name),
            price: patch.price.or(stored.price),
            status: patch.status.or(stored.status),
            ..stored
        })
    }

    async fn delete_product(&self, _id: i64) -> Result<bool, DataError> {
        self.enter()?;
        Ok(self.delete_result)
    }

    async fn list_content(&self) -> Result<Vec<Content>, DataError> {
        self.enter()?;
        Ok(self.content.clone())
    }

    async fn create_content(&self, input: NewContent) -> Result<Content, DataError> {
        self.enter()?;
        *self.created_content.lock().unwrap() = Some(input.clone());
        Ok(Content {
            id: self.content.len() as i64 + 1,
            page: input.page,
            section: input.section,
            title: input.title,
            content: input.content,
            image_url: input.image_url,
            status: Some(input.status.unwrap_or_else(|| "active".to_string())),
            ..Default::default()
        })
    }

    async fn update_content(&self, id: i64, patch: ContentPatch) -> Result<Content, DataError> {
        self.enter()?;
        *self.content_patch.lock().unwrap() = Some((id, patch.clone()));
        let stored = self
            .content
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or(DataError::MissingRow)?;
        Ok(Content {
            title: patch.title.or(stored.title),
            content: patch.content.or(stored.content),
            ..stored
        })
    }
}

// --- FIXTURES ---

pub fn product(id: i64, name: &str, status: Option<&str>) -> Product {
    Product {
        id,
        name: name.to_string(),
        price: Some(399.0),
        category: Some("dropshipping".to_string()),
        status: status.map(str::to_string),
        ..Default::default()
    }
}

pub fn content(id: i64, page: &str, section: &str, status: Option<&str>) -> Content {
    Content {
        id,
        page: page.to_string(),
        section: section.to_string(),
        title: Some(format!("{} {}", page, section)),
        content: Some(format!("{} copy", section)),
        status: status.map(str::to_string),
        ..Default::default()
    }
}

pub fn identity() -> IdentityState {
    Arc::new(
        MockIdentityProvider::new()
            .with_session(ADMIN_TOKEN, "user_admin", Some(ADMIN_EMAIL))
            .with_session(MEMBER_TOKEN, "user_member", Some(MEMBER_EMAIL))
            .with_session(NO_EMAIL_TOKEN, "user_phone", None),
    )
}

pub fn state_with(repo: Arc<MemoryRepository>, storage: StorageState, config: AppConfig) -> AppState {
    AppState {
        repo: repo as RepositoryState,
        storage,
        identity: identity(),
        config,
    }
}

pub fn app(repo: Arc<MemoryRepository>) -> Router {
    create_router(state_with(
        repo,
        Arc::new(MockStorageService::new()),
        AppConfig::default(),
    ))
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).expect("response body is not JSON")
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

pub async fn send(router: Router, request: Request<Body>) -> TestResponse {
    let response = router.oneshot(request).await.expect("router is infallible");
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body read failed");
    TestResponse {
        status,
        headers,
        body: String::from_utf8_lossy(&bytes).into_owned(),
    }
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn get_as(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

pub fn json_as(method: &str, uri: &str, token: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {}", token))
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}
