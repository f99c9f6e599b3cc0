use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::{
    error::DataError,
    models::{Content, ContentPatch, NewContent, NewProduct, Product, ProductPatch},
    query::{ExecutorState, Statement},
};

/// Repository Trait
///
/// The typed contract over the `products` and `content` tables. Handlers only see this
/// trait, so tests can substitute an in-memory implementation.
///
/// Every failure surfaces as a `DataError`; "no rows" is never an error for lists.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Products ---
    // Every row, newest first.
    async fn list_products(&self) -> Result<Vec<Product>, DataError>;
    async fn create_product(&self, input: NewProduct) -> Result<Product, DataError>;
    // Omitted fields keep their stored value; updated_at is refreshed.
    async fn update_product(&self, id: i64, patch: ProductPatch) -> Result<Product, DataError>;
    // Returns the remote success flag as reported, without checking the row existed.
    async fn delete_product(&self, id: i64) -> Result<bool, DataError>;

    // --- Content ---
    // Every row, ordered by page then section.
    async fn list_content(&self) -> Result<Vec<Content>, DataError>;
    async fn create_content(&self, input: NewContent) -> Result<Content, DataError>;
    async fn update_content(&self, id: i64, patch: ContentPatch) -> Result<Content, DataError>;
}

/// RepositoryState
///
/// The concrete type used to share the data layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;

/// D1Repository
///
/// `Repository` backed by the remote query service.
pub struct D1Repository {
    executor: ExecutorState,
}

impl D1Repository {
    pub fn new(executor: ExecutorState) -> Self {
        Self { executor }
    }
}

#[async_trait]
impl Repository for D1Repository {
    async fn list_products(&self) -> Result<Vec<Product>, DataError> {
        self.executor.execute(sql::select_products()).await?.rows()
    }

    async fn create_product(&self, input: NewProduct) -> Result<Product, DataError> {
        self.executor
            .execute(sql::insert_product(&input))
            .await?
            .first_row()
    }

    async fn update_product(&self, id: i64, patch: ProductPatch) -> Result<Product, DataError> {
        self.executor
            .execute(sql::update_product(id, &patch, Utc::now()))
            .await?
            .first_row()
    }

    async fn delete_product(&self, id: i64) -> Result<bool, DataError> {
        let envelope = self.executor.execute(sql::delete_product(id)).await?;
        Ok(envelope.success)
    }

    async fn list_content(&self) -> Result<Vec<Content>, DataError> {
        self.executor.execute(sql::select_content()).await?.rows()
    }

    async fn create_content(&self, input: NewContent) -> Result<Content, DataError> {
        self.executor
            .execute(sql::insert_content(&input))
            .await?
            .first_row()
    }

    async fn update_content(&self, id: i64, patch: ContentPatch) -> Result<Content, DataError> {
        self.executor
            .execute(sql::update_content(id, &patch, Utc::now()))
            .await?
            .first_row()
    }
}

/// Statement builders. Values are always bound positionally, never interpolated.
pub mod sql {
    use super::*;
    use crate::models::ACTIVE_STATUS;

    /// Text form of the refresh timestamp. Millisecond precision keeps successive
    /// updates ordered, and the prefix matches the store's `YYYY-MM-DD HH:MM:SS`.
    pub fn timestamp(at: DateTime<Utc>) -> String {
        at.format("%Y-%m-%d %H:%M:%S%.3f").to_string()
    }

    fn status_or_active(status: &Option<String>) -> String {
        status.clone().unwrap_or_else(|| ACTIVE_STATUS.to_string())
    }

    pub fn select_products() -> Statement {
        Statement::new("SELECT * FROM products ORDER BY created_at DESC")
    }

    pub fn insert_product(input: &NewProduct) -> Statement {
        Statement::new(
            "INSERT INTO products (name, description, price, image_url, category, status) \
             VALUES (?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(input.name.clone())
        .bind(input.description.clone())
        .bind(input.price)
        .bind(input.image_url.clone())
        .bind(input.category.clone())
        .bind(status_or_active(&input.status))
    }

    pub fn update_product(id: i64, patch: &ProductPatch, now: DateTime<Utc>) -> Statement {
        Statement::new(
            "UPDATE products SET \
             name = COALESCE(?, name), \
             description = COALESCE(?, description), \
             price = COALESCE(?, price), \
             image_url = COALESCE(?, image_url), \
             category = COALESCE(?, category), \
             status = COALESCE(?, status), \
             updated_at = ? \
             WHERE id = ? RETURNING *",
        )
        .bind(patch.name.clone())
        .bind(patch.description.clone())
        .bind(patch.price)
        .bind(patch.image_url.clone())
        .bind(patch.category.clone())
        .bind(patch.status.clone())
        .bind(timestamp(now))
        .bind(id)
    }

    pub fn delete_product(id: i64) -> Statement {
        Statement::new("DELETE FROM products WHERE id = ?").bind(id)
    }

    pub fn select_content() -> Statement {
        Statement::new("SELECT * FROM content ORDER BY page, section")
    }

    pub fn insert_content(input: &NewContent) -> Statement {
        Statement::new(
            "INSERT INTO content (page, section, title, content, image_url, status) \
             VALUES (?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(input.page.clone())
        .bind(input.section.clone())
        .bind(input.title.clone())
        .bind(input.content.clone())
        .bind(input.image_url.clone())
        .bind(status_or_active(&input.status))
    }

    pub fn update_content(id: i64, patch: &ContentPatch, now: DateTime<Utc>) -> Statement {
        Statement::new(
            "UPDATE content SET \
             page = COALESCE(?, page), \
             section = COALESCE(?, section), \
             title = COALESCE(?, title), \
             content = COALESCE(?, content), \
             image_url = COALESCE(?, image_url), \
             status = COALESCE(?, status), \
             updated_at = ? \
             WHERE id = ? RETURNING *",
        )
        .bind(patch.page.clone())
        .bind(patch.section.clone())
        .bind(patch.title.clone())
        .bind(patch.content.clone())
        .bind(patch.image_url.clone())
        .bind(patch.status.clone())
        .bind(timestamp(now))
        .bind(id)
    }
}
