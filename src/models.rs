use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::{IntoParams, ToSchema};

/// Status value that makes a row publicly visible.
pub const ACTIVE_STATUS: &str = "active";

// --- Stored Records (owned by the remote query service) ---

/// Product
///
/// A row of the `products` table as returned by the query service.
/// Timestamps are the store's own text representation and are passed through untouched.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq)]
#[ts(export)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: Option<f64>,
    // Reference to externally hosted media.
    pub image_url: Option<String>,
    // Free-form grouping, e.g. "dropshipping".
    pub category: Option<String>,
    pub status: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl Product {
    pub fn is_active(&self) -> bool {
        self.status.as_deref() == Some(ACTIVE_STATUS)
    }
}

/// Content
///
/// A row of the `content` table. `(page, section)` is not unique.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq)]
#[ts(export)]
pub struct Content {
    pub id: i64,
    pub page: String,
    pub section: String,
    pub title: Option<String>,
    // Free text or HTML.
    pub content: Option<String>,
    pub image_url: Option<String>,
    pub status: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl Content {
    pub fn is_active(&self) -> bool {
        self.status.as_deref() == Some(ACTIVE_STATUS)
    }
}

// --- Request Payloads (Input Schemas) ---

/// NewProduct
///
/// Input payload for POST /api/products. `status` falls back to "active".
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq)]
#[ts(export)]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// ProductPatch
///
/// Partial update payload for PUT /api/products/{id}. Absent fields keep their stored value.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq)]
#[ts(export)]
pub struct ProductPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// NewContent
///
/// Input payload for POST /api/content.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq)]
#[ts(export)]
pub struct NewContent {
    pub page: String,
    pub section: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// ContentPatch
///
/// Partial update payload for PUT /api/content/{id}.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq)]
#[ts(export)]
pub struct ContentPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// ContentFilter
///
/// Query parameters of the public content feed. Matching is exact and case-sensitive;
/// an empty value counts as absent.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ContentFilter {
    pub page: Option<String>,
    pub section: Option<String>,
}

impl ContentFilter {
    pub fn matches(&self, item: &Content) -> bool {
        fn wanted(filter: &Option<String>) -> Option<&str> {
            filter.as_deref().filter(|value| !value.is_empty())
        }

        item.is_active()
            && wanted(&self.page).is_none_or(|page| item.page == page)
            && wanted(&self.section).is_none_or(|section| item.section == section)
    }

    /// Keeps the active rows that satisfy both filters, in their original order.
    pub fn apply(&self, items: Vec<Content>) -> Vec<Content> {
        items.into_iter().filter(|item| self.matches(item)).collect()
    }
}

/// Only rows with the active status.
pub fn active_products(products: Vec<Product>) -> Vec<Product> {
    products.into_iter().filter(Product::is_active).collect()
}

// --- Responses ---

/// DeleteResponse
///
/// Carries the remote service's success flag verbatim.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, PartialEq)]
#[ts(export)]
pub struct DeleteResponse {
    pub success: bool,
}

/// PresignedUrlRequest
///
/// Input payload for POST /api/upload.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema, TS, Default)]
#[ts(export)]
pub struct PresignedUrlRequest {
    /// Original filename, used to derive the extension.
    #[schema(example = "hero.png")]
    pub filename: String,
    /// MIME type the upload is constrained to.
    #[schema(example = "image/png")]
    pub file_type: String,
    /// Declared size in bytes, enforced on the signed request when present.
    #[serde(default)]
    #[ts(type = "number | null")]
    pub size: Option<u64>,
}

/// PresignedUrlResponse
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, TS, Default)]
#[ts(export)]
pub struct PresignedUrlResponse {
    /// Time-limited URL for the PUT request.
    pub upload_url: String,
    /// Object key inside the media bucket.
    pub resource_key: String,
    /// URL to store in `image_url` once the upload finished.
    pub public_url: String,
}

/// DashboardStats
///
/// Counts shown on the back-office landing page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardStats {
    pub total_products: usize,
    pub active_products: usize,
    pub content_pages: usize,
    pub content_sections: usize,
}

impl DashboardStats {
    pub fn from_rows(products: &[Product], content: &[Content]) -> Self {
        let mut pages: Vec<&str> = content.iter().map(|c| c.page.as_str()).collect();
        pages.sort_unstable();
        pages.dedup();

        Self {
            total_products: products.len(),
            active_products: products.iter().filter(|p| p.is_active()).count(),
            content_pages: pages.len(),
            content_sections: content.len(),
        }
    }
}
