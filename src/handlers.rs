use crate::{
    AppState,
    error::{ApiError, ErrorBody, OrFail},
    models::{
        self, Content, ContentFilter, ContentPatch, DeleteResponse, NewContent, NewProduct,
        PresignedUrlRequest, PresignedUrlResponse, Product, ProductPatch,
    },
    storage::{media_object_key, validate_upload},
};
use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
};
use serde::Deserialize;
use utoipa::IntoParams;

/// SectionFilter
///
/// Query parameters of the page-scoped public content feed.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SectionFilter {
    pub section: Option<String>,
}

// --- Public Read API ---

/// get_public_products
///
/// [Public Route] Active products only. The whole table is fetched and filtered in
/// process.
#[utoipa::path(
    get,
    path = "/api/public/products",
    responses(
        (status = 200, description = "Active products", body = [Product]),
        (status = 500, description = "Failed", body = ErrorBody)
    )
)]
pub async fn get_public_products(
    State(state): State<AppState>,
) -> Result<Json<Vec<Product>>, ApiError> {
    let products = state
        .repo
        .list_products()
        .await
        .or_fail("Failed to fetch products")?;
    Ok(Json(models::active_products(products)))
}

/// get_public_content
///
/// [Public Route] Active content, optionally narrowed to one page and/or section.
#[utoipa::path(
    get,
    path = "/api/public/content",
    params(ContentFilter),
    responses(
        (status = 200, description = "Active content", body = [Content]),
        (status = 500, description = "Failed", body = ErrorBody)
    )
)]
pub async fn get_public_content(
    State(state): State<AppState>,
    filter: Result<Query<ContentFilter>, QueryRejection>,
) -> Result<Json<Vec<Content>>, ApiError> {
    let Query(filter) = filter.or_fail("Failed to fetch content")?;
    let content = state
        .repo
        .list_content()
        .await
        .or_fail("Failed to fetch content")?;
    Ok(Json(filter.apply(content)))
}

/// get_public_page_content
///
/// [Public Route] Active content of a single page, optionally one section of it.
#[utoipa::path(
    get,
    path = "/api/public/content/{page}",
    params(("page" = String, Path, description = "Page key, e.g. home"), SectionFilter),
    responses(
        (status = 200, description = "Active content of the page", body = [Content]),
        (status = 500, description = "Failed", body = ErrorBody)
    )
)]
pub async fn get_public_page_content(
    State(state): State<AppState>,
    page: Result<Path<String>, PathRejection>,
    section: Result<Query<SectionFilter>, QueryRejection>,
) -> Result<Json<Vec<Content>>, ApiError> {
    let Path(page) = page.or_fail("Failed to fetch page content")?;
    let Query(SectionFilter { section }) = section.or_fail("Failed to fetch page content")?;
    let filter = ContentFilter {
        page: Some(page),
        section,
    };
    let content = state
        .repo
        .list_content()
        .await
        .or_fail("Failed to fetch page content")?;
    Ok(Json(filter.apply(content)))
}

/// preflight
///
/// [Public Route] Answers `OPTIONS` on the public feeds; the CORS layer adds the headers.
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

// --- Admin API: Products ---

/// list_products
///
/// [Admin Route] Every product, whatever its status, newest first.
#[utoipa::path(
    get,
    path = "/api/products",
    responses(
        (status = 200, description = "All products", body = [Product]),
        (status = 500, description = "Failed", body = ErrorBody)
    )
)]
pub async fn list_products(State(state): State<AppState>) -> Result<Json<Vec<Product>>, ApiError> {
    let products = state
        .repo
        .list_products()
        .await
        .or_fail("Failed to fetch products")?;
    Ok(Json(products))
}

/// create_product
///
/// [Admin Route] Inserts a product; `status` defaults to "active".
#[utoipa::path(
    post,
    path = "/api/products",
    request_body = NewProduct,
    responses(
        (status = 201, description = "Created", body = Product),
        (status = 500, description = "Failed", body = ErrorBody)
    )
)]
pub async fn create_product(
    State(state): State<AppState>,
    payload: Result<Json<NewProduct>, JsonRejection>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    let Json(input) = payload.or_fail("Failed to create product")?;
    let product = state
        .repo
        .create_product(input)
        .await
        .or_fail("Failed to create product")?;
    tracing::info!(product_id = product.id, "product created");
    Ok((StatusCode::CREATED, Json(product)))
}

/// update_product
///
/// [Admin Route] Partial update; omitted fields keep their stored values.
#[utoipa::path(
    put,
    path = "/api/products/{id}",
    params(("id" = i64, Path, description = "Product ID")),
    request_body = ProductPatch,
    responses(
        (status = 200, description = "Updated", body = Product),
        (status = 500, description = "Failed", body = ErrorBody)
    )
)]
pub async fn update_product(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<ProductPatch>, JsonRejection>,
) -> Result<Json<Product>, ApiError> {
    let Path(id) = id.or_fail("Failed to update product")?;
    let Json(patch) = payload.or_fail("Failed to update product")?;
    let product = state
        .repo
        .update_product(id, patch)
        .await
        .or_fail("Failed to update product")?;
    tracing::info!(product_id = id, "product updated");
    Ok(Json(product))
}

/// delete_product
///
/// [Admin Route] Deletes by id and echoes the remote success flag. No existence check.
#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    params(("id" = i64, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Remote success flag", body = DeleteResponse),
        (status = 500, description = "Failed", body = ErrorBody)
    )
)]
pub async fn delete_product(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let Path(id) = id.or_fail("Failed to delete product")?;
    let success = state
        .repo
        .delete_product(id)
        .await
        .or_fail("Failed to delete product")?;
    tracing::info!(product_id = id, success, "product delete issued");
    Ok(Json(DeleteResponse { success }))
}

// --- Admin API: Content ---

/// list_content
///
/// [Admin Route] Every content row, ordered by page then section.
#[utoipa::path(
    get,
    path = "/api/content",
    responses(
        (status = 200, description = "All content", body = [Content]),
        (status = 500, description = "Failed", body = ErrorBody)
    )
)]
pub async fn list_content(State(state): State<AppState>) -> Result<Json<Vec<Content>>, ApiError> {
    let content = state
        .repo
        .list_content()
        .await
        .or_fail("Failed to fetch content")?;
    Ok(Json(content))
}

/// create_content
#[utoipa::path(
    post,
    path = "/api/content",
    request_body = NewContent,
    responses(
        (status = 201, description = "Created", body = Content),
        (status = 500, description = "Failed", body = ErrorBody)
    )
)]
pub async fn create_content(
    State(state): State<AppState>,
    payload: Result<Json<NewContent>, JsonRejection>,
) -> Result<(StatusCode, Json<Content>), ApiError> {
    let Json(input) = payload.or_fail("Failed to create content")?;
    let content = state
        .repo
        .create_content(input)
        .await
        .or_fail("Failed to create content")?;
    tracing::info!(content_id = content.id, page = %content.page, "content created");
    Ok((StatusCode::CREATED, Json(content)))
}

/// update_content
#[utoipa::path(
    put,
    path = "/api/content/{id}",
    params(("id" = i64, Path, description = "Content ID")),
    request_body = ContentPatch,
    responses(
        (status = 200, description = "Updated", body = Content),
        (status = 500, description = "Failed", body = ErrorBody)
    )
)]
pub async fn update_content(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<ContentPatch>, JsonRejection>,
) -> Result<Json<Content>, ApiError> {
    let Path(id) = id.or_fail("Failed to update content")?;
    let Json(patch) = payload.or_fail("Failed to update content")?;
    let content = state
        .repo
        .update_content(id, patch)
        .await
        .or_fail("Failed to update content")?;
    tracing::info!(content_id = id, "content updated");
    Ok(Json(content))
}

// --- Admin API: Media ---

/// create_upload
///
/// [Admin Route] Issues a presigned PUT URL for one image, so the browser uploads
/// straight to the media bucket.
#[utoipa::path(
    post,
    path = "/api/upload",
    request_body = PresignedUrlRequest,
    responses(
        (status = 200, description = "Signed upload", body = PresignedUrlResponse),
        (status = 500, description = "Failed", body = ErrorBody)
    )
)]
pub async fn create_upload(
    State(state): State<AppState>,
    payload: Result<Json<PresignedUrlRequest>, JsonRejection>,
) -> Result<Json<PresignedUrlResponse>, ApiError> {
    let Json(request) = payload.or_fail("Failed to upload file")?;
    validate_upload(&request.file_type, request.size).or_fail("Failed to upload file")?;

    let object_key = media_object_key(&request.filename);
    let upload_url = state
        .storage
        .get_presigned_upload_url(&object_key, &request.file_type, request.size)
        .await
        .or_fail("Failed to upload file")?;

    Ok(Json(PresignedUrlResponse {
        upload_url,
        public_url: state.storage.public_url(&object_key),
        resource_key: object_key,
    }))
}
