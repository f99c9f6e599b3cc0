use async_trait::async_trait;
use aws_sdk_s3 as s3;
use s3::presigning::PresigningConfig;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::error::StorageError;

/// Media types the back-office accepts for product and content images.
pub const ALLOWED_MEDIA_TYPES: [&str; 4] = ["image/png", "image/jpeg", "image/gif", "image/webp"];

/// Largest declared upload, in bytes (10 MiB).
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Lifetime of a presigned upload URL.
const UPLOAD_URL_TTL: Duration = Duration::from_secs(600);

// 1. StorageService Contract
/// StorageService
///
/// Abstract contract for the media bucket that hosts images referenced by `image_url`.
/// The real implementation talks to S3/MinIO; `MockStorageService` is used in tests.
#[async_trait]
pub trait StorageService: Send + Sync {
    /// Creates the bucket if needed. Only called in `Env::Local` against MinIO.
    async fn ensure_bucket_exists(&self);

    /// Generates a signed URL allowing the browser to PUT one object directly.
    ///
    /// # Arguments
    /// * `key`: object key inside the bucket.
    /// * `content_type`: MIME type the upload is constrained to.
    /// * `size`: declared content length, signed into the request when known.
    async fn get_presigned_upload_url(
        &self,
        key: &str,
        content_type: &str,
        size: Option<u64>,
    ) -> Result<String, StorageError>;

    /// Public URL of an object once uploaded.
    fn public_url(&self, key: &str) -> String;
}

/// Checks the declared type and size of an upload before anything is signed.
pub fn validate_upload(content_type: &str, size: Option<u64>) -> Result<(), StorageError> {
    if !ALLOWED_MEDIA_TYPES.contains(&content_type) {
        return Err(StorageError::UnsupportedType(content_type.to_string()));
    }
    match size {
        Some(size) if size > MAX_UPLOAD_BYTES => Err(StorageError::TooLarge {
            size,
            limit: MAX_UPLOAD_BYTES,
        }),
        _ => Ok(()),
    }
}

/// Builds a unique object key (`media/<uuid>.<ext>`) from the client filename.
/// Only alphanumeric extensions survive; anything else becomes `bin`.
pub fn media_object_key(filename: &str) -> String {
    let extension = std::path::Path::new(filename)
        .extension()
        .and_then(std::ffi::OsStr::to_str)
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(str::to_ascii_lowercase)
        .unwrap_or_else(|| "bin".to_string());

    format!("media/{}.{}", Uuid::new_v4(), extension)
}

// 2. The Real Implementation (S3/MinIO)
/// S3StorageClient
///
/// `force_path_style(true)` is required for MinIO and most S3-compatible gateways.
#[derive(Clone)]
pub struct S3StorageClient {
    client: s3::Client,
    bucket_name: String,
    public_base_url: String,
}

impl S3StorageClient {
    pub async fn new(
        endpoint: &str,
        region: &str,
        access_key: &str,
        secret_key: &str,
        bucket: &str,
        public_base_url: &str,
    ) -> Self {
        let credentials =
            s3::config::Credentials::new(access_key, secret_key, None, None, "static");

        let config = s3::Config::builder()
            .credentials_provider(credentials)
            .endpoint_url(endpoint)
            .region(s3::config::Region::new(region.to_string()))
            .behavior_version_latest()
            .force_path_style(true)
            .build();

        Self {
            client: s3::Client::from_conf(config),
            bucket_name: bucket.to_string(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl StorageService for S3StorageClient {
    async fn ensure_bucket_exists(&self) {
        // CreateBucket on an existing bucket fails harmlessly.
        if let Err(e) = self
            .client
            .create_bucket()
            .bucket(&self.bucket_name)
            .send()
            .await
        {
            tracing::debug!(error = %e, bucket = %self.bucket_name, "create_bucket skipped");
        }
    }

    async fn get_presigned_upload_url(
        &self,
        key: &str,
        content_type: &str,
        size: Option<u64>,
    ) -> Result<String, StorageError> {
        let presigning = PresigningConfig::expires_in(UPLOAD_URL_TTL)
            .map_err(|e| StorageError::Presign(e.to_string()))?;

        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket_name)
            .key(key)
            .content_type(content_type);

        if let Some(size) = size {
            request = request.content_length(size as i64);
        }

        let presigned = request
            .presigned(presigning)
            .await
            .map_err(|e| StorageError::Presign(e.to_string()))?;

        Ok(presigned.uri().to_string())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url, sanitize_key(key))
    }
}

/// sanitize_key
///
/// Drops empty, `.` and `..` segments so a key can never climb out of its prefix.
fn sanitize_key(key: &str) -> String {
    key.split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".." && *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}

// 3. The Mock Implementation (For Tests)
/// MockStorageService
///
/// Deterministic URLs, no network. `should_fail` simulates a signing failure.
#[derive(Clone, Default)]
pub struct MockStorageService {
    pub should_fail: bool,
}

impl MockStorageService {
    pub fn new() -> Self {
        Self { should_fail: false }
    }

    pub fn new_failing() -> Self {
        Self { should_fail: true }
    }
}

#[async_trait]
impl StorageService for MockStorageService {
    async fn ensure_bucket_exists(&self) {}

    async fn get_presigned_upload_url(
        &self,
        key: &str,
        _content_type: &str,
        _size: Option<u64>,
    ) -> Result<String, StorageError> {
        if self.should_fail {
            return Err(StorageError::Presign("simulated failure".to_string()));
        }

        Ok(format!(
            "http://localhost:9000/mock-bucket/{}?signature=fake",
            sanitize_key(key)
        ))
    }

    fn public_url(&self, key: &str) -> String {
        format!("http://localhost:9000/mock-bucket/{}", sanitize_key(key))
    }
}

/// StorageState
///
/// The concrete type used to share the storage service across the application state.
pub type StorageState = Arc<dyn StorageService>;
