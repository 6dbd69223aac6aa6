//! S3-based image storage operations
mod error;
#[cfg(feature = "test-utils")]
mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use aws_sdk_s3::{primitives::ByteStream, Client as S3Client};
use axum::body::Bytes;
use strum::Display;

pub use error::{BucketError, BucketResult};
#[cfg(feature = "test-utils")]
pub use memory::InMemoryImageStore;

/// Top-level folder an image is stored under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum MediaFolder {
    /// Profile pictures
    #[strum(serialize = "profile_pics")]
    ProfilePictures,
    /// Post images
    #[strum(serialize = "post_images")]
    PostImages,
}

/// An image received from a client
#[derive(Debug, Clone)]
pub struct ImageUpload {
    /// File name the client sent, used only for its extension
    pub original_name: Option<String>,
    /// Content type the client sent
    pub content_type: Option<String>,
    /// Raw image bytes
    pub data: Bytes,
}

impl ImageUpload {
    /// Object key for this image under `folder`: `<folder>/<uuid><.ext>`
    #[must_use]
    pub fn object_key(&self, folder: MediaFolder) -> String {
        let id = uuid::Uuid::new_v4();
        match self.extension() {
            Some(ext) => format!("{folder}/{id}.{ext}"),
            None => format!("{folder}/{id}"),
        }
    }

    /// Lowercased extension of the original file name, if it looks like one
    fn extension(&self) -> Option<String> {
        let name = self.original_name.as_deref()?;
        let (stem, ext) = name.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() || ext.len() > 8 {
            return None;
        }
        ext.chars()
            .all(|c| c.is_ascii_alphanumeric())
            .then(|| ext.to_ascii_lowercase())
    }
}

/// Blob store for uploaded images
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Stores `image` under `folder` and returns its public URL
    async fn upload(&self, folder: MediaFolder, image: ImageUpload) -> BucketResult<String>;
}

/// Image storage client for S3 operations
pub struct MediaStorage {
    s3_client: Arc<S3Client>,
    bucket_name: String,
    public_base_url: String,
}

impl MediaStorage {
    /// Creates a new media storage client
    ///
    /// # Arguments
    ///
    /// * `s3_client` - Pre-configured S3 client
    /// * `bucket_name` - S3 bucket name for image storage
    /// * `public_base_url` - Base URL objects are publicly served from, without trailing `/`
    #[must_use]
    pub const fn new(s3_client: Arc<S3Client>, bucket_name: String, public_base_url: String) -> Self {
        Self {
            s3_client,
            bucket_name,
            public_base_url,
        }
    }

    /// Public URL of the object stored under `key`
    #[must_use]
    pub fn public_url(&self, key: &str) -> String {
        format!("{}/{key}", self.public_base_url)
    }
}

#[async_trait]
impl ImageStore for MediaStorage {
    /// Uploads the image with a single `PutObject`
    ///
    /// # Errors
    ///
    /// Returns `BucketError::InvalidInput` for an empty image
    /// Returns `BucketError::UpstreamError` for 5xx errors
    /// Returns `BucketError::S3Error` for other S3 service errors
    async fn upload(&self, folder: MediaFolder, image: ImageUpload) -> BucketResult<String> {
        if image.data.is_empty() {
            return Err(BucketError::InvalidInput("image is empty".to_string()));
        }

        let key = image.object_key(folder);
        let content_type = image
            .content_type
            .unwrap_or_else(|| mime::APPLICATION_OCTET_STREAM.to_string());
        let size = image.data.len();

        self.s3_client
            .put_object()
            .bucket(&self.bucket_name)
            .key(&key)
            .content_type(content_type)
            .body(ByteStream::from(image.data))
            .send()
            .await?;

        tracing::info!(key = %key, size, "Uploaded image");

        Ok(self.public_url(&key))
    }
}
