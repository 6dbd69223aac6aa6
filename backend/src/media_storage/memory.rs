use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{BucketError, BucketResult, ImageStore, ImageUpload, MediaFolder};

/// Image store that keeps uploads in memory
#[derive(Debug, Default)]
pub struct InMemoryImageStore {
    uploads: RwLock<Vec<(String, ImageUpload)>>,
    failing: AtomicBool,
}

impl InMemoryImageStore {
    /// Base URL of the returned public URLs
    pub const BASE_URL: &'static str = "https://media.test";

    /// Creates an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following upload fail like an S3 outage
    pub fn fail_uploads(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    /// Keys of all stored images, in upload order
    pub async fn keys(&self) -> Vec<String> {
        self.uploads
            .read()
            .await
            .iter()
            .map(|(key, _)| key.clone())
            .collect()
    }
}

#[async_trait]
impl ImageStore for InMemoryImageStore {
    async fn upload(&self, folder: MediaFolder, image: ImageUpload) -> BucketResult<String> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(BucketError::UpstreamError("503 Slow Down".to_string()));
        }
        if image.data.is_empty() {
            return Err(BucketError::InvalidInput("image is empty".to_string()));
        }

        let key = image.object_key(folder);
        let url = format!("{}/{key}", Self::BASE_URL);
        self.uploads.write().await.push((key, image));

        Ok(url)
    }
}
