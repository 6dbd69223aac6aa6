//! Application state management

use std::sync::Arc;

use instaeats_storage::{post::PostRepository, profile::ProfileRepository};

use crate::media_storage::ImageStore;
use crate::publication::PostPublication;

/// Stores shared across handlers
///
/// Built once at startup and injected as an `Extension`; never mutated afterwards.
#[derive(Clone)]
pub struct AppState {
    /// Profile documents
    pub profiles: Arc<dyn ProfileRepository>,
    /// Post documents
    pub posts: Arc<dyn PostRepository>,
    /// Uploaded images
    pub images: Arc<dyn ImageStore>,
}

impl AppState {
    /// Creates the state from its stores
    #[must_use]
    pub fn new(
        profiles: Arc<dyn ProfileRepository>,
        posts: Arc<dyn PostRepository>,
        images: Arc<dyn ImageStore>,
    ) -> Self {
        Self {
            profiles,
            posts,
            images,
        }
    }

    /// The post creation saga over this state's stores
    #[must_use]
    pub fn publication(&self) -> PostPublication<'_> {
        PostPublication::new(self.profiles.as_ref(), self.posts.as_ref())
    }

    /// Counts the documents in both tables
    ///
    /// Used at startup to fail fast when the stores are unreachable.
    ///
    /// # Errors
    ///
    /// Returns an error if either table cannot be read
    pub async fn ensure_ready(&self) -> anyhow::Result<()> {
        let profiles = self.profiles.count().await?;
        let posts = self.posts.count().await?;
        tracing::info!(profiles, posts, "✅ Document stores reachable");
        Ok(())
    }
}
