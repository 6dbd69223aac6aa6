//! Publishing a post: insert it, then attach it to its author's profile
//!
//! The two writes are not atomic. When the profile cannot be updated the inserted post is
//! deleted again; if the process dies in between, or the delete itself fails, the post is
//! left orphaned.

use instaeats_storage::{
    post::{Post, PostCreateRequest, PostRepository, PostStorageError},
    profile::{ProfileRepository, ProfileStorageError},
};
use thiserror::Error;

/// Errors raised while publishing a post
#[derive(Error, Debug)]
pub enum PublicationError {
    /// The post could not be inserted; nothing was written
    #[error("Failed to insert post: {0}")]
    Insert(#[from] PostStorageError),

    /// The author profile was not modified (it does not exist); the post was removed
    #[error("Profile {profile_id} was not updated, post {post_id} was removed")]
    ProfileNotUpdated {
        /// Post that was inserted and removed again
        post_id: String,
        /// Profile that should have been updated
        profile_id: String,
    },

    /// Updating the author profile failed; the post was removed
    #[error("Failed to update profile for post {post_id}: {source}")]
    ProfileUpdate {
        /// Post that was inserted and removed again
        post_id: String,
        /// Storage failure
        source: ProfileStorageError,
    },

    /// Removing the post after a failed profile update failed; the post is orphaned
    #[error("Failed to remove orphaned post {post_id}: {source}")]
    Compensation {
        /// Post left without a profile
        post_id: String,
        /// Storage failure
        source: PostStorageError,
    },
}

/// The post creation saga
pub struct PostPublication<'a> {
    profiles: &'a dyn ProfileRepository,
    posts: &'a dyn PostRepository,
}

impl<'a> PostPublication<'a> {
    /// Creates the saga over the given repositories
    #[must_use]
    pub const fn new(profiles: &'a dyn ProfileRepository, posts: &'a dyn PostRepository) -> Self {
        Self { profiles, posts }
    }

    /// Inserts the post and records it on the author's profile
    ///
    /// # Errors
    ///
    /// Returns `PublicationError::Insert` if the post could not be stored, and
    /// `ProfileNotUpdated` or `ProfileUpdate` after a compensated profile failure.
    /// Returns `Compensation` if the compensating delete failed as well.
    #[tracing::instrument(skip_all, fields(profile_id = %request.author_profile_id))]
    pub async fn execute(&self, request: PostCreateRequest) -> Result<Post, PublicationError> {
        let post = self.posts.create(request).await?;
        tracing::info!(post_id = %post.id, "Inserted post");

        let failure = match self
            .profiles
            .record_post(&post.author_profile_id, &post.id)
            .await
        {
            Ok(true) => return Ok(post),
            Ok(false) => PublicationError::ProfileNotUpdated {
                post_id: post.id.clone(),
                profile_id: post.author_profile_id.clone(),
            },
            Err(source) => PublicationError::ProfileUpdate {
                post_id: post.id.clone(),
                source,
            },
        };

        self.compensate(&post).await?;

        Err(failure)
    }

    /// Deletes a post whose profile update failed
    ///
    /// # Errors
    ///
    /// Returns `PublicationError::Compensation` if the delete fails
    pub async fn compensate(&self, post: &Post) -> Result<(), PublicationError> {
        tracing::warn!(post_id = %post.id, "Removing post after failed profile update");

        self.posts
            .delete(&post.id)
            .await
            .map_err(|source| PublicationError::Compensation {
                post_id: post.id.clone(),
                source,
            })
    }
}
