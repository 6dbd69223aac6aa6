//! Repositories that fail on selected operations

use async_trait::async_trait;
use instaeats_storage::{
    memory::{InMemoryPostStorage, InMemoryProfileStorage},
    post::{Post, PostCreateRequest, PostRepository, PostStorageError, PostStorageResult},
    profile::{
        Profile, ProfileCreateRequest, ProfileRepository, ProfileStorageError,
        ProfileStorageResult,
    },
    search::SearchPattern,
};

/// Profile store whose `record_post` and `count` fail
#[derive(Default)]
pub struct BrokenProfiles {
    inner: InMemoryProfileStorage,
}

fn profile_failure() -> ProfileStorageError {
    ProfileStorageError::SerializationError("profile table unavailable".to_string())
}

#[async_trait]
impl ProfileRepository for BrokenProfiles {
    async fn get(&self, id: &str) -> ProfileStorageResult<Option<Profile>> {
        self.inner.get(id).await
    }

    async fn get_by_email(&self, email: &str) -> ProfileStorageResult<Option<Profile>> {
        self.inner.get_by_email(email).await
    }

    async fn create(&self, request: ProfileCreateRequest) -> ProfileStorageResult<Profile> {
        self.inner.create(request).await
    }

    async fn update_details(
        &self,
        id: &str,
        bio: &str,
        username: &str,
    ) -> ProfileStorageResult<bool> {
        self.inner.update_details(id, bio, username).await
    }

    async fn set_profile_pic(&self, id: &str, url: &str) -> ProfileStorageResult<bool> {
        self.inner.set_profile_pic(id, url).await
    }

    async fn record_post(&self, _id: &str, _post_id: &str) -> ProfileStorageResult<bool> {
        Err(profile_failure())
    }

    async fn release_post(&self, id: &str, post_id: &str) -> ProfileStorageResult<bool> {
        self.inner.release_post(id, post_id).await
    }

    async fn save_post(&self, id: &str, post_id: &str) -> ProfileStorageResult<bool> {
        self.inner.save_post(id, post_id).await
    }

    async fn remove_saved_post(&self, id: &str, post_id: &str) -> ProfileStorageResult<bool> {
        self.inner.remove_saved_post(id, post_id).await
    }

    async fn delete(&self, id: &str) -> ProfileStorageResult<()> {
        self.inner.delete(id).await
    }

    async fn count(&self) -> ProfileStorageResult<usize> {
        Err(profile_failure())
    }
}

/// Post store whose `delete` fails
#[derive(Default)]
pub struct UndeletablePosts {
    pub inner: InMemoryPostStorage,
}

#[async_trait]
impl PostRepository for UndeletablePosts {
    async fn get(&self, id: &str) -> PostStorageResult<Option<Post>> {
        self.inner.get(id).await
    }

    async fn list_all(&self) -> PostStorageResult<Vec<Post>> {
        self.inner.list_all().await
    }

    async fn search(&self, pattern: &SearchPattern) -> PostStorageResult<Vec<Post>> {
        self.inner.search(pattern).await
    }

    async fn create(&self, request: PostCreateRequest) -> PostStorageResult<Post> {
        self.inner.create(request).await
    }

    async fn delete(&self, _id: &str) -> PostStorageResult<()> {
        Err(PostStorageError::SerializationError(
            "post table unavailable".to_string(),
        ))
    }

    async fn delete_by_author(&self, author_profile_id: &str) -> PostStorageResult<usize> {
        self.inner.delete_by_author(author_profile_id).await
    }

    async fn rename_author(
        &self,
        old_username: &str,
        new_username: &str,
    ) -> PostStorageResult<usize> {
        self.inner.rename_author(old_username, new_username).await
    }

    async fn set_author_picture(&self, username: &str, url: &str) -> PostStorageResult<usize> {
        self.inner.set_author_picture(username, url).await
    }

    async fn like(&self, id: &str, profile_id: &str) -> PostStorageResult<bool> {
        self.inner.like(id, profile_id).await
    }

    async fn count(&self) -> PostStorageResult<usize> {
        self.inner.count().await
    }
}
