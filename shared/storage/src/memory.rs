//! In-memory repositories with the same modification semantics as the `DynamoDB` ones
//!
//! Documents are kept in insertion order, which stands in for the table's natural order.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::post::{Post, PostCreateRequest, PostRepository, PostStorageResult};
use crate::profile::{Profile, ProfileCreateRequest, ProfileRepository, ProfileStorageResult};
use crate::search::SearchPattern;

/// Profile repository backed by a vector
#[derive(Debug, Default)]
pub struct InMemoryProfileStorage {
    profiles: RwLock<Vec<Profile>>,
}

impl InMemoryProfileStorage {
    /// Creates an empty repository
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every stored profile
    pub async fn snapshot(&self) -> Vec<Profile> {
        self.profiles.read().await.clone()
    }

    async fn update<F>(&self, id: &str, apply: F) -> bool
    where
        F: FnOnce(&mut Profile) -> bool + Send,
    {
        let mut profiles = self.profiles.write().await;
        profiles
            .iter_mut()
            .find(|profile| profile.id == id)
            .is_some_and(apply)
    }
}

#[async_trait]
impl ProfileRepository for InMemoryProfileStorage {
    async fn get(&self, id: &str) -> ProfileStorageResult<Option<Profile>> {
        let profiles = self.profiles.read().await;
        Ok(profiles.iter().find(|profile| profile.id == id).cloned())
    }

    async fn get_by_email(&self, email: &str) -> ProfileStorageResult<Option<Profile>> {
        let profiles = self.profiles.read().await;
        Ok(profiles
            .iter()
            .find(|profile| profile.email == email)
            .cloned())
    }

    async fn create(&self, request: ProfileCreateRequest) -> ProfileStorageResult<Profile> {
        let profile = Profile::new(request);
        self.profiles.write().await.push(profile.clone());
        Ok(profile)
    }

    async fn update_details(
        &self,
        id: &str,
        bio: &str,
        username: &str,
    ) -> ProfileStorageResult<bool> {
        Ok(self
            .update(id, |profile| {
                if profile.bio == bio && profile.username == username {
                    return false;
                }
                bio.clone_into(&mut profile.bio);
                username.clone_into(&mut profile.username);
                true
            })
            .await)
    }

    async fn set_profile_pic(&self, id: &str, url: &str) -> ProfileStorageResult<bool> {
        Ok(self
            .update(id, |profile| {
                if profile.profile_pic.as_deref() == Some(url) {
                    return false;
                }
                profile.profile_pic = Some(url.to_string());
                true
            })
            .await)
    }

    async fn record_post(&self, id: &str, post_id: &str) -> ProfileStorageResult<bool> {
        Ok(self
            .update(id, |profile| {
                profile.post_count += 1;
                profile.post_ids.insert(post_id.to_string());
                true
            })
            .await)
    }

    async fn release_post(&self, id: &str, post_id: &str) -> ProfileStorageResult<bool> {
        Ok(self
            .update(id, |profile| {
                if profile.post_count <= 0 {
                    return false;
                }
                profile.post_count -= 1;
                profile.post_ids.remove(post_id);
                true
            })
            .await)
    }

    async fn save_post(&self, id: &str, post_id: &str) -> ProfileStorageResult<bool> {
        Ok(self
            .update(id, |profile| profile.saved_post_ids.insert(post_id.to_string()))
            .await)
    }

    async fn remove_saved_post(&self, id: &str, post_id: &str) -> ProfileStorageResult<bool> {
        Ok(self
            .update(id, |profile| profile.saved_post_ids.remove(post_id))
            .await)
    }

    async fn delete(&self, id: &str) -> ProfileStorageResult<()> {
        self.profiles.write().await.retain(|profile| profile.id != id);
        Ok(())
    }

    async fn count(&self) -> ProfileStorageResult<usize> {
        Ok(self.profiles.read().await.len())
    }
}

/// Post repository backed by a vector
#[derive(Debug, Default)]
pub struct InMemoryPostStorage {
    posts: RwLock<Vec<Post>>,
}

impl InMemoryPostStorage {
    /// Creates an empty repository
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every stored post
    pub async fn snapshot(&self) -> Vec<Post> {
        self.posts.read().await.clone()
    }

    async fn update_by_username<F>(&self, username: &str, apply: F) -> usize
    where
        F: Fn(&mut Post) + Send,
    {
        let mut posts = self.posts.write().await;
        let mut updated = 0;
        for post in posts.iter_mut().filter(|post| post.username == username) {
            apply(post);
            updated += 1;
        }
        updated
    }
}

#[async_trait]
impl PostRepository for InMemoryPostStorage {
    async fn get(&self, id: &str) -> PostStorageResult<Option<Post>> {
        let posts = self.posts.read().await;
        Ok(posts.iter().find(|post| post.id == id).cloned())
    }

    async fn list_all(&self) -> PostStorageResult<Vec<Post>> {
        Ok(self.snapshot().await)
    }

    async fn search(&self, pattern: &SearchPattern) -> PostStorageResult<Vec<Post>> {
        let posts = self.posts.read().await;
        Ok(posts
            .iter()
            .filter(|post| post.matches(pattern))
            .cloned()
            .collect())
    }

    async fn create(&self, request: PostCreateRequest) -> PostStorageResult<Post> {
        let post = Post::new(request);
        self.posts.write().await.push(post.clone());
        Ok(post)
    }

    async fn delete(&self, id: &str) -> PostStorageResult<()> {
        self.posts.write().await.retain(|post| post.id != id);
        Ok(())
    }

    async fn delete_by_author(&self, author_profile_id: &str) -> PostStorageResult<usize> {
        let mut posts = self.posts.write().await;
        let before = posts.len();
        posts.retain(|post| post.author_profile_id != author_profile_id);
        Ok(before - posts.len())
    }

    async fn rename_author(
        &self,
        old_username: &str,
        new_username: &str,
    ) -> PostStorageResult<usize> {
        Ok(self
            .update_by_username(old_username, |post| {
                new_username.clone_into(&mut post.username);
            })
            .await)
    }

    async fn set_author_picture(&self, username: &str, url: &str) -> PostStorageResult<usize> {
        Ok(self
            .update_by_username(username, |post| {
                post.profile_pic = Some(url.to_string());
            })
            .await)
    }

    async fn like(&self, id: &str, profile_id: &str) -> PostStorageResult<bool> {
        let mut posts = self.posts.write().await;
        let Some(post) = posts.iter_mut().find(|post| post.id == id) else {
            return Ok(false);
        };

        if !post.liker_profile_ids.insert(profile_id.to_string()) {
            return Ok(false);
        }
        post.like_count += 1;

        Ok(true)
    }

    async fn count(&self) -> PostStorageResult<usize> {
        Ok(self.posts.read().await.len())
    }
}
