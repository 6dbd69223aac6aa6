//! Post storage module for `DynamoDB` operations
//!
//! Posts carry a copy of their author's username and profile picture. Keeping those copies
//! in sync is a best-effort bulk update, not a transaction.

mod error;

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use aws_sdk_dynamodb::types::{AttributeValue, DeleteRequest, WriteRequest};
use aws_sdk_dynamodb::Client as DynamoDbClient;
pub use error::{PostStorageError, PostStorageResult};
use futures::{stream, StreamExt, TryStreamExt};
use serde::{Deserialize, Serialize};
use serde_dynamo::{from_item, from_items, to_item};
use strum::Display;

use crate::dynamo::{self, modified, number, string_set};
use crate::search::SearchPattern;

/// Maximum number of items in a single `BatchWriteItem` request
const BATCH_WRITE_LIMIT: usize = 25;

/// Number of per-post updates kept in flight during a bulk update
const BULK_UPDATE_CONCURRENCY: usize = 16;

/// `DynamoDB` table for posts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    /// Primary key - unique post ID (UUID v4)
    pub id: String,
    /// Profile that authored the post (used for GSI)
    pub author_profile_id: String,
    /// Author's username at last sync (used for GSI)
    pub username: String,
    /// Author's profile picture at last sync
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_pic: Option<String>,
    /// Name of the place
    pub place_name: String,
    /// Map link for the place
    pub map_url: String,
    /// Caption written by the author
    #[serde(default)]
    pub caption: String,
    /// Rating given by the author
    pub rating: f64,
    /// Public URL of the post image
    pub image_url: String,
    /// Number of likes
    #[serde(default)]
    pub like_count: i64,
    /// Profiles that liked the post
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub liker_profile_ids: BTreeSet<String>,
    /// Timestamp of post creation
    pub created_at: i64,
}

/// Request to create a new post
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostCreateRequest {
    /// Profile that authors the post
    pub author_profile_id: String,
    /// Author's username
    pub username: String,
    /// Author's profile picture
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_pic: Option<String>,
    /// Name of the place
    pub place_name: String,
    /// Map link for the place
    pub map_url: String,
    /// Caption
    pub caption: String,
    /// Rating
    pub rating: f64,
    /// Public URL of the post image
    pub image_url: String,
}

impl Post {
    /// Builds a fresh post with a generated id, no likes and the current timestamp
    #[must_use]
    pub fn new(request: PostCreateRequest) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            author_profile_id: request.author_profile_id,
            username: request.username,
            profile_pic: request.profile_pic,
            place_name: request.place_name,
            map_url: request.map_url,
            caption: request.caption,
            rating: request.rating,
            image_url: request.image_url,
            like_count: 0,
            liker_profile_ids: BTreeSet::new(),
            created_at: chrono::Utc::now().timestamp(),
        }
    }

    /// Whether any of the searchable text fields match `pattern`
    #[must_use]
    pub fn matches(&self, pattern: &SearchPattern) -> bool {
        [
            &self.username,
            &self.place_name,
            &self.caption,
            &self.map_url,
        ]
        .into_iter()
        .any(|field| pattern.is_match(field))
    }
}

/// `DynamoDB` attribute names for the post table
#[derive(Debug, Display)]
#[strum(serialize_all = "snake_case")]
pub enum PostAttribute {
    /// Primary key - unique post ID
    Id,
    /// Author profile ID (used for GSI)
    AuthorProfileId,
    /// Author username (used for GSI)
    Username,
    /// Author profile picture
    ProfilePic,
    /// Place name
    PlaceName,
    /// Map link
    MapUrl,
    /// Caption
    Caption,
    /// Rating
    Rating,
    /// Image URL
    ImageUrl,
    /// Like counter
    LikeCount,
    /// Liker profile id set
    LikerProfileIds,
    /// Creation timestamp
    CreatedAt,
}

/// Operations the HTTP layer performs on posts
///
/// Bulk operations return the number of posts they touched.
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Gets a single post by ID
    async fn get(&self, id: &str) -> PostStorageResult<Option<Post>>;

    /// Lists every post in storage order
    async fn list_all(&self) -> PostStorageResult<Vec<Post>>;

    /// Lists every post with a searchable field matching `pattern`
    async fn search(&self, pattern: &SearchPattern) -> PostStorageResult<Vec<Post>>;

    /// Creates a new post with generated UUID
    async fn create(&self, request: PostCreateRequest) -> PostStorageResult<Post>;

    /// Deletes a post by ID
    async fn delete(&self, id: &str) -> PostStorageResult<()>;

    /// Deletes every post authored by the given profile
    async fn delete_by_author(&self, author_profile_id: &str) -> PostStorageResult<usize>;

    /// Replaces `old_username` with `new_username` on every post carrying it
    async fn rename_author(&self, old_username: &str, new_username: &str)
        -> PostStorageResult<usize>;

    /// Sets the profile picture on every post carrying `username`
    async fn set_author_picture(&self, username: &str, url: &str) -> PostStorageResult<usize>;

    /// Records a like from `profile_id`; a repeated like is not counted twice
    async fn like(&self, id: &str, profile_id: &str) -> PostStorageResult<bool>;

    /// Counts stored posts
    async fn count(&self) -> PostStorageResult<usize>;
}

/// Storage client for post operations
pub struct PostStorage {
    dynamodb_client: Arc<DynamoDbClient>,
    table_name: String,
    username_index_name: String,
    author_index_name: String,
}

impl PostStorage {
    /// Creates a new storage instance
    ///
    /// # Arguments
    ///
    /// * `dynamodb_client` - Pre-configured `DynamoDB` client
    /// * `table_name` - `DynamoDB` table name for posts
    /// * `username_index_name` - Name of the GSI for username queries
    /// * `author_index_name` - Name of the GSI for author profile queries
    #[must_use]
    pub const fn new(
        dynamodb_client: Arc<DynamoDbClient>,
        table_name: String,
        username_index_name: String,
        author_index_name: String,
    ) -> Self {
        Self {
            dynamodb_client,
            table_name,
            username_index_name,
            author_index_name,
        }
    }

    fn key(id: &str) -> (String, AttributeValue) {
        (
            PostAttribute::Id.to_string(),
            AttributeValue::S(id.to_string()),
        )
    }

    async fn query_ids(
        &self,
        index_name: &str,
        attribute: PostAttribute,
        value: &str,
    ) -> PostStorageResult<Vec<String>> {
        let items = dynamo::query_index::<PostStorageError>(
            &self.dynamodb_client,
            &self.table_name,
            index_name,
            &attribute.to_string(),
            value,
        )
        .await?;

        // Indexes may project keys only, so read the id attribute directly
        let id_attribute = PostAttribute::Id.to_string();

        Ok(items
            .into_iter()
            .filter_map(|mut item| match item.remove(&id_attribute) {
                Some(AttributeValue::S(id)) => Some(id),
                _ => None,
            })
            .collect())
    }

    /// Sets `attribute` to `value` on every post whose username is `username`.
    ///
    /// Each post is updated on its own; the username is re-checked per item so a post
    /// renamed concurrently is left alone.
    async fn update_by_username(
        &self,
        username: &str,
        attribute: PostAttribute,
        value: &str,
    ) -> PostStorageResult<usize> {
        let ids = self
            .query_ids(&self.username_index_name, PostAttribute::Username, username)
            .await?;

        let attribute = attribute.to_string();

        let results: Vec<bool> = stream::iter(ids)
            .map(|id| {
                let (key_name, key_value) = Self::key(&id);
                let request = self
                    .dynamodb_client
                    .update_item()
                    .table_name(&self.table_name)
                    .key(key_name, key_value)
                    .update_expression("SET #attr = :value")
                    .condition_expression("attribute_exists(#id) AND #username = :username")
                    .expression_attribute_names("#id", PostAttribute::Id.to_string())
                    .expression_attribute_names("#username", PostAttribute::Username.to_string())
                    .expression_attribute_names("#attr", attribute.clone())
                    .expression_attribute_values(":username", AttributeValue::S(username.to_string()))
                    .expression_attribute_values(":value", AttributeValue::S(value.to_string()));

                async move { modified::<PostStorageError>(request.send().await) }
            })
            .buffer_unordered(BULK_UPDATE_CONCURRENCY)
            .try_collect()
            .await?;

        let updated = results.iter().filter(|updated| **updated).count();
        if updated < results.len() {
            tracing::debug!(
                skipped = results.len() - updated,
                "Posts changed username during bulk update"
            );
        }

        Ok(updated)
    }

    /// Batch delete multiple posts by their IDs
    ///
    /// # Errors
    ///
    /// Returns `PostStorageError` if the `DynamoDB` batch write operation fails
    pub async fn batch_delete(&self, ids: &[String]) -> PostStorageResult<()> {
        for chunk in ids.chunks(BATCH_WRITE_LIMIT) {
            let mut pending = HashMap::from([(
                self.table_name.clone(),
                chunk
                    .iter()
                    .map(|id| Self::build_delete_request(id.clone()))
                    .collect::<Result<Vec<_>, _>>()?,
            )]);

            // Throttled writes come back as unprocessed items and are resubmitted
            while !pending.is_empty() {
                let response = self
                    .dynamodb_client
                    .batch_write_item()
                    .set_request_items(Some(pending))
                    .send()
                    .await?;

                pending = response.unprocessed_items.unwrap_or_default();
                pending.retain(|_, requests| !requests.is_empty());

                if let Some(requests) = pending.get(&self.table_name) {
                    tracing::debug!(count = requests.len(), "Resubmitting unprocessed deletes");
                }
            }
        }

        Ok(())
    }

    /// Builds a delete request for a post
    fn build_delete_request(id: String) -> PostStorageResult<WriteRequest> {
        let key = HashMap::from([(PostAttribute::Id.to_string(), AttributeValue::S(id))]);

        Ok(WriteRequest::builder()
            .delete_request(
                DeleteRequest::builder()
                    .set_key(Some(key))
                    .build()
                    .map_err(|e| {
                        PostStorageError::SerializationError(format!(
                            "Failed to build delete request: {e:?}",
                        ))
                    })?,
            )
            .build())
    }
}

#[async_trait]
impl PostRepository for PostStorage {
    async fn get(&self, id: &str) -> PostStorageResult<Option<Post>> {
        let (key_name, key_value) = Self::key(id);

        let response = self
            .dynamodb_client
            .get_item()
            .table_name(&self.table_name)
            .key(key_name, key_value)
            .send()
            .await?;

        response
            .item()
            .map(|item| {
                from_item(item.clone())
                    .map_err(|e| PostStorageError::SerializationError(e.to_string()))
            })
            .transpose()
    }

    async fn list_all(&self) -> PostStorageResult<Vec<Post>> {
        let items =
            dynamo::scan_all::<PostStorageError>(&self.dynamodb_client, &self.table_name).await?;

        Ok(from_items(items)?)
    }

    async fn search(&self, pattern: &SearchPattern) -> PostStorageResult<Vec<Post>> {
        // Regex matching is not expressible as a filter expression, so the table is scanned
        let posts = self.list_all().await?;

        Ok(posts.into_iter().filter(|post| post.matches(pattern)).collect())
    }

    async fn create(&self, request: PostCreateRequest) -> PostStorageResult<Post> {
        let post = Post::new(request);

        let item = to_item(&post)?;

        self.dynamodb_client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .condition_expression("attribute_not_exists(#id)")
            .expression_attribute_names("#id", PostAttribute::Id.to_string())
            .send()
            .await?;

        Ok(post)
    }

    async fn delete(&self, id: &str) -> PostStorageResult<()> {
        let (key_name, key_value) = Self::key(id);

        self.dynamodb_client
            .delete_item()
            .table_name(&self.table_name)
            .key(key_name, key_value)
            .send()
            .await?;

        Ok(())
    }

    async fn delete_by_author(&self, author_profile_id: &str) -> PostStorageResult<usize> {
        let ids = self
            .query_ids(
                &self.author_index_name,
                PostAttribute::AuthorProfileId,
                author_profile_id,
            )
            .await?;

        if ids.is_empty() {
            return Ok(0);
        }

        self.batch_delete(&ids).await?;

        Ok(ids.len())
    }

    async fn rename_author(
        &self,
        old_username: &str,
        new_username: &str,
    ) -> PostStorageResult<usize> {
        self.update_by_username(old_username, PostAttribute::Username, new_username)
            .await
    }

    async fn set_author_picture(&self, username: &str, url: &str) -> PostStorageResult<usize> {
        self.update_by_username(username, PostAttribute::ProfilePic, url)
            .await
    }

    async fn like(&self, id: &str, profile_id: &str) -> PostStorageResult<bool> {
        let (key_name, key_value) = Self::key(id);

        let result = self
            .dynamodb_client
            .update_item()
            .table_name(&self.table_name)
            .key(key_name, key_value)
            .update_expression("ADD #like_count :one, #likers :likers")
            .condition_expression("attribute_exists(#id) AND NOT contains(#likers, :profile_id)")
            .expression_attribute_names("#id", PostAttribute::Id.to_string())
            .expression_attribute_names("#like_count", PostAttribute::LikeCount.to_string())
            .expression_attribute_names("#likers", PostAttribute::LikerProfileIds.to_string())
            .expression_attribute_values(":one", number(1))
            .expression_attribute_values(":likers", string_set(profile_id))
            .expression_attribute_values(":profile_id", AttributeValue::S(profile_id.to_string()))
            .send()
            .await;

        modified(result)
    }

    async fn count(&self) -> PostStorageResult<usize> {
        dynamo::count_all(&self.dynamodb_client, &self.table_name).await
    }
}
