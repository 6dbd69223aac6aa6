//! Profile storage module for `DynamoDB` operations
//!
//! One document per user. The email is the business key and is served by a global
//! secondary index; its uniqueness is checked by callers before insert, never by the table.
//! Lookups only read the primary key from the index, so any projection type works.

mod error;

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client as DynamoDbClient;
pub use error::{ProfileStorageError, ProfileStorageResult};
use serde::{Deserialize, Serialize};
use serde_dynamo::{from_item, to_item};
use strum::Display;

use crate::dynamo::{self, modified, number, string_set};

/// `DynamoDB` table for profiles
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Primary key - unique profile ID (UUID v4)
    pub id: String,
    /// Email address, unique per profile at creation time
    pub email: String,
    /// Display name
    pub name: String,
    /// Username, copied into every post authored by this profile
    pub username: String,
    /// Free-form biography
    #[serde(default)]
    pub bio: String,
    /// Public URL of the profile picture
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_pic: Option<String>,
    /// Number of posts authored by this profile
    #[serde(default)]
    pub post_count: i64,
    /// IDs of posts authored by this profile (display only)
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub post_ids: BTreeSet<String>,
    /// IDs of posts saved by this profile
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub saved_post_ids: BTreeSet<String>,
    /// Timestamp of profile creation
    #[serde(default)]
    pub created_at: i64,
}

/// Request to create a new profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileCreateRequest {
    /// Email address
    pub email: String,
    /// Display name
    pub name: String,
    /// Username
    pub username: String,
    /// Optional biography, stored as an empty string when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    /// Optional profile picture URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_pic: Option<String>,
}

impl Profile {
    /// Builds a fresh profile with a generated id and empty post relationships
    #[must_use]
    pub fn new(request: ProfileCreateRequest) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            email: request.email,
            name: request.name,
            username: request.username,
            bio: request.bio.unwrap_or_default(),
            profile_pic: request.profile_pic,
            post_count: 0,
            post_ids: BTreeSet::new(),
            saved_post_ids: BTreeSet::new(),
            created_at: chrono::Utc::now().timestamp(),
        }
    }
}

/// `DynamoDB` attribute names for the profile table
#[derive(Debug, Display)]
#[strum(serialize_all = "snake_case")]
pub enum ProfileAttribute {
    /// Primary key - unique profile ID
    Id,
    /// Email (used for GSI)
    Email,
    /// Display name
    Name,
    /// Username
    Username,
    /// Biography
    Bio,
    /// Profile picture URL
    ProfilePic,
    /// Authored post counter
    PostCount,
    /// Authored post id set
    PostIds,
    /// Saved post id set
    SavedPostIds,
    /// Creation timestamp
    CreatedAt,
}

/// Operations the HTTP layer performs on profiles
///
/// Update operations return whether the stored document was modified. An update aimed at
/// a missing profile, or one that would leave the document unchanged, returns `false`.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Gets a single profile by ID
    async fn get(&self, id: &str) -> ProfileStorageResult<Option<Profile>>;

    /// Gets the first profile registered with the given email
    async fn get_by_email(&self, email: &str) -> ProfileStorageResult<Option<Profile>>;

    /// Creates a new profile with generated UUID
    async fn create(&self, request: ProfileCreateRequest) -> ProfileStorageResult<Profile>;

    /// Sets biography and username
    async fn update_details(
        &self,
        id: &str,
        bio: &str,
        username: &str,
    ) -> ProfileStorageResult<bool>;

    /// Sets the profile picture URL
    async fn set_profile_pic(&self, id: &str, url: &str) -> ProfileStorageResult<bool>;

    /// Increments the post counter and adds `post_id` to the authored set
    async fn record_post(&self, id: &str, post_id: &str) -> ProfileStorageResult<bool>;

    /// Decrements the post counter and removes `post_id` from the authored set
    async fn release_post(&self, id: &str, post_id: &str) -> ProfileStorageResult<bool>;

    /// Adds `post_id` to the saved set
    async fn save_post(&self, id: &str, post_id: &str) -> ProfileStorageResult<bool>;

    /// Removes `post_id` from the saved set
    async fn remove_saved_post(&self, id: &str, post_id: &str) -> ProfileStorageResult<bool>;

    /// Deletes a profile by ID
    async fn delete(&self, id: &str) -> ProfileStorageResult<()>;

    /// Counts stored profiles
    async fn count(&self) -> ProfileStorageResult<usize>;
}

/// Storage client for profile operations
pub struct ProfileStorage {
    dynamodb_client: Arc<DynamoDbClient>,
    table_name: String,
    email_index_name: String,
}

impl ProfileStorage {
    /// Creates a new storage instance
    ///
    /// # Arguments
    ///
    /// * `dynamodb_client` - Pre-configured `DynamoDB` client
    /// * `table_name` - `DynamoDB` table name for profiles
    /// * `email_index_name` - Name of the GSI for email lookups
    #[must_use]
    pub const fn new(
        dynamodb_client: Arc<DynamoDbClient>,
        table_name: String,
        email_index_name: String,
    ) -> Self {
        Self {
            dynamodb_client,
            table_name,
            email_index_name,
        }
    }

    fn key(id: &str) -> (String, AttributeValue) {
        (
            ProfileAttribute::Id.to_string(),
            AttributeValue::S(id.to_string()),
        )
    }

    /// Applies a set update (`ADD`/`DELETE`) of a single id guarded by a membership check
    async fn update_id_set(
        &self,
        id: &str,
        action: &str,
        condition: &str,
        attribute: ProfileAttribute,
        member: &str,
    ) -> ProfileStorageResult<bool> {
        let (key_name, key_value) = Self::key(id);

        let result = self
            .dynamodb_client
            .update_item()
            .table_name(&self.table_name)
            .key(key_name, key_value)
            .update_expression(format!("{action} #set :members"))
            .condition_expression(format!("attribute_exists(#id) AND {condition}"))
            .expression_attribute_names("#id", ProfileAttribute::Id.to_string())
            .expression_attribute_names("#set", attribute.to_string())
            .expression_attribute_values(":members", string_set(member))
            .expression_attribute_values(":member", AttributeValue::S(member.to_string()))
            .send()
            .await;

        modified(result)
    }
}

#[async_trait]
impl ProfileRepository for ProfileStorage {
    async fn get(&self, id: &str) -> ProfileStorageResult<Option<Profile>> {
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
                    .map_err(|e| ProfileStorageError::SerializationError(e.to_string()))
            })
            .transpose()
    }

    async fn get_by_email(&self, email: &str) -> ProfileStorageResult<Option<Profile>> {
        let items = dynamo::query_index::<ProfileStorageError>(
            &self.dynamodb_client,
            &self.table_name,
            &self.email_index_name,
            &ProfileAttribute::Email.to_string(),
            email,
        )
        .await?;

        // The index may project keys only, so the full document is read from the table
        let id = items.into_iter().next().and_then(|mut item| {
            match item.remove(&ProfileAttribute::Id.to_string()) {
                Some(AttributeValue::S(id)) => Some(id),
                _ => None,
            }
        });

        match id {
            Some(id) => self.get(&id).await,
            None => Ok(None),
        }
    }

    async fn create(&self, request: ProfileCreateRequest) -> ProfileStorageResult<Profile> {
        let profile = Profile::new(request);

        let item = to_item(&profile)?;

        self.dynamodb_client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .condition_expression("attribute_not_exists(#id)")
            .expression_attribute_names("#id", ProfileAttribute::Id.to_string())
            .send()
            .await?;

        Ok(profile)
    }

    async fn update_details(
        &self,
        id: &str,
        bio: &str,
        username: &str,
    ) -> ProfileStorageResult<bool> {
        let (key_name, key_value) = Self::key(id);

        let result = self
            .dynamodb_client
            .update_item()
            .table_name(&self.table_name)
            .key(key_name, key_value)
            .update_expression("SET #bio = :bio, #username = :username")
            .condition_expression(
                "attribute_exists(#id) AND (attribute_not_exists(#bio) OR #bio <> :bio OR #username <> :username)",
            )
            .expression_attribute_names("#id", ProfileAttribute::Id.to_string())
            .expression_attribute_names("#bio", ProfileAttribute::Bio.to_string())
            .expression_attribute_names("#username", ProfileAttribute::Username.to_string())
            .expression_attribute_values(":bio", AttributeValue::S(bio.to_string()))
            .expression_attribute_values(":username", AttributeValue::S(username.to_string()))
            .send()
            .await;

        modified(result)
    }

    async fn set_profile_pic(&self, id: &str, url: &str) -> ProfileStorageResult<bool> {
        let (key_name, key_value) = Self::key(id);

        let result = self
            .dynamodb_client
            .update_item()
            .table_name(&self.table_name)
            .key(key_name, key_value)
            .update_expression("SET #profile_pic = :url")
            .condition_expression(
                "attribute_exists(#id) AND (attribute_not_exists(#profile_pic) OR #profile_pic <> :url)",
            )
            .expression_attribute_names("#id", ProfileAttribute::Id.to_string())
            .expression_attribute_names("#profile_pic", ProfileAttribute::ProfilePic.to_string())
            .expression_attribute_values(":url", AttributeValue::S(url.to_string()))
            .send()
            .await;

        modified(result)
    }

    async fn record_post(&self, id: &str, post_id: &str) -> ProfileStorageResult<bool> {
        let (key_name, key_value) = Self::key(id);

        let result = self
            .dynamodb_client
            .update_item()
            .table_name(&self.table_name)
            .key(key_name, key_value)
            .update_expression("ADD #post_count :one, #post_ids :post_ids")
            .condition_expression("attribute_exists(#id)")
            .expression_attribute_names("#id", ProfileAttribute::Id.to_string())
            .expression_attribute_names("#post_count", ProfileAttribute::PostCount.to_string())
            .expression_attribute_names("#post_ids", ProfileAttribute::PostIds.to_string())
            .expression_attribute_values(":one", number(1))
            .expression_attribute_values(":post_ids", string_set(post_id))
            .send()
            .await;

        modified(result)
    }

    async fn release_post(&self, id: &str, post_id: &str) -> ProfileStorageResult<bool> {
        let (key_name, key_value) = Self::key(id);

        // The counter never drops below zero, even if it already drifted from the post table
        let result = self
            .dynamodb_client
            .update_item()
            .table_name(&self.table_name)
            .key(key_name, key_value)
            .update_expression("ADD #post_count :minus_one DELETE #post_ids :post_ids")
            .condition_expression("attribute_exists(#id) AND #post_count > :zero")
            .expression_attribute_names("#id", ProfileAttribute::Id.to_string())
            .expression_attribute_names("#post_count", ProfileAttribute::PostCount.to_string())
            .expression_attribute_names("#post_ids", ProfileAttribute::PostIds.to_string())
            .expression_attribute_values(":minus_one", number(-1))
            .expression_attribute_values(":zero", number(0))
            .expression_attribute_values(":post_ids", string_set(post_id))
            .send()
            .await;

        modified(result)
    }

    async fn save_post(&self, id: &str, post_id: &str) -> ProfileStorageResult<bool> {
        self.update_id_set(
            id,
            "ADD",
            "NOT contains(#set, :member)",
            ProfileAttribute::SavedPostIds,
            post_id,
        )
        .await
    }

    async fn remove_saved_post(&self, id: &str, post_id: &str) -> ProfileStorageResult<bool> {
        self.update_id_set(
            id,
            "DELETE",
            "contains(#set, :member)",
            ProfileAttribute::SavedPostIds,
            post_id,
        )
        .await
    }

    async fn delete(&self, id: &str) -> ProfileStorageResult<()> {
        let (key_name, key_value) = Self::key(id);

        self.dynamodb_client
            .delete_item()
            .table_name(&self.table_name)
            .key(key_name, key_value)
            .send()
            .await?;

        Ok(())
    }

    async fn count(&self) -> ProfileStorageResult<usize> {
        dynamo::count_all(&self.dynamodb_client, &self.table_name).await
    }
}
