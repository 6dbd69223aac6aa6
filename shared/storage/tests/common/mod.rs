//! LocalStack table setup shared by the storage tests

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use aws_config::{BehaviorVersion, Region};
use aws_credential_types::Credentials;
use aws_sdk_dynamodb::types::{
    AttributeDefinition, BillingMode, GlobalSecondaryIndex, KeySchemaElement, KeyType, Projection,
    ProjectionType, ScalarAttributeType,
};
use aws_sdk_dynamodb::Client as DynamoDbClient;
use instaeats_storage::post::{PostAttribute, PostStorage};
use instaeats_storage::profile::{ProfileAttribute, ProfileStorage};
use tokio::time::sleep;
use uuid::Uuid;

/// Test configuration for LocalStack
const LOCALSTACK_ENDPOINT: &str = "http://localhost:4566";
const TEST_REGION: &str = "us-east-1";

pub const TEST_EMAIL_INDEX_NAME: &str = "email-index";
pub const TEST_USERNAME_INDEX_NAME: &str = "username-index";
pub const TEST_AUTHOR_INDEX_NAME: &str = "author-profile-id-index";

/// Test context that automatically cleans up the table on drop
pub struct TableContext {
    pub table_name: String,
    pub dynamodb_client: Arc<DynamoDbClient>,
}

impl Drop for TableContext {
    fn drop(&mut self) {
        // Clean up the table
        let client = self.dynamodb_client.clone();
        let table = self.table_name.clone();

        // Use tokio runtime to delete table
        let handle = tokio::runtime::Handle::try_current();
        if let Ok(handle) = handle {
            handle.spawn(async move {
                let _ = client.delete_table().table_name(&table).send().await;
            });
        }
    }
}

/// Profile storage backed by a fresh table
pub struct ProfileTestContext {
    pub storage: ProfileStorage,
    pub table: TableContext,
}

/// Post storage backed by a fresh table
pub struct PostTestContext {
    pub storage: PostStorage,
    pub table: TableContext,
}

async fn dynamodb_client() -> Arc<DynamoDbClient> {
    // Configure AWS SDK for LocalStack
    let credentials = Credentials::from_keys(
        "test", // AWS_ACCESS_KEY_ID
        "test", // AWS_SECRET_ACCESS_KEY
        None,   // no session token
    );
    let config = aws_config::defaults(BehaviorVersion::latest())
        .endpoint_url(LOCALSTACK_ENDPOINT)
        .region(Region::new(TEST_REGION))
        .credentials_provider(credentials)
        .load()
        .await;

    Arc::new(DynamoDbClient::new(&config))
}

fn string_attribute(name: String) -> AttributeDefinition {
    AttributeDefinition::builder()
        .attribute_name(name)
        .attribute_type(ScalarAttributeType::S)
        .build()
        .expect("Failed to build attribute definition")
}

fn hash_key(name: String) -> KeySchemaElement {
    KeySchemaElement::builder()
        .attribute_name(name)
        .key_type(KeyType::Hash)
        .build()
        .expect("Failed to build key schema")
}

/// Keys-only index, so lookups must not rely on projected attributes
fn keys_only_index(index_name: &str, attribute: String) -> GlobalSecondaryIndex {
    GlobalSecondaryIndex::builder()
        .index_name(index_name)
        .key_schema(hash_key(attribute))
        .projection(
            Projection::builder()
                .projection_type(ProjectionType::KeysOnly)
                .build(),
        )
        .build()
        .expect("Failed to build GSI")
}

/// Creates a profile table with an email index
pub async fn setup_profiles() -> ProfileTestContext {
    let table_name = format!("test-profiles-{}", Uuid::new_v4());
    let dynamodb_client = dynamodb_client().await;

    dynamodb_client
        .create_table()
        .table_name(&table_name)
        .billing_mode(BillingMode::PayPerRequest)
        .key_schema(hash_key(ProfileAttribute::Id.to_string()))
        .attribute_definitions(string_attribute(ProfileAttribute::Id.to_string()))
        .attribute_definitions(string_attribute(ProfileAttribute::Email.to_string()))
        .global_secondary_indexes(keys_only_index(
            TEST_EMAIL_INDEX_NAME,
            ProfileAttribute::Email.to_string(),
        ))
        .send()
        .await
        .expect("Failed to create test table");

    // Wait for table to be ready
    sleep(Duration::from_millis(100)).await;

    let storage = ProfileStorage::new(
        dynamodb_client.clone(),
        table_name.clone(),
        TEST_EMAIL_INDEX_NAME.to_string(),
    );

    ProfileTestContext {
        storage,
        table: TableContext {
            table_name,
            dynamodb_client,
        },
    }
}

/// Creates a post table with username and author indexes
pub async fn setup_posts() -> PostTestContext {
    let table_name = format!("test-posts-{}", Uuid::new_v4());
    let dynamodb_client = dynamodb_client().await;

    dynamodb_client
        .create_table()
        .table_name(&table_name)
        .billing_mode(BillingMode::PayPerRequest)
        .key_schema(hash_key(PostAttribute::Id.to_string()))
        .attribute_definitions(string_attribute(PostAttribute::Id.to_string()))
        .attribute_definitions(string_attribute(PostAttribute::Username.to_string()))
        .attribute_definitions(string_attribute(PostAttribute::AuthorProfileId.to_string()))
        .global_secondary_indexes(keys_only_index(
            TEST_USERNAME_INDEX_NAME,
            PostAttribute::Username.to_string(),
        ))
        .global_secondary_indexes(keys_only_index(
            TEST_AUTHOR_INDEX_NAME,
            PostAttribute::AuthorProfileId.to_string(),
        ))
        .send()
        .await
        .expect("Failed to create test table");

    // Wait for table to be ready
    sleep(Duration::from_millis(100)).await;

    let storage = PostStorage::new(
        dynamodb_client.clone(),
        table_name.clone(),
        TEST_USERNAME_INDEX_NAME.to_string(),
        TEST_AUTHOR_INDEX_NAME.to_string(),
    );

    PostTestContext {
        storage,
        table: TableContext {
            table_name,
            dynamodb_client,
        },
    }
}
