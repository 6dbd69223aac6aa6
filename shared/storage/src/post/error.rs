//! Error types for post storage operations

use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::operation::{
    batch_write_item::BatchWriteItemError, delete_item::DeleteItemError, get_item::GetItemError,
    put_item::PutItemError, query::QueryError, scan::ScanError, update_item::UpdateItemError,
};
use thiserror::Error;

/// Result type alias for post storage operations
pub type PostStorageResult<T> = Result<T, PostStorageError>;

/// Storage error types for post operations
#[derive(Debug, Error)]
pub enum PostStorageError {
    /// Failed to insert post into `DynamoDB`
    #[error("Failed to insert post into DynamoDB: {0:?}")]
    DynamoDbPutError(#[from] SdkError<PutItemError>),

    /// Failed to get post from `DynamoDB`
    #[error("Failed to get post from DynamoDB: {0:?}")]
    DynamoDbGetError(#[from] SdkError<GetItemError>),

    /// Failed to query posts from `DynamoDB`
    #[error("Failed to query posts from DynamoDB: {0:?}")]
    DynamoDbQueryError(#[from] SdkError<QueryError>),

    /// Failed to scan posts from `DynamoDB`
    #[error("Failed to scan posts from DynamoDB: {0:?}")]
    DynamoDbScanError(#[from] SdkError<ScanError>),

    /// Failed to update post in `DynamoDB`
    #[error("Failed to update post in DynamoDB: {0:?}")]
    DynamoDbUpdateError(#[from] SdkError<UpdateItemError>),

    /// Failed to delete post from `DynamoDB`
    #[error("Failed to delete post from DynamoDB: {0:?}")]
    DynamoDbDeleteError(#[from] SdkError<DeleteItemError>),

    /// Failed to batch delete posts from `DynamoDB`
    #[error("Failed to batch delete posts from DynamoDB: {0:?}")]
    DynamoDbBatchWriteError(#[from] SdkError<BatchWriteItemError>),

    /// Failed to convert between a post and a `DynamoDB` item
    #[error("Failed to parse post: {0}")]
    SerializationError(String),
}

impl From<serde_dynamo::Error> for PostStorageError {
    fn from(err: serde_dynamo::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}
