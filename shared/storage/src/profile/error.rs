//! Error types for profile storage operations

use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::operation::{
    delete_item::DeleteItemError, get_item::GetItemError, put_item::PutItemError,
    query::QueryError, scan::ScanError, update_item::UpdateItemError,
};
use thiserror::Error;

/// Result type alias for profile storage operations
pub type ProfileStorageResult<T> = Result<T, ProfileStorageError>;

/// Storage error types for profile operations
#[derive(Debug, Error)]
pub enum ProfileStorageError {
    /// Failed to insert profile into `DynamoDB`
    #[error("Failed to insert profile into DynamoDB: {0:?}")]
    DynamoDbPutError(#[from] SdkError<PutItemError>),

    /// Failed to get profile from `DynamoDB`
    #[error("Failed to get profile from DynamoDB: {0:?}")]
    DynamoDbGetError(#[from] SdkError<GetItemError>),

    /// Failed to query profiles from `DynamoDB`
    #[error("Failed to query profiles from DynamoDB: {0:?}")]
    DynamoDbQueryError(#[from] SdkError<QueryError>),

    /// Failed to scan profiles from `DynamoDB`
    #[error("Failed to scan profiles from DynamoDB: {0:?}")]
    DynamoDbScanError(#[from] SdkError<ScanError>),

    /// Failed to update profile in `DynamoDB`
    #[error("Failed to update profile in DynamoDB: {0:?}")]
    DynamoDbUpdateError(#[from] SdkError<UpdateItemError>),

    /// Failed to delete profile from `DynamoDB`
    #[error("Failed to delete profile from DynamoDB: {0:?}")]
    DynamoDbDeleteError(#[from] SdkError<DeleteItemError>),

    /// Failed to convert between a profile and a `DynamoDB` item
    #[error("Failed to parse profile: {0}")]
    SerializationError(String),
}

impl From<serde_dynamo::Error> for ProfileStorageError {
    fn from(err: serde_dynamo::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}
