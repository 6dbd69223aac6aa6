//! Universal error handling for the API

use std::borrow::Cow;

use aide::OperationOutput;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use instaeats_storage::{post::PostStorageError, profile::ProfileStorageError};
use schemars::JsonSchema;
use serde::Serialize;

use crate::media_storage::BucketError;
use crate::publication::PublicationError;

/// API error response envelope
#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorResponse {
    /// Whether the client should retry the request
    pub allow_retry: bool,
    /// Error details
    error: ErrorBody,
}

/// Error body containing code and message
#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    /// Machine-readable error code
    pub code: Cow<'static, str>,
    /// Human-readable error message
    pub message: &'static str,
}

/// Application error type that wraps the API error response
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    inner: ApiErrorResponse,
}

impl AppError {
    /// Create a new application error
    #[must_use]
    pub const fn new(
        status: StatusCode,
        code: &'static str,
        msg: &'static str,
        retry: bool,
    ) -> Self {
        Self {
            status,
            inner: ApiErrorResponse {
                allow_retry: retry,
                error: ErrorBody {
                    code: Cow::Borrowed(code),
                    message: msg,
                },
            },
        }
    }

    /// A `400 BAD_REQUEST` for a request that failed boundary validation
    ///
    /// `code` is the failing rule's code, e.g. `name_required`.
    #[must_use]
    pub fn validation(code: impl Into<Cow<'static, str>>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            inner: ApiErrorResponse {
                allow_retry: false,
                error: ErrorBody {
                    code: code.into(),
                    message: "Request validation failed",
                },
            },
        }
    }

    /// HTTP status of the error
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Machine-readable error code
    #[must_use]
    pub fn code(&self) -> &str {
        &self.inner.error.code
    }

    const fn storage_failure() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal_error",
            "Internal server error",
            true,
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the error based on status code
        match self.status.as_u16() {
            400..=499 => tracing::warn!(
                "Client error: {} - {}",
                self.inner.error.code,
                self.inner.error.message
            ),
            500..=599 => tracing::error!(
                "Server error: {} - {}",
                self.inner.error.code,
                self.inner.error.message
            ),
            _ => {}
        }

        (self.status, Json(self.inner)).into_response()
    }
}

impl From<ProfileStorageError> for AppError {
    fn from(err: ProfileStorageError) -> Self {
        tracing::error!("Profile storage error: {err}");
        Self::storage_failure()
    }
}

impl From<PostStorageError> for AppError {
    fn from(err: PostStorageError) -> Self {
        tracing::error!("Post storage error: {err}");
        Self::storage_failure()
    }
}

/// Convert bucket errors to application errors
impl From<BucketError> for AppError {
    fn from(err: BucketError) -> Self {
        use BucketError::{AwsError, InvalidInput, S3Error, UpstreamError};

        match &err {
            UpstreamError(msg) => {
                tracing::error!("S3 upstream error: {msg}");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "upload_failed",
                    "Failed to upload image",
                    true,
                )
            }
            S3Error(msg) | AwsError(msg) => {
                tracing::error!("S3/AWS error: {msg}");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "upload_failed",
                    "Failed to upload image",
                    false,
                )
            }
            InvalidInput(msg) => {
                tracing::warn!("Invalid input: {msg}");
                Self::new(
                    StatusCode::BAD_REQUEST,
                    "invalid_input",
                    "Invalid input provided",
                    false,
                )
            }
        }
    }
}

impl From<PublicationError> for AppError {
    fn from(err: PublicationError) -> Self {
        match &err {
            PublicationError::ProfileNotUpdated { .. } => {
                tracing::warn!("{err}");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "profile_update_failed",
                    "Failed to update profile after creating post",
                    false,
                )
            }
            PublicationError::Insert(_)
            | PublicationError::ProfileUpdate { .. }
            | PublicationError::Compensation { .. } => {
                tracing::error!("{err}");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "post_create_failed",
                    "Failed to create post",
                    true,
                )
            }
        }
    }
}

impl OperationOutput for AppError {
    type Inner = ApiErrorResponse;

    fn operation_response(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) -> Option<aide::openapi::Response> {
        Json::<ApiErrorResponse>::operation_response(ctx, operation)
    }
}
