//! Custom extractors for request validation

use aide::operation::OperationInput;
use aide::OperationOutput;
use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    Json,
};
use schemars::JsonSchema;
use validator::{Validate, ValidationErrors};

use crate::types::error::AppError;

/// JSON extractor that validates the payload before the handler runs
///
/// Rejections use the rule's `code` as the error code, so a request missing a
/// required field fails with e.g. `username_required`.
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: serde::de::DeserializeOwned + Validate + JsonSchema,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(payload) = Json::<T>::from_request(req, state)
            .await
            .map_err(json_rejection)?;

        payload.validate().map_err(|errors| first_failure(&errors))?;

        Ok(Self(payload))
    }
}

fn json_rejection(rejection: JsonRejection) -> AppError {
    match rejection {
        JsonRejection::MissingJsonContentType(_) => AppError::new(
            StatusCode::BAD_REQUEST,
            "invalid_content_type",
            "Missing Content-Type: application/json header",
            false,
        ),
        // Well-formed JSON with a missing or mistyped field
        JsonRejection::JsonDataError(err) => {
            tracing::debug!("Rejected request body: {err}");
            AppError::validation("validation_error")
        }
        _ => AppError::new(
            StatusCode::BAD_REQUEST,
            "invalid_json",
            "Invalid JSON payload",
            false,
        ),
    }
}

/// Picks the failing rule of the alphabetically first field
fn first_failure(errors: &ValidationErrors) -> AppError {
    let field_errors = errors.field_errors();
    let mut fields: Vec<_> = field_errors.iter().collect();
    fields.sort_by(|(a, _), (b, _)| a.cmp(b));

    fields
        .into_iter()
        .find_map(|(_, errors)| errors.first())
        .map_or_else(
            || AppError::validation("validation_error"),
            |error| AppError::validation(error.code.clone()),
        )
}

impl<T> OperationInput for ValidatedJson<T>
where
    T: JsonSchema,
{
    fn operation_input(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) {
        Json::<T>::operation_input(ctx, operation);
    }

    fn inferred_early_responses(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) -> Vec<(Option<u16>, aide::openapi::Response)> {
        AppError::inferred_responses(ctx, operation)
    }
}
