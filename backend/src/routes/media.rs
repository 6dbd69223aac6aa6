use axum::{extract::Multipart, http::StatusCode, Extension, Json};
use schemars::JsonSchema;
use serde::Serialize;
use tracing::instrument;

use crate::{
    media_storage::{ImageUpload, MediaFolder},
    state::AppState,
    types::AppError,
};

/// Multipart field carrying the image
const IMAGE_FIELD: &str = "image";

/// Response to an image upload
#[derive(Debug, Serialize, JsonSchema)]
pub struct UploadResponse {
    /// Public URL of the stored image
    pub url: String,
}

/// Fields of an image upload form
#[derive(Debug, Default)]
pub struct ImageForm {
    /// The `image` file field
    pub image: Option<ImageUpload>,
    /// Every other field, read as text
    pub fields: Vec<(String, String)>,
}

impl ImageForm {
    /// Reads the whole form
    ///
    /// # Errors
    ///
    /// Returns `400 BAD_REQUEST` if the body is not valid multipart data
    pub async fn read(multipart: &mut Multipart) -> Result<Self, AppError> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await.map_err(invalid_multipart)? {
            let name = field.name().unwrap_or_default().to_string();

            if name == IMAGE_FIELD {
                let original_name = field.file_name().map(ToString::to_string);
                let content_type = field.content_type().map(ToString::to_string);
                let data = field.bytes().await.map_err(invalid_multipart)?;

                form.image = Some(ImageUpload {
                    original_name,
                    content_type,
                    data,
                });
            } else {
                let value = field.text().await.map_err(invalid_multipart)?;
                form.fields.push((name, value));
            }
        }

        Ok(form)
    }

    /// Value of a text field
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value.as_str())
    }

    /// Takes the image, failing when the form carried none
    ///
    /// # Errors
    ///
    /// Returns `400 BAD_REQUEST` with `image_required` if no non-empty image was sent
    pub fn take_image(&mut self) -> Result<ImageUpload, AppError> {
        self.image
            .take()
            .filter(|image| !image.data.is_empty())
            .ok_or_else(|| {
                AppError::new(
                    StatusCode::BAD_REQUEST,
                    "image_required",
                    "Image is required",
                    false,
                )
            })
    }
}

fn invalid_multipart(err: axum::extract::multipart::MultipartError) -> AppError {
    tracing::debug!("Rejected multipart body: {err}");
    AppError::new(
        StatusCode::BAD_REQUEST,
        "invalid_multipart",
        "Invalid multipart form data",
        false,
    )
}

/// Upload a post image
///
/// Stores the `image` field under `post_images/` and returns its public URL. The URL is
/// then sent as `imageUrl` when creating the post.
///
/// # Errors
///
/// Returns an error if:
/// - `400 BAD_REQUEST` - No image in the form
/// - `500 INTERNAL_SERVER_ERROR` - The image could not be stored
#[instrument(skip_all)]
pub async fn upload_image(
    Extension(state): Extension<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let mut form = ImageForm::read(&mut multipart).await?;
    let image = form.take_image()?;

    let url = state.images.upload(MediaFolder::PostImages, image).await?;

    Ok(Json(UploadResponse { url }))
}
