use axum::{
    extract::{Multipart, Path},
    http::StatusCode,
    Extension, Json,
};
use instaeats_storage::profile::{Profile, ProfileCreateRequest};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use validator::Validate;

use crate::{
    media_storage::MediaFolder,
    routes::media::{ImageForm, UploadResponse},
    state::AppState,
    types::{AppError, ValidatedJson},
};

/// Request to create a profile
#[derive(Debug, Deserialize, JsonSchema, Validate)]
pub struct CreateProfileRequest {
    /// Display name
    #[serde(rename = "Name", default)]
    #[validate(length(min = 1, code = "name_required"))]
    pub name: String,
    /// Username shown on the profile's posts
    #[serde(default)]
    #[validate(length(min = 1, code = "username_required"))]
    pub username: String,
    /// Email address, unique per profile
    #[serde(default)]
    #[validate(length(min = 1, code = "email_required"))]
    pub email: String,
    /// Profile picture URL
    #[serde(rename = "profilePic")]
    pub profile_pic: Option<String>,
    /// Short biography
    pub bio: Option<String>,
}

/// Request to edit a profile's bio and username
#[derive(Debug, Deserialize, JsonSchema, Validate)]
pub struct EditProfileRequest {
    /// Email of the profile to edit
    #[serde(default)]
    #[validate(length(min = 1, code = "email_required"))]
    pub email: String,
    /// New biography
    #[serde(default)]
    pub bio: String,
    /// New username
    #[serde(rename = "userName", default)]
    #[validate(length(min = 1, code = "username_required"))]
    pub username: String,
}

/// Request naming a profile
#[derive(Debug, Deserialize, JsonSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DeleteProfileRequest {
    /// Profile to delete
    #[serde(default)]
    #[validate(length(min = 1, code = "profile_id_required"))]
    pub profile_id: String,
}

/// Request to save or unsave a post
#[derive(Debug, Deserialize, JsonSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SavedPostRequest {
    /// Post to save or unsave
    #[serde(default)]
    #[validate(length(min = 1, code = "post_id_required"))]
    pub post_id: String,
    /// Profile saving the post
    #[serde(default)]
    #[validate(length(min = 1, code = "profile_id_required"))]
    pub profile_id: String,
}

/// Path of a profile lookup
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ProfilePath {
    /// Email of the profile
    #[serde(rename = "emailId")]
    pub email_id: String,
}

/// A profile as returned to clients
#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    /// Profile ID
    pub id: String,
    /// Email address
    pub email: String,
    /// Display name
    pub name: String,
    /// Username
    pub username: String,
    /// Biography
    pub bio: String,
    /// Profile picture URL
    pub profile_pic: Option<String>,
    /// Number of posts authored
    pub post_count: i64,
    /// Authored post IDs
    pub post_ids: Vec<String>,
    /// Saved post IDs
    pub saved_post_ids: Vec<String>,
    /// Unix timestamp of creation
    pub created_at: i64,
}

impl From<Profile> for ProfileResponse {
    fn from(profile: Profile) -> Self {
        Self {
            id: profile.id,
            email: profile.email,
            name: profile.name,
            username: profile.username,
            bio: profile.bio,
            profile_pic: profile.profile_pic,
            post_count: profile.post_count,
            post_ids: profile.post_ids.into_iter().collect(),
            saved_post_ids: profile.saved_post_ids.into_iter().collect(),
            created_at: profile.created_at,
        }
    }
}

/// Response to profile creation
#[derive(Debug, Serialize, JsonSchema)]
pub struct CreateProfileResponse {
    /// Status message
    pub message: String,
    /// The created profile
    pub profile: ProfileResponse,
}

/// Response to a profile edit
#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct EditProfileResponse {
    /// Status message
    pub message: String,
    /// Number of posts whose username was updated
    pub updated_posts: usize,
}

/// Response to profile deletion
#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteProfileResponse {
    /// Whether the profile was deleted
    pub deleted: bool,
    /// Number of the profile's posts that were deleted
    pub deleted_posts: usize,
}

/// Whether an update changed the stored document
#[derive(Debug, Serialize, JsonSchema)]
pub struct ModifiedResponse {
    /// `true` if the document changed
    pub modified: bool,
}

fn profile_not_found() -> AppError {
    AppError::new(
        StatusCode::NOT_FOUND,
        "profile_not_found",
        "Profile not found",
        false,
    )
}

fn profile_update_failed() -> AppError {
    AppError::new(
        StatusCode::INTERNAL_SERVER_ERROR,
        "profile_update_failed",
        "Failed to update profile",
        false,
    )
}

/// Create a profile
///
/// The email must not belong to an existing profile. The check and the insert are separate
/// operations, so two concurrent requests with the same email can both succeed.
///
/// # Returns
///
/// Returns `201 CREATED` with the stored profile
///
/// # Errors
///
/// Returns an error if:
/// - `400 BAD_REQUEST` - `Name`, `username` or `email` missing or empty
/// - `400 BAD_REQUEST` - A profile with this email already exists
/// - `500 INTERNAL_SERVER_ERROR` - Storage failure
#[instrument(skip_all, fields(email = %payload.email))]
pub async fn create_profile(
    Extension(state): Extension<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateProfileRequest>,
) -> Result<(StatusCode, Json<CreateProfileResponse>), AppError> {
    if state.profiles.get_by_email(&payload.email).await?.is_some() {
        return Err(AppError::new(
            StatusCode::BAD_REQUEST,
            "profile_exists",
            "Profile with this email already exists",
            false,
        ));
    }

    let profile = state
        .profiles
        .create(ProfileCreateRequest {
            email: payload.email,
            name: payload.name,
            username: payload.username,
            bio: payload.bio,
            profile_pic: payload.profile_pic,
        })
        .await?;

    tracing::info!(profile_id = %profile.id, "Created profile");

    Ok((
        StatusCode::CREATED,
        Json(CreateProfileResponse {
            message: "Profile created successfully".to_string(),
            profile: profile.into(),
        }),
    ))
}

/// Edit a profile's bio and username
///
/// When the username changes, every post carrying the old username is renamed. The rename
/// runs after the profile update and is not transactional; if it fails the posts keep the
/// old username.
///
/// A request that changes nothing is reported as a failed update.
///
/// # Errors
///
/// Returns an error if:
/// - `400 BAD_REQUEST` - `email` or `userName` missing or empty
/// - `404 NOT_FOUND` - No profile with this email
/// - `500 INTERNAL_SERVER_ERROR` - The profile was not modified, or storage failure
#[instrument(skip_all, fields(email = %payload.email))]
pub async fn edit_profile(
    Extension(state): Extension<AppState>,
    ValidatedJson(payload): ValidatedJson<EditProfileRequest>,
) -> Result<Json<EditProfileResponse>, AppError> {
    let profile = state
        .profiles
        .get_by_email(&payload.email)
        .await?
        .ok_or_else(profile_not_found)?;

    let modified = state
        .profiles
        .update_details(&profile.id, &payload.bio, &payload.username)
        .await?;
    if !modified {
        return Err(profile_update_failed());
    }

    let updated_posts = if profile.username == payload.username {
        0
    } else {
        state
            .posts
            .rename_author(&profile.username, &payload.username)
            .await
            .inspect_err(|err| {
                tracing::warn!(
                    old_username = %profile.username,
                    "Profile renamed but posts were not: {err}"
                );
            })?
    };

    tracing::info!(profile_id = %profile.id, updated_posts, "Edited profile");

    Ok(Json(EditProfileResponse {
        message: "Profile and posts updated successfully".to_string(),
        updated_posts,
    }))
}

/// Replace a profile picture
///
/// Multipart form with an `image` file and the profile's `email`. The image is stored
/// under `profile_pics/`, set on the profile and copied to every post carrying the
/// profile's username.
///
/// # Errors
///
/// Returns an error if:
/// - `400 BAD_REQUEST` - No image, or no email
/// - `404 NOT_FOUND` - No profile with this email
/// - `500 INTERNAL_SERVER_ERROR` - Upload failure, the profile was not modified, or storage failure
#[instrument(skip_all)]
pub async fn update_profile_pic(
    Extension(state): Extension<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let mut form = ImageForm::read(&mut multipart).await?;
    let image = form.take_image()?;
    let email = form
        .field("email")
        .filter(|email| !email.is_empty())
        .ok_or_else(|| AppError::validation("email_required"))?;

    let profile = state
        .profiles
        .get_by_email(email)
        .await?
        .ok_or_else(profile_not_found)?;

    let url = state
        .images
        .upload(MediaFolder::ProfilePictures, image)
        .await?;

    if !state.profiles.set_profile_pic(&profile.id, &url).await? {
        return Err(profile_update_failed());
    }

    // Posts are matched on the username stored now, not the one read before the upload
    let username = state
        .profiles
        .get(&profile.id)
        .await?
        .ok_or_else(profile_not_found)?
        .username;

    let updated_posts = state
        .posts
        .set_author_picture(&username, &url)
        .await
        .inspect_err(|err| {
            tracing::warn!(%username, "Profile picture set but posts were not updated: {err}");
        })?;

    tracing::info!(profile_id = %profile.id, updated_posts, "Updated profile picture");

    Ok(Json(UploadResponse { url }))
}

/// Look up a profile by email
///
/// Returns an array with the profile, or an empty array if there is none.
///
/// # Errors
///
/// Returns `500 INTERNAL_SERVER_ERROR` on storage failure
#[instrument(skip_all, fields(email = %path.email_id))]
pub async fn get_profile(
    Extension(state): Extension<AppState>,
    Path(path): Path<ProfilePath>,
) -> Result<Json<Vec<ProfileResponse>>, AppError> {
    let profile = state.profiles.get_by_email(&path.email_id).await?;

    Ok(Json(profile.into_iter().map(Into::into).collect()))
}

/// Delete a profile and all of its posts
///
/// The posts are deleted after the profile. If that fails the posts stay behind without
/// an author.
///
/// # Errors
///
/// Returns an error if:
/// - `404 NOT_FOUND` - No profile with this ID
/// - `500 INTERNAL_SERVER_ERROR` - Storage failure
#[instrument(skip_all, fields(profile_id = %payload.profile_id))]
pub async fn delete_profile(
    Extension(state): Extension<AppState>,
    ValidatedJson(payload): ValidatedJson<DeleteProfileRequest>,
) -> Result<Json<DeleteProfileResponse>, AppError> {
    let profile = state
        .profiles
        .get(&payload.profile_id)
        .await?
        .ok_or_else(profile_not_found)?;

    state.profiles.delete(&profile.id).await?;

    let deleted_posts = state
        .posts
        .delete_by_author(&profile.id)
        .await
        .inspect_err(|err| tracing::warn!("Profile deleted but its posts were not: {err}"))?;

    tracing::info!(deleted_posts, "Deleted profile");

    Ok(Json(DeleteProfileResponse {
        deleted: true,
        deleted_posts,
    }))
}

/// Save a post to a profile
///
/// Saving an already saved post changes nothing.
///
/// # Errors
///
/// Returns `500 INTERNAL_SERVER_ERROR` on storage failure
#[instrument(skip_all, fields(post_id = %payload.post_id, profile_id = %payload.profile_id))]
pub async fn save_post(
    Extension(state): Extension<AppState>,
    ValidatedJson(payload): ValidatedJson<SavedPostRequest>,
) -> Result<Json<ModifiedResponse>, AppError> {
    let modified = state
        .profiles
        .save_post(&payload.profile_id, &payload.post_id)
        .await?;

    Ok(Json(ModifiedResponse { modified }))
}

/// Remove a saved post from a profile
///
/// Removing a post that is not saved changes nothing.
///
/// # Errors
///
/// Returns `500 INTERNAL_SERVER_ERROR` on storage failure
#[instrument(skip_all, fields(post_id = %payload.post_id, profile_id = %payload.profile_id))]
pub async fn remove_saved_post(
    Extension(state): Extension<AppState>,
    ValidatedJson(payload): ValidatedJson<SavedPostRequest>,
) -> Result<Json<ModifiedResponse>, AppError> {
    let modified = state
        .profiles
        .remove_saved_post(&payload.profile_id, &payload.post_id)
        .await?;

    Ok(Json(ModifiedResponse { modified }))
}
