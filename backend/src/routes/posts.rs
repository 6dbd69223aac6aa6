use axum::{
    extract::{Path, Query},
    http::StatusCode,
    Extension, Json,
};
use instaeats_storage::{
    post::{Post, PostCreateRequest},
    search::SearchPattern,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use validator::Validate;

use crate::{
    routes::profiles::ModifiedResponse,
    state::AppState,
    types::{AppError, ValidatedJson},
};

/// Request to create a post
#[derive(Debug, Deserialize, JsonSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    /// Author's username
    #[serde(default)]
    #[validate(length(min = 1, code = "username_required"))]
    pub user_name: String,
    /// URL returned by `/uploadImage`
    #[serde(default)]
    #[validate(length(min = 1, code = "image_url_required"))]
    pub image_url: String,
    /// Name of the place
    #[serde(default)]
    #[validate(length(min = 1, code = "place_name_required"))]
    pub place_name: String,
    /// Map link for the place
    #[serde(default)]
    pub google_map_url: String,
    /// Author's profile ID
    #[serde(default)]
    #[validate(length(min = 1, code = "profile_id_required"))]
    pub profile_id: String,
    /// Caption
    #[serde(default)]
    pub caption: String,
    /// Author's profile picture
    pub profile_pic: Option<String>,
    /// Rating of the place
    #[serde(default)]
    pub rating: f64,
}

/// Request naming a post
#[derive(Debug, Deserialize, JsonSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DeletePostRequest {
    /// Post to delete
    #[serde(default)]
    #[validate(length(min = 1, code = "post_id_required"))]
    pub post_id: String,
}

/// Request to like a post
#[derive(Debug, Deserialize, JsonSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LikeRequest {
    /// Post to like
    #[serde(default)]
    #[validate(length(min = 1, code = "post_id_required"))]
    pub id: String,
    /// Profile liking the post
    #[serde(default)]
    #[validate(length(min = 1, code = "profile_id_required"))]
    pub profile_id: String,
}

/// Path of a post lookup
#[derive(Debug, Deserialize, JsonSchema)]
pub struct PostPath {
    /// Post ID
    #[serde(rename = "postId")]
    pub post_id: String,
}

/// Query of a post search
#[derive(Debug, Deserialize, JsonSchema)]
pub struct SearchQuery {
    /// Text or regular expression, matched case-insensitively
    #[serde(default)]
    pub input: String,
}

/// A post as returned to clients
#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    /// Post ID
    pub id: String,
    /// Author's profile ID
    pub profile_id: String,
    /// Author's username
    pub user_name: String,
    /// Author's profile picture
    pub profile_pic: Option<String>,
    /// Name of the place
    pub place_name: String,
    /// Map link for the place
    pub google_map_url: String,
    /// Caption
    pub caption: String,
    /// Rating of the place
    pub rating: f64,
    /// Image URL
    pub image_url: String,
    /// Number of likes
    pub likes: i64,
    /// Profiles that liked the post
    pub like_ids: Vec<String>,
    /// Unix timestamp of creation
    pub created_at: i64,
}

impl From<Post> for PostResponse {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            profile_id: post.author_profile_id,
            user_name: post.username,
            profile_pic: post.profile_pic,
            place_name: post.place_name,
            google_map_url: post.map_url,
            caption: post.caption,
            rating: post.rating,
            image_url: post.image_url,
            likes: post.like_count,
            like_ids: post.liker_profile_ids.into_iter().collect(),
            created_at: post.created_at,
        }
    }
}

/// Response to post creation
#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostResponse {
    /// Status message
    pub message: String,
    /// ID of the created post
    pub post_id: String,
}

/// Response to post deletion
#[derive(Debug, Serialize, JsonSchema)]
pub struct DeletePostResponse {
    /// Whether the post was deleted
    pub deleted: bool,
}

fn into_responses(posts: Vec<Post>) -> Json<Vec<PostResponse>> {
    Json(posts.into_iter().map(Into::into).collect())
}

/// List every post
///
/// # Errors
///
/// Returns `500 INTERNAL_SERVER_ERROR` on storage failure
#[instrument(skip_all)]
pub async fn feed(
    Extension(state): Extension<AppState>,
) -> Result<Json<Vec<PostResponse>>, AppError> {
    let posts = state.posts.list_all().await?;
    tracing::debug!(count = posts.len(), "Listed posts");

    Ok(into_responses(posts))
}

/// Search posts
///
/// Matches `input` case-insensitively against the username, place name, caption and map
/// link of every post. `input` is a regular expression; input that does not compile is
/// matched literally.
///
/// # Errors
///
/// Returns an error if:
/// - `400 BAD_REQUEST` - `input` is too large to compile
/// - `500 INTERNAL_SERVER_ERROR` - Storage failure
#[instrument(skip_all, fields(input = %query.input))]
pub async fn search(
    Extension(state): Extension<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<PostResponse>>, AppError> {
    let pattern = SearchPattern::new(&query.input).map_err(|err| {
        tracing::debug!("Rejected search input: {err}");
        AppError::new(
            StatusCode::BAD_REQUEST,
            "invalid_search",
            "Search input could not be compiled",
            false,
        )
    })?;

    let posts = state.posts.search(&pattern).await?;
    tracing::debug!(count = posts.len(), "Searched posts");

    Ok(into_responses(posts))
}

/// Create a post
///
/// Inserts the post and adds it to the author's profile. If the profile does not exist the
/// post is deleted again.
///
/// # Returns
///
/// Returns `201 CREATED` with the new post's ID
///
/// # Errors
///
/// Returns an error if:
/// - `400 BAD_REQUEST` - A required field is missing or empty
/// - `500 INTERNAL_SERVER_ERROR` - The profile was not updated, or storage failure
#[instrument(skip_all, fields(profile_id = %payload.profile_id))]
pub async fn create_post(
    Extension(state): Extension<AppState>,
    ValidatedJson(payload): ValidatedJson<CreatePostRequest>,
) -> Result<(StatusCode, Json<CreatePostResponse>), AppError> {
    let post = state
        .publication()
        .execute(PostCreateRequest {
            author_profile_id: payload.profile_id,
            username: payload.user_name,
            profile_pic: payload.profile_pic,
            place_name: payload.place_name,
            map_url: payload.google_map_url,
            caption: payload.caption,
            rating: payload.rating,
            image_url: payload.image_url,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatePostResponse {
            message: "Post created successfully".to_string(),
            post_id: post.id,
        }),
    ))
}

/// Look up a post by ID
///
/// Returns an array with the post, or an empty array if there is none.
///
/// # Errors
///
/// Returns `500 INTERNAL_SERVER_ERROR` on storage failure
#[instrument(skip_all, fields(post_id = %path.post_id))]
pub async fn get_post(
    Extension(state): Extension<AppState>,
    Path(path): Path<PostPath>,
) -> Result<Json<Vec<PostResponse>>, AppError> {
    let post = state.posts.get(&path.post_id).await?;

    Ok(into_responses(post.into_iter().collect()))
}

/// Delete a post
///
/// Deletes the post, then decrements the author's post count and drops the post from the
/// author's post list. The second step is not transactional with the first.
///
/// # Errors
///
/// Returns an error if:
/// - `404 NOT_FOUND` - No post with this ID
/// - `500 INTERNAL_SERVER_ERROR` - Storage failure
#[instrument(skip_all, fields(post_id = %payload.post_id))]
pub async fn delete_post(
    Extension(state): Extension<AppState>,
    ValidatedJson(payload): ValidatedJson<DeletePostRequest>,
) -> Result<Json<DeletePostResponse>, AppError> {
    let post = state.posts.get(&payload.post_id).await?.ok_or_else(|| {
        AppError::new(
            StatusCode::NOT_FOUND,
            "post_not_found",
            "Post not found",
            false,
        )
    })?;

    state.posts.delete(&post.id).await?;

    let released = state
        .profiles
        .release_post(&post.author_profile_id, &post.id)
        .await
        .inspect_err(|err| tracing::warn!("Post deleted but profile was not updated: {err}"))?;
    if !released {
        tracing::warn!(
            profile_id = %post.author_profile_id,
            "Post deleted but author's post count was not decremented"
        );
    }

    tracing::info!("Deleted post");

    Ok(Json(DeletePostResponse { deleted: true }))
}

/// Like a post
///
/// A profile's like is counted once; liking again changes nothing.
///
/// # Errors
///
/// Returns `500 INTERNAL_SERVER_ERROR` on storage failure
#[instrument(skip_all, fields(post_id = %payload.id, profile_id = %payload.profile_id))]
pub async fn add_like(
    Extension(state): Extension<AppState>,
    ValidatedJson(payload): ValidatedJson<LikeRequest>,
) -> Result<Json<ModifiedResponse>, AppError> {
    let modified = state.posts.like(&payload.id, &payload.profile_id).await?;

    Ok(Json(ModifiedResponse { modified }))
}
