mod docs;
mod health;
/// Image upload form and endpoint
pub mod media;
/// Feed, search and post endpoints
pub mod posts;
/// Profile endpoints
pub mod profiles;

use aide::axum::{
    routing::{get, post},
    ApiRouter,
};

use crate::types::Environment;

/// Creates the router with all handler routes
pub fn handler(environment: &Environment) -> ApiRouter {
    ApiRouter::new()
        .merge(docs::handler(environment))
        .api_route("/health", get(health::handler))
        .api_route("/", get(posts::feed))
        .api_route("/search", get(posts::search))
        .api_route("/createProfile", post(profiles::create_profile))
        .api_route("/edit-profile", post(profiles::edit_profile))
        .api_route("/updateProfilePic", post(profiles::update_profile_pic))
        .api_route("/profile/{emailId}", get(profiles::get_profile))
        .api_route("/DeleteProfile", post(profiles::delete_profile))
        .api_route("/SavePost", post(profiles::save_post))
        .api_route("/RemoveSavedPost", post(profiles::remove_saved_post))
        .api_route("/createPost", post(posts::create_post))
        .api_route("/uploadImage", post(media::upload_image))
        .api_route("/post/{postId}", get(posts::get_post))
        .api_route("/DeletePost", post(posts::delete_post))
        .api_route("/Addlike", post(posts::add_like))
}
