use std::sync::Arc;

use axum::{body::Body, http::Request, response::Response, Router};
use backend::{
    media_storage::InMemoryImageStore, server, state::AppState, types::Environment,
};
use http::StatusCode;
use instaeats_storage::memory::{InMemoryPostStorage, InMemoryProfileStorage};
use tower::ServiceExt;

use super::utils::{
    create_post_request, create_profile_request, multipart_body, parse_response_body, FormPart,
    BOUNDARY,
};

/// Initialize tracing for tests
pub fn setup_test_env() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init()
        .ok();
}

/// Router wired to in-memory stores the test can inspect
pub struct TestSetup {
    pub router: Router,
    pub profiles: Arc<InMemoryProfileStorage>,
    pub posts: Arc<InMemoryPostStorage>,
    pub images: Arc<InMemoryImageStore>,
}

impl TestSetup {
    pub fn new() -> Self {
        setup_test_env();

        let profiles = Arc::new(InMemoryProfileStorage::new());
        let posts = Arc::new(InMemoryPostStorage::new());
        let images = Arc::new(InMemoryImageStore::new());

        let state = AppState::new(profiles.clone(), posts.clone(), images.clone());
        let router = server::app(Environment::Development, state);

        Self {
            router,
            profiles,
            posts,
            images,
        }
    }

    pub async fn send_post_request(
        &self,
        route: &str,
        payload: serde_json::Value,
    ) -> Result<Response, Box<dyn std::error::Error>> {
        let request = Request::builder()
            .uri(route)
            .method("POST")
            .header("Content-Type", "application/json")
            .body(Body::from(payload.to_string()))?;

        let response = self.router.clone().oneshot(request).await?;
        Ok(response)
    }

    pub async fn send_multipart_request(
        &self,
        route: &str,
        parts: &[FormPart<'_>],
    ) -> Result<Response, Box<dyn std::error::Error>> {
        let request = Request::builder()
            .uri(route)
            .method("POST")
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(multipart_body(parts)))?;

        let response = self.router.clone().oneshot(request).await?;
        Ok(response)
    }

    pub async fn send_get_request(
        &self,
        route: &str,
    ) -> Result<Response, Box<dyn std::error::Error>> {
        let request = Request::builder()
            .uri(route)
            .method("GET")
            .body(Body::empty())?;

        let response = self.router.clone().oneshot(request).await?;
        Ok(response)
    }

    /// Creates a profile through the API and returns its ID
    pub async fn create_profile(&self, email: &str, username: &str) -> String {
        let response = self
            .send_post_request("/createProfile", create_profile_request(email, username))
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = parse_response_body(response).await;
        body["profile"]["id"].as_str().unwrap().to_string()
    }

    /// Creates a post through the API and returns its ID
    pub async fn create_post(
        &self,
        profile_id: &str,
        username: &str,
        place_name: &str,
        caption: &str,
    ) -> String {
        let response = self
            .send_post_request(
                "/createPost",
                create_post_request(profile_id, username, place_name, caption),
            )
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = parse_response_body(response).await;
        body["postId"].as_str().unwrap().to_string()
    }
}
