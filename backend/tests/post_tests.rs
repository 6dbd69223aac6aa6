mod common;

use common::*;

use http::StatusCode;
use instaeats_storage::{post::PostRepository, profile::ProfileRepository};
use serde_json::json;

#[tokio::test]
async fn test_create_post_updates_profile() {
    let setup = TestSetup::new();
    let ana = setup.create_profile("ana@example.com", "ana").await;

    let response = setup
        .send_post_request(
            "/createPost",
            create_post_request(&ana, "ana", "Sushi Zen", "omakase night"),
        )
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = parse_response_body(response).await;
    assert_eq!(body["message"], "Post created successfully");
    let post_id = body["postId"].as_str().unwrap();

    let profile = setup.profiles.get(&ana).await.unwrap().unwrap();
    assert_eq!(profile.post_count, 1);
    assert!(profile.post_ids.contains(post_id));

    let post = setup.posts.get(post_id).await.unwrap().unwrap();
    assert_eq!(post.author_profile_id, ana);
    assert_eq!(post.like_count, 0);
    assert!(post.liker_profile_ids.is_empty());
}

#[tokio::test]
async fn test_create_post_for_unknown_profile_is_rolled_back() {
    let setup = TestSetup::new();
    let ana = setup.create_profile("ana@example.com", "ana").await;
    let before = setup.profiles.snapshot().await;

    let response = setup
        .send_post_request(
            "/createPost",
            create_post_request("missing-profile", "ghost", "Sushi Zen", "boo"),
        )
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = parse_response_body(response).await;
    assert_eq!(body["error"]["code"], "profile_update_failed");

    assert_eq!(setup.posts.count().await.unwrap(), 0);
    let after = setup.profiles.snapshot().await;
    assert_eq!(after.len(), before.len());
    assert_eq!(after[0].id, ana);
    assert_eq!(after[0].post_count, before[0].post_count);
    assert_eq!(after[0].post_ids, before[0].post_ids);
}

#[tokio::test]
async fn test_create_post_requires_fields() {
    let setup = TestSetup::new();

    let response = setup
        .send_post_request(
            "/createPost",
            json!({ "userName": "ana", "placeName": "Sushi Zen", "imageUrl": "https://x" }),
        )
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = parse_response_body(response).await;
    assert_eq!(body["error"]["code"], "profile_id_required");
    assert_eq!(setup.posts.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_get_post() {
    let setup = TestSetup::new();
    let ana = setup.create_profile("ana@example.com", "ana").await;
    let post_id = setup.create_post(&ana, "ana", "Sushi Zen", "omakase").await;

    let response = setup
        .send_get_request(&format!("/post/{post_id}"))
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    let posts = body.as_array().unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0]["id"], post_id.as_str());
    assert_eq!(posts[0]["profileId"], ana.as_str());
    assert_eq!(posts[0]["userName"], "ana");
    assert_eq!(posts[0]["placeName"], "Sushi Zen");
    assert_eq!(posts[0]["rating"], 4.5);
    assert_eq!(posts[0]["likes"], 0);
    assert_eq!(posts[0]["likeIds"], json!([]));
}

#[tokio::test]
async fn test_get_unknown_post_returns_empty_array() {
    let setup = TestSetup::new();

    let response = setup
        .send_get_request("/post/missing")
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(parse_response_body(response).await, json!([]));
}

#[tokio::test]
async fn test_delete_post_updates_profile() {
    let setup = TestSetup::new();
    let ana = setup.create_profile("ana@example.com", "ana").await;
    let deleted = setup.create_post(&ana, "ana", "Sushi Zen", "omakase").await;
    let kept = setup.create_post(&ana, "ana", "Pho 24", "broth").await;

    let response = setup
        .send_post_request("/DeletePost", json!({ "postId": deleted }))
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        parse_response_body(response).await,
        json!({ "deleted": true })
    );

    assert!(setup.posts.get(&deleted).await.unwrap().is_none());

    let profile = setup.profiles.get(&ana).await.unwrap().unwrap();
    assert_eq!(profile.post_count, 1);
    assert!(!profile.post_ids.contains(&deleted));
    assert!(profile.post_ids.contains(&kept));
}

#[tokio::test]
async fn test_delete_unknown_post_mutates_nothing() {
    let setup = TestSetup::new();
    let ana = setup.create_profile("ana@example.com", "ana").await;
    setup.create_post(&ana, "ana", "Sushi Zen", "omakase").await;

    let response = setup
        .send_post_request("/DeletePost", json!({ "postId": "missing" }))
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = parse_response_body(response).await;
    assert_eq!(body["error"]["code"], "post_not_found");

    assert_eq!(setup.posts.count().await.unwrap(), 1);
    let profile = setup.profiles.get(&ana).await.unwrap().unwrap();
    assert_eq!(profile.post_count, 1);
}

#[tokio::test]
async fn test_like_is_counted_once_per_profile() {
    let setup = TestSetup::new();
    let ana = setup.create_profile("ana@example.com", "ana").await;
    let post_id = setup.create_post(&ana, "ana", "Sushi Zen", "omakase").await;

    let payload = json!({ "id": post_id, "profileId": "bo" });

    let response = setup
        .send_post_request("/Addlike", payload.clone())
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(parse_response_body(response).await, json!({ "modified": true }));

    let response = setup
        .send_post_request("/Addlike", payload)
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(parse_response_body(response).await, json!({ "modified": false }));

    let post = setup.posts.get(&post_id).await.unwrap().unwrap();
    assert_eq!(post.like_count, 1);
    assert_eq!(post.liker_profile_ids.len(), 1);
    assert!(post.liker_profile_ids.contains("bo"));
}

#[tokio::test]
async fn test_feed_lists_every_post() {
    let setup = TestSetup::new();
    let ana = setup.create_profile("ana@example.com", "ana").await;
    let first = setup.create_post(&ana, "ana", "Sushi Zen", "omakase").await;
    let second = setup.create_post(&ana, "ana", "Pho 24", "broth").await;

    let response = setup
        .send_get_request("/")
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    let ids: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|post| post["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec![first.as_str(), second.as_str()]);
}
