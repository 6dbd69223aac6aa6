use axum::response::Response;
use http_body_util::BodyExt;
use serde_json::json;

/// Boundary used by [`multipart_body`]
pub const BOUNDARY: &str = "instaeats-test-boundary";

/// Parse response body to JSON
pub async fn parse_response_body(response: Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

/// One field of a multipart form
pub enum FormPart<'a> {
    /// A plain text field
    Text { name: &'a str, value: &'a str },
    /// A file field
    File {
        name: &'a str,
        file_name: &'a str,
        content_type: &'a str,
        data: &'a [u8],
    },
}

/// Encodes `parts` as a `multipart/form-data` body delimited by [`BOUNDARY`]
pub fn multipart_body(parts: &[FormPart<'_>]) -> Vec<u8> {
    let mut body = Vec::new();

    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            FormPart::Text { name, value } => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            FormPart::File {
                name,
                file_name,
                content_type,
                data,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(data);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    body
}

/// A small JPEG-looking image field named `image`
pub fn image_part(data: &[u8]) -> FormPart<'_> {
    FormPart::File {
        name: "image",
        file_name: "dinner.jpg",
        content_type: "image/jpeg",
        data,
    }
}

/// Body of a `/createProfile` request
pub fn create_profile_request(email: &str, username: &str) -> serde_json::Value {
    json!({
        "Name": "Test User",
        "username": username,
        "email": email,
        "bio": "I eat, therefore I am"
    })
}

/// Body of a `/createPost` request
pub fn create_post_request(
    profile_id: &str,
    username: &str,
    place_name: &str,
    caption: &str,
) -> serde_json::Value {
    json!({
        "userName": username,
        "imageUrl": "https://media.test/post_images/dinner.jpg",
        "placeName": place_name,
        "googleMapUrl": "https://maps.example.com/?q=place",
        "profileId": profile_id,
        "caption": caption,
        "profilePic": null,
        "rating": 4.5
    })
}
