use std::sync::Arc;

use aws_sdk_dynamodb::Client as DynamoDbClient;
use aws_sdk_s3::Client as S3Client;

use backend::{media_storage::MediaStorage, server, state::AppState, types::Environment};
use instaeats_storage::{post::PostStorage, profile::ProfileStorage};
use tracing_subscriber::{filter::LevelFilter, fmt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Local overrides; deployed environments set real variables
    dotenvy::dotenv().ok();

    let environment = Environment::from_env();

    // RUST_LOG wins over TRACING_LEVEL
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(environment.tracing_level()).into())
        .from_env_lossy();

    // Use JSON format for staging/production (Datadog), regular format for development
    match environment {
        Environment::Production | Environment::Staging => {
            fmt().json().with_env_filter(filter).init();
        }
        Environment::Development => {
            fmt().with_env_filter(filter).init();
        }
    }

    let dynamodb_client = Arc::new(DynamoDbClient::new(&environment.aws_config().await));

    let profile_storage = Arc::new(ProfileStorage::new(
        dynamodb_client.clone(),
        environment.profiles_table_name(),
        environment.profiles_email_index_name(),
    ));
    tracing::info!("✅ Initialized profile storage");

    let post_storage = Arc::new(PostStorage::new(
        dynamodb_client,
        environment.posts_table_name(),
        environment.posts_username_index_name(),
        environment.posts_author_index_name(),
    ));
    tracing::info!("✅ Initialized post storage");

    let s3_client = Arc::new(S3Client::from_conf(environment.s3_client_config().await));
    let media_storage = Arc::new(MediaStorage::new(
        s3_client,
        environment.s3_bucket(),
        environment.media_public_base_url(),
    ));
    tracing::info!("✅ Initialized media storage");

    let state = AppState::new(profile_storage, post_storage, media_storage);
    state.ensure_ready().await?;

    server::start(environment, state).await
}
