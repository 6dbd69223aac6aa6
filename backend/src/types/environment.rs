//! Environment configuration for different deployment stages

use std::env;
use std::time::Duration;

use aws_config::{retry::RetryConfig, timeout::TimeoutConfig, BehaviorVersion};
use tracing::Level;

/// Port the server listens on when `PORT` is not set
const DEFAULT_PORT: u16 = 3000;

/// Application environment configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    /// Production environment
    Production,
    /// Staging environment
    Staging,
    /// Development environment (uses `LocalStack`)
    Development,
}

impl Environment {
    /// Creates an Environment from the `APP_ENV` environment variable
    ///
    /// # Panics
    ///
    /// Panics if `APP_ENV` contains an invalid value
    #[must_use]
    pub fn from_env() -> Self {
        let env = env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .trim()
            .to_lowercase();

        match env.as_str() {
            "production" => Self::Production,
            "staging" => Self::Staging,
            "development" => Self::Development,
            _ => panic!("Invalid environment: {env}"),
        }
    }

    /// Port the HTTP server binds to
    ///
    /// # Errors
    ///
    /// Returns an error if `PORT` is set but is not a valid port number
    pub fn port(&self) -> Result<u16, std::num::ParseIntError> {
        env::var("PORT").map_or(Ok(DEFAULT_PORT), |port| port.parse())
    }

    /// Reads a required variable in production/staging, falling back to a local default in
    /// development
    fn required_var(&self, name: &str, development_default: &str) -> String {
        match self {
            Self::Production | Self::Staging => {
                env::var(name).unwrap_or_else(|_| panic!("{name} environment variable is not set"))
            }
            Self::Development => env::var(name).unwrap_or_else(|_| development_default.to_string()),
        }
    }

    /// Returns the profile table name
    ///
    /// # Panics
    ///
    /// Panics if `DYNAMODB_PROFILES_TABLE_NAME` is not set in production/staging
    #[must_use]
    pub fn profiles_table_name(&self) -> String {
        self.required_var("DYNAMODB_PROFILES_TABLE_NAME", "instaeats-profiles")
    }

    /// Returns the name of the profile GSI keyed by email
    ///
    /// # Panics
    ///
    /// Panics if `DYNAMODB_PROFILES_EMAIL_GSI` is not set in production/staging
    #[must_use]
    pub fn profiles_email_index_name(&self) -> String {
        self.required_var("DYNAMODB_PROFILES_EMAIL_GSI", "email-index")
    }

    /// Returns the post table name
    ///
    /// # Panics
    ///
    /// Panics if `DYNAMODB_POSTS_TABLE_NAME` is not set in production/staging
    #[must_use]
    pub fn posts_table_name(&self) -> String {
        self.required_var("DYNAMODB_POSTS_TABLE_NAME", "instaeats-posts")
    }

    /// Returns the name of the post GSI keyed by username
    ///
    /// # Panics
    ///
    /// Panics if `DYNAMODB_POSTS_USERNAME_GSI` is not set in production/staging
    #[must_use]
    pub fn posts_username_index_name(&self) -> String {
        self.required_var("DYNAMODB_POSTS_USERNAME_GSI", "username-index")
    }

    /// Returns the name of the post GSI keyed by author profile id
    ///
    /// # Panics
    ///
    /// Panics if `DYNAMODB_POSTS_AUTHOR_GSI` is not set in production/staging
    #[must_use]
    pub fn posts_author_index_name(&self) -> String {
        self.required_var("DYNAMODB_POSTS_AUTHOR_GSI", "author-profile-id-index")
    }

    /// Returns the S3 bucket name for the environment
    ///
    /// # Panics
    ///
    /// Panics if the `S3_BUCKET_NAME` environment variable is not set in production/staging
    #[must_use]
    pub fn s3_bucket(&self) -> String {
        self.required_var("S3_BUCKET_NAME", "instaeats-media")
    }

    /// Base URL under which uploaded objects are publicly reachable
    ///
    /// Defaults to the bucket's virtual-hosted S3 URL, or to the `LocalStack` path-style URL
    /// in development.
    #[must_use]
    pub fn media_public_base_url(&self) -> String {
        if let Ok(url) = env::var("MEDIA_PUBLIC_BASE_URL") {
            return url.trim_end_matches('/').to_string();
        }

        let bucket = self.s3_bucket();
        match self.override_aws_endpoint_url() {
            Some(endpoint) => format!("{endpoint}/{bucket}"),
            None => format!("https://{bucket}.s3.amazonaws.com"),
        }
    }

    /// Whether to show API docs
    #[must_use]
    pub const fn show_api_docs(&self) -> bool {
        matches!(self, Self::Development | Self::Staging)
    }

    /// Returns the endpoint URL to use for AWS services
    #[must_use]
    pub const fn override_aws_endpoint_url(&self) -> Option<&str> {
        match self {
            // Regular AWS endpoints for production and staging
            Self::Production | Self::Staging => None,
            // LocalStack endpoint for development
            Self::Development => Some("http://localhost:4566"),
        }
    }

    /// AWS configuration with retry and timeout settings
    pub async fn aws_config(&self) -> aws_config::SdkConfig {
        let retry_config = RetryConfig::standard()
            .with_max_attempts(3)
            .with_initial_backoff(Duration::from_millis(50));

        let timeout_config = TimeoutConfig::builder()
            .operation_timeout(Duration::from_secs(30))
            .build();

        let mut config_builder = aws_config::load_defaults(BehaviorVersion::latest())
            .await
            .to_builder()
            .retry_config(retry_config)
            .timeout_config(timeout_config);

        if let Some(endpoint_url) = self.override_aws_endpoint_url() {
            config_builder = config_builder.endpoint_url(endpoint_url);
        }

        config_builder.build()
    }

    /// AWS S3 service configuration
    pub async fn s3_client_config(&self) -> aws_sdk_s3::Config {
        let aws_config = self.aws_config().await;
        let s3_config: aws_sdk_s3::Config = (&aws_config).into();
        let mut builder = s3_config.to_builder();

        // Override "force path style" to true for compatibility with LocalStack
        // https://github.com/awslabs/aws-sdk-rust/discussions/874
        if matches!(self, Self::Development) {
            builder.set_force_path_style(Some(true));
        }

        builder.build()
    }

    /// Log level used when `RUST_LOG` does not say otherwise
    #[must_use]
    pub fn tracing_level(&self) -> Level {
        env::var("TRACING_LEVEL")
            .ok()
            .and_then(|val| val.parse::<Level>().ok())
            .unwrap_or(match self {
                Self::Production | Self::Staging => Level::INFO,
                Self::Development => Level::DEBUG,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_environment_from_env() {
        // Test development (default)
        env::remove_var("APP_ENV");
        assert_eq!(Environment::from_env(), Environment::Development);

        env::set_var("APP_ENV", " Staging ");
        assert_eq!(Environment::from_env(), Environment::Staging);

        env::set_var("APP_ENV", "production");
        assert_eq!(Environment::from_env(), Environment::Production);

        env::remove_var("APP_ENV");
    }

    #[test]
    #[serial]
    #[should_panic(expected = "Invalid environment: invalid")]
    fn test_invalid_environment() {
        env::set_var("APP_ENV", "invalid");
        let _ = Environment::from_env();
    }

    #[test]
    #[serial]
    fn test_development_defaults() {
        env::remove_var("DYNAMODB_PROFILES_TABLE_NAME");
        env::remove_var("S3_BUCKET_NAME");
        env::remove_var("MEDIA_PUBLIC_BASE_URL");
        env::remove_var("PORT");

        let env = Environment::Development;

        assert_eq!(env.profiles_table_name(), "instaeats-profiles");
        assert_eq!(env.s3_bucket(), "instaeats-media");
        assert_eq!(
            env.media_public_base_url(),
            "http://localhost:4566/instaeats-media"
        );
        assert_eq!(env.port(), Ok(3000));
    }

    #[test]
    #[serial]
    fn test_public_base_url_override() {
        env::set_var("MEDIA_PUBLIC_BASE_URL", "https://cdn.example.com/");

        assert_eq!(
            Environment::Production.media_public_base_url(),
            "https://cdn.example.com"
        );

        env::remove_var("MEDIA_PUBLIC_BASE_URL");
    }

    #[test]
    #[serial]
    fn test_production_public_base_url() {
        env::remove_var("MEDIA_PUBLIC_BASE_URL");
        env::set_var("S3_BUCKET_NAME", "instaeats-prod-media");

        assert_eq!(
            Environment::Production.media_public_base_url(),
            "https://instaeats-prod-media.s3.amazonaws.com"
        );

        env::remove_var("S3_BUCKET_NAME");
    }

    #[test]
    #[serial]
    #[should_panic(expected = "DYNAMODB_POSTS_TABLE_NAME environment variable is not set")]
    fn test_production_requires_table_name() {
        env::remove_var("DYNAMODB_POSTS_TABLE_NAME");
        let _ = Environment::Production.posts_table_name();
    }

    #[test]
    #[serial]
    fn test_invalid_port() {
        env::set_var("PORT", "not-a-port");
        assert!(Environment::Development.port().is_err());
        env::remove_var("PORT");
    }
}
