//! InstaEats backend service
//!
//! HTTP handlers for profiles, posts and image uploads over `DynamoDB` and S3.

#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    dead_code
)]

/// S3 image storage
pub mod media_storage;

/// Post creation saga
pub mod publication;

/// Route handlers
pub mod routes;

/// Router construction and server startup
pub mod server;

/// Application state
pub mod state;

/// Environment, errors and extractors
pub mod types;

#[cfg(test)]
mod testing;
