//! Storage services for `InstaEats`
//!
//! Profiles and posts live in two `DynamoDB` tables. Each table is reached through a
//! repository trait so the HTTP layer only depends on the operations it performs, not on
//! the client behind them. In-memory implementations of both traits are available behind
//! the `test-utils` feature.

mod dynamo;

pub mod post;
pub mod profile;
pub mod search;

#[cfg(feature = "test-utils")]
pub mod memory;
