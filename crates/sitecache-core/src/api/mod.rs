//! Remote content source.
//!
//! This module provides the `ContentSource` trait the cache manager fetches
//! through, and `ApiClient`, its implementation against the site's hosted
//! Postgres REST endpoint (PostgREST, as exposed by Supabase).
//!
//! Requests authenticate with the project API key sent both as the `apikey`
//! header and as a bearer token.

pub mod client;
pub mod error;
pub mod source;

pub use client::ApiClient;
pub use error::ApiError;
pub use source::ContentSource;
