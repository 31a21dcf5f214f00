//! sitecache-core - content cache for the marketing site.
//!
//! The site renders four collections (projects, services, team, blog posts)
//! that live in a hosted Postgres database. This crate keeps one local copy
//! of all four so pages render instantly, and refreshes it in the background
//! before it goes stale.
//!
//! - `api`: the remote content source and its REST client
//! - `cache`: stores, freshness policy and the `ContentCacheManager`
//! - `models`: typed content records
//! - `config`, `auth`: configuration file and API key storage

pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod models;

#[cfg(test)]
pub(crate) mod test_utils;

pub use api::{ApiClient, ApiError, ContentSource};
pub use cache::{
    CacheError, CachePolicy, CacheState, CacheStatus, CacheStore, CachedContent, CollectionView,
    ContentCacheManager, FileStore, Initialization, MemoryStore, Section,
};
pub use config::Config;
