//! Local caching module for site content.
//!
//! This module provides the `ContentCacheManager`, which keeps one cached
//! aggregate of the four content collections (projects, services, team,
//! blog posts) in a `CacheStore` and decides when that aggregate is served,
//! refreshed in the background, or refetched while the UI waits.
//!
//! By default an aggregate is valid for 30 minutes and refreshed in the
//! background once it is older than 15 minutes; see `CachePolicy`.

pub mod content;
pub mod error;
pub mod manager;
pub mod policy;
pub mod state;
pub mod store;

pub use content::{now_millis, CachedContent, SCHEMA_VERSION};
pub use error::CacheError;
pub use manager::{ContentCacheManager, Initialization, CONTENT_KEY};
pub use policy::CachePolicy;
pub use state::{CacheState, CacheStatus, CollectionView, Section};
pub use store::{CacheStore, FileStore, MemoryStore};
