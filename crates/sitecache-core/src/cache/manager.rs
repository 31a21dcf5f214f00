//! The content cache manager.
//!
//! `ContentCacheManager` owns the cached aggregate of the four content
//! collections. It serves the aggregate from the store when it is still
//! valid, refetches everything while the UI waits when it is not, and keeps
//! an aging aggregate fresh with a silent background refresh.
//!
//! State is published through a `tokio::sync::watch` channel; consumers take
//! `state()` snapshots or `subscribe()` to changes. The manager is a cheap
//! handle: clones share the same source, store and state.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::Context;
use futures::future::{BoxFuture, FutureExt, Shared};
use serde::Deserialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::api::ContentSource;
use crate::models::{BlogPost, Project, Service, TeamMember};

use super::content::now_millis;
use super::{
    CacheError, CachePolicy, CacheState, CacheStatus, CacheStore, CachedContent, CollectionView,
    Section, SCHEMA_VERSION,
};

/// Store key of the cached aggregate. Shared by every manager over a store.
pub const CONTENT_KEY: &str = "content_cache";

type RefreshFuture = Shared<BoxFuture<'static, Result<Arc<CachedContent>, CacheError>>>;

/// How `initialize` obtained its content.
#[derive(Debug)]
pub enum Initialization {
    /// Served from the store. `background` is the silent refresh started
    /// because the aggregate was past the refresh threshold.
    Cached { background: Option<JoinHandle<()>> },
    /// Nothing usable in the store; fetched while loading.
    Fetched,
    /// Nothing usable in the store and the fetch failed.
    Failed(CacheError),
}

/// Only reads the version so an old layout is a miss, not a parse error.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredVersion {
    #[serde(default)]
    schema_version: u32,
}

pub struct ContentCacheManager<S, T> {
    inner: Arc<Inner<S, T>>,
}

struct Inner<S, T> {
    source: S,
    store: T,
    policy: CachePolicy,
    state: watch::Sender<CacheState>,
    in_flight: Mutex<Option<RefreshFuture>>,
    /// Blocking `refresh_data` callers currently waiting on a fetch.
    waiting: AtomicUsize,
}

/// Held by a blocking refresh while it waits. When the last waiter is
/// dropped before the fetch settles, the status leaves `Loading`.
struct WaitGuard<'a, S, T> {
    inner: &'a Inner<S, T>,
    settled: bool,
}

impl<'a, S, T> WaitGuard<'a, S, T> {
    fn enter(inner: &'a Inner<S, T>) -> Self {
        inner.waiting.fetch_add(1, Ordering::SeqCst);
        Self {
            inner,
            settled: false,
        }
    }
}

impl<S, T> Drop for WaitGuard<'_, S, T> {
    fn drop(&mut self) {
        let last = self.inner.waiting.fetch_sub(1, Ordering::SeqCst) == 1;
        if self.settled || !last {
            return;
        }
        debug!("Refresh caller went away, fetch continues unattended");
        self.inner.state.send_modify(|state| {
            if state.status == CacheStatus::Loading {
                state.status = if state.content.is_some() {
                    CacheStatus::Ready
                } else {
                    CacheStatus::Uninitialized
                };
            }
        });
    }
}

impl<S, T> Clone for ContentCacheManager<S, T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S, T> ContentCacheManager<S, T>
where
    S: ContentSource + 'static,
    T: CacheStore + 'static,
{
    pub fn new(source: S, store: T, policy: CachePolicy) -> Self {
        if !policy.refreshes_in_background() {
            warn!(
                validity_minutes = policy.validity.num_minutes(),
                refresh_threshold_minutes = policy.refresh_threshold.num_minutes(),
                "Refresh threshold is not below the validity window; background refresh disabled"
            );
        }
        let (state, _) = watch::channel(CacheState::default());
        Self {
            inner: Arc::new(Inner {
                source,
                store,
                policy,
                state,
                in_flight: Mutex::new(None),
                waiting: AtomicUsize::new(0),
            }),
        }
    }

    pub fn policy(&self) -> CachePolicy {
        self.inner.policy
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> CacheState {
        self.inner.state.borrow().clone()
    }

    /// Receiver that wakes on every state change.
    pub fn subscribe(&self) -> watch::Receiver<CacheState> {
        self.inner.state.subscribe()
    }

    pub fn projects(&self) -> CollectionView<Project> {
        self.state().projects()
    }

    pub fn services(&self) -> CollectionView<Service> {
        self.state().services()
    }

    pub fn team(&self) -> CollectionView<TeamMember> {
        self.state().team()
    }

    pub fn blog_posts(&self) -> CollectionView<BlogPost> {
        self.state().blog_posts()
    }

    pub fn is_data_ready(&self, section: Option<Section>) -> bool {
        self.state().is_data_ready(section)
    }

    /// Load from the store, or fetch everything if nothing valid is cached.
    ///
    /// A valid aggregate is published immediately. If it is older than the
    /// refresh threshold, one background refresh is started; the status
    /// stays `Ready` while it runs.
    pub async fn initialize(&self) -> Initialization {
        let now = now_millis();

        if let Some(content) = self.inner.load_valid(now) {
            let stamp = content.last_updated;
            info!(
                age = %content.age_display(now),
                records = content.record_count(),
                "Serving content from cache"
            );
            self.inner.state.send_modify(|state| {
                state.status = CacheStatus::Ready;
                state.content = Some(Arc::new(content));
                state.error = None;
            });

            let background = if self.inner.policy.needs_background_refresh(stamp, now) {
                debug!("Cached content is aging, refreshing in background");
                Some(self.spawn_background_refresh())
            } else {
                None
            };
            return Initialization::Cached { background };
        }

        match self.refresh_data().await {
            Ok(_) => Initialization::Fetched,
            Err(e) => Initialization::Failed(e),
        }
    }

    /// Refetch all four collections while the UI shows its loading state.
    ///
    /// On failure the status becomes `Error` with the message in `error`;
    /// whatever content was loaded before stays in place. Dropping the
    /// returned future does not cancel the fetch.
    pub async fn refresh_data(&self) -> Result<Arc<CachedContent>, CacheError> {
        let mut guard = WaitGuard::enter(&self.inner);
        self.inner.state.send_modify(|state| {
            state.status = CacheStatus::Loading;
            state.error = None;
        });

        let result = self.join_or_start_refresh().await;
        guard.settled = true;
        drop(guard);

        match &result {
            Ok(_) => self.inner.state.send_modify(|state| {
                state.status = CacheStatus::Ready;
                state.error = None;
            }),
            Err(e) => {
                error!(error = %e, "Content fetch failed");
                let message = e.to_string();
                self.inner.state.send_modify(|state| {
                    state.status = CacheStatus::Error;
                    state.error = Some(message);
                });
            }
        }
        result
    }

    /// Remove the persisted aggregate. In-memory state is left alone.
    pub fn clear(&self) -> Result<(), CacheError> {
        self.inner
            .store
            .remove(CONTENT_KEY)
            .map_err(|e| CacheError::StoreWrite(format!("{:#}", e)))?;
        info!("Cached content removed from store");
        Ok(())
    }

    fn spawn_background_refresh(&self) -> JoinHandle<()> {
        let refresh = self.join_or_start_refresh();
        tokio::spawn(async move {
            match refresh.await {
                Ok(content) => {
                    debug!(records = content.record_count(), "Background refresh complete");
                }
                Err(e) => {
                    warn!(error = %e, "Background refresh failed, keeping cached content");
                }
            }
        })
    }

    /// Attach to the refresh already in flight, or start one.
    ///
    /// The fetch runs on its own task, so it settles and frees the slot even
    /// when every caller stops waiting for it.
    fn join_or_start_refresh(&self) -> RefreshFuture {
        let mut slot = self.inner.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(ref running) = *slot {
            debug!("Refresh already in flight, joining it");
            return running.clone();
        }

        let inner = Arc::clone(&self.inner);
        let task = tokio::spawn(async move {
            let result = inner.fetch_all().await;
            inner
                .in_flight
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .take();
            result
        });
        let refresh = async move {
            task.await
                .unwrap_or_else(|e| Err(CacheError::Fetch(format!("Refresh task failed: {}", e))))
        }
        .boxed()
        .shared();

        *slot = Some(refresh.clone());
        refresh
    }
}

impl<S, T> Inner<S, T>
where
    S: ContentSource,
    T: CacheStore,
{
    /// Fan out the four reads, then persist and publish the new aggregate.
    /// Any failed read fails the whole batch and nothing is replaced.
    async fn fetch_all(&self) -> Result<Arc<CachedContent>, CacheError> {
        info!("Fetching all content");

        let (projects, services, team, blog_posts) = tokio::try_join!(
            async { self.source.fetch_projects().await.context("Failed to fetch projects") },
            async { self.source.fetch_services().await.context("Failed to fetch services") },
            async { self.source.fetch_team().await.context("Failed to fetch team") },
            async { self.source.fetch_blog_posts().await.context("Failed to fetch blog posts") },
        )
        .map_err(|e| CacheError::fetch(&e))?;

        let now = now_millis();
        let previous = self
            .state
            .borrow()
            .content
            .as_ref()
            .map(|c| c.last_updated)
            .filter(|&stamp| !self.policy.is_from_future(stamp, now));
        let content = Arc::new(CachedContent::new(
            projects,
            services,
            team,
            blog_posts,
            now,
            previous,
        ));

        if let Err(e) = self.persist(&content) {
            warn!(error = %e, "Failed to cache content, keeping it in memory only");
        }

        self.state.send_modify(|state| {
            state.content = Some(Arc::clone(&content));
            if state.status == CacheStatus::Uninitialized {
                state.status = CacheStatus::Ready;
            }
        });

        info!(
            projects = content.projects.len(),
            services = content.services.len(),
            team = content.team.len(),
            blog_posts = content.blog_posts.len(),
            "Content refreshed"
        );
        Ok(content)
    }

    fn persist(&self, content: &CachedContent) -> Result<(), CacheError> {
        let raw = serde_json::to_string(content)
            .map_err(|e| CacheError::StoreWrite(e.to_string()))?;
        self.store
            .set(CONTENT_KEY, &raw)
            .map_err(|e| CacheError::StoreWrite(format!("{:#}", e)))
    }

    fn read_stored(&self) -> Result<Option<CachedContent>, CacheError> {
        let raw = match self.store.get(CONTENT_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Ok(None),
            Err(e) => return Err(CacheError::StoreRead(format!("{:#}", e))),
        };

        let stored: StoredVersion =
            serde_json::from_str(&raw).map_err(|e| CacheError::StoreRead(e.to_string()))?;
        if stored.schema_version != SCHEMA_VERSION {
            debug!(
                found = stored.schema_version,
                expected = SCHEMA_VERSION,
                "Cached content has another schema version"
            );
            return Ok(None);
        }

        let content =
            serde_json::from_str(&raw).map_err(|e| CacheError::StoreRead(e.to_string()))?;
        Ok(Some(content))
    }

    /// Stored aggregate if present, readable and inside the validity window.
    /// Store problems are logged and read as a miss.
    fn load_valid(&self, now: i64) -> Option<CachedContent> {
        match self.read_stored() {
            Ok(Some(content)) if self.policy.is_from_future(content.last_updated, now) => {
                let e = CacheError::StoreRead(format!(
                    "lastUpdated {} is ahead of the clock",
                    content.last_updated
                ));
                warn!(error = %e, "Ignoring unreadable cached content");
                None
            }
            Ok(Some(content)) if self.policy.is_valid(content.last_updated, now) => Some(content),
            Ok(Some(content)) => {
                debug!(age = %content.age_display(now), "Cached content expired");
                None
            }
            Ok(None) => {
                debug!("No cached content");
                None
            }
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable cached content");
                None
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
