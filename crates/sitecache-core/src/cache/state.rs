//! Snapshots of cache state handed to UI consumers.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::models::{BlogPost, Project, Service, TeamMember};

use super::CachedContent;

/// Lifecycle of a cache manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheStatus {
    #[default]
    Uninitialized,
    Loading,
    Ready,
    Error,
}

/// One of the four cached collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Projects,
    Services,
    Team,
    BlogPosts,
}

impl Section {
    pub const ALL: [Section; 4] = [
        Section::Projects,
        Section::Services,
        Section::Team,
        Section::BlogPosts,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Projects => "projects",
            Section::Services => "services",
            Section::Team => "team",
            Section::BlogPosts => "blogPosts",
        }
    }

    /// Number of records of this section in an aggregate.
    pub fn len_in(&self, content: &CachedContent) -> usize {
        match self {
            Section::Projects => content.projects.len(),
            Section::Services => content.services.len(),
            Section::Team => content.team.len(),
            Section::BlogPosts => content.blog_posts.len(),
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Section {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "projects" => Ok(Section::Projects),
            "services" => Ok(Section::Services),
            "team" => Ok(Section::Team),
            "blogposts" | "blog" | "posts" => Ok(Section::BlogPosts),
            other => Err(format!("Unknown section: {}", other)),
        }
    }
}

/// Everything a consumer needs to render: status, data and error.
///
/// Cloning is cheap; the aggregate is shared, never copied.
#[derive(Debug, Clone, Default)]
pub struct CacheState {
    pub status: CacheStatus,
    pub content: Option<Arc<CachedContent>>,
    pub error: Option<String>,
}

impl CacheState {
    /// The externally observed loading flag.
    pub fn loading(&self) -> bool {
        matches!(self.status, CacheStatus::Uninitialized | CacheStatus::Loading)
    }

    pub fn projects(&self) -> CollectionView<Project> {
        self.view(|c| &c.projects)
    }

    pub fn services(&self) -> CollectionView<Service> {
        self.view(|c| &c.services)
    }

    pub fn team(&self) -> CollectionView<TeamMember> {
        self.view(|c| &c.team)
    }

    pub fn blog_posts(&self) -> CollectionView<BlogPost> {
        self.view(|c| &c.blog_posts)
    }

    /// Without a section: whether any aggregate is loaded.
    /// With a section: whether that collection has records.
    pub fn is_data_ready(&self, section: Option<Section>) -> bool {
        match (&self.content, section) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(content), Some(section)) => section.len_in(content) > 0,
        }
    }

    fn view<T>(&self, select: fn(&CachedContent) -> &Vec<T>) -> CollectionView<T> {
        CollectionView {
            content: self.content.clone(),
            select,
            manager_loading: self.loading(),
        }
    }
}

/// Read-only view of one collection of a shared aggregate.
pub struct CollectionView<T> {
    content: Option<Arc<CachedContent>>,
    select: fn(&CachedContent) -> &Vec<T>,
    manager_loading: bool,
}

impl<T> CollectionView<T> {
    /// The records, empty when nothing is loaded yet.
    pub fn items(&self) -> &[T] {
        match self.content.as_deref() {
            Some(content) => (self.select)(content).as_slice(),
            None => &[],
        }
    }

    /// True until this collection has records and the manager is done loading.
    pub fn loading(&self) -> bool {
        self.manager_loading || !self.ready()
    }

    pub fn ready(&self) -> bool {
        !self.items().is_empty()
    }

    pub fn len(&self) -> usize {
        self.items().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }
}

impl<T> Clone for CollectionView<T> {
    fn clone(&self) -> Self {
        Self {
            content: self.content.clone(),
            select: self.select,
            manager_loading: self.manager_loading,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for CollectionView<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectionView")
            .field("items", &self.items())
            .field("loading", &self.loading())
            .finish()
    }
}
