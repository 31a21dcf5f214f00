use anyhow::Result;
use async_trait::async_trait;

use crate::models::{BlogPost, Project, Service, TeamMember};

/// Read side of the remote content store.
///
/// Every method returns the whole collection in display order. There is no
/// pagination or delta support; callers always replace what they had.
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn fetch_projects(&self) -> Result<Vec<Project>>;

    async fn fetch_services(&self) -> Result<Vec<Service>>;

    async fn fetch_team(&self) -> Result<Vec<TeamMember>>;

    async fn fetch_blog_posts(&self) -> Result<Vec<BlogPost>>;
}

#[async_trait]
impl<S: ContentSource + ?Sized> ContentSource for std::sync::Arc<S> {
    async fn fetch_projects(&self) -> Result<Vec<Project>> {
        (**self).fetch_projects().await
    }

    async fn fetch_services(&self) -> Result<Vec<Service>> {
        (**self).fetch_services().await
    }

    async fn fetch_team(&self) -> Result<Vec<TeamMember>> {
        (**self).fetch_team().await
    }

    async fn fetch_blog_posts(&self) -> Result<Vec<BlogPost>> {
        (**self).fetch_blog_posts().await
    }
}
