//! Fixtures and an in-memory content source shared by the unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use tokio::sync::Semaphore;

use crate::api::ContentSource;
use crate::cache::{CacheStore, CachedContent, Section, CONTENT_KEY};
use crate::models::{BlogPost, Project, RecordId, Service, TeamMember};

pub fn project(id: i64) -> Project {
    Project {
        id: RecordId::from(id),
        title: format!("Project {}", id),
        category: "Web".to_string(),
        image: format!("https://cdn.example.com/project-{}.png", id),
        tech: vec!["React".to_string(), "Postgres".to_string()],
        link: format!("https://example.com/work/{}", id),
        github: String::new(),
        description: None,
        featured: id == 1,
        created_at: None,
    }
}

pub fn service(id: i64) -> Service {
    Service {
        id: RecordId::from(id),
        title: format!("Service {}", id),
        description: "Done well".to_string(),
        icon: None,
        features: vec![],
        price: None,
        created_at: None,
    }
}

pub fn member(id: i64) -> TeamMember {
    TeamMember {
        id: RecordId::from(id),
        name: format!("Member {}", id),
        role: "Developer".to_string(),
        image: "member.png".to_string(),
        bio: None,
        linkedin: None,
        twitter: None,
        github: None,
        created_at: None,
    }
}

pub fn post(id: i64) -> BlogPost {
    BlogPost {
        id: RecordId::from(id),
        title: format!("Post {}", id),
        excerpt: "Short".to_string(),
        content: "Long form body".to_string(),
        author: "Editor".to_string(),
        image: None,
        category: None,
        date: None,
        read_time: None,
        tags: vec![],
        slug: None,
        created_at: None,
    }
}

/// The four collections a `MockSource` returns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fixture {
    pub projects: Vec<Project>,
    pub services: Vec<Service>,
    pub team: Vec<TeamMember>,
    pub blog_posts: Vec<BlogPost>,
}

impl Fixture {
    /// `n` records in every collection, ids offset by `base`.
    pub fn sized(base: i64, n: i64) -> Self {
        Self {
            projects: (base..base + n).map(project).collect(),
            services: (base..base + n).map(service).collect(),
            team: (base..base + n).map(member).collect(),
            blog_posts: (base..base + n).map(post).collect(),
        }
    }

    pub fn matches(&self, content: &CachedContent) -> bool {
        self.projects == content.projects
            && self.services == content.services
            && self.team == content.team
            && self.blog_posts == content.blog_posts
    }
}

/// Write an aggregate of `fixture` aged `age_minutes` into `store`.
pub fn seed_store(store: &impl CacheStore, fixture: &Fixture, age_minutes: i64) -> CachedContent {
    let stamp = crate::cache::content::now_millis() - age_minutes * 60_000;
    let content = CachedContent::new(
        fixture.projects.clone(),
        fixture.services.clone(),
        fixture.team.clone(),
        fixture.blog_posts.clone(),
        stamp,
        None,
    );
    let raw = serde_json::to_string(&content).expect("serialize seed");
    store.set(CONTENT_KEY, &raw).expect("seed store");
    content
}

/// Content source backed by a `Fixture`, with call counting, injectable
/// failures and an optional gate that holds every fetch until opened.
#[derive(Default)]
pub struct MockSource {
    fixture: Mutex<Fixture>,
    failing: Mutex<Option<Section>>,
    fetches: AtomicUsize,
    gate: Option<Semaphore>,
}

impl MockSource {
    pub fn new(fixture: Fixture) -> Self {
        Self {
            fixture: Mutex::new(fixture),
            ..Default::default()
        }
    }

    /// Like `new`, but fetches wait until `open` is called.
    pub fn gated(fixture: Fixture) -> Self {
        Self {
            gate: Some(Semaphore::new(0)),
            ..Self::new(fixture)
        }
    }

    pub fn open(&self) {
        if let Some(ref gate) = self.gate {
            gate.add_permits(1);
        }
    }

    /// Number of fan-out fetches started (counted on the projects read).
    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn set_fixture(&self, fixture: Fixture) {
        *self.fixture.lock().unwrap() = fixture;
    }

    pub fn fail_on(&self, section: Option<Section>) {
        *self.failing.lock().unwrap() = section;
    }

    async fn read<V>(&self, section: Section, pick: impl FnOnce(&Fixture) -> Vec<V>) -> Result<Vec<V>> {
        if let Some(ref gate) = self.gate {
            let _permit = gate.acquire().await?;
        }
        if *self.failing.lock().unwrap() == Some(section) {
            return Err(anyhow!("{} table unavailable", section));
        }
        Ok(pick(&self.fixture.lock().unwrap()))
    }
}

#[async_trait]
impl ContentSource for MockSource {
    async fn fetch_projects(&self) -> Result<Vec<Project>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.read(Section::Projects, |f| f.projects.clone()).await
    }

    async fn fetch_services(&self) -> Result<Vec<Service>> {
        self.read(Section::Services, |f| f.services.clone()).await
    }

    async fn fetch_team(&self) -> Result<Vec<TeamMember>> {
        self.read(Section::Team, |f| f.team.clone()).await
    }

    async fn fetch_blog_posts(&self) -> Result<Vec<BlogPost>> {
        self.read(Section::BlogPosts, |f| f.blog_posts.clone()).await
    }
}
