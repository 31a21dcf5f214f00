use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{BlogPost, Project, Service, TeamMember};

/// Version of the stored aggregate's shape. Bump when a record type changes
/// so blobs written by older builds are treated as a cache miss.
pub const SCHEMA_VERSION: u32 = 1;

/// The four content collections and the moment they were fetched.
///
/// Always built, persisted and replaced as one unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedContent {
    pub schema_version: u32,
    pub projects: Vec<Project>,
    pub services: Vec<Service>,
    pub team: Vec<TeamMember>,
    pub blog_posts: Vec<BlogPost>,
    /// Milliseconds since the Unix epoch.
    pub last_updated: i64,
}

impl CachedContent {
    /// Build a fresh aggregate stamped at `now`.
    ///
    /// When `previous` is given the stamp is kept strictly after it, so a
    /// replacement always reads as newer even within the same millisecond.
    pub fn new(
        projects: Vec<Project>,
        services: Vec<Service>,
        team: Vec<TeamMember>,
        blog_posts: Vec<BlogPost>,
        now: i64,
        previous: Option<i64>,
    ) -> Self {
        let last_updated = match previous {
            Some(prev) if prev >= now => prev.saturating_add(1),
            _ => now,
        };
        Self {
            schema_version: SCHEMA_VERSION,
            projects,
            services,
            team,
            blog_posts,
            last_updated,
        }
    }

    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.last_updated).single()
    }

    pub fn age_minutes(&self, now: i64) -> i64 {
        now.saturating_sub(self.last_updated) / 60_000
    }

    pub fn age_display(&self, now: i64) -> String {
        let minutes = self.age_minutes(now);
        if minutes < 1 {
            // Covers clock skew too
            "just now".to_string()
        } else if minutes < 60 {
            format!("{}m ago", minutes)
        } else if minutes < 1440 {
            let hours = minutes / 60;
            if minutes % 60 >= 30 {
                format!("{}h ago", hours + 1)
            } else {
                format!("{}h ago", hours)
            }
        } else {
            let days = minutes / 1440;
            if (minutes % 1440) / 60 >= 12 {
                format!("{}d ago", days + 1)
            } else {
                format!("{}d ago", days)
            }
        }
    }

    /// Total number of records across the four collections.
    pub fn record_count(&self) -> usize {
        self.projects.len() + self.services.len() + self.team.len() + self.blog_posts.len()
    }
}

/// Current wall-clock time in milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}
