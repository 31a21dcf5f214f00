//! API client for the site's hosted Postgres REST endpoint.
//!
//! This module provides the `ApiClient` struct, which reads the four content
//! tables and decodes them row by row into typed records.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::models::{BlogPost, Project, Record, Service, TeamMember};

use super::{ApiError, ContentSource};

// ============================================================================
// Constants
// ============================================================================

/// Path prefix of the PostgREST API under the project URL.
const REST_PATH: &str = "rest/v1";

/// Per-request timeout. A whole refresh is four of these in parallel.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Retries after a 429 before a table read gives up.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// First wait after a 429 without `Retry-After`; doubles per retry.
const INITIAL_BACKOFF_MS: u64 = 1000;

/// Reads the content tables over PostgREST. Clones share one connection pool.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Arc<str>,
    api_key: Arc<str>,
}

impl ApiClient {
    /// Create a new API client for a project URL such as `https://xyz.supabase.co`.
    pub fn new(project_url: &str, api_key: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: Arc::from(Self::rest_base(project_url)),
            api_key: Arc::from(api_key),
        })
    }

    fn rest_base(project_url: &str) -> String {
        format!("{}/{}", project_url.trim_end_matches('/'), REST_PATH)
    }

    /// URL that reads a whole table in display order.
    fn table_url<T: Record>(&self) -> String {
        format!("{}/{}?select=*&order={}", self.base_url, T::TABLE, T::ORDER)
    }

    fn auth_headers(&self) -> Result<header::HeaderMap> {
        let mut headers = header::HeaderMap::new();
        headers.insert("apikey", header::HeaderValue::from_str(&self.api_key)?);
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&format!("Bearer {}", self.api_key))?,
        );
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );
        Ok(headers)
    }

    /// Delay requested by a 429 response, when it names one in seconds.
    fn retry_after(response: &reqwest::Response) -> Option<Duration> {
        response
            .headers()
            .get(header::RETRY_AFTER)?
            .to_str()
            .ok()?
            .trim()
            .parse::<u64>()
            .ok()
            .map(Duration::from_secs)
    }

    /// GET a table, backing off while the endpoint answers 429.
    async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let mut backoff = Duration::from_millis(INITIAL_BACKOFF_MS);

        for attempt in 0..=MAX_RATE_LIMIT_RETRIES {
            let response = self
                .client
                .get(url)
                .headers(self.auth_headers()?)
                .send()
                .await
                .map_err(ApiError::Unreachable)
                .with_context(|| format!("GET {}", url))?;

            let status = response.status();
            if status.is_success() {
                return response
                    .json()
                    .await
                    .with_context(|| format!("Malformed JSON from {}", url));
            }
            if status != StatusCode::TOO_MANY_REQUESTS {
                let body = response.text().await.unwrap_or_default();
                return Err(ApiError::from_status(status, &body).into());
            }
            if attempt == MAX_RATE_LIMIT_RETRIES {
                break;
            }

            let wait = Self::retry_after(&response).unwrap_or(backoff);
            warn!(url, retry = attempt + 1, wait_ms = wait.as_millis() as u64, "Rate limited");
            tokio::time::sleep(wait).await;
            backoff *= 2;
        }

        Err(ApiError::RateLimited(MAX_RATE_LIMIT_RETRIES).into())
    }

    /// Read one table and keep only the rows that decode and validate.
    async fn fetch_table<T: Record + DeserializeOwned>(&self) -> Result<Vec<T>> {
        let url = self.table_url::<T>();
        let rows: Vec<serde_json::Value> = self.get(&url).await?;
        let records = decode_rows::<T>(rows);
        debug!(table = T::TABLE, count = records.len(), "Table fetched");
        Ok(records)
    }
}

/// Decode rows one at a time. Rows that fail to decode or validate are
/// quarantined: logged and dropped, never passed on.
pub(crate) fn decode_rows<T: Record + DeserializeOwned>(rows: Vec<serde_json::Value>) -> Vec<T> {
    let total = rows.len();
    let records: Vec<T> = rows
        .into_iter()
        .enumerate()
        .filter_map(|(index, row)| {
            let record = match serde_json::from_value::<T>(row) {
                Ok(record) => record,
                Err(e) => {
                    warn!(table = T::TABLE, index, error = %e, "Quarantined row that failed to decode");
                    return None;
                }
            };
            match record.validate() {
                Ok(()) => Some(record),
                Err(reason) => {
                    warn!(table = T::TABLE, id = %record.id(), reason = %reason, "Quarantined invalid row");
                    None
                }
            }
        })
        .collect();

    if records.len() < total {
        warn!(
            table = T::TABLE,
            kept = records.len(),
            dropped = total - records.len(),
            "Some rows were quarantined"
        );
    }
    records
}

#[async_trait]
impl ContentSource for ApiClient {
    async fn fetch_projects(&self) -> Result<Vec<Project>> {
        self.fetch_table().await
    }

    async fn fetch_services(&self) -> Result<Vec<Service>> {
        self.fetch_table().await
    }

    async fn fetch_team(&self) -> Result<Vec<TeamMember>> {
        self.fetch_table().await
    }

    async fn fetch_blog_posts(&self) -> Result<Vec<BlogPost>> {
        self.fetch_table().await
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RecordId;
    use serde_json::json;

    #[test]
    fn test_table_url() {
        let api = ApiClient::new("https://abc.supabase.co/", "anon").unwrap();
        assert_eq!(
            api.table_url::<Project>(),
            "https://abc.supabase.co/rest/v1/projects?select=*&order=created_at.desc"
        );
        assert_eq!(
            api.table_url::<TeamMember>(),
            "https://abc.supabase.co/rest/v1/team_members?select=*&order=created_at.asc"
        );
    }

    #[test]
    fn test_auth_headers_carry_key() {
        let api = ApiClient::new("https://abc.supabase.co", "secret-key").unwrap();
        let headers = api.auth_headers().unwrap();
        assert_eq!(headers.get("apikey").unwrap(), "secret-key");
        assert_eq!(
            headers.get(header::AUTHORIZATION).unwrap(),
            "Bearer secret-key"
        );
    }

    #[test]
    fn test_decode_rows_quarantines_malformed() {
        let rows = vec![
            json!({"id": 1, "title": "SEO", "description": "Rank higher"}),
            json!({"id": 2, "title": "Missing description"}),
            json!({"id": 3, "title": "", "description": "Blank title"}),
            json!({"id": "4", "title": "Hosting", "description": "Managed", "features": ["CDN"]}),
        ];
        let services = decode_rows::<Service>(rows);
        assert_eq!(services.len(), 2);
        assert_eq!(services[0].title, "SEO");
        assert_eq!(services[1].features, vec!["CDN".to_string()]);
    }

    #[test]
    fn test_decode_rows_accepts_null_optional_columns() {
        let services = decode_rows::<Service>(vec![
            json!({"id": 1, "title": "SEO", "description": "Rank higher", "features": null}),
        ]);
        assert_eq!(services.len(), 1);
        assert!(services[0].features.is_empty());

        let projects = decode_rows::<Project>(vec![json!({
            "id": 1,
            "title": "Storefront",
            "category": "E-commerce",
            "image": "p1.png",
            "tech": ["React"],
            "link": "https://shop.example.com",
            "github": null,
            "featured": null
        })]);
        assert_eq!(projects.len(), 1);
        assert!(!projects[0].featured);

        let posts = decode_rows::<BlogPost>(vec![json!({
            "id": "a1",
            "title": "Launch",
            "excerpt": "We shipped",
            "content": "Long form body",
            "author": "Team",
            "tags": null,
            "read_time": null
        })]);
        assert_eq!(posts.len(), 1);
        assert!(posts[0].tags.is_empty());
    }

    #[test]
    fn test_decode_rows_quarantines_blank_post_body() {
        let posts = decode_rows::<BlogPost>(vec![
            json!({"id": 1, "title": "Draft", "excerpt": "Soon", "content": "", "author": "Team"}),
            json!({"id": 2, "title": "Live", "excerpt": "Now", "content": "Body", "author": "Team"}),
        ]);
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].id, RecordId::from(2));
    }

    #[test]
    fn test_decode_rows_keeps_order() {
        let rows = (1..=3)
            .map(|i| json!({"id": i, "name": format!("M{}", i), "role": "Dev", "image": "m.png"}))
            .collect();
        let team = decode_rows::<TeamMember>(rows);
        let names: Vec<_> = team.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["M1", "M2", "M3"]);
    }
}
