use serde::{Deserialize, Serialize};

use super::{require, require_id, Record, RecordId};

/// Words per minute used when a post has no explicit read time.
const READING_WORDS_PER_MINUTE: usize = 200;

/// A blog article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    pub id: RecordId,
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, alias = "read_time", skip_serializing_if = "Option::is_none")]
    pub read_time: Option<String>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, alias = "created_at", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl BlogPost {
    /// Read time as stored, or estimated from the body length.
    pub fn read_time_display(&self) -> String {
        if let Some(ref stored) = self.read_time {
            if !stored.is_empty() {
                return stored.clone();
            }
        }
        let words = self.content.split_whitespace().count();
        let minutes = words.div_ceil(READING_WORDS_PER_MINUTE).max(1);
        format!("{} min read", minutes)
    }
}

impl Record for BlogPost {
    const TABLE: &'static str = "blog_posts";
    const ORDER: &'static str = "created_at.desc";

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn validate(&self) -> Result<(), String> {
        require_id(&self.id)?;
        require("title", &self.title)?;
        require("excerpt", &self.excerpt)?;
        require("content", &self.content)?;
        require("author", &self.author)
    }
}
