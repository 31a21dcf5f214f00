use serde::{Deserialize, Serialize};

use super::{require, require_id, Record, RecordId};

/// A portfolio project shown in the carousel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: RecordId,
    pub title: String,
    pub category: String,
    pub image: String,
    pub tech: Vec<String>,
    #[serde(deserialize_with = "super::null_as_default")]
    pub link: String,
    #[serde(deserialize_with = "super::null_as_default")]
    pub github: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub featured: bool,
    #[serde(default, alias = "created_at", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Project {
    /// Technologies joined for a one-line display.
    pub fn tech_display(&self) -> String {
        self.tech.join(", ")
    }
}

impl Record for Project {
    const TABLE: &'static str = "projects";
    const ORDER: &'static str = "created_at.desc";

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn validate(&self) -> Result<(), String> {
        require_id(&self.id)?;
        require("title", &self.title)?;
        require("category", &self.category)?;
        require("image", &self.image)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_from_row() {
        let row = serde_json::json!({
            "id": 1,
            "title": "Storefront",
            "category": "E-commerce",
            "image": "https://cdn.example.com/p1.png",
            "tech": ["React", "Stripe"],
            "link": "https://shop.example.com",
            "github": "",
            "created_at": "2024-03-01T10:00:00Z"
        });
        let project: Project = serde_json::from_value(row).unwrap();
        assert_eq!(project.tech_display(), "React, Stripe");
        assert_eq!(project.created_at.as_deref(), Some("2024-03-01T10:00:00Z"));
        assert!(!project.featured);
        assert!(project.validate().is_ok());
    }

    #[test]
    fn test_project_links_may_be_blank_or_null() {
        let row = serde_json::json!({
            "id": 2,
            "title": "Internal tool",
            "category": "Dashboard",
            "image": "p2.png",
            "tech": ["Rust"],
            "link": null,
            "github": "",
            "featured": null
        });
        let project: Project = serde_json::from_value(row).unwrap();
        assert_eq!(project.link, "");
        assert!(!project.featured);
        assert!(project.validate().is_ok());
    }

    #[test]
    fn test_project_missing_tech_fails_decode() {
        let row = serde_json::json!({
            "id": 1,
            "title": "Storefront",
            "category": "E-commerce",
            "image": "x.png",
            "link": "",
            "github": ""
        });
        assert!(serde_json::from_value::<Project>(row).is_err());
    }
}
