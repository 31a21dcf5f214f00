use serde::{Deserialize, Serialize};

use super::{require, require_id, Record, RecordId};

/// A member of the team section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    pub id: RecordId,
    pub name: String,
    pub role: String,
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github: Option<String>,
    #[serde(default, alias = "created_at", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl TeamMember {
    /// Social profile links that are actually set, in display order.
    pub fn social_links(&self) -> Vec<(&'static str, &str)> {
        [
            ("LinkedIn", &self.linkedin),
            ("Twitter", &self.twitter),
            ("GitHub", &self.github),
        ]
        .into_iter()
        .filter_map(|(label, url)| match url.as_deref() {
            Some(u) if !u.is_empty() => Some((label, u)),
            _ => None,
        })
        .collect()
    }
}

impl Record for TeamMember {
    const TABLE: &'static str = "team_members";
    const ORDER: &'static str = "created_at.asc";

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn validate(&self) -> Result<(), String> {
        require_id(&self.id)?;
        require("name", &self.name)?;
        require("role", &self.role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_social_links_skips_empty() {
        let member = TeamMember {
            id: RecordId::from(3),
            name: "Ada".to_string(),
            role: "Engineer".to_string(),
            image: "ada.png".to_string(),
            bio: None,
            linkedin: Some("https://linkedin.com/in/ada".to_string()),
            twitter: Some(String::new()),
            github: None,
            created_at: None,
        };
        assert_eq!(
            member.social_links(),
            vec![("LinkedIn", "https://linkedin.com/in/ada")]
        );
    }
}
