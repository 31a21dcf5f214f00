use serde::{Deserialize, Serialize};

use super::{require, require_id, Record, RecordId};

/// A service offering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: RecordId,
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub features: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(default, alias = "created_at", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Record for Service {
    const TABLE: &'static str = "services";
    const ORDER: &'static str = "created_at.asc";

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn validate(&self) -> Result<(), String> {
        require_id(&self.id)?;
        require("title", &self.title)?;
        require("description", &self.description)
    }
}
