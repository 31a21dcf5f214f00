//! Content models for the marketing site.
//!
//! Each collection served by the site has an explicit record type:
//!
//! - `Project`: portfolio carousel entries
//! - `Service`: service offerings
//! - `TeamMember`: team section
//! - `BlogPost`: blog list and article pages
//!
//! Rows are decoded one at a time at the REST boundary and checked with
//! [`Record::validate`] so malformed rows never reach the cache.

pub mod blog;
pub mod project;
pub mod service;
pub mod team;

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

pub use blog::BlogPost;
pub use project::Project;
pub use service::Service;
pub use team::TeamMember;

/// Primary key of a content row. Serial tables return integers, uuid tables strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Int(id) => f.pad(&id.to_string()),
            RecordId::Text(id) => f.pad(id),
        }
    }
}

impl From<i64> for RecordId {
    fn from(id: i64) -> Self {
        RecordId::Int(id)
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        RecordId::Text(id.to_string())
    }
}

/// A row type that lives in one remote table.
pub trait Record {
    /// Table name on the REST endpoint.
    const TABLE: &'static str;

    /// PostgREST ordering applied when the full collection is read.
    const ORDER: &'static str;

    fn id(&self) -> &RecordId;

    /// Check fields serde cannot express (non-empty text and the like).
    fn validate(&self) -> Result<(), String>;
}

/// Fail validation when a required text field is blank.
pub(crate) fn require(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{} is empty", field))
    } else {
        Ok(())
    }
}

/// Read a nullable column as its default. PostgREST sends `null` for unset
/// columns, which `#[serde(default)]` alone does not accept.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Validate the id itself: text ids must not be blank.
pub(crate) fn require_id(id: &RecordId) -> Result<(), String> {
    match id {
        RecordId::Int(_) => Ok(()),
        RecordId::Text(s) => require("id", s),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_id_accepts_int_and_text() {
        let int: RecordId = serde_json::from_str("42").unwrap();
        assert_eq!(int, RecordId::Int(42));

        let text: RecordId = serde_json::from_str("\"3f2c\"").unwrap();
        assert_eq!(text, RecordId::Text("3f2c".to_string()));
    }

    #[test]
    fn test_record_id_display() {
        assert_eq!(RecordId::from(7).to_string(), "7");
        assert_eq!(RecordId::from("abc").to_string(), "abc");
    }

    #[test]
    fn test_require_rejects_blank() {
        assert!(require("title", "Site").is_ok());
        assert_eq!(require("title", "  "), Err("title is empty".to_string()));
        assert!(require_id(&RecordId::from("")).is_err());
        assert!(require_id(&RecordId::from(0)).is_ok());
    }
}
